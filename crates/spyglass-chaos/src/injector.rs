//! The chaos injector.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use spyglass_core::{KeyValueStorage, ObservableStore, SubscriptionId};

use crate::config::ChaosConfig;
use crate::error::{ChaosError, ChaosResult};
use crate::fault::SyntheticFault;

/// Fixed storage key for the persisted chaos configuration.
pub const CHAOS_STORAGE_KEY: &str = "spyglass.chaos";

/// Holds the fault-injection policy and applies it to intercepted calls.
///
/// The configuration is loaded from durable storage at construction and
/// persisted on every setter call. Setters notify subscribers after
/// persisting, so observers always see the stored state.
pub struct ChaosInjector {
    config: ObservableStore<ChaosConfig>,
    storage: Arc<dyn KeyValueStorage>,
}

impl ChaosInjector {
    /// Create an injector, loading the persisted configuration or falling
    /// back to defaults. Corrupt or missing data never raises.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let config = Self::load(storage.as_ref());
        Self {
            config: ObservableStore::new(config),
            storage,
        }
    }

    fn load(storage: &dyn KeyValueStorage) -> ChaosConfig {
        let Some(blob) = storage.get(CHAOS_STORAGE_KEY) else {
            return ChaosConfig::default();
        };
        match serde_json::from_str(&blob) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!(%error, "Corrupt chaos config, using defaults");
                ChaosConfig::default()
            }
        }
    }

    /// Get a copy of the current configuration.
    pub fn config(&self) -> ChaosConfig {
        (*self.config.snapshot()).clone()
    }

    /// Enable or disable fault injection.
    pub fn set_enabled(&self, enabled: bool) {
        self.update(|config| config.enabled = enabled);
    }

    /// Set the injected latency range.
    pub fn set_latency(&self, min: Duration, max: Duration) -> ChaosResult<()> {
        if min > max {
            return Err(ChaosError::InvalidLatencyRange { min, max });
        }
        self.update(|config| {
            config.latency_min = min;
            config.latency_max = max;
        });
        Ok(())
    }

    /// Set the failure probability, clamped to [0, 1].
    pub fn set_failure_rate(&self, rate: f64) {
        self.update(|config| config.failure_rate = rate.clamp(0.0, 1.0));
    }

    /// Register a listener invoked after every configuration change.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.config.subscribe(listener)
    }

    /// Remove a previously registered listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.config.unsubscribe(id)
    }

    fn update(&self, f: impl FnOnce(&mut ChaosConfig)) {
        self.config.mutate(|config| {
            f(config);
            // Persist before subscribers observe the change. A storage
            // failure must not take the instrumented application down.
            if let Err(error) = self.persist(config) {
                tracing::warn!(%error, "Failed to persist chaos config");
            }
        });
    }

    fn persist(&self, config: &ChaosConfig) -> ChaosResult<()> {
        let blob = serde_json::to_string(config).map_err(spyglass_core::StorageError::from)?;
        self.storage.set(CHAOS_STORAGE_KEY, &blob)?;
        Ok(())
    }

    /// The awaitable chaos gate.
    ///
    /// No-op when disabled. Otherwise suspends the caller for a duration
    /// drawn uniformly from `[latency_min, latency_max]`, then with
    /// probability `failure_rate` returns a [`SyntheticFault`]. Latency and
    /// failure draws are independent per invocation.
    pub async fn apply_fault(&self) -> Result<(), SyntheticFault> {
        let config = self.config();
        if !config.enabled {
            return Ok(());
        }

        let delay = {
            let mut rng = rand::thread_rng();
            let min = config.latency_min.as_secs_f64();
            let max = config.latency_max.as_secs_f64();
            if max > min {
                Duration::from_secs_f64(rng.gen_range(min..=max))
            } else {
                config.latency_min
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let roll: f64 = rand::thread_rng().gen_range(0.0..1.0);
        if roll < config.failure_rate {
            tracing::debug!(?delay, "Injecting synthetic network fault");
            return Err(SyntheticFault::new(delay));
        }
        Ok(())
    }

    /// Whether fault injection is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.read(|config| config.enabled)
    }
}

impl std::fmt::Debug for ChaosInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaosInjector")
            .field("config", &self.config())
            .finish()
    }
}
