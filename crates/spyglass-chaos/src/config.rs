//! Fault-injection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Process-wide fault-injection policy.
///
/// Persisted as a JSON blob; missing fields fall back to their defaults so
/// that older or partially written blobs still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaosConfig {
    /// Whether fault injection is active.
    #[serde(default)]
    pub enabled: bool,

    /// Lower bound of the injected latency.
    #[serde(default = "default_latency_min", with = "duration_millis")]
    pub latency_min: Duration,

    /// Upper bound of the injected latency. Always >= `latency_min`.
    #[serde(default = "default_latency_max", with = "duration_millis")]
    pub latency_max: Duration,

    /// Probability in [0, 1] that a call fails with a synthetic fault.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            latency_min: default_latency_min(),
            latency_max: default_latency_max(),
            failure_rate: default_failure_rate(),
        }
    }
}

fn default_latency_min() -> Duration {
    Duration::from_millis(200)
}

fn default_latency_max() -> Duration {
    Duration::from_millis(2000)
}

fn default_failure_rate() -> f64 {
    0.1
}

/// Durations persist as integer milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
