//! # Spyglass - development-time HTTP and log instrumentation
//!
//! Spyglass observes and perturbs an application's outbound HTTP calls and
//! structured log output during development:
//!
//! - **Interception**: every call through the wrapped transport becomes a
//!   telemetry span with a terminal status
//! - **Chaos**: synthetic latency and failures, injected deterministically
//!   and persisted across restarts
//! - **Replay**: captured calls can be re-issued through the same wrapped
//!   call site
//! - **Log capture**: a bounded ring buffer of `tracing` events
//! - **Reactive snapshots**: every store exposes `subscribe` plus a
//!   reference-stable snapshot, so any presentation layer can bind to it
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use spyglass::prelude::*;
//!
//! let spyglass = Spyglass::builder()
//!     .with_storage(Arc::new(FileStorage::new(".spyglass.json")))
//!     .with_transport(Arc::new(ReqwestTransport::new()))
//!     .build();
//!
//! // Hand the wrapped call site to the application.
//! let transport = spyglass.transport();
//! let response = transport.execute(RequestDescriptor::get("https://api.example.com")).await?;
//!
//! // Perturb it.
//! spyglass.chaos().set_enabled(true);
//! spyglass.chaos().set_failure_rate(0.25);
//!
//! // Observe it.
//! for span in spyglass.spans().snapshot().iter() {
//!     println!("{} {} -> {}", span.method, span.url, span.status);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Your Application                      │
//! ├──────────────────────────────────────────────────────────┤
//! │                    spyglass (facade)                     │
//! │                 ┌──────────────────────┐                 │
//! │                 │   Spyglass Builder   │                 │
//! │                 └──────────┬───────────┘                 │
//! │                            │                             │
//! │  ┌───────────────┬────────┴────────┬──────────────────┐ │
//! │  │ intercept     │ chaos           │ telemetry        │ │
//! │  │ (call site)   │ (faults)        │ (spans, replay)  │ │
//! │  ├───────────────┴─────────────────┴──────────────────┤ │
//! │  │ core (observable stores, storage)   console (logs) │ │
//! │  └────────────────────────────────────────────────────┘ │
//! ├──────────────────────────────────────────────────────────┤
//! │           HttpTransport (reqwest, test stubs, ...)       │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use spyglass_chaos::ChaosInjector;
use spyglass_console::{ConsoleCapture, ConsoleCaptureLayer, DEFAULT_LOG_CAPACITY};
use spyglass_core::{KeyValueStorage, MemoryStorage};
use spyglass_http::{HttpTransport, RequestDescriptor, TransportError, TransportResponse};
use spyglass_intercept::NetworkInterceptor;
use spyglass_telemetry::{SpanId, TelemetrySpanStore};

// Re-export from sub-crates
pub use spyglass_chaos;
pub use spyglass_console;
pub use spyglass_core;
pub use spyglass_http;
pub use spyglass_intercept;
pub use spyglass_telemetry;

/// Builder for a wired Spyglass instance.
pub struct SpyglassBuilder {
    storage: Option<Arc<dyn KeyValueStorage>>,
    transport: Option<Arc<dyn HttpTransport>>,
    log_capacity: usize,
}

impl SpyglassBuilder {
    /// Create a builder with in-memory storage, no transport, and the
    /// default log capacity.
    pub fn new() -> Self {
        Self {
            storage: None,
            transport: None,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }

    /// Use the given durable storage for the chaos configuration.
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Install the given transport as the wrapped call site.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the log capture buffer capacity.
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Wire everything together.
    pub fn build(self) -> Spyglass {
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let chaos = Arc::new(ChaosInjector::new(storage));
        let spans = Arc::new(TelemetrySpanStore::new());
        let console = Arc::new(ConsoleCapture::with_capacity(self.log_capacity));
        let interceptor = Arc::new(NetworkInterceptor::new(
            Arc::clone(&chaos),
            Arc::clone(&spans),
        ));
        if let Some(transport) = self.transport {
            interceptor.init(transport);
        }

        Spyglass {
            chaos,
            spans,
            console,
            interceptor,
        }
    }
}

impl Default for SpyglassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A wired instrumentation instance.
///
/// Owns the chaos injector, span store, console capture, and the network
/// interceptor, and exposes the wrapped call site the application should
/// use for outbound HTTP.
pub struct Spyglass {
    chaos: Arc<ChaosInjector>,
    spans: Arc<TelemetrySpanStore>,
    console: Arc<ConsoleCapture>,
    interceptor: Arc<NetworkInterceptor>,
}

impl Spyglass {
    /// Create a builder.
    pub fn builder() -> SpyglassBuilder {
        SpyglassBuilder::new()
    }

    /// Create an instance with defaults: in-memory storage, no transport.
    pub fn with_defaults() -> Self {
        SpyglassBuilder::new().build()
    }

    /// The fault-injection policy store.
    pub fn chaos(&self) -> &Arc<ChaosInjector> {
        &self.chaos
    }

    /// The span store.
    pub fn spans(&self) -> &Arc<TelemetrySpanStore> {
        &self.spans
    }

    /// The log capture buffer.
    pub fn console(&self) -> &Arc<ConsoleCapture> {
        &self.console
    }

    /// The interceptor itself, for lifecycle control.
    pub fn interceptor(&self) -> &Arc<NetworkInterceptor> {
        &self.interceptor
    }

    /// The wrapped call site to hand to the application.
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.interceptor) as Arc<dyn HttpTransport>
    }

    /// Execute one call through the wrapped call site.
    pub async fn execute(
        &self,
        request: RequestDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        self.interceptor.execute(request).await
    }

    /// Re-issue a captured call through the wrapped call site, creating a
    /// brand-new span. `Ok(None)` when the span has no captured request.
    pub async fn replay(&self, id: SpanId) -> Result<Option<TransportResponse>, TransportError> {
        self.spans.replay(id, self.interceptor.as_ref()).await
    }

    /// A tracing layer feeding the console capture, for composing into the
    /// application's subscriber stack.
    pub fn console_layer(&self) -> ConsoleCaptureLayer {
        self.console.layer()
    }

    /// Install the console capture as the global default subscriber,
    /// exactly once. See [`spyglass_console::install_global`].
    pub fn init_console(&self) -> bool {
        spyglass_console::install_global(&self.console)
    }

    /// Uninstall the wrapped transport. Further calls through the
    /// interceptor fail with [`TransportError::Unavailable`].
    pub fn teardown(&self) {
        self.interceptor.teardown();
    }
}

impl std::fmt::Debug for Spyglass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spyglass")
            .field("initialized", &self.interceptor.is_initialized())
            .field("spans", &self.spans.len())
            .field("logs", &self.console.len())
            .finish()
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{Spyglass, SpyglassBuilder};
    pub use spyglass_chaos::{ChaosConfig, ChaosInjector, SyntheticFault};
    pub use spyglass_console::{ConsoleCapture, LogEntry, LogLevel};
    pub use spyglass_core::{FileStorage, KeyValueStorage, MemoryStorage, ObservableStore};
    pub use spyglass_http::{
        HttpTransport, RequestBody, RequestDescriptor, TransportError, TransportResponse,
    };
    #[cfg(feature = "reqwest")]
    pub use spyglass_http::ReqwestTransport;
    pub use spyglass_intercept::NetworkInterceptor;
    pub use spyglass_telemetry::{Span, SpanId, SpanStatus, TelemetrySpanStore};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use spyglass_telemetry::SpanStatus;

    /// Counts calls and returns 200 with the request echoed in a header.
    struct CountingTransport {
        calls: AtomicUsize,
        seen: Mutex<Vec<RequestDescriptor>>,
    }

    impl CountingTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for CountingTransport {
        async fn execute(
            &self,
            request: RequestDescriptor,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().push(request);
            Ok(TransportResponse::new(200).with_body("ok"))
        }
    }

    #[tokio::test]
    async fn test_end_to_end_call_creates_span() {
        let transport = CountingTransport::new();
        let spyglass = Spyglass::builder()
            .with_transport(transport.clone() as Arc<dyn HttpTransport>)
            .build();

        let response = spyglass
            .execute(RequestDescriptor::get("https://api.example.com/users"))
            .await
            .unwrap();
        assert!(response.is_success());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        let snapshot = spyglass.spans().snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].status, SpanStatus::Success);
        assert!(snapshot[0].duration.is_some());
    }

    #[tokio::test]
    async fn test_replay_creates_new_span_and_preserves_original() {
        let transport = CountingTransport::new();
        let spyglass = Spyglass::builder()
            .with_transport(transport.clone() as Arc<dyn HttpTransport>)
            .build();

        spyglass
            .execute(RequestDescriptor::post("https://api.example.com/items").with_body("data"))
            .await
            .unwrap();

        let original = spyglass.spans().snapshot()[0].clone();
        let response = spyglass.replay(original.id).await.unwrap();
        assert!(response.unwrap().is_success());

        // Replay went through the wrapped call site: two transport calls,
        // two spans, identical method and URL.
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        let snapshot = spyglass.spans().snapshot();
        assert_eq!(snapshot.len(), 2);
        let replayed = snapshot.iter().find(|span| span.id != original.id).unwrap();
        assert_eq!(replayed.method, original.method);
        assert_eq!(replayed.url, original.url);

        // Original untouched.
        let after = spyglass.spans().get(original.id).unwrap();
        assert_eq!(after.status, original.status);
        assert_eq!(after.duration, original.duration);
        assert_eq!(after.started_at, original.started_at);
    }

    #[tokio::test]
    async fn test_replay_without_capture_creates_no_span() {
        let transport = CountingTransport::new();
        let spyglass = Spyglass::builder()
            .with_transport(transport.clone() as Arc<dyn HttpTransport>)
            .build();

        spyglass
            .execute(RequestDescriptor::post("https://api.example.com/upload").with_opaque_body())
            .await
            .unwrap();

        let id = spyglass.spans().snapshot()[0].id;
        let response = spyglass.replay(id).await.unwrap();
        assert!(response.is_none());
        assert_eq!(spyglass.spans().len(), 1);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chaos_struck_call_observable() {
        let transport = CountingTransport::new();
        let spyglass = Spyglass::builder()
            .with_transport(transport.clone() as Arc<dyn HttpTransport>)
            .build();

        spyglass.chaos().set_enabled(true);
        spyglass.chaos().set_failure_rate(1.0);

        let error = spyglass
            .execute(RequestDescriptor::get("https://api.example.com"))
            .await
            .unwrap_err();
        assert!(error.is_fault());

        // The real transport never ran.
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert_eq!(spyglass.spans().stats().chaos, 1);
    }

    #[tokio::test]
    async fn test_teardown_stops_interception() {
        let spyglass = Spyglass::builder()
            .with_transport(CountingTransport::new() as Arc<dyn HttpTransport>)
            .build();

        spyglass.teardown();

        let error = spyglass
            .execute(RequestDescriptor::get("https://api.example.com"))
            .await
            .unwrap_err();
        assert!(matches!(error, TransportError::Unavailable));
    }

    #[test]
    fn test_console_layer_captures_into_instance() {
        use tracing_subscriber::prelude::*;

        let spyglass = Spyglass::with_defaults();
        let subscriber = tracing_subscriber::registry().with(spyglass.console_layer());

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(retries = 3, "request retried");
        });

        let entries = spyglass.console().snapshot();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].message.contains("request retried"));
    }

    #[test]
    fn test_default_build_has_no_transport() {
        let spyglass = Spyglass::with_defaults();
        assert!(!spyglass.interceptor().is_initialized());
    }
}
