//! The network interceptor.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use spyglass_chaos::ChaosInjector;
use spyglass_http::{HttpTransport, RequestDescriptor, TransportError, TransportResponse};
use spyglass_telemetry::{SpanStatus, TelemetrySpanStore};

/// Wraps a transport call site with span tracking and fault injection.
///
/// The interceptor is an explicit instance with an
/// [`init`](Self::init)/[`teardown`](Self::teardown) lifecycle; multiple
/// isolated instances can coexist. It never alters what the wrapped
/// transport returns: the original response or error always propagates to
/// the caller unchanged, apart from the chaos-injected latency or fault
/// itself.
pub struct NetworkInterceptor {
    chaos: Arc<ChaosInjector>,
    spans: Arc<TelemetrySpanStore>,
    inner: RwLock<Option<Arc<dyn HttpTransport>>>,
}

impl NetworkInterceptor {
    /// Create an interceptor with no transport installed.
    pub fn new(chaos: Arc<ChaosInjector>, spans: Arc<TelemetrySpanStore>) -> Self {
        Self {
            chaos,
            spans,
            inner: RwLock::new(None),
        }
    }

    /// Install the wrapped transport. Idempotent: the first call installs
    /// and returns true; every later call is a no-op returning false, so
    /// the call site is only ever wrapped once.
    pub fn init(&self, transport: Arc<dyn HttpTransport>) -> bool {
        let mut inner = self.inner.write();
        if inner.is_some() {
            tracing::debug!("Network interceptor already initialized");
            return false;
        }
        *inner = Some(transport);
        tracing::debug!("Network interceptor initialized");
        true
    }

    /// Remove and return the wrapped transport. Subsequent calls through
    /// the interceptor fail with [`TransportError::Unavailable`].
    pub fn teardown(&self) -> Option<Arc<dyn HttpTransport>> {
        self.inner.write().take()
    }

    /// Whether a transport is installed.
    pub fn is_initialized(&self) -> bool {
        self.inner.read().is_some()
    }

    /// The chaos injector consulted on every call.
    pub fn chaos(&self) -> &Arc<ChaosInjector> {
        &self.chaos
    }

    /// The span store fed by this interceptor.
    pub fn spans(&self) -> &Arc<TelemetrySpanStore> {
        &self.spans
    }

    fn classify_error(error: &TransportError) -> SpanStatus {
        match error {
            TransportError::Fault(_) => SpanStatus::Chaos,
            TransportError::Cancelled => SpanStatus::Cancelled,
            TransportError::Unavailable | TransportError::Network(_) => SpanStatus::Error,
        }
    }
}

#[async_trait]
impl HttpTransport for NetworkInterceptor {
    async fn execute(
        &self,
        request: RequestDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        let Some(inner) = self.inner.read().clone() else {
            return Err(TransportError::Unavailable);
        };

        let captured = request.is_replayable().then(|| request.clone());
        let id = self
            .spans
            .start_span(request.method.clone(), request.normalized_url(), captured);

        if let Err(fault) = self.chaos.apply_fault().await {
            self.spans.end_span(id, SpanStatus::Chaos);
            return Err(TransportError::Fault(fault));
        }

        match inner.execute(request).await {
            Ok(response) => {
                let status = if response.is_success() {
                    SpanStatus::Success
                } else {
                    SpanStatus::Error
                };
                self.spans.end_span(id, status);
                Ok(response)
            }
            Err(error) => {
                self.spans.end_span(id, Self::classify_error(&error));
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for NetworkInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkInterceptor")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use spyglass_core::MemoryStorage;

    /// Test transport returning a canned outcome.
    struct StubTransport {
        result: Result<u16, TransportError>,
    }

    impl StubTransport {
        fn responding(status: u16) -> Arc<Self> {
            Arc::new(Self { result: Ok(status) })
        }

        fn failing(error: TransportError) -> Arc<Self> {
            Arc::new(Self { result: Err(error) })
        }
    }

    #[async_trait]
    impl HttpTransport for StubTransport {
        async fn execute(
            &self,
            _request: RequestDescriptor,
        ) -> Result<TransportResponse, TransportError> {
            match &self.result {
                Ok(status) => Ok(TransportResponse::new(*status)),
                Err(error) => Err(error.clone()),
            }
        }
    }

    fn interceptor() -> NetworkInterceptor {
        let chaos = Arc::new(ChaosInjector::new(Arc::new(MemoryStorage::new())));
        let spans = Arc::new(TelemetrySpanStore::new());
        NetworkInterceptor::new(chaos, spans)
    }

    #[tokio::test]
    async fn test_success_response_closes_success() {
        let interceptor = interceptor();
        interceptor.init(StubTransport::responding(200));

        let response = interceptor
            .execute(RequestDescriptor::get("https://example.com"))
            .await
            .unwrap();
        assert!(response.is_success());

        let snapshot = interceptor.spans().snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].status, SpanStatus::Success);
        assert_eq!(snapshot[0].method, "GET");
        assert_eq!(snapshot[0].url, "https://example.com");
    }

    #[tokio::test]
    async fn test_non_success_response_closes_error() {
        let interceptor = interceptor();
        interceptor.init(StubTransport::responding(500));

        let response = interceptor
            .execute(RequestDescriptor::get("https://example.com"))
            .await
            .unwrap();
        assert_eq!(response.status, 500);

        assert_eq!(interceptor.spans().snapshot()[0].status, SpanStatus::Error);
    }

    #[tokio::test]
    async fn test_network_failure_closes_error_and_propagates() {
        let interceptor = interceptor();
        interceptor.init(StubTransport::failing(TransportError::Network(
            "connection refused".to_string(),
        )));

        let error = interceptor
            .execute(RequestDescriptor::get("https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(error, TransportError::Network(_)));

        assert_eq!(interceptor.spans().snapshot()[0].status, SpanStatus::Error);
    }

    #[tokio::test]
    async fn test_cancellation_closes_cancelled() {
        let interceptor = interceptor();
        interceptor.init(StubTransport::failing(TransportError::Cancelled));

        let error = interceptor
            .execute(RequestDescriptor::get("https://example.com"))
            .await
            .unwrap_err();
        assert!(error.is_cancellation());

        let span = &interceptor.spans().snapshot()[0];
        assert_eq!(span.status, SpanStatus::Cancelled);
        assert!(!span.chaos_affected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chaos_fault_closes_chaos_and_propagates() {
        let interceptor = interceptor();
        interceptor.init(StubTransport::responding(200));
        interceptor.chaos().set_enabled(true);
        interceptor.chaos().set_failure_rate(1.0);

        let error = interceptor
            .execute(RequestDescriptor::get("https://example.com"))
            .await
            .unwrap_err();
        assert!(error.is_fault());

        let span = &interceptor.spans().snapshot()[0];
        assert_eq!(span.status, SpanStatus::Chaos);
        assert!(span.chaos_affected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_failure_rate_never_injects() {
        let interceptor = interceptor();
        interceptor.init(StubTransport::responding(200));
        interceptor.chaos().set_enabled(true);
        interceptor.chaos().set_failure_rate(0.0);

        for _ in 0..10 {
            interceptor
                .execute(RequestDescriptor::get("https://example.com"))
                .await
                .unwrap();
        }

        assert_eq!(interceptor.spans().stats().chaos, 0);
        assert_eq!(interceptor.spans().stats().success, 10);
    }

    #[tokio::test]
    async fn test_init_idempotent_single_span_per_call() {
        let interceptor = interceptor();

        assert!(interceptor.init(StubTransport::responding(200)));
        assert!(!interceptor.init(StubTransport::responding(500)));

        let response = interceptor
            .execute(RequestDescriptor::get("https://example.com"))
            .await
            .unwrap();
        // The first transport stays installed.
        assert!(response.is_success());
        assert_eq!(interceptor.spans().len(), 1);
    }

    #[tokio::test]
    async fn test_uninitialized_execute_fails_without_span() {
        let interceptor = interceptor();

        let error = interceptor
            .execute(RequestDescriptor::get("https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(error, TransportError::Unavailable));
        assert!(interceptor.spans().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_uninstalls() {
        let interceptor = interceptor();
        interceptor.init(StubTransport::responding(200));

        assert!(interceptor.teardown().is_some());
        assert!(!interceptor.is_initialized());
        assert!(interceptor.teardown().is_none());

        let error = interceptor
            .execute(RequestDescriptor::get("https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(error, TransportError::Unavailable));
    }

    #[tokio::test]
    async fn test_opaque_body_not_captured() {
        let interceptor = interceptor();
        interceptor.init(StubTransport::responding(200));

        interceptor
            .execute(RequestDescriptor::post("https://example.com").with_opaque_body())
            .await
            .unwrap();

        let span = &interceptor.spans().snapshot()[0];
        assert!(span.request.is_none());
        assert!(!span.is_replayable());
    }

    #[tokio::test]
    async fn test_fragment_stripped_from_span_url() {
        let interceptor = interceptor();
        interceptor.init(StubTransport::responding(200));

        interceptor
            .execute(RequestDescriptor::get("https://example.com/page#frag"))
            .await
            .unwrap();

        assert_eq!(
            interceptor.spans().snapshot()[0].url,
            "https://example.com/page"
        );
    }

    /// Sleeps 50ms for `/slow` and 10ms for everything else.
    struct PathDelayTransport;

    #[async_trait]
    impl HttpTransport for PathDelayTransport {
        async fn execute(
            &self,
            request: RequestDescriptor,
        ) -> Result<TransportResponse, TransportError> {
            let delay = if request.url.ends_with("/slow") {
                Duration::from_millis(50)
            } else {
                Duration::from_millis(10)
            };
            tokio::time::sleep(delay).await;
            Ok(TransportResponse::new(200))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_interleaved_calls_ordered_by_start() {
        let interceptor = Arc::new(interceptor());
        interceptor.init(Arc::new(PathDelayTransport));

        // First call starts first and completes last.
        let first = {
            let interceptor = Arc::clone(&interceptor);
            tokio::spawn(async move {
                interceptor
                    .execute(RequestDescriptor::get("https://example.com/slow"))
                    .await
            })
        };
        tokio::task::yield_now().await;

        let second = {
            let interceptor = Arc::clone(&interceptor);
            tokio::spawn(async move {
                interceptor
                    .execute(RequestDescriptor::get("https://example.com/fast"))
                    .await
            })
        };

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let snapshot = interceptor.spans().snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].url, "https://example.com/slow");
        assert_eq!(snapshot[1].url, "https://example.com/fast");
        assert_eq!(snapshot[0].status, SpanStatus::Success);
        assert_eq!(snapshot[1].status, SpanStatus::Success);
    }
}
