//! The span store.

use std::sync::Arc;
use std::time::Instant;

use spyglass_core::{ObservableStore, SubscriptionId};
use spyglass_http::{HttpTransport, RequestDescriptor, TransportError, TransportResponse};

use crate::span::{Span, SpanId, SpanStatus};

/// Per-status counts over the current span set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStats {
    /// Total spans held.
    pub total: usize,
    /// Spans still in flight.
    pub pending: usize,
    /// Spans closed successfully.
    pub success: usize,
    /// Spans closed with a real failure.
    pub error: usize,
    /// Spans closed by caller cancellation.
    pub cancelled: usize,
    /// Spans closed by an injected fault.
    pub chaos: usize,
}

/// Holds the spans of all observed network calls.
///
/// The snapshot is the span set sorted ascending by start time, stable for
/// equal timestamps by insertion order, and is re-sorted on every mutation
/// so interleaved calls always appear in start order. Spans accumulate
/// until [`clear`](Self::clear); only the log buffer is ring-bounded.
pub struct TelemetrySpanStore {
    spans: ObservableStore<Vec<Span>>,
}

impl TelemetrySpanStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            spans: ObservableStore::new(Vec::new()),
        }
    }

    /// Open a span for a call starting now. Returns the fresh span id.
    ///
    /// `request` is the captured descriptor for later replay; pass `None`
    /// when the call's arguments cannot be captured.
    pub fn start_span(
        &self,
        method: impl Into<String>,
        url: impl Into<String>,
        request: Option<RequestDescriptor>,
    ) -> SpanId {
        let id = SpanId::new();
        let span = Span {
            id,
            method: method.into(),
            url: url.into(),
            started_at: Instant::now(),
            ended_at: None,
            duration: None,
            status: SpanStatus::Pending,
            request,
            chaos_affected: false,
        };
        self.spans.mutate(|spans| {
            spans.push(span);
            // Stable sort: ties stay in insertion order.
            spans.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        });
        id
    }

    /// Close a span with a terminal status.
    ///
    /// Unknown ids and already-terminal spans are left untouched; a span's
    /// status and duration never change after close.
    pub fn end_span(&self, id: SpanId, status: SpanStatus) {
        if !status.is_terminal() {
            tracing::warn!(%id, "Refusing to close span with non-terminal status");
            return;
        }
        let eligible = self.spans.read(|spans| {
            spans
                .iter()
                .any(|span| span.id == id && span.status == SpanStatus::Pending)
        });
        if !eligible {
            tracing::debug!(%id, %status, "No pending span to close");
            return;
        }
        self.spans.mutate(|spans| {
            if let Some(span) = spans
                .iter_mut()
                .find(|span| span.id == id && span.status == SpanStatus::Pending)
            {
                let ended_at = Instant::now();
                span.ended_at = Some(ended_at);
                span.duration = Some(ended_at.saturating_duration_since(span.started_at));
                span.status = status;
                span.chaos_affected = status == SpanStatus::Chaos;
            }
        });
    }

    /// The current snapshot, sorted ascending by start time.
    pub fn snapshot(&self) -> Arc<Vec<Span>> {
        self.spans.snapshot()
    }

    /// Look up a span by id.
    pub fn get(&self, id: SpanId) -> Option<Span> {
        self.spans
            .read(|spans| spans.iter().find(|span| span.id == id).cloned())
    }

    /// Number of spans held.
    pub fn len(&self) -> usize {
        self.spans.read(|spans| spans.len())
    }

    /// Whether no spans are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-status counts.
    pub fn stats(&self) -> SpanStats {
        self.spans.read(|spans| {
            let mut stats = SpanStats {
                total: spans.len(),
                ..SpanStats::default()
            };
            for span in spans {
                match span.status {
                    SpanStatus::Pending => stats.pending += 1,
                    SpanStatus::Success => stats.success += 1,
                    SpanStatus::Error => stats.error += 1,
                    SpanStatus::Cancelled => stats.cancelled += 1,
                    SpanStatus::Chaos => stats.chaos += 1,
                }
            }
            stats
        })
    }

    /// Drop all spans and notify subscribers.
    pub fn clear(&self) {
        self.spans.mutate(|spans| spans.clear());
    }

    /// Register a listener invoked after every span mutation.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.spans.subscribe(listener)
    }

    /// Remove a previously registered listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.spans.unsubscribe(id)
    }

    /// Re-issue a captured call through `transport`.
    ///
    /// Callers pass the wrapped call site, so the replayed call is observed
    /// like any other and gets a brand-new span; the original span is left
    /// untouched. Returns `Ok(None)` without side effects when the span is
    /// unknown or carries no captured request.
    pub async fn replay(
        &self,
        id: SpanId,
        transport: &dyn HttpTransport,
    ) -> Result<Option<TransportResponse>, TransportError> {
        let Some(span) = self.get(id) else {
            tracing::warn!(%id, "No span to replay");
            return Ok(None);
        };
        let Some(request) = span.request else {
            tracing::warn!(%id, "No captured request to replay");
            return Ok(None);
        };

        tracing::debug!(%id, method = %span.method, url = %span.url, "Replaying request");
        transport.execute(request).await.map(Some)
    }
}

impl Default for TelemetrySpanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TelemetrySpanStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySpanStore")
            .field("stats", &self.stats())
            .finish()
    }
}
