//! Spans: one observed network call each.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use spyglass_http::RequestDescriptor;

/// Unique identifier for an observed call, generated at call start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanId(Uuid);

impl SpanId {
    /// Create a new random span ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SpanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal and non-terminal states of a span.
///
/// `Pending` is the only non-terminal state; a span transitions out of it
/// exactly once and its status never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
    /// The call is still in flight.
    Pending,
    /// The call returned a success response.
    Success,
    /// The call failed, or returned a non-success response.
    Error,
    /// The caller cancelled the call.
    Cancelled,
    /// A synthetic fault was injected into the call.
    Chaos,
}

impl SpanStatus {
    /// Whether this status closes a span.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SpanStatus::Pending)
    }

    /// Lowercase status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanStatus::Pending => "pending",
            SpanStatus::Success => "success",
            SpanStatus::Error => "error",
            SpanStatus::Cancelled => "cancelled",
            SpanStatus::Chaos => "chaos",
        }
    }
}

impl std::fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed network call, from open to terminal status.
#[derive(Debug, Clone)]
pub struct Span {
    /// Unique call identifier.
    pub id: SpanId,
    /// HTTP method.
    pub method: String,
    /// Normalized target URL.
    pub url: String,
    /// When the call was opened (monotonic).
    pub started_at: Instant,
    /// When the call reached a terminal status.
    pub ended_at: Option<Instant>,
    /// `ended_at - started_at`; set once terminal, never negative.
    pub duration: Option<Duration>,
    /// Current status.
    pub status: SpanStatus,
    /// The captured request, retained solely for replay. `None` when the
    /// call's body could not be captured.
    pub request: Option<RequestDescriptor>,
    /// True iff `status` is [`SpanStatus::Chaos`].
    pub chaos_affected: bool,
}

impl Span {
    /// Whether the span has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether a request was captured for replay.
    pub fn is_replayable(&self) -> bool {
        self.request.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_is_only_non_terminal_status() {
        assert!(!SpanStatus::Pending.is_terminal());
        assert!(SpanStatus::Success.is_terminal());
        assert!(SpanStatus::Error.is_terminal());
        assert!(SpanStatus::Cancelled.is_terminal());
        assert!(SpanStatus::Chaos.is_terminal());
    }

    #[test]
    fn test_span_ids_unique() {
        assert_ne!(SpanId::new(), SpanId::new());
    }
}
