//! Spyglass Telemetry
//!
//! Span tracking for intercepted network calls. Every observed call
//! becomes a [`Span`] in the [`TelemetrySpanStore`], which exposes
//! time-ordered snapshots, per-status [`SpanStats`], and request replay
//! from captured [`RequestDescriptor`]s.
//!
//! [`RequestDescriptor`]: spyglass_http::RequestDescriptor

pub mod span;
pub mod store;

pub use span::{Span, SpanId, SpanStatus};
pub use store::{SpanStats, TelemetrySpanStore};
