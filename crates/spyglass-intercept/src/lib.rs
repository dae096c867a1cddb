//! Spyglass Intercept
//!
//! The [`NetworkInterceptor`] wraps an [`HttpTransport`] call site: every
//! call through it opens a telemetry span, passes the chaos gate, delegates
//! to the wrapped transport, and closes the span with a terminal status.
//! The interceptor is itself an [`HttpTransport`], so applications are
//! handed the wrapped call site in place of the real one.
//!
//! ```
//! use std::sync::Arc;
//! use spyglass_chaos::ChaosInjector;
//! use spyglass_core::MemoryStorage;
//! use spyglass_intercept::NetworkInterceptor;
//! use spyglass_telemetry::TelemetrySpanStore;
//!
//! let chaos = Arc::new(ChaosInjector::new(Arc::new(MemoryStorage::new())));
//! let spans = Arc::new(TelemetrySpanStore::new());
//! let interceptor = NetworkInterceptor::new(chaos, spans);
//! assert!(!interceptor.is_initialized());
//! ```
//!
//! [`HttpTransport`]: spyglass_http::HttpTransport

pub mod interceptor;

pub use interceptor::NetworkInterceptor;
