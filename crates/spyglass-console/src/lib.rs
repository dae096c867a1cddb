//! Spyglass Console
//!
//! Bounded capture of structured log output. The [`ConsoleCaptureLayer`]
//! observes every `tracing` event flowing through the subscriber stack and
//! appends a [`LogEntry`] to the [`ConsoleCapture`] ring buffer; delivery
//! to sibling layers is unaffected.
//!
//! ```
//! use std::sync::Arc;
//! use spyglass_console::ConsoleCapture;
//! use tracing_subscriber::prelude::*;
//!
//! let capture = Arc::new(ConsoleCapture::new());
//! let subscriber = tracing_subscriber::registry().with(capture.layer());
//!
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::info!(user = "alice", "logged in");
//! });
//!
//! let entries = capture.snapshot();
//! assert_eq!(entries.len(), 1);
//! assert!(entries[0].message.contains("logged in"));
//! ```

pub mod capture;
pub mod entry;
pub mod layer;

pub use capture::{ConsoleCapture, DEFAULT_LOG_CAPACITY, install_global};
pub use entry::{LogEntry, LogLevel};
pub use layer::ConsoleCaptureLayer;
