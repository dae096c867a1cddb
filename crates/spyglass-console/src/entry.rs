//! Captured log entries.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a captured log event, mirroring the five `tracing` levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Finest-grained diagnostics.
    Trace,
    /// Debugging output.
    Debug,
    /// Routine information.
    Info,
    /// Something worth attention.
    Warn,
    /// A failure.
    Error,
}

impl LogLevel {
    /// Lowercase level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            LogLevel::Error
        } else if level == tracing::Level::WARN {
            LogLevel::Warn
        } else if level == tracing::Level::INFO {
            LogLevel::Info
        } else if level == tracing::Level::DEBUG {
            LogLevel::Debug
        } else {
            LogLevel::Trace
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured structured-log event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// Event severity.
    pub level: LogLevel,
    /// The `tracing` target the event was emitted under.
    pub target: String,
    /// Rendered message: the event's message followed by its other fields
    /// as `key=value` pairs.
    pub message: String,
    /// When the event was captured (monotonic).
    pub timestamp: Instant,
    /// The original structured field values, retained for non-lossy
    /// inspection.
    pub fields: serde_json::Map<String, serde_json::Value>,
}
