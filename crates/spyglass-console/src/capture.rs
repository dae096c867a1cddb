//! The bounded log capture buffer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing_subscriber::prelude::*;
use uuid::Uuid;

use spyglass_core::{ObservableStore, SubscriptionId};

use crate::entry::{LogEntry, LogLevel};
use crate::layer::ConsoleCaptureLayer;

/// Default capacity of the capture ring buffer.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Bounded FIFO buffer of captured log entries.
///
/// Holds at most `capacity` entries; appending to a full buffer evicts the
/// oldest. Subscribers are notified synchronously after every append and
/// clear.
pub struct ConsoleCapture {
    entries: ObservableStore<VecDeque<LogEntry>>,
    capacity: usize,
}

impl ConsoleCapture {
    /// Create a capture buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// Create a capture buffer with a custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: ObservableStore::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// A layer feeding this buffer, for composing into a subscriber stack.
    pub fn layer(self: &Arc<Self>) -> ConsoleCaptureLayer {
        ConsoleCaptureLayer::new(Arc::clone(self))
    }

    /// Append a pre-built entry, evicting the oldest when full.
    pub fn push(&self, entry: LogEntry) {
        self.entries.mutate(|entries| {
            entries.push_back(entry);
            while entries.len() > self.capacity {
                entries.pop_front();
            }
        });
    }

    /// Build and append an entry captured now.
    pub fn record(
        &self,
        level: LogLevel,
        target: &str,
        message: String,
        fields: serde_json::Map<String, serde_json::Value>,
    ) {
        self.push(LogEntry {
            id: Uuid::new_v4(),
            level,
            target: target.to_string(),
            message,
            timestamp: Instant::now(),
            fields,
        });
    }

    /// The current snapshot, oldest entry first.
    pub fn snapshot(&self) -> Arc<VecDeque<LogEntry>> {
        self.entries.snapshot()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.read(|entries| entries.len())
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all entries and notify subscribers.
    pub fn clear(&self) {
        self.entries.mutate(|entries| entries.clear());
    }

    /// Register a listener invoked after every buffer mutation.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.entries.subscribe(listener)
    }

    /// Remove a previously registered listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.entries.unsubscribe(id)
    }
}

impl Default for ConsoleCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConsoleCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleCapture")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

static GLOBAL_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Install a registry with the capture layer as the process-wide default
/// subscriber, exactly once.
///
/// Returns true on the first successful install. Repeat calls, or an
/// already-set global default, are no-ops returning false; composing
/// [`ConsoleCapture::layer`] into an application's own subscriber stack is
/// the instance-scoped alternative.
pub fn install_global(capture: &Arc<ConsoleCapture>) -> bool {
    if GLOBAL_INSTALLED.swap(true, Ordering::SeqCst) {
        return false;
    }
    match tracing_subscriber::registry().with(capture.layer()).try_init() {
        Ok(()) => true,
        Err(_) => {
            // Another global default beat us to it.
            GLOBAL_INSTALLED.store(false, Ordering::SeqCst);
            false
        }
    }
}
