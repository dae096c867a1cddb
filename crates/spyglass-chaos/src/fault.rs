//! The synthetic fault raised by the chaos gate.

use std::time::Duration;

use thiserror::Error;

/// A deliberately injected network failure.
///
/// Raised by [`ChaosInjector::apply_fault`](crate::ChaosInjector::apply_fault)
/// after the injected latency has elapsed. Interceptors recognize this by
/// type and record the affected call as chaos-struck rather than failed;
/// the fault itself always surfaces to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("synthetic network fault injected after {delay:?}")]
pub struct SyntheticFault {
    /// The latency that was injected before the fault fired.
    pub delay: Duration,
}

impl SyntheticFault {
    /// Create a fault that fired after the given injected delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}
