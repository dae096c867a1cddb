//! The transport failure vocabulary.

use thiserror::Error;

use spyglass_chaos::SyntheticFault;

/// Why a transport call did not produce a response.
///
/// Interceptors classify terminal outcomes by variant: an injected
/// [`SyntheticFault`] is never confused with a real failure, and a
/// caller-initiated cancellation is never recorded as an error.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// A synthetic fault injected by the chaos gate. Real transports never
    /// construct this variant.
    #[error(transparent)]
    Fault(#[from] SyntheticFault),

    /// The caller cancelled the request before it completed.
    #[error("request cancelled by caller")]
    Cancelled,

    /// No transport is installed at this call site.
    #[error("no transport installed")]
    Unavailable,

    /// Any other transport-level failure (connect, DNS, protocol, ...).
    #[error("network failure: {0}")]
    Network(String),
}

impl TransportError {
    /// Whether this is an injected synthetic fault.
    pub fn is_fault(&self) -> bool {
        matches!(self, TransportError::Fault(_))
    }

    /// Whether this is a caller-initiated cancellation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fault_classified_by_variant_not_message() {
        // A real failure whose message mentions faults must not classify
        // as one.
        let imposter = TransportError::Network("synthetic network fault".to_string());
        assert!(!imposter.is_fault());

        let fault = TransportError::from(SyntheticFault::new(Duration::from_millis(10)));
        assert!(fault.is_fault());
        assert!(!fault.is_cancellation());
    }
}
