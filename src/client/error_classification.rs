//! Failure classification used by the caching interceptor.

use crate::Error;

/// The two failure kinds observable at the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The exchange completed but the response carried a failure status.
    Protocol,
    /// No response was received (connect failure, timeout, cancellation, ...).
    Transport,
}

/// Classify an error surfaced by the downstream continuation.
///
/// Anything without an associated response counts as a transport failure.
pub fn classify(err: &Error) -> FailureClass {
    match err {
        Error::Protocol(_) => FailureClass::Protocol,
        _ => FailureClass::Transport,
    }
}
