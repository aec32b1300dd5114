//! Unified error classification and recovery.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Validation,
    NotFound,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    Storage,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// The session is gone; the user has to log in again.
    Reauthenticate,
    RetryLater,
    FixRequest,
    CheckConfiguration,
    ContactSupport,
}
