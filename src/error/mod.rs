//! Error types for fitplan.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

use crate::auth::AuthError;

/// Maximum number of response-body bytes embedded in an error message.
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Primary error type for all fitplan operations.
#[derive(Error, Debug)]
pub enum FitplanError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl FitplanError {
    /// Create an API error from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Build an API error from a non-success response body, truncating
    /// oversized bodies.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        Self::api(status.as_u16(), truncate_body(body))
    }

    /// Status code carried by this error, if it came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            Self::Auth(AuthError::InvalidCredentials) => Some(401),
            _ => None,
        }
    }

    /// Whether this error ended the session (credentials are gone).
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Auth(AuthError::SessionExpired))
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth(AuthError::Io(_)) => ErrorCategory::Storage,
            Self::Auth(AuthError::Serialization(_)) => ErrorCategory::Serialization,
            Self::Auth(AuthError::Network(_)) => ErrorCategory::Network,
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Network(err) if err.is_timeout() => ErrorCategory::Timeout,
            Self::Network(_) => ErrorCategory::Network,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                404 => ErrorCategory::NotFound,
                400 | 409 | 422 => ErrorCategory::Validation,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::InvalidArgument(_) => ErrorCategory::Validation,
            Self::InvalidState(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether the caller may reasonably try the same call again later.
    ///
    /// The session manager itself never retries these.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::Reauthenticate,
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Server => {
                RecoverySuggestion::RetryLater
            }
            ErrorCategory::Validation | ErrorCategory::NotFound => RecoverySuggestion::FixRequest,
            ErrorCategory::Configuration | ErrorCategory::Storage => {
                RecoverySuggestion::CheckConfiguration
            }
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}... (truncated, {} total bytes)",
        &body[..end],
        body.len()
    )
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FitplanError>;
