//! Authentication error types.

use thiserror::Error;

/// Authentication error type.
///
/// Provider rejections are not errors; they come back as
/// [`AuthOutcome::Failure`](crate::AuthOutcome::Failure).
#[derive(Error, Debug)]
pub enum AuthError {
    /// HTTP request error (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// API URL template is missing the region placeholder
    #[error("Invalid API URL template: {0}")]
    InvalidTemplate(String),

    /// Provider reported success but a required field is missing
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Token could not be encoded as a header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] glucolink_storage::StorageError),

    /// No session available
    #[error("Not logged in")]
    NotLoggedIn,

    /// Invalid state transition in the auth FSM
    #[error("Invalid auth state transition: {0}")]
    InvalidStateTransition(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Returns true if this error is transient (connect failure, timeout, 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            _ => false,
        }
    }
}

impl From<glucolink_config_and_utils::CoreError> for AuthError {
    fn from(e: glucolink_config_and_utils::CoreError) -> Self {
        AuthError::Config(e.to_string())
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
