//! Gateway error types.

use thiserror::Error;

/// Errors that can occur when calling the recycling backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Input rejected before any request was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport failure (connect, timeout, TLS, broken body).
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Detail message extracted from the response body.
        message: String,
    },

    /// Redemption code unknown or already used.
    #[error("invalid code: {0}")]
    InvalidCode(String),

    /// Response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl GatewayError {
    /// Text shown to the user. Backend-supplied messages pass through verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message)
            | Self::Network(message)
            | Self::InvalidCode(message)
            | Self::Parse(message)
            | Self::Server { message, .. } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Parse(error.to_string())
        } else if error.is_timeout() {
            Self::Network(format!("request timed out: {error}"))
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}
