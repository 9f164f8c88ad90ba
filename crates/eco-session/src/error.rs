//! Error types for capture, persistence, and session orchestration.

use std::path::PathBuf;

use eco_core::CoreError;
use eco_gateway::GatewayError;
use thiserror::Error;

/// Errors raised by the camera and voice capturers.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The platform refused access to the camera, microphone, or file.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("capture too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    /// Capture finished without producing any data.
    #[error("nothing was captured")]
    Empty,

    #[error(transparent)]
    InvalidState(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for CaptureError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(error.to_string()),
            std::io::ErrorKind::NotFound => Self::DeviceUnavailable(error.to_string()),
            _ => Self::Io(error),
        }
    }
}

/// Errors raised while loading or saving the persisted client state.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid state file: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Terminal failure of a session operation. Every variant carries a message
/// suitable for the inline error banner.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No usable coordinate. Scans and recycler lookups fall back to the
    /// configured coordinate instead of raising this.
    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Input rejected before any backend call.
    #[error("{0}")]
    Validation(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("invalid code: {0}")]
    InvalidCode(String),

    #[error("unexpected response from backend: {0}")]
    UnexpectedResponse(String),

    /// Another capture is still being submitted.
    #[error("a capture is already being submitted")]
    Busy,

    #[error("capture failed: {0}")]
    Capture(String),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl SessionError {
    pub(crate) fn identity_required() -> Self {
        Self::Validation("identity required".into())
    }

    /// Text shown in the inline error banner. Backend messages pass through
    /// verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message)
            | Self::Network(message)
            | Self::InvalidCode(message)
            | Self::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<GatewayError> for SessionError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::Validation(message) => Self::Validation(message),
            GatewayError::Network(message) => Self::Network(message),
            GatewayError::Server { status, message } => Self::Server { status, message },
            GatewayError::InvalidCode(message) => Self::InvalidCode(message),
            GatewayError::Parse(message) => Self::UnexpectedResponse(message),
        }
    }
}

impl From<CaptureError> for SessionError {
    fn from(error: CaptureError) -> Self {
        match error {
            CaptureError::PermissionDenied(message) => Self::PermissionDenied(message),
            other => Self::Capture(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_detail_is_shown_verbatim() {
        let err = SessionError::from(GatewayError::Server {
            status: 500,
            message: "model unavailable".into(),
        });
        assert_eq!(err.user_message(), "model unavailable");
    }

    #[test]
    fn io_permission_error_maps_to_permission_denied() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "mic blocked");
        let err = SessionError::from(CaptureError::from(io));
        assert!(matches!(err, SessionError::PermissionDenied(_)));
    }

    #[test]
    fn busy_has_readable_message() {
        assert_eq!(
            SessionError::Busy.user_message(),
            "a capture is already being submitted"
        );
    }
}
