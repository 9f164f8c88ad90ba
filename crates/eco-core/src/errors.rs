//! Cross-cutting error types for ecosort.
//!
//! Domain-specific errors (`GatewayError`, `CaptureError`, `SessionError`) live
//! in their respective crates. `CoreError` covers failures that can be raised
//! while manipulating the shared entities themselves.

use thiserror::Error;

/// Errors that can be raised by any ecosort crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {machine} from {from} to {to}")]
    InvalidTransition {
        machine: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, range, required field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
