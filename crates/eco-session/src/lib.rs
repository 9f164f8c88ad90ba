//! # eco-session
//!
//! Client-side session for ecosort:
//! - [`store::SessionStore`], the single owned context holding identity,
//!   location, the current scan result, and UI state
//! - [`persist`], the JSON blob that survives restarts
//! - [`location::GeolocationProvider`], single-shot fixes with fallback
//! - [`capture`], the camera and voice recorder state machines
//! - [`orchestrator::SessionOrchestrator`], which sequences one capture
//!   through location, submission, and commit
//! - [`presentation`], read-only views over the store

pub mod capture;
pub mod location;
pub mod orchestrator;
pub mod persist;
pub mod presentation;
pub mod store;

mod error;

pub use error::{CaptureError, PersistError, SessionError};
pub use orchestrator::{RunOutcome, RunReport, SessionOrchestrator};
pub use store::{ScanRecord, SessionStore, SessionUiState};
