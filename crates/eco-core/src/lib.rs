//! # eco-core
//!
//! Core types shared across all ecosort crates:
//! - Entity structs for backend results (scans, recyclers, impact, wallet, pickups)
//! - Identity and registration records
//! - Coordinates and location readiness
//! - Capture inputs produced by the camera and voice recorder
//! - Session enums with state machine transitions
//! - Cross-cutting error types

pub mod capture;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod location;

pub use capture::CaptureInput;
pub use errors::CoreError;
pub use identity::Identity;
pub use location::{Coordinate, LocationFix, Readiness};
