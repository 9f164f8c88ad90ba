use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Language;

/// The locally known user record used to attribute scans.
///
/// Exactly one identity is active per session. It is seeded from config or the
/// persisted blob at startup and only replaced through the session store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Identity {
    /// Opaque backend user id.
    pub id: String,
    pub display_name: String,
    /// Phone number or email address.
    pub contact: String,
}

impl Identity {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            contact: contact.into(),
        }
    }

    /// An identity is usable for attribution only when it carries an id.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Payload for `POST /user/register`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Registration {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "phone")]
    pub contact: String,
    pub language: Language,
}

/// Backend acknowledgement of a registration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RegisteredUser {
    pub id: String,
    pub contact: String,
    pub message: String,
}
