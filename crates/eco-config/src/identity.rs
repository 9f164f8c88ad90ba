//! Seed identity used when no persisted identity exists.

use eco_core::Identity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    /// Phone number or email.
    #[serde(default)]
    pub contact: String,
}

impl IdentityConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// The seed identity, if an id is configured.
    #[must_use]
    pub fn seed(&self) -> Option<Identity> {
        self.is_configured().then(|| {
            Identity::new(
                self.id.trim(),
                self.display_name.clone(),
                self.contact.clone(),
            )
        })
    }
}
