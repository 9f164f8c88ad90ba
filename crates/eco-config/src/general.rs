//! General application configuration.

use eco_core::enums::Language;
use serde::{Deserialize, Serialize};

/// Default weight assumed for a nearby-recycler lookup.
const fn default_weight_kg() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Language used when the persisted state carries none.
    #[serde(default)]
    pub language: Language,

    #[serde(default = "default_weight_kg")]
    pub default_weight_kg: f64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: Language::En,
            default_weight_kg: default_weight_kg(),
        }
    }
}
