//! # eco-config
//!
//! Layered configuration loading for ecosort using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ECOSORT_*` prefix, `__` as separator)
//! 2. Project-level `.ecosort/config.toml`
//! 3. User-level `~/.config/ecosort/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ECOSORT_BACKEND__BASE_URL` -> `backend.base_url`,
//! `ECOSORT_LOCATION__TIMEOUT_MS` -> `location.timeout_ms`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use eco_config::EcoConfig;
//!
//! let config = EcoConfig::load_with_dotenv().expect("config");
//! println!("backend: {}", config.backend.base_url);
//! ```

mod backend;
mod error;
mod general;
mod identity;
mod location;
mod session;

pub use backend::BackendConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use identity::IdentityConfig;
pub use location::LocationConfig;
pub use session::SessionConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EcoConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl EcoConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is out of range.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests and the CLI can layer extra providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".ecosort/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("ECOSORT_").split("__"))
    }

    /// Check cross-field constraints that serde defaults cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.location.validate()?;
        if self.general.default_weight_kg <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_weight_kg".into(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ecosort").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        let config = EcoConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.location.is_configured());
        assert!(!config.identity.is_configured());
        assert_eq!(config.general.default_weight_kg, 1.0);
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = EcoConfig::figment();
        let config: EcoConfig = figment.extract().expect("should extract defaults");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.session.history_limit, 10);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut config = EcoConfig::default();
        config.general.default_weight_kg = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
