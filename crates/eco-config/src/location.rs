//! Geolocation settings.

use eco_core::Coordinate;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_timeout_ms() -> u64 {
    5_000
}

const fn default_high_accuracy() -> bool {
    true
}

const fn default_fallback_latitude() -> f64 {
    Coordinate::FALLBACK.latitude
}

const fn default_fallback_longitude() -> f64 {
    Coordinate::FALLBACK.longitude
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    /// Fixed latitude reported as the live position. Unset means no location
    /// capability.
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    /// Upper bound for a single position fix.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,

    #[serde(default = "default_fallback_latitude")]
    pub fallback_latitude: f64,

    #[serde(default = "default_fallback_longitude")]
    pub fallback_longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            timeout_ms: default_timeout_ms(),
            high_accuracy: default_high_accuracy(),
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
        }
    }
}

impl LocationConfig {
    /// The configured fixed position, if both axes are set.
    #[must_use]
    pub fn fixed(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn fallback(&self) -> Coordinate {
        Coordinate::new(self.fallback_latitude, self.fallback_longitude)
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.latitude.is_some() != self.longitude.is_some() {
            return Err(ConfigError::InvalidValue {
                field: "location".into(),
                reason: "latitude and longitude must be set together".into(),
            });
        }
        if let Some(fixed) = self.fixed()
            && !fixed.is_valid()
        {
            return Err(ConfigError::InvalidValue {
                field: "location.latitude/longitude".into(),
                reason: format!("{fixed} is outside the valid range"),
            });
        }
        if !self.fallback().is_valid() {
            return Err(ConfigError::InvalidValue {
                field: "location.fallback_latitude/fallback_longitude".into(),
                reason: format!("{} is outside the valid range", self.fallback()),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "location.timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_have_no_fixed_position() {
        let config = LocationConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.fixed(), None);
        assert_eq!(config.fallback(), Coordinate::FALLBACK);
        assert_eq!(config.timeout_ms, 5_000);
    }

    #[test]
    fn half_configured_position_is_rejected() {
        let config = LocationConfig {
            latitude: Some(19.07),
            ..LocationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
