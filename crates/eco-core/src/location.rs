//! Coordinates and the tri-state location readiness model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Fixed reference point (New Delhi) used when no live fix is available.
    pub const FALLBACK: Self = Self {
        latitude: 28.6139,
        longitude: 77.2090,
    };

    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Whether a coordinate may be read yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum Readiness {
    #[default]
    Pending,
    Ready,
    Unavailable(String),
}

impl Readiness {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Current location state held by the session store.
///
/// Consumers never read `coordinate` directly; [`LocationFix::usable`] applies
/// the pending/fallback rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LocationFix {
    pub readiness: Readiness,
    pub coordinate: Option<Coordinate>,
    /// Why the fallback was substituted, for diagnostic display.
    pub diagnostic: Option<String>,
}

impl LocationFix {
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn live(coordinate: Coordinate) -> Self {
        Self {
            readiness: Readiness::Ready,
            coordinate: Some(coordinate),
            diagnostic: None,
        }
    }

    /// Ready with the fallback coordinate, keeping the failure reason.
    #[must_use]
    pub fn fallback(fallback: Coordinate, reason: impl Into<String>) -> Self {
        Self {
            readiness: Readiness::Ready,
            coordinate: Some(fallback),
            diagnostic: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            readiness: Readiness::Unavailable(reason.into()),
            coordinate: None,
            diagnostic: None,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.readiness.is_pending()
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.diagnostic.is_some() || matches!(self.readiness, Readiness::Unavailable(_))
    }

    /// The coordinate a submission should use, or `None` while pending.
    ///
    /// `Unavailable` never blocks: it resolves to [`Coordinate::FALLBACK`].
    #[must_use]
    pub fn usable(&self) -> Option<Coordinate> {
        self.usable_or(Coordinate::FALLBACK)
    }

    /// Like [`LocationFix::usable`], resolving missing coordinates to
    /// `fallback` instead of the built-in point.
    #[must_use]
    pub fn usable_or(&self, fallback: Coordinate) -> Option<Coordinate> {
        match self.readiness {
            Readiness::Pending => None,
            Readiness::Ready => Some(self.coordinate.unwrap_or(fallback)),
            Readiness::Unavailable(_) => Some(fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pending_fix_is_not_usable() {
        assert_eq!(LocationFix::pending().usable(), None);
    }

    #[test]
    fn live_fix_uses_reported_coordinate() {
        let fix = LocationFix::live(Coordinate::new(19.07, 72.87));
        assert_eq!(fix.usable(), Some(Coordinate::new(19.07, 72.87)));
        assert!(!fix.is_fallback());
    }

    #[test]
    fn unavailable_resolves_to_fallback() {
        let fix = LocationFix::unavailable("permission denied");
        assert_eq!(fix.usable(), Some(Coordinate::FALLBACK));
        assert!(fix.is_fallback());
    }

    #[test]
    fn unavailable_resolves_to_given_fallback() {
        let home = Coordinate::new(12.9716, 77.5946);
        let fix = LocationFix::unavailable("permission denied");
        assert_eq!(fix.usable_or(home), Some(home));
        assert_eq!(LocationFix::pending().usable_or(home), None);
        let live = LocationFix::live(Coordinate::new(19.07, 72.87));
        assert_eq!(live.usable_or(home), Some(Coordinate::new(19.07, 72.87)));
    }

    #[test]
    fn fallback_fix_is_ready_with_diagnostic() {
        let fix = LocationFix::fallback(Coordinate::FALLBACK, "timeout");
        assert_eq!(fix.readiness, Readiness::Ready);
        assert_eq!(fix.diagnostic.as_deref(), Some("timeout"));
        assert_eq!(fix.usable(), Some(Coordinate::FALLBACK));
    }

    #[test]
    fn coordinate_range_checks() {
        assert!(Coordinate::FALLBACK.is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
