//! Geolocation provider.
//!
//! Resolves a single fix per activation. Failure never leaves the session
//! pending: unsupported platforms, denials, errors and timeouts all resolve
//! to the fallback coordinate with a diagnostic reason.

use std::future::Future;
use std::time::Duration;

use eco_core::{Coordinate, LocationFix};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::store::SessionStore;

/// Documented default fix timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a position request failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// Platform location capability.
pub trait LocationSource: Send + Sync {
    /// Whether the platform can produce fixes at all.
    fn is_supported(&self) -> bool;

    /// Request one fix.
    fn current_position(
        &self,
        high_accuracy: bool,
    ) -> impl Future<Output = Result<Coordinate, PositionError>> + Send;
}

/// A source that always reports the same coordinate (configured or
/// command-line location).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

impl LocationSource for FixedLocation {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self, _high_accuracy: bool) -> Result<Coordinate, PositionError> {
        Ok(self.0)
    }
}

/// A platform without location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationSource for NoLocation {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self, _high_accuracy: bool) -> Result<Coordinate, PositionError> {
        Err(PositionError::Unavailable("unsupported".into()))
    }
}

#[derive(Debug, Clone)]
pub struct GeolocationProvider<S> {
    source: S,
    timeout: Duration,
    high_accuracy: bool,
    fallback: Coordinate,
}

impl<S: LocationSource> GeolocationProvider<S> {
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            timeout: DEFAULT_TIMEOUT,
            high_accuracy: true,
            fallback: Coordinate::FALLBACK,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_high_accuracy(mut self, high_accuracy: bool) -> Self {
        self.high_accuracy = high_accuracy;
        self
    }

    #[must_use]
    pub const fn with_fallback(mut self, fallback: Coordinate) -> Self {
        self.fallback = fallback;
        self
    }

    /// Request one fix, bounded by the timeout. Always resolves `Ready`.
    pub async fn acquire(&self) -> LocationFix {
        if !self.source.is_supported() {
            tracing::info!("location unsupported; using fallback coordinate");
            return LocationFix::fallback(self.fallback, "unsupported");
        }

        let request = self.source.current_position(self.high_accuracy);
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(coordinate)) if coordinate.is_valid() => {
                tracing::debug!(%coordinate, "location fix acquired");
                LocationFix::live(coordinate)
            }
            Ok(Ok(coordinate)) => {
                tracing::warn!(%coordinate, "location source returned an invalid coordinate");
                LocationFix::fallback(self.fallback, "invalid coordinate")
            }
            Ok(Err(error)) => {
                tracing::warn!(%error, "location request failed; using fallback coordinate");
                LocationFix::fallback(self.fallback, error.to_string())
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis(), "location request timed out");
                LocationFix::fallback(self.fallback, "timeout")
            }
        }
    }

    /// Mark the store pending, acquire, and publish the result.
    pub async fn acquire_into(&self, store: &SessionStore) -> LocationFix {
        store.set_location(LocationFix::pending());
        let fix = self.acquire().await;
        store.set_location(fix.clone());
        fix
    }
}

impl<S: LocationSource + 'static> GeolocationProvider<S> {
    /// Start acquisition in the background. The store is pending until the
    /// task publishes its fix.
    pub fn spawn(self, store: SessionStore) -> JoinHandle<LocationFix> {
        store.set_location(LocationFix::pending());
        tokio::spawn(async move { self.acquire_into(&store).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::Readiness;
    use pretty_assertions::assert_eq;

    struct NeverResolves;

    impl LocationSource for NeverResolves {
        fn is_supported(&self) -> bool {
            true
        }

        async fn current_position(&self, _high: bool) -> Result<Coordinate, PositionError> {
            std::future::pending().await
        }
    }

    struct Denied;

    impl LocationSource for Denied {
        fn is_supported(&self) -> bool {
            true
        }

        async fn current_position(&self, _high: bool) -> Result<Coordinate, PositionError> {
            Err(PositionError::PermissionDenied)
        }
    }

    #[tokio::test]
    async fn fixed_source_is_live() {
        let fix = GeolocationProvider::new(FixedLocation(Coordinate::new(12.9716, 77.5946)))
            .acquire()
            .await;
        assert_eq!(fix, LocationFix::live(Coordinate::new(12.9716, 77.5946)));
    }

    #[tokio::test]
    async fn unsupported_resolves_to_fallback_immediately() {
        let fix = GeolocationProvider::new(NoLocation).acquire().await;
        assert_eq!(fix.readiness, Readiness::Ready);
        assert_eq!(fix.usable(), Some(Coordinate::FALLBACK));
        assert_eq!(fix.diagnostic.as_deref(), Some("unsupported"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_resolves_to_fallback() {
        let fix = GeolocationProvider::new(NeverResolves)
            .with_timeout(Duration::from_secs(5))
            .acquire()
            .await;
        assert_eq!(fix.readiness, Readiness::Ready);
        assert_eq!(fix.usable(), Some(Coordinate::FALLBACK));
        assert_eq!(fix.diagnostic.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn denial_records_reason() {
        let fix = GeolocationProvider::new(Denied).acquire().await;
        assert!(fix.is_fallback());
        assert_eq!(fix.diagnostic.as_deref(), Some("permission denied"));
    }

    #[tokio::test]
    async fn invalid_coordinate_is_replaced() {
        let fix = GeolocationProvider::new(FixedLocation(Coordinate::new(120.0, 0.0)))
            .acquire()
            .await;
        assert_eq!(fix.usable(), Some(Coordinate::FALLBACK));
    }

    #[tokio::test]
    async fn spawn_publishes_into_store() {
        let store = SessionStore::default();
        let handle = GeolocationProvider::new(FixedLocation(Coordinate::FALLBACK))
            .spawn(store.clone());
        let fix = handle.await.unwrap();
        assert_eq!(store.location(), fix);
    }
}
