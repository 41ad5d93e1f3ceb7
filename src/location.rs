//! Location provider abstraction
//!
//! Wraps whatever platform supplies a position fix behind one asynchronous
//! operation with a typed outcome; this is the only module that deals with
//! platform-specific failure causes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A position fix. Replaced wholesale on every read, never merged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in metres, zero when the provider has no estimate.
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// Also returned when the platform cannot answer the query; treated
    /// as "ask the user".
    Prompt,
}

/// How a fix should be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Zero means a cached fix is never reused.
    pub maximum_age: Duration,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Location error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LocationError {
    pub kind: LocationErrorKind,
    pub message: String,
}

impl LocationError {
    pub fn new(kind: LocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn permission_denied() -> Self {
        Self::new(
            LocationErrorKind::PermissionDenied,
            "Location permission denied. Please enable location access in your settings.",
        )
    }

    pub fn unavailable() -> Self {
        Self::new(
            LocationErrorKind::Unavailable,
            "Location information is unavailable.",
        )
    }

    pub fn timeout() -> Self {
        Self::new(LocationErrorKind::Timeout, "Location request timed out.")
    }

    pub fn unsupported() -> Self {
        Self::new(
            LocationErrorKind::Unsupported,
            "Geolocation is not supported on this device.",
        )
    }

    /// Failure with no better classification.
    pub fn other() -> Self {
        Self::new(LocationErrorKind::Other, "Unable to get your location")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationErrorKind {
    PermissionDenied,
    Unavailable,
    Timeout,
    /// No geolocation capability at all
    Unsupported,
    Other,
}

impl LocationErrorKind {
    /// Whether asking again can plausibly succeed without the user changing
    /// settings or hardware first.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            LocationErrorKind::Unavailable | LocationErrorKind::Timeout | LocationErrorKind::Other
        )
    }
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Capability check, no side effect.
    fn is_available(&self) -> bool;

    async fn check_permission(&self) -> PermissionState;

    async fn current_location(
        &self,
        options: &LocationOptions,
    ) -> Result<UserLocation, LocationError>;
}

/// Provider reading a fix from `LOCATOUR_LAT` / `LOCATOUR_LON`
///
/// The terminal front end has no platform geolocation, so the fix comes from
/// the environment. Variables are re-read on every acquisition, which also
/// satisfies the never-reuse-a-cached-fix contract.
pub struct EnvLocationProvider;

impl EnvLocationProvider {
    pub const LAT_VAR: &'static str = "LOCATOUR_LAT";
    pub const LON_VAR: &'static str = "LOCATOUR_LON";

    pub fn new() -> Self {
        Self
    }

    fn read() -> Option<(String, String)> {
        let lat = std::env::var(Self::LAT_VAR).ok()?;
        let lon = std::env::var(Self::LON_VAR).ok()?;
        Some((lat, lon))
    }
}

impl Default for EnvLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationProvider for EnvLocationProvider {
    fn is_available(&self) -> bool {
        Self::read().is_some()
    }

    async fn check_permission(&self) -> PermissionState {
        if self.is_available() {
            PermissionState::Granted
        } else {
            PermissionState::Prompt
        }
    }

    async fn current_location(
        &self,
        _options: &LocationOptions,
    ) -> Result<UserLocation, LocationError> {
        let (lat, lon) = match (
            std::env::var(Self::LAT_VAR).ok(),
            std::env::var(Self::LON_VAR).ok(),
        ) {
            (Some(lat), Some(lon)) => (lat, lon),
            (None, None) => return Err(LocationError::unsupported()),
            // Half a fix is a misconfiguration we cannot classify further.
            _ => return Err(LocationError::other()),
        };

        let latitude: f64 = lat.parse().map_err(|_| LocationError::unavailable())?;
        let longitude: f64 = lon.parse().map_err(|_| LocationError::unavailable())?;

        Ok(UserLocation {
            latitude,
            longitude,
            accuracy: 0.0,
        })
    }
}

/// Provider returning a fixed fix; the seam for tests and embedders that
/// already know the position.
pub struct StaticLocationProvider {
    location: UserLocation,
}

impl StaticLocationProvider {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            location: UserLocation {
                latitude,
                longitude,
                accuracy: 0.0,
            },
        }
    }
}

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    fn is_available(&self) -> bool {
        true
    }

    async fn check_permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    async fn current_location(
        &self,
        _options: &LocationOptions,
    ) -> Result<UserLocation, LocationError> {
        Ok(self.location)
    }
}
