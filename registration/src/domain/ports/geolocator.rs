//! Port for the platform geolocation capability.
//!
//! The controller queries it once per mount to build a display-only location
//! string. Failures fall back to a fixed string; they are never surfaced.

use crate::domain::GeoPosition;

use super::define_port_error;

define_port_error! {
    /// Reasons a position could not be obtained.
    pub enum GeolocationError {
        /// The user or platform refused access.
        PermissionDenied => "geolocation permission denied",
        /// The platform has no geolocation capability.
        Unsupported => "geolocation is not supported",
        /// The platform reported a failure.
        Failed { message: String } => "geolocation failed: {message}",
    }
}

/// Source of the device's current position.
#[cfg_attr(test, mockall::automock)]
pub trait Geolocator: Send + Sync {
    /// Query the current position.
    fn current_position(&self) -> Result<GeoPosition, GeolocationError>;
}
