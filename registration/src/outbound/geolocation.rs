//! Geolocation adapters for hosts without a positioning service.

use crate::domain::GeoPosition;
use crate::domain::ports::{GeolocationError, Geolocator};

/// Reports the same position on every query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedGeolocator {
    position: GeoPosition,
}

impl FixedGeolocator {
    /// A geolocator pinned to `latitude`, `longitude`.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            position: GeoPosition {
                latitude,
                longitude,
            },
        }
    }
}

impl Geolocator for FixedGeolocator {
    fn current_position(&self) -> Result<GeoPosition, GeolocationError> {
        Ok(self.position)
    }
}

/// Always reports that geolocation is unsupported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnavailableGeolocator;

impl Geolocator for UnavailableGeolocator {
    fn current_position(&self) -> Result<GeoPosition, GeolocationError> {
        Err(GeolocationError::unsupported())
    }
}
