//! Display-only location attached to a registration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ports::Geolocator;

/// Shown when the platform cannot provide a position.
pub const DEFAULT_LOCATION_FALLBACK: &str = "Location unavailable";

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Degrees north (negative for south).
    pub latitude: f64,
    /// Degrees east (negative for west).
    pub longitude: f64,
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Query `geolocator` once and render the result, or `fallback` on failure.
pub fn describe_location(geolocator: &dyn Geolocator, fallback: &str) -> String {
    match geolocator.current_position() {
        Ok(position) => position.to_string(),
        Err(error) => {
            tracing::debug!(%error, "geolocation unavailable; using fallback");
            fallback.to_owned()
        }
    }
}
