//! Geographic coordinate value object
//!
//! The canonical string form `"{latitude},{longitude}"` is what every HERE
//! endpoint accepts for `at`, `origin` and `destination`, so [`Coordinate`]
//! round-trips through that form via `Display` and `FromStr`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// A latitude/longitude pair in degrees
///
/// Serializes as `{"lat": .., "lng": ..}`, the waypoint shape used by the
/// matrix routing request body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    #[serde(rename = "lat")]
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    #[serde(rename = "lng")]
    longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinate` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinate(format!(
                "{latitude},{longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a coordinate without validation (for values read back from the API)
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidCoordinate(s.to_string());

        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lng.trim().parse().map_err(|_| invalid())?;

        Self::new(latitude, longitude)
    }
}
