//! Neighborhood-scale distance math
//!
//! Distances use a planar approximation in degree space scaled by
//! [`KM_PER_DEGREE`]. This is accurate enough for radii of a few kilometers
//! and is not geodesically exact; longitude degrees are not shortened towards
//! the poles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kilometers per degree used by [`distance_km`]
pub const KM_PER_DEGREE: f64 = 111.0;

/// Errors for coordinate construction and parsing
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("malformed coordinate text '{0}', expected \"lat,lng\"")]
    Malformed(String),
}

/// A validated latitude/longitude pair in decimal degrees
///
/// Deserializes from `{"latitude": .., "longitude": ..}` with range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GeoError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Parses the `"lat,lng"` form used by location pickers
impl FromStr for Coordinate {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| GeoError::Malformed(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| GeoError::Malformed(s.to_string()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| GeoError::Malformed(s.to_string()))?;
        Self::new(lat, lng)
    }
}

/// Anything that sits at a known coordinate
pub trait Located {
    fn coordinates(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn coordinates(&self) -> Coordinate {
        *self
    }
}

/// Approximate distance between two coordinates in kilometers
///
/// Euclidean distance in degree space times [`KM_PER_DEGREE`]. Symmetric and
/// zero for identical points.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = a.latitude - b.latitude;
    let d_lng = a.longitude - b.longitude;
    (d_lat * d_lat + d_lng * d_lng).sqrt() * KM_PER_DEGREE
}

/// Keeps the items within `radius_km` of `origin`, preserving order
///
/// Applying the same filter twice yields the same result.
pub fn filter_within_radius<T: Located>(
    items: Vec<T>,
    origin: Coordinate,
    radius_km: f64,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| distance_km(origin, item.coordinates()) <= radius_km)
        .collect()
}
