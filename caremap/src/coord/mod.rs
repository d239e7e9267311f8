//! Geographic coordinate type and great-circle distance.
//!
//! Provides the validated [`Coordinate`] value type used throughout the
//! search core, and the haversine [`distance_km`] metric that ranking and
//! routing are built on.

use std::fmt;

/// Mean Earth radius in kilometers, as used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Minimum valid latitude in degrees.
pub const MIN_LATITUDE: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LATITUDE: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LONGITUDE: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Errors produced when constructing a [`Coordinate`] from raw degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordError {
    /// Latitude outside [-90, 90] (or not a number).
    InvalidLatitude(f64),
    /// Longitude outside [-180, 180] (or not a number).
    InvalidLongitude(f64),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "latitude {} outside [{}, {}]",
                    lat, MIN_LATITUDE, MAX_LATITUDE
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "longitude {} outside [{}, {}]",
                    lon, MIN_LONGITUDE, MAX_LONGITUDE
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}

/// A validated geographic coordinate in degrees.
///
/// Construction via [`Coordinate::new`] is the only way to obtain a value,
/// so every `Coordinate` in the system satisfies the latitude/longitude
/// range invariants. The type is an immutable `Copy` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude/longitude in degrees.
    ///
    /// # Arguments
    ///
    /// * `latitude` - Latitude in degrees (-90.0 to 90.0)
    /// * `longitude` - Longitude in degrees (-180.0 to 180.0)
    ///
    /// # Returns
    ///
    /// A `Result` containing the coordinate, or an error if either
    /// component is out of range or NaN.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(CoordError::InvalidLatitude(latitude));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(CoordError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Computes the great-circle distance between two coordinates in kilometers.
///
/// Uses the haversine formula with a mean Earth radius of 6371 km. The
/// metric is symmetric and returns zero for identical coordinates. Inputs
/// are already validated by construction, so the result is always finite.
#[inline]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
