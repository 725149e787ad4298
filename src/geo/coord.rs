use std::fmt;

use thiserror::Error;

/// Meters per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// A WGS84 position. Latitude is within [-90, 90], longitude within [-180, 180].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(GeoError::OutOfRange {
                latitude,
                longitude,
            });
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

    /// Move the coordinate by a small planar offset in meters.
    ///
    /// Latitude is clamped to the poles and longitude wraps at the antimeridian.
    pub fn offset_meters(&self, north_m: f64, east_m: f64) -> Self {
        let latitude = (self.latitude + north_m / METERS_PER_DEGREE).clamp(-90.0, 90.0);

        // cos(lat) reaches 0 at the poles; keep a floor so the east offset stays finite.
        let cos_lat = self.latitude.to_radians().cos().abs().max(1e-6);
        let mut longitude = self.longitude + east_m / (METERS_PER_DEGREE * cos_lat);
        while longitude > 180.0 {
            longitude -= 360.0;
        }
        while longitude < -180.0 {
            longitude += 360.0;
        }

        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Where the user is, as reported by a live sensor or set by hand.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UserLocation {
    pub coordinate: Coordinate,
    /// Reported accuracy radius in meters. Informational only.
    pub accuracy: Option<f64>,
}

impl UserLocation {
    pub fn new(coordinate: Coordinate, accuracy: Option<f64>) -> Self {
        let accuracy = accuracy.filter(|a| a.is_finite() && *a >= 0.0);
        Self {
            coordinate,
            accuracy,
        }
    }
}

impl From<Coordinate> for UserLocation {
    fn from(coordinate: Coordinate) -> Self {
        Self::new(coordinate, None)
    }
}
