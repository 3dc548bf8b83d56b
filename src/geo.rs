use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Mean Earth radius (IUGG) in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn validate(self) -> Result<Self, QueryError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(QueryError::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }
}

/// Haversine distance between `a` and `b` in kilometers.
pub fn distance_km(a: Point, b: Point) -> Result<f64, QueryError> {
    let a = a.validate()?;
    let b = b.validate()?;

    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // rounding can push h just past 1 for antipodal points
    let c = 2.0 * h.min(1.0).sqrt().asin();

    Ok(EARTH_RADIUS_KM * c)
}
