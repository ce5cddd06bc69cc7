//! Geographic to local planar coordinates.
//!
//! Stations arrive as WGS-84 latitude/longitude. Planning happens on a
//! local tangent-plane approximation centred on the mean station
//! coordinate, so tree splits and edge weights work in straight-line meter
//! distances. Good to well under a percent at city scale, which is the
//! only scale a station network covers.

use crate::stations_reader::ImportedStation;
use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalProjection {
    pub lat_mean: f64,
    pub lon_mean: f64,
}

impl LocalProjection {
    pub fn new(lat_mean: f64, lon_mean: f64) -> Self {
        Self { lat_mean, lon_mean }
    }

    /// Centers the projection on the mean station coordinate. `None` when
    /// the roster is empty.
    pub fn from_stations(stations: &[ImportedStation]) -> Option<Self> {
        if stations.is_empty() {
            return None;
        }
        let n = stations.len() as f64;
        let lat_mean = stations.iter().map(|s| s.lat).sum::<f64>() / n;
        let lon_mean = stations.iter().map(|s| s.lon).sum::<f64>() / n;
        Some(Self::new(lat_mean, lon_mean))
    }

    /// Equirectangular projection: x east, y north, meters from the center.
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = EARTH_RADIUS_METERS
            * (lon - self.lon_mean).to_radians()
            * self.lat_mean.to_radians().cos();
        let y = EARTH_RADIUS_METERS * (lat - self.lat_mean).to_radians();
        (x, y)
    }
}

pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}
