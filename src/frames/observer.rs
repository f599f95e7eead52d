use nalgebra::Vector3;
use serde::Serialize;

use super::error::GeometryError;

/// WGS-84 equatorial radius, km.
pub const WGS84_A_KM: f64 = 6378.137;
/// WGS-84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Observer location on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeodeticPosition {
    latitude_deg: f64,
    longitude_deg: f64,
    height_km: f64,
}

impl GeodeticPosition {
    /// Longitude may be given in [-180, 360]; it is stored wrapped to
    /// [-180, 180).
    pub fn new(latitude_deg: f64, longitude_deg: f64, height_km: f64) -> Result<Self, GeometryError> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(GeometryError::InvalidObserver(format!(
                "latitude {latitude_deg} outside [-90, 90]"
            )));
        }
        if !(-180.0..=360.0).contains(&longitude_deg) {
            return Err(GeometryError::InvalidObserver(format!(
                "longitude {longitude_deg} outside [-180, 360]"
            )));
        }
        if !height_km.is_finite() {
            return Err(GeometryError::InvalidObserver(format!(
                "height {height_km} is not finite"
            )));
        }
        Ok(Self {
            latitude_deg,
            longitude_deg: (longitude_deg + 180.0).rem_euclid(360.0) - 180.0,
            height_km,
        })
    }

    /// Parse `"lat, lon"` in degrees.
    pub fn from_coordinates(coordinates: &str, height_km: Option<f64>) -> Result<Self, GeometryError> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        let [lat, lon] = parts.as_slice() else {
            return Err(GeometryError::InvalidObserver(format!(
                "expected \"lat, lon\", got \"{coordinates}\""
            )));
        };
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| GeometryError::InvalidObserver(format!("'{s}' is not a number")))
        };
        Self::new(parse(lat)?, parse(lon)?, height_km.unwrap_or(0.0))
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    pub fn height_km(&self) -> f64 {
        self.height_km
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> Vector3<f64> {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let (sin_lat, cos_lat) = self.lat_rad().sin_cos();
        let (sin_lon, cos_lon) = self.lon_rad().sin_cos();
        let n = WGS84_A_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        Vector3::new(
            (n + self.height_km) * cos_lat * cos_lon,
            (n + self.height_km) * cos_lat * sin_lon,
            (n * (1.0 - e2) + self.height_km) * sin_lat,
        )
    }

    /// Rotate an Earth-fixed vector into the local East-North-Up frame.
    pub fn ecef_to_enu(&self, dr: &Vector3<f64>) -> Vector3<f64> {
        let (sin_lat, cos_lat) = self.lat_rad().sin_cos();
        let (sin_lon, cos_lon) = self.lon_rad().sin_cos();

        let east = -sin_lon * dr.x + cos_lon * dr.y;
        let north = -sin_lat * cos_lon * dr.x - sin_lat * sin_lon * dr.y + cos_lat * dr.z;
        let up = cos_lat * cos_lon * dr.x + cos_lat * sin_lon * dr.y + sin_lat * dr.z;
        Vector3::new(east, north, up)
    }
}
