use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::frames::TopocentricAngles;

/// One pointing command. Angles are apparent (or geometric when refraction
/// is disabled) and tilted when a tilt is configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointingRecord {
    pub timestamp: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    pub range_rate_km_s: f64,
}

impl PointingRecord {
    pub fn new(timestamp: DateTime<Utc>, angles: &TopocentricAngles) -> Self {
        Self {
            timestamp,
            azimuth_deg: angles.azimuth_deg,
            elevation_deg: angles.elevation_deg,
            range_km: angles.range_km,
            range_rate_km_s: angles.range_rate_km_s,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.elevation_deg >= 0.0
    }
}
