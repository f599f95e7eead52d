use chrono::{DateTime, Utc};
use serde::Serialize;

/// Security classification carried in column 8 of line 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum Classification {
    Unclassified,
    Classified,
    Secret,
}

/// A parsed mean-element set. Angles are stored in degrees as they appear in
/// the element lines, mean motion in revolutions per day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitalElementSet {
    pub name: Option<String>,
    pub norad_id: u32,
    pub classification: Classification,
    pub international_designator: String,
    pub epoch: DateTime<Utc>,
    /// First derivative of mean motion divided by two, rev/day^2.
    pub mean_motion_dot: f64,
    /// Second derivative of mean motion divided by six, rev/day^3.
    pub mean_motion_ddot: f64,
    /// B* drag term, inverse Earth radii.
    pub drag_term: f64,
    pub ephemeris_type: u8,
    pub element_set_number: u32,
    pub inclination_deg: f64,
    pub right_ascension_deg: f64,
    pub eccentricity: f64,
    pub argument_of_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    /// Kozai mean motion, rev/day.
    pub mean_motion: f64,
    pub revolution_number: u32,
}

impl OrbitalElementSet {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", self.norad_id))
    }

    /// Orbital period in minutes implied by the mean motion.
    pub fn period_minutes(&self) -> f64 {
        1440.0 / self.mean_motion
    }
}
