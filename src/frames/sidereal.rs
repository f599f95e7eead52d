use std::f64::consts::TAU;

use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
/// 2000-01-01T12:00:00 UTC as a Unix timestamp.
const J2000_UNIX_SECONDS: i64 = 946_728_000;

/// Julian centuries elapsed since J2000, treating UTC as UT1.
pub fn julian_centuries_since_j2000(time: DateTime<Utc>) -> f64 {
    let seconds = (time.timestamp() - J2000_UNIX_SECONDS) as f64
        + f64::from(time.timestamp_subsec_nanos()) * 1e-9;
    seconds / SECONDS_PER_DAY / DAYS_PER_JULIAN_CENTURY
}

/// Greenwich mean sidereal angle in radians, [0, 2π).
///
/// IAU 1982 polynomial (seconds of sidereal time):
/// `67310.54841 + (876600 h + 8640184.812866) T + 0.093104 T^2 - 6.2e-6 T^3`
pub fn greenwich_sidereal_angle(time: DateTime<Utc>) -> f64 {
    let t = julian_centuries_since_j2000(time);
    let seconds = 67_310.548_41
        + (876_600.0 * 3600.0 + 8_640_184.812_866) * t
        + 0.093_104 * t * t
        - 6.2e-6 * t * t * t;
    (seconds * TAU / SECONDS_PER_DAY).rem_euclid(TAU)
}

pub fn greenwich_sidereal_angle_deg(time: DateTime<Utc>) -> f64 {
    crate::geometry::wrap_degrees(greenwich_sidereal_angle(time).to_degrees())
}
