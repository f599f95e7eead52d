//! WGS-72 gravity constants, the set mean element sets are fitted with.

use std::f64::consts::TAU;

/// Gravitational parameter, km^3/s^2.
pub const MU_KM3_S2: f64 = 398_600.8;
/// Equatorial radius, km.
pub const EARTH_RADIUS_KM: f64 = 6378.135;
/// Second zonal harmonic.
pub const J2: f64 = 0.001_082_616;

pub const MINUTES_PER_DAY: f64 = 1440.0;
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Revolutions per day to radians per minute.
pub const REV_PER_DAY_TO_RAD_PER_MIN: f64 = TAU / MINUTES_PER_DAY;

/// sqrt(mu) in Earth radii^1.5 per minute.
pub fn ke() -> f64 {
    SECONDS_PER_MINUTE / (EARTH_RADIUS_KM.powi(3) / MU_KM3_S2).sqrt()
}
