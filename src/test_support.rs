//! Shared fixtures for unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::elements::{self, OrbitalElementSet};

pub const LINE1: &str = "1 44078U 19072A   25237.00127315  .00000014  00000-0  40313-4 0  1239";
pub const LINE2: &str = "2 44078  98.2808 291.9629 0018719  34.1424  38.1671 14.43768520337337";

pub const SITE_LAT_DEG: f64 = 17.269079;
pub const SITE_LON_DEG: f64 = 78.495696;

pub fn reference_set() -> OrbitalElementSet {
    elements::parse(Some("D091"), LINE1, LINE2).unwrap()
}

pub fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 25, h, m, s).unwrap()
}
