use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::record::PointingRecord;

pub const HORIZON_ELEVATION_DEG: f64 = 0.0;

/// A visibility interval found in a sampled sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassSummary {
    pub rise: DateTime<Utc>,
    pub culmination: DateTime<Utc>,
    pub set: DateTime<Utc>,
    pub max_elevation_deg: f64,
    pub culmination_azimuth_deg: f64,
    pub rise_azimuth_deg: f64,
    pub set_azimuth_deg: f64,
    pub duration_seconds: i64,
    /// Already above the horizon at the first record.
    pub rises_before_window: bool,
    /// Still above the horizon at the last record.
    pub sets_after_window: bool,
}

/// Passes whose peak reaches `min_elevation_deg`. Horizon crossings are
/// interpolated linearly between the bracketing records.
pub fn summarize_passes(records: &[PointingRecord], min_elevation_deg: f64) -> Vec<PassSummary> {
    let mut passes = Vec::new();
    let mut current: Option<PassSummary> = None;
    let mut previous: Option<&PointingRecord> = None;

    for record in records {
        let visible = record.elevation_deg >= HORIZON_ELEVATION_DEG;
        match (current.as_mut(), visible) {
            (None, true) => {
                let rise = previous.map_or(record.timestamp, |p| horizon_crossing(p, record));
                current = Some(PassSummary {
                    rise,
                    culmination: record.timestamp,
                    set: record.timestamp,
                    max_elevation_deg: record.elevation_deg,
                    culmination_azimuth_deg: record.azimuth_deg,
                    rise_azimuth_deg: record.azimuth_deg,
                    set_azimuth_deg: record.azimuth_deg,
                    duration_seconds: 0,
                    rises_before_window: previous.is_none(),
                    sets_after_window: false,
                });
            }
            (Some(pass), true) => {
                if record.elevation_deg > pass.max_elevation_deg {
                    pass.max_elevation_deg = record.elevation_deg;
                    pass.culmination = record.timestamp;
                    pass.culmination_azimuth_deg = record.azimuth_deg;
                }
            }
            (Some(_), false) => {
                if let (Some(mut pass), Some(last)) = (current.take(), previous) {
                    pass.set = horizon_crossing(last, record);
                    pass.set_azimuth_deg = last.azimuth_deg;
                    finish(pass, min_elevation_deg, &mut passes);
                }
            }
            (None, false) => {}
        }
        previous = Some(record);
    }

    if let (Some(mut pass), Some(last)) = (current, previous) {
        pass.set = last.timestamp;
        pass.set_azimuth_deg = last.azimuth_deg;
        pass.sets_after_window = true;
        finish(pass, min_elevation_deg, &mut passes);
    }

    passes
}

fn finish(mut pass: PassSummary, min_elevation_deg: f64, passes: &mut Vec<PassSummary>) {
    if pass.max_elevation_deg >= min_elevation_deg {
        pass.duration_seconds = (pass.set - pass.rise).num_seconds();
        passes.push(pass);
    }
}

fn horizon_crossing(before: &PointingRecord, after: &PointingRecord) -> DateTime<Utc> {
    let span_ns = (after.timestamp - before.timestamp).num_nanoseconds().unwrap_or(0) as f64;
    let fraction = ((HORIZON_ELEVATION_DEG - before.elevation_deg)
        / (after.elevation_deg - before.elevation_deg))
        .clamp(0.0, 1.0);
    before.timestamp + Duration::nanoseconds((span_ns * fraction).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::utc;

    fn profile(elevations: &[f64]) -> Vec<PointingRecord> {
        elevations
            .iter()
            .enumerate()
            .map(|(i, &el)| PointingRecord {
                timestamp: utc(3, 0, 0) + Duration::seconds(10 * i as i64),
                azimuth_deg: 10.0 * i as f64,
                elevation_deg: el,
                range_km: 1000.0,
                range_rate_km_s: 0.0,
            })
            .collect()
    }

    #[test]
    fn finds_interpolated_crossings() {
        let passes = summarize_passes(&profile(&[-2.0, -1.0, 1.0, 3.0, 2.0, -1.0, -3.0]), 0.0);
        assert_eq!(passes.len(), 1);
        let pass = &passes[0];
        assert_eq!(pass.rise, utc(3, 0, 15));
        assert_eq!(pass.culmination, utc(3, 0, 30));
        assert_eq!(pass.max_elevation_deg, 3.0);
        assert_eq!(pass.culmination_azimuth_deg, 30.0);
        let expected_set = utc(3, 0, 40) + Duration::nanoseconds(6_666_666_667);
        assert!((pass.set - expected_set).num_nanoseconds().unwrap().abs() < 10);
        assert_eq!(pass.duration_seconds, 31);
        assert!(!pass.rises_before_window && !pass.sets_after_window);
    }

    #[test]
    fn low_passes_are_filtered() {
        let records = profile(&[-1.0, 1.0, 3.0, -1.0]);
        assert!(summarize_passes(&records, 5.0).is_empty());
        assert_eq!(summarize_passes(&records, 2.0).len(), 1);
    }

    #[test]
    fn truncated_passes_are_flagged() {
        let passes = summarize_passes(&profile(&[1.0, 2.0, -1.0, -2.0, 0.5, 4.0]), 0.0);
        assert_eq!(passes.len(), 2);
        assert!(passes[0].rises_before_window);
        assert_eq!(passes[0].rise, utc(3, 0, 0));
        assert!(passes[1].sets_after_window);
        assert_eq!(passes[1].set, utc(3, 0, 50));
    }

    #[test]
    fn no_records_no_passes() {
        assert!(summarize_passes(&[], 0.0).is_empty());
        assert!(summarize_passes(&profile(&[-5.0, -4.0]), 0.0).is_empty());
    }
}
