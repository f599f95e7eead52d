use serde::{Deserialize, Serialize};

use crate::sampler::PointingRecord;

/// How non-negative and negative elevations are padded in the fixed layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ElevationPadding {
    /// `05.23` but `-5.23`: only non-negative values are zero-padded. The
    /// sign comes from the unrounded value, so `-0.004` prints as `-0.00`.
    #[default]
    Legacy,
    /// `05.23` and `-05.23`. A value that rounds to zero prints unsigned.
    Symmetric,
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (value * scale).round() / scale;
    // No "-0.00".
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn field_width(integer_digits: usize, decimals: usize) -> usize {
    if decimals == 0 {
        integer_digits
    } else {
        integer_digits + 1 + decimals
    }
}

/// `AAA.AA`: rounded first, then wrapped, so 359.996 prints as `000.00`.
pub fn format_azimuth(azimuth_deg: f64, decimals: usize) -> String {
    let mut rounded = round_to(azimuth_deg, decimals);
    if rounded >= 360.0 {
        rounded = round_to(rounded - 360.0, decimals);
    }
    format!("{:0w$.p$}", rounded, w = field_width(3, decimals), p = decimals)
}

/// `EE.EE` in the fixed layout; also used for the csv column.
pub fn format_elevation(elevation_deg: f64, decimals: usize, padding: ElevationPadding) -> String {
    let width = field_width(2, decimals);
    match padding {
        ElevationPadding::Legacy if elevation_deg >= 0.0 => {
            format!("{:0w$.p$}", elevation_deg, w = width, p = decimals)
        }
        ElevationPadding::Legacy => format!("{:.p$}", elevation_deg, p = decimals),
        ElevationPadding::Symmetric => {
            let rounded = round_to(elevation_deg, decimals);
            if rounded < 0.0 {
                format!("-{:0w$.p$}", -rounded, w = width, p = decimals)
            } else {
                format!("{:0w$.p$}", rounded, w = width, p = decimals)
            }
        }
    }
}

/// `HH MM SS.mmm AAA.AA EE.EE`
pub fn format_fixed_line(record: &PointingRecord, decimals: usize, padding: ElevationPadding) -> String {
    format!(
        "{} {} {}",
        record.timestamp.format("%H %M %S%.3f"),
        format_azimuth(record.azimuth_deg, decimals),
        format_elevation(record.elevation_deg, decimals, padding)
    )
}
