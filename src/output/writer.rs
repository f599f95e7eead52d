use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::OutputError;
use super::fixed::{format_azimuth, format_elevation, format_fixed_line, ElevationPadding};
use crate::sampler::PointingRecord;

pub const DEFAULT_DECIMALS: usize = 2;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    /// `HH MM SS.mmm AAA.AA EE.EE`, one line per record.
    #[default]
    Fixed,
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub decimals: usize,
    pub elevation_padding: ElevationPadding,
    /// Drop records below the horizon.
    pub visible_only: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Fixed,
            decimals: DEFAULT_DECIMALS,
            elevation_padding: ElevationPadding::Legacy,
            visible_only: false,
        }
    }
}

/// Write `records` in the configured format. Returns how many were written.
pub fn write_records<W: Write>(
    mut writer: W,
    records: &[PointingRecord],
    options: &OutputOptions,
) -> Result<usize, OutputError> {
    let selected: Vec<&PointingRecord> = records
        .iter()
        .filter(|r| !options.visible_only || r.is_visible())
        .collect();

    match options.format {
        OutputFormat::Fixed => {
            for record in &selected {
                writeln!(
                    writer,
                    "{}",
                    format_fixed_line(record, options.decimals, options.elevation_padding)
                )?;
            }
            writer.flush()?;
        }
        OutputFormat::Csv => {
            let mut csv = csv::Writer::from_writer(writer);
            csv.write_record(["time_utc", "az_deg", "el_deg"])?;
            for record in &selected {
                csv.write_record([
                    record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
                    format_azimuth(record.azimuth_deg, options.decimals),
                    format_elevation(record.elevation_deg, options.decimals, options.elevation_padding),
                ])?;
            }
            csv.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &selected)?;
            writeln!(writer)?;
            writer.flush()?;
        }
    }

    log::debug!(
        "Wrote {} of {} records as {}",
        selected.len(),
        records.len(),
        options.format
    );
    Ok(selected.len())
}

pub fn write_records_to_path(
    path: &Path,
    records: &[PointingRecord],
    options: &OutputOptions,
) -> Result<usize, OutputError> {
    let file = File::create(path)?;
    let written = write_records(BufWriter::new(file), records, options)?;
    log::info!("Wrote {} records to {}", written, path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::utc;

    fn records() -> Vec<PointingRecord> {
        [(-0.5, 200.0), (0.25, 201.5), (12.0, 359.999)]
            .iter()
            .enumerate()
            .map(|(i, &(el, az))| PointingRecord {
                timestamp: utc(3, 39, 25 + i as u32),
                azimuth_deg: az,
                elevation_deg: el,
                range_km: 2000.0 - 100.0 * i as f64,
                range_rate_km_s: -5.0,
            })
            .collect()
    }

    fn render(options: &OutputOptions) -> (usize, String) {
        let mut buf = Vec::new();
        let n = write_records(&mut buf, &records(), options).unwrap();
        (n, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn fixed_output() {
        let (n, text) = render(&OutputOptions::default());
        assert_eq!(n, 3);
        assert_eq!(
            text,
            "03 39 25.000 200.00 -0.50\n03 39 26.000 201.50 00.25\n03 39 27.000 000.00 12.00\n"
        );
    }

    #[test]
    fn visible_only_drops_negative_elevations() {
        let options = OutputOptions {
            visible_only: true,
            ..OutputOptions::default()
        };
        let (n, text) = render(&options);
        assert_eq!(n, 2);
        assert!(text.starts_with("03 39 26.000"));
    }

    #[test]
    fn csv_output() {
        let options = OutputOptions {
            format: OutputFormat::Csv,
            ..OutputOptions::default()
        };
        let (_, text) = render(&options);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "time_utc,az_deg,el_deg");
        assert_eq!(lines[1], "2025-08-25 03:39:25.000,200.00,-0.50");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn json_output_includes_range() {
        let options = OutputOptions {
            format: OutputFormat::Json,
            ..OutputOptions::default()
        };
        let (_, text) = render(&options);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array[1]["range_km"], 1900.0);
        assert_eq!(array[0]["timestamp"], "2025-08-25T03:39:25Z");
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: OutputOptions =
            serde_yaml::from_str("format: csv\nelevation_padding: symmetric\n").unwrap();
        assert_eq!(options.format, OutputFormat::Csv);
        assert_eq!(options.elevation_padding, ElevationPadding::Symmetric);
        assert_eq!(options.decimals, DEFAULT_DECIMALS);
        assert!(!options.visible_only);
    }

    #[test]
    fn csv_and_fixed_agree_on_elevation() {
        let near_horizon = [(-0.004, 10.0), (0.004, 11.0), (-7.5, 12.0)]
            .iter()
            .map(|&(el, az)| PointingRecord {
                timestamp: utc(4, 0, 0),
                azimuth_deg: az,
                elevation_deg: el,
                range_km: 3000.0,
                range_rate_km_s: 1.0,
            })
            .collect::<Vec<_>>();
        for padding in [ElevationPadding::Legacy, ElevationPadding::Symmetric] {
            let mut fixed = Vec::new();
            let mut csv = Vec::new();
            let fixed_options = OutputOptions {
                elevation_padding: padding,
                ..OutputOptions::default()
            };
            let csv_options = OutputOptions {
                format: OutputFormat::Csv,
                ..fixed_options
            };
            write_records(&mut fixed, &near_horizon, &fixed_options).unwrap();
            write_records(&mut csv, &near_horizon, &csv_options).unwrap();
            let fixed = String::from_utf8(fixed).unwrap();
            let csv = String::from_utf8(csv).unwrap();
            let fixed_el: Vec<_> = fixed.lines().map(|l| l.rsplit(' ').next().unwrap()).collect();
            let csv_el: Vec<_> = csv.lines().skip(1).map(|l| l.rsplit(',').next().unwrap()).collect();
            assert_eq!(fixed_el, csv_el, "{padding}");
        }
        let mut csv = Vec::new();
        let options = OutputOptions {
            format: OutputFormat::Csv,
            ..OutputOptions::default()
        };
        write_records(&mut csv, &near_horizon, &options).unwrap();
        assert!(String::from_utf8(csv).unwrap().contains("2025-08-25 04:00:00.000,010.00,-0.00"));
    }
}
