//! Rendering of pointing records for the tracking controller.

mod error;
mod fixed;
mod writer;

pub use error::OutputError;
pub use fixed::{format_azimuth, format_elevation, format_fixed_line, ElevationPadding};
pub use writer::{write_records, write_records_to_path, OutputFormat, OutputOptions, DEFAULT_DECIMALS};
