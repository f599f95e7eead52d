//! YAML session file.
//!
//! ```yaml
//! station:
//!   coordinates: "17.269079, 78.495696"
//!   height_km: 0.0
//! satellite:
//!   tle: |
//!     1 44078U ...
//!     2 44078 ...
//! window:
//!   start: 2025-08-25T03:39:25Z
//!   end: 2025-08-25T03:54:00Z
//!   cadence: 1s
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::elements::{ElementCatalog, ElementSetError, OrbitalElementSet};
use crate::frames::{GeodeticPosition, GeometryError, DEFAULT_MIN_RANGE_KM};
use crate::output::OutputOptions;
use crate::refraction::{
    PressureModel, Refraction, RefractionModel, RefractionParameters, DEFAULT_CUTOFF_DEG,
    DEFAULT_TEMPERATURE_C,
};
use crate::sampler::{
    EphemerisSampler, Pipeline, SamplerError, TimeWindow, DEFAULT_CADENCE, DEFAULT_CHUNK_SIZE,
};
use crate::tilt::TiltConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("element set: {0}")]
    ElementSet(#[from] ElementSetError),
    #[error("station: {0}")]
    Station(#[from] GeometryError),
    #[error("window: {0}")]
    Window(#[from] SamplerError),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    pub satellite: SatelliteConfig,
    pub window: WindowConfig,
    #[serde(default)]
    pub refraction: RefractionConfig,
    pub tilt: Option<TiltConfig>,
    #[serde(default)]
    pub output: OutputOptions,
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Directory relative `tle_file` paths are resolved against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    /// `"lat, lon"` in degrees.
    pub coordinates: String,
    #[serde(default)]
    pub height_km: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SatelliteConfig {
    /// Two lines, or three with a name line.
    pub tle: Option<String>,
    pub tle_file: Option<PathBuf>,
    /// Entry to pick from `tle_file`; the first one when absent.
    pub norad_id: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Alternative to `end`, e.g. `14m 35s`.
    pub duration: Option<String>,
    pub cadence: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefractionConfig {
    pub enabled: bool,
    pub model: RefractionModel,
    pub temperature_c: f64,
    pub pressure_model: PressureModel,
    /// Overrides the pressure derived from the station height.
    pub pressure_mbar: Option<f64>,
    pub cutoff_deg: f64,
}

impl Default for RefractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: RefractionModel::default(),
            temperature_c: DEFAULT_TEMPERATURE_C,
            pressure_model: PressureModel::default(),
            pressure_mbar: None,
            cutoff_deg: DEFAULT_CUTOFF_DEG,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub parallel: bool,
    pub chunk_size: usize,
    pub min_range_km: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_range_km: DEFAULT_MIN_RANGE_KM,
        }
    }
}

/// Everything one run needs, validated and immutable.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub station_name: Option<String>,
    pub elements: OrbitalElementSet,
    pub observer: GeodeticPosition,
    pub window: TimeWindow,
    pub tick_count: usize,
    pub refraction: Option<Refraction>,
    pub tilt: Option<TiltConfig>,
    pub output: OutputOptions,
    pub parallel: bool,
    pub chunk_size: usize,
    pub min_range_km: f64,
}

impl SessionConfig {
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.elements.clone(), self.observer)
            .with_refraction(self.refraction)
            .with_tilt(self.tilt)
            .with_min_range_km(self.min_range_km)
    }

    pub fn sampler(&self) -> EphemerisSampler {
        EphemerisSampler::new(self.pipeline(), self.window)
            .parallel(self.parallel)
            .chunk_size(self.chunk_size)
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn session(&self) -> Result<SessionConfig, ConfigError> {
        let observer =
            GeodeticPosition::from_coordinates(&self.station.coordinates, Some(self.station.height_km))?;
        let elements = self.satellite.load(self.base_dir.as_deref())?;
        let window = self.window.resolve()?;
        let tick_count = window.tick_count()?;

        let refraction = if self.refraction.enabled {
            let parameters = RefractionParameters::for_site(
                observer.height_km(),
                self.refraction.temperature_c,
                self.refraction.pressure_model,
                self.refraction.pressure_mbar,
            );
            let refraction = Refraction {
                cutoff_deg: self.refraction.cutoff_deg,
                ..Refraction::new(self.refraction.model, parameters)
            };
            refraction
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("refraction: {e}")))?;
            Some(refraction)
        } else {
            None
        };

        if !(self.sampling.min_range_km > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_range_km {} must be positive",
                self.sampling.min_range_km
            )));
        }

        Ok(SessionConfig {
            station_name: self.station.name.clone(),
            elements,
            observer,
            window,
            tick_count,
            refraction,
            tilt: self.tilt,
            output: self.output,
            parallel: self.sampling.parallel,
            chunk_size: self.sampling.chunk_size,
            min_range_km: self.sampling.min_range_km,
        })
    }
}

impl SatelliteConfig {
    fn load(&self, base_dir: Option<&Path>) -> Result<OrbitalElementSet, ConfigError> {
        match (&self.tle, &self.tle_file) {
            (Some(text), None) => {
                let set = OrbitalElementSet::from_tle_text(text)?;
                if let Some(id) = self.norad_id.filter(|&id| id != set.norad_id) {
                    return Err(ConfigError::Invalid(format!(
                        "norad_id {} does not match element set {}",
                        id, set.norad_id
                    )));
                }
                Ok(set)
            }
            (None, Some(file)) => {
                let path = match base_dir {
                    Some(dir) if file.is_relative() => dir.join(file),
                    _ => file.clone(),
                };
                let catalog = ElementCatalog::load(&path)?;
                let set = match self.norad_id {
                    Some(id) => catalog.get(id)?,
                    None => catalog.first()?,
                };
                Ok(set.clone())
            }
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "satellite: give either tle or tle_file, not both".into(),
            )),
            (None, None) => Err(ConfigError::Invalid(
                "satellite: one of tle or tle_file is required".into(),
            )),
        }
    }
}

impl WindowConfig {
    fn resolve(&self) -> Result<TimeWindow, ConfigError> {
        let end = match (self.end, &self.duration) {
            (Some(end), None) => end,
            (None, Some(duration)) => self.start + parse_duration(duration)?,
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "window: give either end or duration, not both".into(),
                ))
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "window: one of end or duration is required".into(),
                ))
            }
        };
        let cadence = match &self.cadence {
            Some(cadence) => parse_duration(cadence)?,
            None => DEFAULT_CADENCE,
        };
        Ok(TimeWindow::new(self.start, end, cadence))
    }
}

fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
        .map_err(|e| ConfigError::Invalid(format!("invalid duration '{s}': {e}")))
}
