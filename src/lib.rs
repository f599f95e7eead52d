//! Pointing angles for a ground antenna tracking a satellite.
//!
//! An element set is propagated to each tick of a time window, converted to
//! azimuth and elevation at the station, corrected for refraction and
//! optionally re-pointed for a tilted mount.

pub mod config;
pub mod elements;
pub mod frames;
pub mod geometry;
pub mod output;
pub mod propagate;
pub mod refraction;
pub mod sampler;
pub mod tilt;

#[cfg(test)]
mod test_support;

pub use config::{Config, ConfigError, SessionConfig};
pub use elements::OrbitalElementSet;
pub use frames::{GeodeticPosition, TopocentricAngles};
pub use propagate::{InertialState, Propagator};
pub use sampler::{EphemerisSampler, PointingRecord, TimeWindow};
