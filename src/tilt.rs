//! Optional re-pointing for a mount whose base is tilted off level.

use serde::{Deserialize, Serialize};

use crate::frames::TopocentricAngles;
use crate::geometry::{az_el_from_unit_vector, rotate_about_axis, unit_vector_from_az_el, wrap_degrees};

/// Rotation of the pointing direction about a horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltConfig {
    /// Right-hand rotation about the axis, degrees.
    pub angle_deg: f64,
    /// Azimuth the horizontal axis points to, degrees.
    pub axis_azimuth_deg: f64,
}

impl TiltConfig {
    pub fn apply(&self, angles: &TopocentricAngles) -> TopocentricAngles {
        let (azimuth_deg, elevation_deg) = apply_tilt(
            angles.azimuth_deg,
            angles.elevation_deg,
            self.angle_deg,
            self.axis_azimuth_deg,
        );
        TopocentricAngles {
            azimuth_deg,
            elevation_deg,
            ..*angles
        }
    }
}

/// Rotate the direction `(az, el)` by `tilt_angle_deg` about the horizontal
/// axis `(sin A, cos A, 0)` in ENU, `A = tilt_axis_azimuth_deg`.
///
/// A zero angle returns the input untouched.
pub fn apply_tilt(
    azimuth_deg: f64,
    elevation_deg: f64,
    tilt_angle_deg: f64,
    tilt_axis_azimuth_deg: f64,
) -> (f64, f64) {
    if tilt_angle_deg == 0.0 {
        return (azimuth_deg, elevation_deg);
    }
    let axis_az = tilt_axis_azimuth_deg.to_radians();
    let axis = nalgebra::Vector3::new(axis_az.sin(), axis_az.cos(), 0.0);
    let pointing = unit_vector_from_az_el(azimuth_deg, elevation_deg);
    let tilted = rotate_about_axis(&pointing, &axis, tilt_angle_deg.to_radians());
    // Only a non-finite input leaves nothing to normalize.
    az_el_from_unit_vector(&tilted).unwrap_or((wrap_degrees(azimuth_deg), elevation_deg))
}
