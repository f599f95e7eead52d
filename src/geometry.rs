//! Named geometric routines shared by the frame transform and the tilt stage.
//!
//! Angles crossing this API are tagged in their names: `_deg` arguments are
//! degrees, `_rad` arguments are radians. Vectors are in an East-North-Up
//! basis unless stated otherwise.

use nalgebra::Vector3;

/// Wrap an angle in degrees into [0, 360).
pub fn wrap_degrees(angle_deg: f64) -> f64 {
    let wrapped = angle_deg.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unit line-of-sight vector in ENU for a pointing direction.
pub fn unit_vector_from_az_el(azimuth_deg: f64, elevation_deg: f64) -> Vector3<f64> {
    let az = azimuth_deg.to_radians();
    let el = elevation_deg.to_radians();
    Vector3::new(el.cos() * az.sin(), el.cos() * az.cos(), el.sin())
}

/// Inverse of [`unit_vector_from_az_el`]. The vector does not need to be
/// normalized; a zero vector yields `None`.
pub fn az_el_from_unit_vector(v: &Vector3<f64>) -> Option<(f64, f64)> {
    let unit = normalize(v)?;
    let elevation = unit.z.clamp(-1.0, 1.0).asin().to_degrees();
    let azimuth = wrap_degrees(unit.x.atan2(unit.y).to_degrees());
    Some((azimuth, elevation))
}

/// Normalize a vector, refusing zero or non-finite input.
pub fn normalize(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    let norm = v.norm();
    if norm > 0.0 && norm.is_finite() {
        Some(v / norm)
    } else {
        None
    }
}

/// Rotate `v` about the unit vector `axis` by `angle_rad` (right-hand rule),
/// using Rodrigues' rotation formula:
///
/// `v' = v cos θ + (k × v) sin θ + k (k · v)(1 − cos θ)`
pub fn rotate_about_axis(v: &Vector3<f64>, axis: &Vector3<f64>, angle_rad: f64) -> Vector3<f64> {
    let (sin, cos) = angle_rad.sin_cos();
    v * cos + axis.cross(v) * sin + axis * axis.dot(v) * (1.0 - cos)
}

/// Rotation of a vector about the z axis by `angle_rad`, expressed in the
/// rotated frame (frame rotation, not vector rotation).
pub fn rotate_frame_z(v: &Vector3<f64>, angle_rad: f64) -> Vector3<f64> {
    let (sin, cos) = angle_rad.sin_cos();
    Vector3::new(v.x * cos + v.y * sin, -v.x * sin + v.y * cos, v.z)
}
