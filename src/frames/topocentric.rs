use nalgebra::Vector3;
use serde::Serialize;

use super::error::GeometryError;
use super::observer::GeodeticPosition;
use super::sidereal::greenwich_sidereal_angle;
use crate::geometry::{rotate_frame_z, wrap_degrees};
use crate::propagate::InertialState;

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;
pub const DEFAULT_MIN_RANGE_KM: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AngleKind {
    Geometric,
    Apparent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TopocentricAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    pub range_rate_km_s: f64,
    pub kind: AngleKind,
}

/// TEME to Earth-fixed, rotating about the pole by the sidereal angle.
pub fn teme_to_ecef_position(pos_teme: &Vector3<f64>, gmst: f64) -> Vector3<f64> {
    rotate_frame_z(pos_teme, gmst)
}

/// Earth-fixed velocity also removes the frame rotation `ω × r`.
pub fn teme_to_ecef_velocity(pos_teme: &Vector3<f64>, vel_teme: &Vector3<f64>, gmst: f64) -> Vector3<f64> {
    let pos = teme_to_ecef_position(pos_teme, gmst);
    let rotated = rotate_frame_z(vel_teme, gmst);
    let rotation = Vector3::new(-EARTH_ROTATION_RAD_S * pos.y, EARTH_ROTATION_RAD_S * pos.x, 0.0);
    rotated - rotation
}

/// Inertial state to observer-relative horizon angles. The instant used for
/// the Earth rotation is the state's own epoch.
#[derive(Debug, Clone, Copy)]
pub struct FrameTransform {
    observer: GeodeticPosition,
    observer_ecef_km: Vector3<f64>,
    min_range_km: f64,
}

impl FrameTransform {
    pub fn new(observer: GeodeticPosition) -> Self {
        Self {
            observer,
            observer_ecef_km: observer.position_ecef_km(),
            min_range_km: DEFAULT_MIN_RANGE_KM,
        }
    }

    pub fn with_min_range_km(mut self, min_range_km: f64) -> Self {
        self.min_range_km = min_range_km;
        self
    }

    pub fn observer(&self) -> &GeodeticPosition {
        &self.observer
    }

    pub fn to_topocentric(&self, state: &InertialState) -> Result<TopocentricAngles, GeometryError> {
        let gmst = greenwich_sidereal_angle(state.epoch);
        let sat_ecef = teme_to_ecef_position(&state.position_km, gmst);
        let sat_vel_ecef = teme_to_ecef_velocity(&state.position_km, &state.velocity_km_s, gmst);

        let dr = sat_ecef - self.observer_ecef_km;
        let range_km = dr.norm();
        if !(range_km >= self.min_range_km) {
            return Err(GeometryError::DegenerateGeometry {
                range_km,
                min_range_km: self.min_range_km,
            });
        }

        let enu = self.observer.ecef_to_enu(&dr);
        let azimuth_deg = wrap_degrees(enu.x.atan2(enu.y).to_degrees());
        let elevation_deg = (enu.z / range_km).clamp(-1.0, 1.0).asin().to_degrees();
        // The observer is at rest in the Earth-fixed frame.
        let range_rate_km_s = sat_vel_ecef.dot(&dr) / range_km;

        Ok(TopocentricAngles {
            azimuth_deg,
            elevation_deg,
            range_km,
            range_rate_km_s,
            kind: AngleKind::Geometric,
        })
    }
}

/// One-off conversion for callers without a session.
pub fn to_topocentric(
    state: &InertialState,
    observer: &GeodeticPosition,
) -> Result<TopocentricAngles, GeometryError> {
    FrameTransform::new(*observer).to_topocentric(state)
}
