//! Inertial to Earth-fixed to topocentric horizon coordinates.

mod error;
mod observer;
pub mod sidereal;
mod topocentric;

pub use error::GeometryError;
pub use observer::{GeodeticPosition, WGS84_A_KM, WGS84_F};
pub use sidereal::{greenwich_sidereal_angle, greenwich_sidereal_angle_deg};
pub use topocentric::{
    teme_to_ecef_position, teme_to_ecef_velocity, to_topocentric, AngleKind, FrameTransform,
    TopocentricAngles, DEFAULT_MIN_RANGE_KM, EARTH_ROTATION_RAD_S,
};
