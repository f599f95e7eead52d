//! Mean-element propagation.
//!
//! Secular theory only: drag enters through the mean-motion derivatives of
//! the element set (semi-major axis decays at constant perigee height) and
//! Earth oblateness through the first-order J2 rates of the node and of the
//! argument of perigee. The osculating state is rebuilt from the advanced
//! elements with the two-body Kepler solution.

pub mod constants;
mod error;
mod kepler;

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use crate::elements::OrbitalElementSet;
use constants::{ke, EARTH_RADIUS_KM, J2, MINUTES_PER_DAY, MU_KM3_S2, REV_PER_DAY_TO_RAD_PER_MIN};

pub use error::PropagationError;
pub use kepler::{solve_kepler, KeplerianElements, KEPLER_MAX_ITERATIONS, KEPLER_TOLERANCE_RAD};

/// Position (km) and velocity (km/s) in the TEME frame at `epoch`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertialState {
    pub epoch: DateTime<Utc>,
    pub position_km: Vector3<f64>,
    pub velocity_km_s: Vector3<f64>,
}

impl InertialState {
    pub fn osculating_elements(&self) -> Option<KeplerianElements> {
        KeplerianElements::from_state(&self.position_km, &self.velocity_km_s, MU_KM3_S2)
    }
}

/// Owns one element set and the epoch quantities derived from it.
#[derive(Debug, Clone)]
pub struct Propagator {
    elements: OrbitalElementSet,
    inclination: f64,
    raan0: f64,
    argp0: f64,
    mean_anomaly0: f64,
    eccentricity0: f64,
    /// Kozai mean motion, rad/min.
    n0: f64,
    /// Half the first derivative of mean motion, rad/min^2.
    ndot: f64,
    /// A sixth of the second derivative of mean motion, rad/min^3.
    nddot: f64,
    /// Semi-major axis at epoch, Earth radii.
    a0: f64,
    /// Perigee radius at epoch, Earth radii.
    q0: f64,
    raan_rate: f64,
    argp_rate: f64,
}

impl Propagator {
    pub fn new(elements: OrbitalElementSet) -> Self {
        let inclination = elements.inclination_deg.to_radians();
        let e0 = elements.eccentricity;
        let n0 = elements.mean_motion * REV_PER_DAY_TO_RAD_PER_MIN;
        let ndot = elements.mean_motion_dot * REV_PER_DAY_TO_RAD_PER_MIN / MINUTES_PER_DAY;
        let nddot =
            elements.mean_motion_ddot * REV_PER_DAY_TO_RAD_PER_MIN / MINUTES_PER_DAY.powi(2);

        // Kozai mean motion to semi-major axis.
        let cos_i = inclination.cos();
        let beta0_cubed = (1.0 - e0 * e0).powf(1.5);
        let a1 = (ke() / n0).powf(2.0 / 3.0);
        let delta1 = 0.75 * J2 * (3.0 * cos_i * cos_i - 1.0) / beta0_cubed / (a1 * a1);
        let a0 = a1
            * (1.0 - delta1 / 3.0 - delta1 * delta1 - 134.0 / 81.0 * delta1 * delta1 * delta1);

        let p0 = a0 * (1.0 - e0 * e0);
        let j2_factor = J2 * n0 / (p0 * p0);
        let raan_rate = -1.5 * j2_factor * cos_i;
        let argp_rate = 0.75 * j2_factor * (5.0 * cos_i * cos_i - 1.0);

        log::debug!(
            "{}: a0 = {:.3} km, dRAAN/dt = {:.3e} rad/min, dAoP/dt = {:.3e} rad/min",
            elements.display_name(),
            a0 * EARTH_RADIUS_KM,
            raan_rate,
            argp_rate
        );

        Self {
            inclination,
            raan0: elements.right_ascension_deg.to_radians(),
            argp0: elements.argument_of_perigee_deg.to_radians(),
            mean_anomaly0: elements.mean_anomaly_deg.to_radians(),
            eccentricity0: e0,
            n0,
            ndot,
            nddot,
            a0,
            q0: a0 * (1.0 - e0),
            raan_rate,
            argp_rate,
            elements,
        }
    }

    pub fn elements(&self) -> &OrbitalElementSet {
        &self.elements
    }

    /// Mean semi-major axis at epoch, km.
    pub fn semi_major_axis_km(&self) -> f64 {
        self.a0 * EARTH_RADIUS_KM
    }

    /// Mean elements advanced `minutes` from epoch.
    pub fn mean_elements_at(&self, minutes: f64) -> Result<KeplerianElements, PropagationError> {
        let decayed = |reason: String| PropagationError::DecayedOrbit {
            minutes_since_epoch: minutes,
            reason,
        };

        let t = minutes;
        let n = self.n0 + 2.0 * self.ndot * t + 3.0 * self.nddot * t * t;
        if !(n > 0.0) {
            return Err(decayed(format!("mean motion {n:.3e} rad/min is not positive")));
        }
        let a = self.a0 * (self.n0 / n).powf(2.0 / 3.0);
        if !(a > 0.0) {
            return Err(decayed(format!("semi-major axis {a} is not positive")));
        }
        let e = if t == 0.0 {
            self.eccentricity0
        } else {
            (1.0 - self.q0 / a).max(0.0)
        };
        if e >= 1.0 {
            return Err(decayed(format!("eccentricity grew to {e}")));
        }
        let semi_latus_rectum = a * (1.0 - e * e);
        if !(semi_latus_rectum > 0.0) {
            return Err(decayed(format!(
                "semi-latus rectum {semi_latus_rectum} is not positive"
            )));
        }

        let mean_anomaly = self.mean_anomaly0
            + self.n0 * t
            + self.ndot * t * t
            + self.nddot * t * t * t;

        Ok(KeplerianElements {
            semi_major_axis_km: a * EARTH_RADIUS_KM,
            eccentricity: e,
            inclination_rad: self.inclination,
            raan_rad: self.raan0 + self.raan_rate * t,
            argument_of_perigee_rad: self.argp0 + self.argp_rate * t,
            mean_anomaly_rad: mean_anomaly,
        })
    }

    /// Inertial state at `target`, which may precede the element epoch.
    pub fn propagate(&self, target: DateTime<Utc>) -> Result<InertialState, PropagationError> {
        let minutes = minutes_since(self.elements.epoch, target);
        let mean = self.mean_elements_at(minutes)?;
        let (position_km, velocity_km_s) = mean.to_cartesian(MU_KM3_S2)?;

        let radius = position_km.norm();
        let finite = position_km.iter().chain(velocity_km_s.iter()).all(|c| c.is_finite());
        if !finite {
            return Err(PropagationError::DecayedOrbit {
                minutes_since_epoch: minutes,
                reason: "non-finite state vector".into(),
            });
        }
        if radius < EARTH_RADIUS_KM {
            return Err(PropagationError::DecayedOrbit {
                minutes_since_epoch: minutes,
                reason: format!("radius {radius:.3} km is below the Earth's surface"),
            });
        }

        Ok(InertialState {
            epoch: target,
            position_km,
            velocity_km_s,
        })
    }
}

/// Convenience wrapper for one-off calls.
pub fn propagate(
    elements: &OrbitalElementSet,
    target: DateTime<Utc>,
) -> Result<InertialState, PropagationError> {
    Propagator::new(elements.clone()).propagate(target)
}

fn minutes_since(epoch: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    let delta = t - epoch;
    (delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) * 1e-9) / 60.0
}
