use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;

use super::error::PropagationError;

pub const KEPLER_TOLERANCE_RAD: f64 = 1e-12;
pub const KEPLER_MAX_ITERATIONS: usize = 50;

/// Solve `E - e sin E = M` for the eccentric anomaly by Newton iteration.
///
/// `mean_anomaly_rad` may be any real; the result lies in [-π, π].
pub fn solve_kepler(mean_anomaly_rad: f64, eccentricity: f64) -> Result<f64, PropagationError> {
    let failure = |iterations| PropagationError::ConvergenceFailure {
        mean_anomaly_rad,
        eccentricity,
        iterations,
    };
    if !mean_anomaly_rad.is_finite() || !(0.0..1.0).contains(&eccentricity) {
        return Err(failure(0));
    }

    let m = (mean_anomaly_rad + PI).rem_euclid(TAU) - PI;
    let mut e_anom = if eccentricity < 0.8 { m } else { PI.copysign(m) };

    for iteration in 1..=KEPLER_MAX_ITERATIONS {
        let (sin, cos) = e_anom.sin_cos();
        let step = (e_anom - eccentricity * sin - m) / (1.0 - eccentricity * cos);
        e_anom -= step;
        if step.abs() < KEPLER_TOLERANCE_RAD {
            log::trace!("Kepler converged in {} iterations", iteration);
            return Ok(e_anom);
        }
    }

    Err(failure(KEPLER_MAX_ITERATIONS))
}

/// Osculating Keplerian elements. Angles in radians, wrapped to [0, 2π).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerianElements {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination_rad: f64,
    pub raan_rad: f64,
    pub argument_of_perigee_rad: f64,
    pub mean_anomaly_rad: f64,
}

impl KeplerianElements {
    /// Cartesian position/velocity for these elements. `mu` in km^3/s^2.
    pub fn to_cartesian(&self, mu: f64) -> Result<(Vector3<f64>, Vector3<f64>), PropagationError> {
        let a = self.semi_major_axis_km;
        let e = self.eccentricity;
        let e_anom = solve_kepler(self.mean_anomaly_rad, e)?;
        let (sin_e, cos_e) = e_anom.sin_cos();
        let beta = (1.0 - e * e).sqrt();
        let radius = a * (1.0 - e * cos_e);

        // Perifocal frame: P towards perigee, Q 90 deg ahead in the orbit plane.
        let x = a * (cos_e - e);
        let y = a * beta * sin_e;
        let rate = (mu * a).sqrt() / radius;
        let vx = -rate * sin_e;
        let vy = rate * beta * cos_e;

        let (p, q) = self.perifocal_axes();
        Ok((p * x + q * y, p * vx + q * vy))
    }

    /// Unit vectors P and Q of the perifocal frame in inertial coordinates,
    /// i.e. the columns of `R3(-Ω) R1(-i) R3(-ω)`.
    fn perifocal_axes(&self) -> (Vector3<f64>, Vector3<f64>) {
        let (sin_o, cos_o) = self.raan_rad.sin_cos();
        let (sin_i, cos_i) = self.inclination_rad.sin_cos();
        let (sin_w, cos_w) = self.argument_of_perigee_rad.sin_cos();
        let p = Vector3::new(
            cos_o * cos_w - sin_o * sin_w * cos_i,
            sin_o * cos_w + cos_o * sin_w * cos_i,
            sin_w * sin_i,
        );
        let q = Vector3::new(
            -cos_o * sin_w - sin_o * cos_w * cos_i,
            -sin_o * sin_w + cos_o * cos_w * cos_i,
            cos_w * sin_i,
        );
        (p, q)
    }

    /// Recover osculating elements from a Cartesian state. Returns `None` for
    /// non-elliptic or degenerate (zero angular momentum) states.
    ///
    /// Equatorial or circular orbits have an undefined node or perigee; the
    /// undefined angle is reported as zero.
    pub fn from_state(position: &Vector3<f64>, velocity: &Vector3<f64>, mu: f64) -> Option<Self> {
        let r = position.norm();
        let v2 = velocity.norm_squared();
        let h = position.cross(velocity);
        let h_norm = h.norm();
        if r == 0.0 || h_norm == 0.0 {
            return None;
        }

        let energy = v2 / 2.0 - mu / r;
        if energy >= 0.0 {
            return None;
        }
        let a = -mu / (2.0 * energy);

        let e_vec = (position * (v2 - mu / r) - velocity * position.dot(velocity)) / mu;
        let e = e_vec.norm();
        let inclination = (h.z / h_norm).clamp(-1.0, 1.0).acos();

        let node = Vector3::new(-h.y, h.x, 0.0);
        let node_norm = node.norm();
        let raan = if node_norm > 0.0 {
            node.y.atan2(node.x).rem_euclid(TAU)
        } else {
            0.0
        };

        let argument_of_perigee = if node_norm > 0.0 && e > 0.0 {
            let cos_w = (node.dot(&e_vec) / (node_norm * e)).clamp(-1.0, 1.0);
            let w = cos_w.acos();
            if e_vec.z < 0.0 {
                TAU - w
            } else {
                w
            }
        } else {
            0.0
        };

        let true_anomaly = if e > 0.0 {
            let cos_nu = (e_vec.dot(position) / (e * r)).clamp(-1.0, 1.0);
            let nu = cos_nu.acos();
            if position.dot(velocity) < 0.0 {
                TAU - nu
            } else {
                nu
            }
        } else {
            0.0
        };

        let (sin_nu, cos_nu) = true_anomaly.sin_cos();
        let e_anom = ((1.0 - e * e).sqrt() * sin_nu).atan2(e + cos_nu);
        let mean_anomaly = (e_anom - e * e_anom.sin()).rem_euclid(TAU);

        Some(Self {
            semi_major_axis_km: a,
            eccentricity: e,
            inclination_rad: inclination,
            raan_rad: raan,
            argument_of_perigee_rad: argument_of_perigee,
            mean_anomaly_rad: mean_anomaly,
        })
    }
}
