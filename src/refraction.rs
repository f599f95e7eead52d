//! Atmospheric refraction: geometric elevation to apparent elevation.
//!
//! Bending is a pure function of elevation, temperature and pressure. It is
//! zero at the zenith, grows towards the horizon, and is held constant below
//! the low-altitude cutoff so it never diverges.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frames::{AngleKind, TopocentricAngles};

pub const REFERENCE_PRESSURE_MBAR: f64 = 1013.25;
pub const SCALE_HEIGHT_KM: f64 = 8.5;
pub const DEFAULT_TEMPERATURE_C: f64 = 20.0;
pub const DEFAULT_CUTOFF_DEG: f64 = -1.0;
/// Lowest cutoff for which both models stay monotone in elevation.
pub const MIN_CUTOFF_DEG: f64 = -1.5;
pub const MAX_CUTOFF_DEG: f64 = 0.0;
const ABSOLUTE_ZERO_C: f64 = -273.15;

const ITERATION_TOLERANCE_DEG: f64 = 1e-8;
const MAX_ITERATIONS: usize = 30;

/// `P0 * exp(-h / H)` with `P0 = 1013.25 mbar`, `H = 8.5 km`.
pub fn pressure_from_height(height_km: f64) -> f64 {
    REFERENCE_PRESSURE_MBAR * (-height_km / SCALE_HEIGHT_KM).exp()
}

/// International Standard Atmosphere troposphere (barometric formula).
pub fn pressure_standard_atmosphere(height_km: f64) -> f64 {
    const T0_K: f64 = 288.15;
    const LAPSE_K_PER_M: f64 = 0.0065;
    const G: f64 = 9.80665;
    const MOLAR_MASS: f64 = 0.028_964_4;
    const GAS_CONSTANT: f64 = 8.314_459_8;
    let h_m = height_km * 1000.0;
    let base = (1.0 - LAPSE_K_PER_M * h_m / T0_K).max(0.0);
    REFERENCE_PRESSURE_MBAR * base.powf(G * MOLAR_MASS / (GAS_CONSTANT * LAPSE_K_PER_M))
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefractionError {
    #[error("temperature {0} C is not above absolute zero")]
    Temperature(f64),
    #[error("pressure {0} mbar must be positive and finite")]
    Pressure(f64),
    #[error("cutoff {0} deg is outside [{min}, {max}]", min = MIN_CUTOFF_DEG, max = MAX_CUTOFF_DEG)]
    Cutoff(f64),
    #[error("refraction does not converge at {0} deg elevation")]
    NoConvergence(f64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PressureModel {
    #[default]
    Exponential,
    StandardAtmosphere,
}

impl PressureModel {
    pub fn pressure_mbar(self, height_km: f64) -> f64 {
        match self {
            PressureModel::Exponential => pressure_from_height(height_km),
            PressureModel::StandardAtmosphere => pressure_standard_atmosphere(height_km),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefractionModel {
    /// Bennett's formula for apparent altitude, solved iteratively.
    #[default]
    Bennett,
    /// Sæmundsson's direct formula from true altitude.
    Saemundsson,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RefractionParameters {
    pub temperature_c: f64,
    pub pressure_mbar: f64,
}

impl RefractionParameters {
    /// Pressure comes from `pressure_override_mbar` when given, otherwise from
    /// the site height through `model`.
    pub fn for_site(
        height_km: f64,
        temperature_c: f64,
        model: PressureModel,
        pressure_override_mbar: Option<f64>,
    ) -> Self {
        Self {
            temperature_c,
            pressure_mbar: pressure_override_mbar.unwrap_or_else(|| model.pressure_mbar(height_km)),
        }
    }
}

impl Default for RefractionParameters {
    fn default() -> Self {
        Self {
            temperature_c: DEFAULT_TEMPERATURE_C,
            pressure_mbar: REFERENCE_PRESSURE_MBAR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refraction {
    pub model: RefractionModel,
    pub parameters: RefractionParameters,
    pub cutoff_deg: f64,
}

impl Refraction {
    pub fn new(model: RefractionModel, parameters: RefractionParameters) -> Self {
        Self {
            model,
            parameters,
            cutoff_deg: DEFAULT_CUTOFF_DEG,
        }
    }

    /// Reject parameters outside the range where the models are physical,
    /// and any for which the Bennett iteration fails to settle.
    pub fn validate(&self) -> Result<(), RefractionError> {
        let RefractionParameters {
            temperature_c,
            pressure_mbar,
        } = self.parameters;
        if !(temperature_c.is_finite() && temperature_c > ABSOLUTE_ZERO_C) {
            return Err(RefractionError::Temperature(temperature_c));
        }
        if !(pressure_mbar.is_finite() && pressure_mbar > 0.0) {
            return Err(RefractionError::Pressure(pressure_mbar));
        }
        if !(MIN_CUTOFF_DEG..=MAX_CUTOFF_DEG).contains(&self.cutoff_deg) {
            return Err(RefractionError::Cutoff(self.cutoff_deg));
        }
        // The iteration is steepest at the cutoff; walk up from there.
        let mut h = self.cutoff_deg;
        while h <= 90.0 {
            let bending = self.bending_deg(h)?;
            if !(bending.is_finite() && bending >= 0.0) {
                return Err(RefractionError::NoConvergence(h));
            }
            h += 0.5;
        }
        Ok(())
    }

    /// Bending in degrees to add to `geometric_deg`.
    pub fn bending_deg(&self, geometric_deg: f64) -> Result<f64, RefractionError> {
        let h = geometric_deg.max(self.cutoff_deg);
        let RefractionParameters {
            temperature_c,
            pressure_mbar,
        } = self.parameters;
        match self.model {
            RefractionModel::Bennett => Ok(bennett_apparent(h, temperature_c, pressure_mbar)? - h),
            RefractionModel::Saemundsson => Ok(saemundsson_bending(h, temperature_c, pressure_mbar)),
        }
    }

    pub fn apparent_elevation(&self, geometric_deg: f64) -> Result<f64, RefractionError> {
        Ok(geometric_deg + self.bending_deg(geometric_deg)?)
    }

    pub fn apply(&self, angles: &TopocentricAngles) -> Result<TopocentricAngles, RefractionError> {
        Ok(TopocentricAngles {
            elevation_deg: self.apparent_elevation(angles.elevation_deg)?,
            kind: AngleKind::Apparent,
            ..*angles
        })
    }
}

/// Apparent elevation with the default model and cutoff.
pub fn apply_refraction(
    geometric_deg: f64,
    temperature_c: f64,
    pressure_mbar: f64,
) -> Result<f64, RefractionError> {
    Refraction::new(
        RefractionModel::Bennett,
        RefractionParameters {
            temperature_c,
            pressure_mbar,
        },
    )
    .apparent_elevation(geometric_deg)
}

/// Bennett (1982) refraction for an observed altitude, degrees.
/// Zero once the argument of the tangent reaches the zenith.
fn bennett_bending(apparent_deg: f64, temperature_c: f64, pressure_mbar: f64) -> f64 {
    let argument = apparent_deg + 7.31 / (apparent_deg + 4.4);
    if argument >= 90.0 {
        return 0.0;
    }
    let r = 0.016_667 / argument.to_radians().tan();
    r * (0.28 * pressure_mbar / (temperature_c + 273.0))
}

/// Fixed point of `x = h + R(x)`; `R` is a contraction near the horizon.
fn bennett_apparent(
    geometric_deg: f64,
    temperature_c: f64,
    pressure_mbar: f64,
) -> Result<f64, RefractionError> {
    let mut refracted = geometric_deg;
    for _ in 0..MAX_ITERATIONS {
        let next = geometric_deg + bennett_bending(refracted, temperature_c, pressure_mbar);
        if (next - refracted).abs() < ITERATION_TOLERANCE_DEG {
            return Ok(next);
        }
        refracted = next;
    }
    Err(RefractionError::NoConvergence(geometric_deg))
}

/// Sæmundsson (1986) refraction for a true altitude, degrees.
fn saemundsson_bending(true_deg: f64, temperature_c: f64, pressure_mbar: f64) -> f64 {
    let argument = true_deg + 10.3 / (true_deg + 5.11);
    if argument >= 90.0 {
        return 0.0;
    }
    let arcmin = 1.02 / argument.to_radians().tan();
    arcmin / 60.0 * (pressure_mbar / 1010.0) * (283.0 / (273.0 + temperature_c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn models() -> [Refraction; 2] {
        let params = RefractionParameters::default();
        [
            Refraction::new(RefractionModel::Bennett, params),
            Refraction::new(RefractionModel::Saemundsson, params),
        ]
    }

    #[test]
    fn exponential_pressure() {
        assert_relative_eq!(pressure_from_height(0.0), 1013.25);
        assert_relative_eq!(pressure_from_height(8.5), 1013.25 / std::f64::consts::E, max_relative = 1e-12);
        assert!(pressure_from_height(-0.1) > 1013.25);
    }

    #[test]
    fn standard_atmosphere_pressure() {
        assert_relative_eq!(pressure_standard_atmosphere(0.0), 1013.25);
        // ISA tables give ~898.7 mbar at 1 km.
        assert_relative_eq!(pressure_standard_atmosphere(1.0), 898.75, epsilon = 0.5);
    }

    #[test]
    fn override_wins_over_model() {
        let params = RefractionParameters::for_site(2.0, 5.0, PressureModel::Exponential, Some(700.0));
        assert_eq!(params.pressure_mbar, 700.0);
        let derived = RefractionParameters::for_site(2.0, 5.0, PressureModel::Exponential, None);
        assert_relative_eq!(derived.pressure_mbar, pressure_from_height(2.0));
    }

    #[test]
    fn horizon_bending_matches_standard_tables() {
        // Roughly 29-35 arcmin at the geometric horizon.
        for refraction in models() {
            let bending = refraction.bending_deg(0.0).unwrap();
            assert!((0.45..0.62).contains(&bending), "{:?}: {bending}", refraction.model);
        }
    }

    #[test]
    fn bending_is_monotone_and_vanishes_at_zenith() {
        for refraction in models() {
            let mut previous = f64::INFINITY;
            let mut h = -10.0;
            while h <= 90.0 {
                let bending = refraction.bending_deg(h).unwrap();
                assert!(bending >= 0.0);
                assert!(bending <= previous + 1e-9, "{:?} not monotone at {h}", refraction.model);
                previous = bending;
                h += 0.25;
            }
            assert_eq!(refraction.bending_deg(90.0).unwrap(), 0.0);
            assert!(refraction.bending_deg(89.0).unwrap() < 1e-3);
        }
    }

    #[test]
    fn lowest_cutoff_keeps_bending_monotone() {
        for model in [RefractionModel::Bennett, RefractionModel::Saemundsson] {
            for (temperature_c, pressure_mbar) in [(-40.0, 1050.0), (20.0, 1013.25), (45.0, 600.0)] {
                let refraction = Refraction {
                    cutoff_deg: MIN_CUTOFF_DEG,
                    ..Refraction::new(model, RefractionParameters { temperature_c, pressure_mbar })
                };
                refraction.validate().unwrap();
                let mut previous = f64::INFINITY;
                let mut h = -10.0;
                while h <= 10.0 {
                    let bending = refraction.bending_deg(h).unwrap();
                    assert!(bending <= previous + 1e-9, "{model} at {temperature_c} C, {h} deg");
                    previous = bending;
                    h += 0.05;
                }
            }
        }
    }

    #[test]
    fn bending_is_clamped_below_cutoff() {
        for refraction in models() {
            let at_cutoff = refraction.bending_deg(DEFAULT_CUTOFF_DEG).unwrap();
            assert_eq!(refraction.bending_deg(-30.0).unwrap(), at_cutoff);
            assert!(at_cutoff < 0.8);
            assert_relative_eq!(refraction.apparent_elevation(-30.0).unwrap(), -30.0 + at_cutoff);
        }
    }

    #[test]
    fn denser_air_bends_more() {
        let warm = apply_refraction(5.0, 30.0, 1013.25).unwrap() - 5.0;
        let cold = apply_refraction(5.0, -10.0, 1013.25).unwrap() - 5.0;
        let thin = apply_refraction(5.0, 30.0, 700.0).unwrap() - 5.0;
        assert!(cold > warm);
        assert!(thin < warm);
    }

    #[test]
    fn bennett_solution_satisfies_fixed_point() {
        let params = RefractionParameters::default();
        let apparent = apply_refraction(3.0, params.temperature_c, params.pressure_mbar).unwrap();
        let residual = apparent - 3.0 - bennett_bending(apparent, params.temperature_c, params.pressure_mbar);
        assert!(residual.abs() < 1e-7);
    }

    #[test]
    fn default_parameters_validate() {
        for refraction in models() {
            assert_eq!(refraction.validate(), Ok(()));
        }
    }

    #[test]
    fn rejects_temperature_at_or_below_absolute_zero() {
        for temperature_c in [-273.15, -273.0, -300.0, f64::NAN] {
            let refraction = Refraction::new(
                RefractionModel::Bennett,
                RefractionParameters {
                    temperature_c,
                    pressure_mbar: REFERENCE_PRESSURE_MBAR,
                },
            );
            assert!(matches!(refraction.validate(), Err(RefractionError::Temperature(_))));
        }
    }

    #[test]
    fn rejects_non_positive_pressure() {
        for pressure_mbar in [-500.0, 0.0, f64::INFINITY, f64::NAN] {
            let refraction = Refraction::new(
                RefractionModel::Saemundsson,
                RefractionParameters {
                    temperature_c: DEFAULT_TEMPERATURE_C,
                    pressure_mbar,
                },
            );
            assert!(matches!(refraction.validate(), Err(RefractionError::Pressure(_))));
        }
    }

    #[test]
    fn rejects_cutoff_outside_monotone_range() {
        for cutoff_deg in [-6.0, -1.6, 0.5, f64::NAN] {
            let refraction = Refraction {
                cutoff_deg,
                ..models()[0]
            };
            assert!(matches!(refraction.validate(), Err(RefractionError::Cutoff(_))));
        }
    }

    #[test]
    fn runaway_iteration_is_an_error() {
        // Just above absolute zero the bending term is no longer a contraction.
        let refraction = Refraction::new(
            RefractionModel::Bennett,
            RefractionParameters {
                temperature_c: -272.9,
                pressure_mbar: REFERENCE_PRESSURE_MBAR,
            },
        );
        assert!(matches!(refraction.bending_deg(0.0), Err(RefractionError::NoConvergence(_))));
        assert!(matches!(refraction.validate(), Err(RefractionError::NoConvergence(_))));
    }

    #[test]
    fn apply_tags_angles_as_apparent() {
        let geometric = TopocentricAngles {
            azimuth_deg: 120.0,
            elevation_deg: 10.0,
            range_km: 2000.0,
            range_rate_km_s: -3.0,
            kind: AngleKind::Geometric,
        };
        let apparent = models()[0].apply(&geometric).unwrap();
        assert_eq!(apparent.kind, AngleKind::Apparent);
        assert_eq!(apparent.azimuth_deg, 120.0);
        assert!(apparent.elevation_deg > 10.0);
    }
}
