use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    #[error(
        "Kepler's equation did not converge after {iterations} iterations \
         (M = {mean_anomaly_rad} rad, e = {eccentricity})"
    )]
    ConvergenceFailure {
        mean_anomaly_rad: f64,
        eccentricity: f64,
        iterations: usize,
    },
    #[error("orbit decayed {minutes_since_epoch:.3} min from epoch: {reason}")]
    DecayedOrbit {
        minutes_since_epoch: f64,
        reason: String,
    },
}
