use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::frames::GeometryError;
use crate::propagate::PropagationError;
use crate::refraction::RefractionError;

/// Failure of a single tick of the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Propagation(#[from] PropagationError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Refraction(#[from] RefractionError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    #[error("invalid time window: {0}")]
    InvalidWindow(String),
    #[error("tick at {timestamp} failed: {source}")]
    Tick {
        timestamp: DateTime<Utc>,
        source: PipelineError,
    },
    #[error("sampler already started")]
    AlreadyStarted,
}
