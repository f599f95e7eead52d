use chrono::{DateTime, Utc};

use super::error::PipelineError;
use super::record::PointingRecord;
use crate::elements::OrbitalElementSet;
use crate::frames::{FrameTransform, GeodeticPosition};
use crate::propagate::Propagator;
use crate::refraction::Refraction;
use crate::tilt::TiltConfig;

/// Per-tick chain: propagate, look angles, refraction, optional tilt.
///
/// Holds only immutable state, so one instance is shared by every worker.
#[derive(Debug, Clone)]
pub struct Pipeline {
    propagator: Propagator,
    transform: FrameTransform,
    refraction: Option<Refraction>,
    tilt: Option<TiltConfig>,
}

impl Pipeline {
    pub fn new(elements: OrbitalElementSet, observer: GeodeticPosition) -> Self {
        Self {
            propagator: Propagator::new(elements),
            transform: FrameTransform::new(observer),
            refraction: None,
            tilt: None,
        }
    }

    pub fn with_refraction(mut self, refraction: Option<Refraction>) -> Self {
        self.refraction = refraction;
        self
    }

    pub fn with_tilt(mut self, tilt: Option<TiltConfig>) -> Self {
        self.tilt = tilt;
        self
    }

    pub fn with_min_range_km(mut self, min_range_km: f64) -> Self {
        self.transform = self.transform.with_min_range_km(min_range_km);
        self
    }

    pub fn elements(&self) -> &OrbitalElementSet {
        self.propagator.elements()
    }

    pub fn observer(&self) -> &GeodeticPosition {
        self.transform.observer()
    }

    pub fn point_at(&self, timestamp: DateTime<Utc>) -> Result<PointingRecord, PipelineError> {
        let state = self.propagator.propagate(timestamp)?;
        let mut angles = self.transform.to_topocentric(&state)?;
        if let Some(refraction) = &self.refraction {
            angles = refraction.apply(&angles)?;
        }
        if let Some(tilt) = &self.tilt {
            angles = tilt.apply(&angles);
        }
        Ok(PointingRecord::new(timestamp, &angles))
    }
}
