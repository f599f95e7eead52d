use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use super::cancel::CancelToken;
use super::error::{PipelineError, SamplerError};
use super::passes::{summarize_passes, PassSummary, HORIZON_ELEVATION_DEG};
use super::pipeline::Pipeline;
use super::record::PointingRecord;
use super::window::TimeWindow;

/// Ticks computed between two cancellation checks in parallel mode.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum SamplerMode {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SamplerStatus {
    pub mode: SamplerMode,
    pub ticks_done: usize,
    pub ticks_total: usize,
    pub failed_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct Shared {
    status: SamplerStatus,
}

/// Read-only view of a sampler's progress, usable from other threads.
#[derive(Debug, Clone)]
pub struct SamplerMonitor {
    shared: Arc<Mutex<Shared>>,
}

impl SamplerMonitor {
    pub fn status(&self) -> SamplerStatus {
        lock(&self.shared).status.clone()
    }
}

/// Samples one pipeline over one window. Runs once.
pub struct EphemerisSampler {
    pipeline: Pipeline,
    window: TimeWindow,
    parallel: bool,
    chunk_size: usize,
    cancel: CancelToken,
    shared: Arc<Mutex<Shared>>,
    records: Vec<PointingRecord>,
    passes: Vec<PassSummary>,
}

impl EphemerisSampler {
    pub fn new(pipeline: Pipeline, window: TimeWindow) -> Self {
        Self {
            pipeline,
            window,
            parallel: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            cancel: CancelToken::new(),
            shared: Arc::new(Mutex::new(Shared {
                status: SamplerStatus {
                    mode: SamplerMode::Idle,
                    ticks_done: 0,
                    ticks_total: 0,
                    failed_at: None,
                },
            })),
            records: Vec::new(),
            passes: Vec::new(),
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn monitor(&self) -> SamplerMonitor {
        SamplerMonitor {
            shared: self.shared.clone(),
        }
    }

    pub fn status(&self) -> SamplerStatus {
        lock(&self.shared).status.clone()
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Records produced so far, in time order. After a cancelled run this is
    /// the gap-free prefix that completed; after a failure it is empty.
    pub fn records(&self) -> &[PointingRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PointingRecord> {
        self.records
    }

    pub fn passes(&self) -> &[PassSummary] {
        &self.passes
    }

    pub fn run(&mut self) -> Result<&[PointingRecord], SamplerError> {
        if lock(&self.shared).status.mode != SamplerMode::Idle {
            return Err(SamplerError::AlreadyStarted);
        }

        let total = match self.window.tick_count() {
            Ok(total) => total,
            Err(e) => {
                self.set_mode(SamplerMode::Failed);
                return Err(e);
            }
        };

        {
            let mut locked = lock(&self.shared);
            locked.status.mode = SamplerMode::Running;
            locked.status.ticks_total = total;
        }
        log::info!(
            "Sampling {} from {} to {}: {} ticks every {}",
            self.pipeline.elements().display_name(),
            self.window.start,
            self.window.end,
            total,
            humantime::format_duration(self.window.cadence.to_std().unwrap_or_default()),
        );

        let outcome = if self.parallel {
            self.run_parallel(total)
        } else {
            self.run_sequential(total)
        };

        match outcome {
            Err((timestamp, source)) => {
                log::error!("Sampling failed at {}: {}", timestamp, source);
                self.records.clear();
                let mut locked = lock(&self.shared);
                locked.status.mode = SamplerMode::Failed;
                locked.status.failed_at = Some(timestamp);
                Err(SamplerError::Tick { timestamp, source })
            }
            Ok(()) if self.records.len() < total => {
                log::warn!(
                    "Sampling cancelled after {} of {} ticks",
                    self.records.len(),
                    total
                );
                self.set_mode(SamplerMode::Cancelled);
                Ok(&self.records)
            }
            Ok(()) => {
                self.passes = summarize_passes(&self.records, HORIZON_ELEVATION_DEG);
                for pass in &self.passes {
                    log::info!(
                        "Pass: rise {} (az {:.2}), culmination {} (el {:.2}), set {} (az {:.2})",
                        pass.rise,
                        pass.rise_azimuth_deg,
                        pass.culmination,
                        pass.max_elevation_deg,
                        pass.set,
                        pass.set_azimuth_deg
                    );
                }
                log::info!("Sampling completed: {} records", self.records.len());
                self.set_mode(SamplerMode::Completed);
                Ok(&self.records)
            }
        }
    }

    fn run_sequential(&mut self, total: usize) -> Result<(), (DateTime<Utc>, PipelineError)> {
        self.records.reserve(total);
        for k in 0..total {
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            let timestamp = self.window.tick(k);
            let record = self.pipeline.point_at(timestamp).map_err(|e| (timestamp, e))?;
            self.records.push(record);
            lock(&self.shared).status.ticks_done = k + 1;
        }
        Ok(())
    }

    fn run_parallel(&mut self, total: usize) -> Result<(), (DateTime<Utc>, PipelineError)> {
        self.records.reserve(total);
        let mut chunk_start = 0;
        while chunk_start < total {
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            let chunk_end = (chunk_start + self.chunk_size).min(total);
            let pipeline = &self.pipeline;
            let window = &self.window;
            let results: Vec<_> = (chunk_start..chunk_end)
                .into_par_iter()
                .map(|k| {
                    let timestamp = window.tick(k);
                    (timestamp, pipeline.point_at(timestamp))
                })
                .collect();

            // Indexed collect keeps tick order, so the first error is the earliest.
            for (timestamp, result) in results {
                self.records.push(result.map_err(|e| (timestamp, e))?);
            }
            lock(&self.shared).status.ticks_done = chunk_end;
            chunk_start = chunk_end;
        }
        Ok(())
    }

    fn set_mode(&self, mode: SamplerMode) {
        lock(&self.shared).status.mode = mode;
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
