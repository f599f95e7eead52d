//! Time-window sampling of the pointing pipeline.

mod cancel;
mod error;
mod passes;
mod pipeline;
mod sampler;
mod record;
mod window;

pub use cancel::CancelToken;
pub use error::{PipelineError, SamplerError};
pub use passes::{summarize_passes, PassSummary, HORIZON_ELEVATION_DEG};
pub use pipeline::Pipeline;
pub use record::PointingRecord;
pub use sampler::{EphemerisSampler, SamplerMode, SamplerMonitor, SamplerStatus, DEFAULT_CHUNK_SIZE};
pub use window::{TimeWindow, DEFAULT_CADENCE};
