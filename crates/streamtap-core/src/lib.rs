pub mod config;
pub mod logging;

pub mod clock;
pub mod error;
pub mod fetch;
pub mod io;
pub mod progress;
pub mod stage;
pub mod throughput;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::ProgressError;
pub use progress::{
    ChunkMode, FileSource, ProgressEvent, ProgressOptions, ProgressState, ProgressStream,
    SourceMetadata,
};
pub use throughput::ThroughputEstimator;
