//! Orchestration of a single document run: extraction, then analysis,
//! recorded in a [`ProcessingRecord`].

pub mod config;
pub mod error;
pub mod progress;
pub mod record;
pub mod runner;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use progress::{
    BroadcastProgress, DocumentProgressEvent, NoopProgress, ProcessingPhase, ProgressEvent,
    ProgressReporter,
};
pub use record::{ProcessingRecord, ProcessingStatus};
pub use runner::Pipeline;
