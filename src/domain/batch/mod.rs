pub mod error;
pub mod result;
pub mod service;

pub use error::CommandFailure;
pub use result::{BatchErrorEntry, BatchResult, CommandOutcome, ErrorStage, UnitError};
pub use service::{BatchPipeline, PipelineSettings};
