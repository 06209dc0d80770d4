use crate::domain::artifact::ArtifactRejected;
use crate::domain::command::ValidationError;
use crate::infrastructure::storage::{PathError, StorageError};

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Variation generation failed: {0}")]
    Generation(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Audio transcoding failed: {0}")]
    Transcode(String),

    #[error("Artifact rejected: {0}")]
    ArtifactRejected(#[from] ArtifactRejected),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid path: {0}")]
    Path(#[from] PathError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
