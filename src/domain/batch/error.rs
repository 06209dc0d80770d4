/// Terminal failure reason for a command that stored zero artifacts.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandFailure {
    #[error("variation generation failed: {0}")]
    Generation(String),

    #[error("no generated variation preserved the intent")]
    NoValidVariations,

    #[error("no artifacts stored: every variation failed")]
    NoArtifactsStored,

    #[error("batch cancelled before this command started")]
    Cancelled,

    #[error("worker crashed: {0}")]
    Crashed(String),
}
