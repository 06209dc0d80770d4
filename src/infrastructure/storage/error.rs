#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote storage error: {0}")]
    Remote(String),

    #[error("no storage backend configured for this operation")]
    NoBackend,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PathError {
    #[error("path component {name} is empty after sanitization (was {original:?})")]
    InvalidComponent {
        name: &'static str,
        original: String,
    },
}
