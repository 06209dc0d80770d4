pub mod error;
pub mod local;
pub mod path;
pub mod router;
pub mod s3;

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

pub use error::{PathError, StorageError};
pub use local::LocalBackend;
pub use path::{canonical_path, is_canonical, sanitize_component};
pub use router::{PutReport, StorageMode, StorageRouter};
pub use s3::S3Backend;

/// Metadata attached to a stored object.
#[derive(Debug, Clone, Default)]
pub struct ObjectMetadata {
    pub content_type: String,
    pub attributes: HashMap<String, String>,
}

impl ObjectMetadata {
    pub fn audio_wav() -> Self {
        Self {
            content_type: "audio/wav".to_string(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Backend-specific descriptor of where a `put` landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StoredLocation {
    Local(PathBuf),
    Remote(String),
}

impl std::fmt::Display for StoredLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoredLocation::Local(path) => write!(f, "{}", path.display()),
            StoredLocation::Remote(uri) => write!(f, "{}", uri),
        }
    }
}

/// Uniform storage interface over the local filesystem and remote object
/// storage. Keys are canonical relative paths produced by
/// [`canonical_path`]; `put` overwrites on collision (last-writer-wins).
///
/// Implementations must be safe for concurrent use by multiple workers.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write `bytes` at `path`, overwriting existing content.
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        metadata: &ObjectMetadata,
    ) -> Result<StoredLocation, StorageError>;

    /// Read the object at `path`; `None` when absent.
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Delete the object at `path`. Idempotent: deleting a missing path
    /// returns `false` rather than erroring.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;

    /// List stored paths under `prefix`. Finite and restartable.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}
