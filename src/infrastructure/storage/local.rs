use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::error::StorageError;
use super::{ObjectMetadata, StorageBackend, StoredLocation};

/// Filesystem-backed storage rooted at a base directory.
///
/// Parent directories are created on demand; concurrent `create_dir_all`
/// calls on the same directory are a benign race. Writes go to a temp file
/// in the destination directory and are renamed into place, so a crash
/// mid-write never leaves a truncated artifact at the canonical path.
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        _metadata: &ObjectMetadata,
    ) -> Result<StoredLocation, StorageError> {
        let destination = self.absolute(path);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Temp file lives next to the destination so the rename stays on one
        // filesystem and is atomic.
        let temp = destination.with_extension(format!("tmp-{}", Uuid::new_v4()));
        fs::write(&temp, bytes).await?;
        if let Err(e) = fs::rename(&temp, &destination).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::debug!(path = %destination.display(), size = bytes.len(), "local write complete");
        Ok(StoredLocation::Local(destination))
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.absolute(path)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.absolute(path)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut results = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let entry_path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(entry_path);
                    continue;
                }

                let relative = entry_path.strip_prefix(&self.root).map_err(|e| {
                    StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
                })?;
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if key.starts_with(prefix) {
                    results.push(key);
                }
            }
        }

        results.sort();
        Ok(results)
    }
}
