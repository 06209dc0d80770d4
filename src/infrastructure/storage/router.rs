use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;

use super::error::StorageError;
use super::{ObjectMetadata, StorageBackend, StoredLocation};

/// Which backends a run writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Local,
    S3,
    Dual,
}

impl StorageMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "local" => Some(StorageMode::Local),
            "s3" => Some(StorageMode::S3),
            "dual" => Some(StorageMode::Dual),
            _ => None,
        }
    }
}

/// Result of a routed `put`. In dual-write mode a remote failure after a
/// successful local write is reported here instead of failing the call:
/// the local artifact is retained and there is no rollback across backends.
#[derive(Debug)]
pub struct PutReport {
    pub locations: Vec<StoredLocation>,
    pub remote_error: Option<StorageError>,
}

impl PutReport {
    pub fn is_partial(&self) -> bool {
        self.remote_error.is_some()
    }
}

/// Presents one logical backend to callers, routing to the configured
/// local and/or remote backends.
pub struct StorageRouter {
    local: Option<Arc<dyn StorageBackend>>,
    remote: Option<Arc<dyn StorageBackend>>,
    prefer_local_reads: bool,
}

impl StorageRouter {
    pub fn local_only(local: Arc<dyn StorageBackend>) -> Self {
        Self {
            local: Some(local),
            remote: None,
            prefer_local_reads: true,
        }
    }

    pub fn remote_only(remote: Arc<dyn StorageBackend>) -> Self {
        Self {
            local: None,
            remote: Some(remote),
            prefer_local_reads: false,
        }
    }

    pub fn dual(
        local: Arc<dyn StorageBackend>,
        remote: Arc<dyn StorageBackend>,
        prefer_local_reads: bool,
    ) -> Self {
        Self {
            local: Some(local),
            remote: Some(remote),
            prefer_local_reads,
        }
    }

    /// Write through to every configured backend. Local is written first so
    /// that a remote failure still leaves an inspectable local copy.
    pub async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        metadata: &ObjectMetadata,
    ) -> Result<PutReport, StorageError> {
        let mut locations = Vec::new();

        if let Some(local) = &self.local {
            locations.push(local.put(path, bytes, metadata).await?);
        }

        if let Some(remote) = &self.remote {
            match remote.put(path, bytes, metadata).await {
                Ok(location) => locations.push(location),
                Err(e) if !locations.is_empty() => {
                    return Ok(PutReport {
                        locations,
                        remote_error: Some(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if locations.is_empty() {
            return Err(StorageError::NoBackend);
        }

        Ok(PutReport {
            locations,
            remote_error: None,
        })
    }

    /// Read with the configured policy: prefer-local checks the local
    /// backend first and falls back to remote only on a local miss.
    pub async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if self.prefer_local_reads {
            if let Some(local) = &self.local {
                if let Some(bytes) = local.get(path).await? {
                    return Ok(Some(bytes));
                }
            }
            if let Some(remote) = &self.remote {
                return remote.get(path).await;
            }
            return Ok(None);
        }

        if let Some(remote) = &self.remote {
            if let Some(bytes) = remote.get(path).await? {
                return Ok(Some(bytes));
            }
        }
        if let Some(local) = &self.local {
            return local.get(path).await;
        }
        Ok(None)
    }

    /// Delete from every configured backend; true when any backend held the
    /// object.
    pub async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let mut deleted = false;
        if let Some(local) = &self.local {
            deleted |= local.delete(path).await?;
        }
        if let Some(remote) = &self.remote {
            deleted |= remote.delete(path).await?;
        }
        Ok(deleted)
    }

    /// Union of the paths known to the configured backends.
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = BTreeSet::new();
        if let Some(local) = &self.local {
            keys.extend(local.list(prefix).await?);
        }
        if let Some(remote) = &self.remote {
            keys.extend(remote.list(prefix).await?);
        }
        Ok(keys.into_iter().collect())
    }
}
