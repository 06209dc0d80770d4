use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use super::error::StorageError;
use super::{ObjectMetadata, StorageBackend, StoredLocation};

/// Transient `put` failures are retried this many times before surfacing.
const MAX_PUT_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// S3-backed storage. The canonical relative path is used as the object key
/// with no extra prefix.
pub struct S3Backend {
    client: Arc<S3Client>,
    bucket: String,
}

impl S3Backend {
    pub fn new(client: Arc<S3Client>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    fn uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    fn is_transient<E>(err: &SdkError<E>) -> bool {
        match err {
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
                true
            }
            SdkError::ServiceError(service) => service.raw().status().as_u16() >= 500,
            _ => false,
        }
    }

}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        metadata: &ObjectMetadata,
    ) -> Result<StoredLocation, StorageError> {
        let mut last_error = None;

        for attempt in 0..MAX_PUT_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(RETRY_BACKOFF * 2u32.pow(attempt - 1)).await;
            }

            match self
                .client
                .put_object()
                .bucket(&self.bucket)
                .key(path)
                .body(ByteStream::from(bytes.to_vec()))
                .content_type(&metadata.content_type)
                .set_metadata(if metadata.attributes.is_empty() {
                    None
                } else {
                    Some(metadata.attributes.clone())
                })
                .send()
                .await
            {
                Ok(_) => {
                    tracing::debug!(key = path, size = bytes.len(), "S3 write complete");
                    return Ok(StoredLocation::Remote(self.uri(path)));
                }
                Err(e) if Self::is_transient(&e) && attempt + 1 < MAX_PUT_ATTEMPTS => {
                    tracing::warn!(
                        key = path,
                        attempt = attempt + 1,
                        error = %e,
                        "transient S3 put failure, retrying"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(StorageError::Remote(format!("S3 put failed: {e}"))),
            }
        }

        Err(StorageError::Remote(format!(
            "S3 put failed after {MAX_PUT_ATTEMPTS} attempts: {}",
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(response) => response,
            Err(SdkError::ServiceError(service)) if service.err().is_no_such_key() => {
                return Ok(None);
            }
            Err(e) => return Err(StorageError::Remote(format!("S3 get failed: {e}"))),
        };

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Remote(format!("failed to read S3 object body: {e}")))?;
        Ok(Some(bytes.into_bytes().to_vec()))
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        // S3 deletes are unconditional; check for existence first so callers
        // can observe the idempotent false on a missing key.
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(_) => {}
            Err(SdkError::ServiceError(service)) if service.err().is_not_found() => {
                return Ok(false);
            }
            Err(e) => return Err(StorageError::Remote(format!("S3 head failed: {e}"))),
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::Remote(format!("S3 delete failed: {e}")))?;
        Ok(true)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| StorageError::Remote(format!("S3 list failed: {e}")))?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }
}
