use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::StorageError;

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReference {
    pub key: String,
    pub url: String,
}

/// Object storage for media bytes, addressed by key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Stores exactly `byte_length` bytes of `body` under `key`.
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
        byte_length: u64,
    ) -> Result<StoredReference, StorageError>;

    /// Removing an absent object succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// A GET URL for `key` that stops working after `ttl_seconds`.
    async fn presign_get(&self, key: &str, ttl_seconds: u64) -> Result<String, StorageError>;

    async fn check_connection(&self) -> Result<(), StorageError>;
}

pub(crate) fn ensure_length(key: &str, body: &Bytes, byte_length: u64) -> Result<(), StorageError> {
    let actual = body.len() as u64;
    if actual != byte_length {
        return Err(StorageError::LengthMismatch {
            key: key.to_string(),
            expected: byte_length,
            actual,
        });
    }
    Ok(())
}
