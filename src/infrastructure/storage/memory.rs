use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::{
    domain::object_key::object_url,
    errors::StorageError,
    repositories::media_store::{ensure_length, MediaStorage, StoredReference},
};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub body: Bytes,
}

/// Process-local storage used for development and tests.
///
/// URLs have the same shape as the S3 backend's, so stored references
/// round-trip through key extraction unchanged.
#[derive(Debug, Default)]
pub struct InMemoryMediaStorage {
    bucket: String,
    public_host: String,
    objects: DashMap<String, StoredObject>,
    deletes: AtomicUsize,
}

impl InMemoryMediaStorage {
    pub fn new(bucket: impl Into<String>, public_host: impl Into<String>) -> Self {
        InMemoryMediaStorage {
            bucket: bucket.into(),
            public_host: public_host.into(),
            objects: DashMap::new(),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of delete calls received, absent keys included.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
        byte_length: u64,
    ) -> Result<StoredReference, StorageError> {
        ensure_length(key, &body, byte_length)?;

        self.objects.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                body,
            },
        );
        debug!(key, bytes = byte_length, "Object stored in memory");

        Ok(StoredReference {
            key: key.to_string(),
            url: object_url(&self.bucket, &self.public_host, key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.objects.remove(key).is_none() {
            warn!(key, "Object already absent from memory store");
        }
        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl_seconds: u64) -> Result<String, StorageError> {
        let expires = Utc::now().timestamp() + ttl_seconds as i64;
        Ok(format!(
            "{}?expires={}",
            object_url(&self.bucket, &self.public_host, key),
            expires
        ))
    }

    async fn check_connection(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> InMemoryMediaStorage {
        InMemoryMediaStorage::new("portfolio", "s3.amazonaws.com")
    }

    #[tokio::test]
    async fn put_returns_virtual_hosted_url() {
        let store = storage();
        let body = Bytes::from_static(b"png-bytes");

        let stored = store.put("images/1-abcdefgh.png", "image/png", body, 9).await.unwrap();

        assert_eq!(stored.url, "https://portfolio.s3.amazonaws.com/images/1-abcdefgh.png");
        assert_eq!(store.object("images/1-abcdefgh.png").unwrap().content_type, "image/png");
    }

    #[tokio::test]
    async fn put_rejects_length_mismatch() {
        let store = storage();

        let err = store
            .put("a.txt", "text/plain", Bytes::from_static(b"abc"), 4)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::LengthMismatch { expected: 4, actual: 3, .. }));
        assert!(!store.contains("a.txt"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = storage();
        store.put("a.txt", "text/plain", Bytes::from_static(b"abc"), 3).await.unwrap();

        store.delete("a.txt").await.unwrap();
        store.delete("a.txt").await.unwrap();

        assert_eq!(store.object_count(), 0);
        assert_eq!(store.delete_count(), 2);
    }
}
