use std::sync::Arc;

use crate::{
    errors::StorageError,
    repositories::media_store::MediaStorage,
    settings::{AppConfig, StorageBackend},
};

pub mod memory;
pub mod s3;

/// Builds the storage backend selected by `storage_backend`.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn MediaStorage>, StorageError> {
    match config.storage_backend {
        StorageBackend::S3 => Ok(Arc::new(s3::S3MediaStorage::new(config)?)),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory media storage; uploads are lost on restart");
            Ok(Arc::new(memory::InMemoryMediaStorage::new(
                config.s3_bucket.clone(),
                config.s3_public_host.clone(),
            )))
        }
    }
}
