use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    aws::{AmazonS3, AmazonS3Builder},
    path::Path,
    signer::Signer,
    Attribute, Attributes, ObjectStore, PutOptions, PutPayload,
};
use tracing::{info, warn};

use crate::{
    domain::object_key::object_url,
    errors::StorageError,
    repositories::media_store::{ensure_length, MediaStorage, StoredReference},
    settings::AppConfig,
};

const HEALTH_PROBE_KEY: &str = ".health-probe";

/// S3-backed media storage.
#[derive(Clone)]
pub struct S3MediaStorage {
    store: Arc<AmazonS3>,
    bucket: String,
    public_host: String,
}

impl S3MediaStorage {
    pub fn new(config: &AppConfig) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.s3_bucket)
            .with_region(&config.s3_region);

        if let Some(access_key) = &config.s3_access_key_id {
            builder = builder.with_access_key_id(access_key);
        }

        if let Some(secret_key) = &config.s3_secret_access_key {
            builder = builder.with_secret_access_key(secret_key);
        }

        if let Some(endpoint) = &config.s3_endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Unavailable(format!("Failed to build S3 client: {}", e)))?;

        info!(bucket = %config.s3_bucket, region = %config.s3_region, "S3 media storage ready");

        Ok(S3MediaStorage {
            store: Arc::new(store),
            bucket: config.s3_bucket.clone(),
            public_host: config.s3_public_host.clone(),
        })
    }
}

#[async_trait]
impl MediaStorage for S3MediaStorage {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
        byte_length: u64,
    ) -> Result<StoredReference, StorageError> {
        ensure_length(key, &body, byte_length)?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&Path::from(key), PutPayload::from(body), options)
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        info!(key, bytes = byte_length, "Object uploaded");

        Ok(StoredReference {
            key: key.to_string(),
            url: object_url(&self.bucket, &self.public_host, key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self.store.delete(&Path::from(key)).await {
            Ok(()) => {
                info!(key, "Object deleted");
                Ok(())
            }
            Err(object_store::Error::NotFound { .. }) => {
                warn!(key, "Object already absent from bucket");
                Ok(())
            }
            Err(e) => Err(StorageError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn presign_get(&self, key: &str, ttl_seconds: u64) -> Result<String, StorageError> {
        let url = self
            .store
            .signed_url(http::Method::GET, &Path::from(key), Duration::from_secs(ttl_seconds))
            .await
            .map_err(|e| StorageError::Presign {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Ok(url.to_string())
    }

    async fn check_connection(&self) -> Result<(), StorageError> {
        match self.store.head(&Path::from(HEALTH_PROBE_KEY)).await {
            Ok(_) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StorageError::Unavailable(e.to_string())),
        }
    }
}
