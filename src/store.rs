//! Key-addressed blob storage.

use crate::config::{Config, StoreBackend};
use crate::error::{MirrorError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ClientOptions, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;
use tracing::info;

/// Minimal capability set the caches need from an object store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// `Ok(false)` when the key is absent, `Err` for any other fault.
    async fn exists(&self, key: &str) -> Result<bool>;

    async fn get(&self, key: &str) -> Result<Bytes>;

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()>;
}

/// [`BlobStore`] backed by an `object_store` implementation (S3 or in-memory).
#[derive(Clone, Debug)]
pub struct ObjectStoreBlobs {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectStoreBlobs {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }

    /// Build the backend selected by `config`.
    ///
    /// S3 credentials and region come from the standard `AWS_*` environment
    /// variables.
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory object store, cached objects are not persisted");
                Ok(Self::in_memory())
            }
            StoreBackend::S3 => {
                let bucket = config.bucket_name.as_deref().ok_or_else(|| {
                    MirrorError::Config("BUCKET_NAME is required for s3".to_string())
                })?;
                let s3 = AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .with_client_options(ClientOptions::new().with_timeout(config.http_timeout()))
                    .build()?;
                info!("Using S3 bucket {}", bucket);
                Ok(Self::new(Arc::new(s3)))
            }
        }
    }
}

#[async_trait]
impl BlobStore for ObjectStoreBlobs {
    async fn exists(&self, key: &str) -> Result<bool> {
        match self.inner.head(&Path::from(key)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let result = self.inner.get(&Path::from(key)).await?;
        Ok(result.bytes().await?)
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };
        self.inner
            .put_opts(&Path::from(key), PutPayload::from(body), opts)
            .await?;
        Ok(())
    }
}
