//! Metadata record cache stored as JSON documents.

use crate::error::Result;
use crate::keys::CacheLayout;
use crate::metrics;
use crate::model::{VideoId, VideoMeta};
use crate::store::BlobStore;
use bytes::Bytes;
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub struct MetadataCache {
    store: Arc<dyn BlobStore>,
    layout: CacheLayout,
}

impl MetadataCache {
    pub fn new(store: Arc<dyn BlobStore>, layout: CacheLayout) -> Self {
        Self { store, layout }
    }

    /// Whether a record for `id` is cached.
    ///
    /// Fails open: a store fault is logged and reported as "not cached", so a
    /// flaky store costs an extra origin fetch instead of failing the request.
    pub async fn exists(&self, id: &VideoId) -> bool {
        let key = self.layout.metadata_key(id);
        match self.store.exists(&key).await {
            Ok(found) => found,
            Err(e) => {
                error!("Failed to HEAD object {}: {}", key, e);
                false
            }
        }
    }

    /// Read a record confirmed present by [`exists`](Self::exists).
    ///
    /// Store and decode failures are hard errors; a confirmed entry that
    /// cannot be read is not treated as absent.
    pub async fn read(&self, id: &VideoId) -> Result<VideoMeta> {
        let body = self.store.get(&self.layout.metadata_key(id)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn write(&self, id: &VideoId, meta: &VideoMeta) -> Result<()> {
        let body = serde_json::to_vec(meta)?;
        self.store
            .put(&self.layout.metadata_key(id), Bytes::from(body), "application/json")
            .await?;
        metrics::record_upload("metadata");
        Ok(())
    }
}
