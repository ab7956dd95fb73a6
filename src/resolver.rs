//! Fetch-or-populate pipeline.
//!
//! `resolve` turns an `(owner, video_id)` pair into a fully materialized
//! metadata record: served from the metadata cache when present, otherwise
//! fetched from the origin with the clip and every image copied into the
//! object store before the rewritten record is persisted.
//!
//! Concurrent requests for the same video are serialized on a per-video lock,
//! so the origin sees at most one miss path per video at a time and queued
//! callers are answered from the cache once the first one finishes.

use crate::cache::{AssetCache, MetadataCache};
use crate::config::Config;
use crate::error::{MirrorError, Result};
use crate::keys::CacheLayout;
use crate::locks::KeyedLocks;
use crate::metrics;
use crate::model::{VideoId, VideoMeta};
use crate::origin::Origin;
use crate::store::BlobStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct VideoResolver {
    origin: Arc<dyn Origin>,
    metadata: MetadataCache,
    assets: AssetCache,
    locks: KeyedLocks,
}

impl VideoResolver {
    pub fn new(origin: Arc<dyn Origin>, store: Arc<dyn BlobStore>, config: &Config) -> Self {
        let layout = CacheLayout::new(&config.cache_url);
        let assets = AssetCache::new(origin.clone(), store.clone(), layout.clone())
            .with_existence_check(config.check_existing_assets);
        Self {
            metadata: MetadataCache::new(store, layout),
            assets,
            origin,
            locks: KeyedLocks::new(),
        }
    }

    pub fn origin(&self) -> &Arc<dyn Origin> {
        &self.origin
    }

    /// Resolve a video to its cached metadata record.
    ///
    /// Returns `Ok(None)` when the video does not exist at the origin, and
    /// also for identities that fail validation, so invalid input is
    /// indistinguishable from an absent video.
    ///
    /// The locked section runs on its own task: if the caller goes away the
    /// pipeline still completes for anyone queued on the same video.
    pub async fn resolve(&self, owner: &str, video_id: &str) -> Result<Option<VideoMeta>> {
        let Some(id) = VideoId::parse(owner, video_id) else {
            debug!("Rejecting invalid video identity {:?}/{:?}", owner, video_id);
            return Ok(None);
        };

        let start = Instant::now();
        let this = self.clone();
        let result = tokio::spawn(async move {
            let key = id.cache_key();
            this.locks
                .with_lock(&key, || this.fetch_or_populate(&id))
                .await
        })
        .await
        .map_err(|e| MirrorError::Internal(format!("resolver task failed: {}", e)))?;

        metrics::record_resolve_duration(start);
        result
    }

    /// Body of the locked section: cache hit or the full miss path.
    async fn fetch_or_populate(&self, id: &VideoId) -> Result<Option<VideoMeta>> {
        if self.metadata.exists(id).await {
            metrics::record_cache("hit");
            info!("Returning cached metadata for {}", id);
            return self.metadata.read(id).await.map(Some);
        }
        metrics::record_cache("miss");

        info!("Getting metadata from TikTok for {}", id);
        let Some(mut meta) = self.origin.fetch_metadata(id).await? else {
            info!("Video {} not found at origin", id);
            return Ok(None);
        };

        self.cache_clip(id, &mut meta).await?;
        self.cache_images(&mut meta).await?;

        // Cached assets stay behind as orphans; the next caller starts over.
        if let Err(e) = self.metadata.write(id, &meta).await {
            error!("Failed to persist metadata for {}: {}", id, e);
            return Err(e);
        }

        Ok(Some(meta))
    }

    async fn cache_clip(&self, id: &VideoId, meta: &mut VideoMeta) -> Result<()> {
        if meta.is_materialized() {
            return Ok(());
        }

        let source = meta
            .clip_source()
            .ok_or_else(|| {
                MirrorError::InvalidMetadata(format!(
                    "video {} has neither downloadAddr nor playAddr",
                    id
                ))
            })?
            .to_string();
        let format = meta.clip_format().to_string();

        meta.cdn_video_url = self.assets.cache_clip(id, &source, &format).await?;
        Ok(())
    }

    /// Rewrite the six image fields in order; the first failure aborts.
    async fn cache_images(&self, meta: &mut VideoMeta) -> Result<()> {
        for (field, url) in meta.image_fields_mut() {
            if url.is_empty() {
                debug!("Image field {} is empty, skipping", field);
                continue;
            }
            *url = self.assets.cache_image(url).await?;
        }
        Ok(())
    }
}
