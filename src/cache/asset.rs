//! Media asset caching.
//!
//! Copies origin media into the object store and hands back the public URL
//! of the copy.

use crate::error::Result;
use crate::keys::CacheLayout;
use crate::metrics;
use crate::model::VideoId;
use crate::origin::Origin;
use crate::store::BlobStore;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct AssetCache {
    origin: Arc<dyn Origin>,
    store: Arc<dyn BlobStore>,
    layout: CacheLayout,
    check_existing: bool,
}

impl AssetCache {
    pub fn new(origin: Arc<dyn Origin>, store: Arc<dyn BlobStore>, layout: CacheLayout) -> Self {
        Self {
            origin,
            store,
            layout,
            check_existing: false,
        }
    }

    /// Skip the fetch when an image key is already present.
    ///
    /// Off by default: an origin URL is assumed stable but its content may
    /// change, and every call re-fetches and overwrites the stored copy.
    pub fn with_existence_check(mut self, enabled: bool) -> Self {
        self.check_existing = enabled;
        self
    }

    /// Cache the image at `url` under `tiktok/img/<md5(url)>`.
    pub async fn cache_image(&self, url: &str) -> Result<String> {
        let key = self.layout.image_key(url);

        if self.check_existing {
            match self.store.exists(&key).await {
                Ok(true) => {
                    debug!("Image already cached at {}", key);
                    return Ok(self.layout.public_url(&key));
                }
                Ok(false) => {}
                Err(e) => error!("Failed to HEAD {}, re-fetching: {}", key, e),
            }
        }

        let media = self.origin.fetch_media(url, None).await?;
        self.store.put(&key, media.body, &media.content_type).await?;
        metrics::record_upload("image");

        Ok(self.layout.public_url(&key))
    }

    /// Cache a video clip under `tiktok/<owner>/<id>.<format>`.
    ///
    /// The download carries the video page as referer.
    pub async fn cache_clip(&self, id: &VideoId, source_url: &str, format: &str) -> Result<String> {
        info!("Downloading video for {}", id);
        let key = self.layout.clip_key(id, format);

        let media = self.origin.fetch_media(source_url, Some(id)).await?;
        let size = media.body.len();
        self.store.put(&key, media.body, &media.content_type).await?;
        metrics::record_upload("clip");
        info!("Cached {} byte clip for {} at {}", size, id, key);

        Ok(self.layout.public_url(&key))
    }
}
