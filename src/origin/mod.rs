pub mod client;
pub mod short_link;

use crate::error::Result;
use crate::model::{VideoId, VideoMeta};
use async_trait::async_trait;
use bytes::Bytes;

pub use client::TikTokClient;

/// Fallback content type when the origin omits one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw bytes fetched from the origin CDN.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaPayload {
    pub body: Bytes,
    pub content_type: String,
}

/// Access to the origin platform.
///
/// Implementations must be safe for concurrent use; the pipeline shares one
/// instance across all requests.
#[async_trait]
pub trait Origin: Send + Sync {
    /// Fetch the metadata record for a video.
    ///
    /// `Ok(None)` means the origin reported the video as not found.
    async fn fetch_metadata(&self, id: &VideoId) -> Result<Option<VideoMeta>>;

    /// Fetch the bytes behind a media URL.
    ///
    /// When `referer` is given the request carries that video's page URL as
    /// `Referer`; the origin refuses clip downloads without it.
    async fn fetch_media(&self, url: &str, referer: Option<&VideoId>) -> Result<MediaPayload>;

    /// Resolve a short-link code to the video it redirects to.
    async fn resolve_short_link(&self, code: &str) -> Result<Option<VideoId>>;
}
