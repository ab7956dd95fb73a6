//! Object key layout and public URL construction.
//!
//! The layout is part of the public contract: cached URLs handed out in the
//! past must keep resolving, so keys are built exactly as
//! `tiktok/<owner>/<id>.json`, `tiktok/<owner>/<id>.<format>` and
//! `tiktok/img/<md5 of source url>`.

use crate::model::VideoId;
use md5::{Digest, Md5};

/// Top-level namespace for every object this service writes.
pub const KEY_PREFIX: &str = "tiktok";

#[derive(Clone, Debug)]
pub struct CacheLayout {
    public_base: String,
}

impl CacheLayout {
    pub fn new(public_base: &str) -> Self {
        Self {
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn metadata_key(&self, id: &VideoId) -> String {
        format!("{}/{}.json", KEY_PREFIX, id.cache_key())
    }

    pub fn clip_key(&self, id: &VideoId, format: &str) -> String {
        format!("{}/{}.{}", KEY_PREFIX, id.cache_key(), format)
    }

    /// Images are addressed by the digest of their origin URL, not their
    /// bytes, so the same avatar referenced by many videos maps to one key.
    pub fn image_key(&self, source_url: &str) -> String {
        format!("{}/img/{}", KEY_PREFIX, url_digest(source_url))
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

/// Lowercase hex MD5 of the URL string.
pub fn url_digest(url: &str) -> String {
    format!("{:x}", Md5::digest(url.as_bytes()))
}
