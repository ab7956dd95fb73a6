//! Video identity and the metadata record mirrored from the origin.
//!
//! Field names on the wire follow the origin's camelCase schema so cached
//! documents stay readable by existing consumers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The `(owner, video_id)` pair naming one video.
///
/// Both components are validated at construction, so every `VideoId` is safe
/// to splice into a store key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VideoId {
    owner: String,
    video_id: String,
}

impl VideoId {
    /// Validate and normalize an identity.
    ///
    /// A single leading `@` is stripped from the owner handle. Returns `None`
    /// for components that are empty, `.`/`..`, or contain a path separator.
    pub fn parse(owner: &str, video_id: &str) -> Option<Self> {
        let owner = owner.strip_prefix('@').unwrap_or(owner);
        if !is_safe_component(owner) || !is_safe_component(video_id) {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            video_id: video_id.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Lock and store namespace key: `owner/video_id`
    pub fn cache_key(&self) -> String {
        format!("{}/{}", self.owner, self.video_id)
    }

    /// Video page URL on the origin, sent as `Referer` on clip downloads.
    pub fn page_url(&self, origin_url: &str) -> String {
        format!(
            "{}/@{}/video/{}",
            origin_url.trim_end_matches('/'),
            self.owner,
            self.video_id
        )
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.video_id)
    }
}

fn is_safe_component(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\\'])
}

/// One video's metadata, as returned by the origin and later rewritten to
/// point at cached copies.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoMeta {
    pub id: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub create_time: i64,
    pub video: Video,
    pub author: Author,
    pub stats: Stats,
    /// Public URL of the cached clip; empty until the clip has been stored
    #[serde(rename = "cdnVideoURL")]
    pub cdn_video_url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Video {
    pub height: i64,
    pub width: i64,
    pub duration: i64,
    pub cover: String,
    pub origin_cover: String,
    pub dynamic_cover: String,
    pub play_addr: String,
    pub download_addr: String,
    pub format: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub unique_id: String,
    pub nickname: String,
    pub avatar_larger: String,
    pub avatar_medium: String,
    pub avatar_thumb: String,
    pub signature: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub digg_count: i64,
    pub share_count: i64,
    pub comment_count: i64,
    pub play_count: i64,
}

impl VideoMeta {
    /// A record whose clip has been cached is never re-downloaded.
    pub fn is_materialized(&self) -> bool {
        !self.cdn_video_url.is_empty()
    }

    /// Source address of the clip: download address, falling back to play address.
    pub fn clip_source(&self) -> Option<&str> {
        [&self.video.download_addr, &self.video.play_addr]
            .into_iter()
            .map(String::as_str)
            .find(|addr| !addr.is_empty())
    }

    /// Container format used for the clip key, `mp4` when the origin omits it.
    pub fn clip_format(&self) -> &str {
        if self.video.format.is_empty() {
            "mp4"
        } else {
            &self.video.format
        }
    }

    /// The six image URL fields, in the order they are cached.
    pub fn image_fields_mut(&mut self) -> [(&'static str, &mut String); 6] {
        [
            ("cover", &mut self.video.cover),
            ("originCover", &mut self.video.origin_cover),
            ("dynamicCover", &mut self.video.dynamic_cover),
            ("avatarLarger", &mut self.author.avatar_larger),
            ("avatarMedium", &mut self.author.avatar_medium),
            ("avatarThumb", &mut self.author.avatar_thumb),
        ]
    }
}

/// Envelope returned by the origin's share endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiEnvelope {
    pub status_code: i64,
    #[serde(rename = "statusMsg")]
    pub status_message: String,
    pub item_info: ItemInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemInfo {
    pub item_struct: Option<VideoMeta>,
}
