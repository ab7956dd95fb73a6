//! Test doubles shared by the integration suites.
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tiktok_mirror::config::{Config, StoreBackend};
use tiktok_mirror::error::{MirrorError, Result};
use tiktok_mirror::model::{VideoId, VideoMeta};
use tiktok_mirror::origin::{MediaPayload, Origin};
use tiktok_mirror::store::{BlobStore, ObjectStoreBlobs};
use tokio::sync::{Notify, Semaphore};

pub const CACHE_URL: &str = "https://cdn.example.com";

pub fn test_config() -> Config {
    Config {
        port: 0,
        cache_url: CACHE_URL.to_string(),
        origin_url: "https://www.tiktok.com".to_string(),
        short_link_url: "https://vm.tiktok.com".to_string(),
        is_dev: true,
        store_backend: StoreBackend::Memory,
        bucket_name: None,
        http_timeout_secs: 5,
        required_cookies: Vec::new(),
        check_existing_assets: false,
    }
}

/// Origin record with a play address only and all six image fields set.
pub fn sample_meta() -> VideoMeta {
    let mut meta = VideoMeta {
        id: "123".to_string(),
        description: "dance #fyp".to_string(),
        create_time: 1_645_000_000,
        ..Default::default()
    };
    meta.video.width = 576;
    meta.video.height = 1024;
    meta.video.duration = 15;
    meta.video.download_addr = String::new();
    meta.video.play_addr = "https://cdn.example/clip.mp4".to_string();
    meta.video.format = "mp4".to_string();
    meta.video.cover = "https://p16.example/img/cover.jpeg".to_string();
    meta.video.origin_cover = "https://p16.example/img/origin_cover.jpeg".to_string();
    meta.video.dynamic_cover = "https://p16.example/img/dynamic_cover.webp".to_string();
    meta.author.unique_id = "alice".to_string();
    meta.author.nickname = "Alice".to_string();
    meta.author.avatar_larger = "https://p16.example/img/avatar_larger.jpeg".to_string();
    meta.author.avatar_medium = "https://p16.example/img/avatar_medium.jpeg".to_string();
    meta.author.avatar_thumb = "https://p16.example/img/avatar_thumb.jpeg".to_string();
    meta.stats.digg_count = 42;
    meta.stats.play_count = 1_000;
    meta
}

/// Scriptable origin with call counters and an optional gate on metadata fetches.
pub struct FakeOrigin {
    record: Mutex<Option<VideoMeta>>,
    metadata_error: AtomicBool,
    fail_media_url: Mutex<Option<String>>,
    short_links: Mutex<HashMap<String, VideoId>>,
    gate: Option<Semaphore>,
    /// Signalled when a metadata fetch starts
    pub entered: Notify,
    pub metadata_calls: AtomicUsize,
    pub media_fetches: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeOrigin {
    pub fn new(record: Option<VideoMeta>) -> Self {
        Self {
            record: Mutex::new(record),
            metadata_error: AtomicBool::new(false),
            fail_media_url: Mutex::new(None),
            short_links: Mutex::new(HashMap::new()),
            gate: None,
            entered: Notify::new(),
            metadata_calls: AtomicUsize::new(0),
            media_fetches: Mutex::new(Vec::new()),
        }
    }

    /// Metadata fetches block until [`open_gate`](Self::open_gate) is called.
    pub fn gated(record: Option<VideoMeta>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(record)
        }
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn fail_metadata(&self) {
        self.metadata_error.store(true, Ordering::SeqCst);
    }

    pub fn clear_metadata_failure(&self) {
        self.metadata_error.store(false, Ordering::SeqCst);
    }

    pub fn fail_media(&self, url: &str) {
        *self.fail_media_url.lock().unwrap() = Some(url.to_string());
    }

    pub fn add_short_link(&self, code: &str, owner: &str, video_id: &str) {
        self.short_links
            .lock()
            .unwrap()
            .insert(code.to_string(), VideoId::parse(owner, video_id).unwrap());
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn media_urls(&self) -> Vec<String> {
        self.media_fetches
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }
}

#[async_trait]
impl Origin for FakeOrigin {
    async fn fetch_metadata(&self, _id: &VideoId) -> Result<Option<VideoMeta>> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| MirrorError::Internal(e.to_string()))?
                .forget();
        }
        if self.metadata_error.load(Ordering::SeqCst) {
            return Err(MirrorError::OriginStatus {
                code: 10000,
                message: "captcha required".to_string(),
            });
        }
        Ok(self.record.lock().unwrap().clone())
    }

    async fn fetch_media(&self, url: &str, referer: Option<&VideoId>) -> Result<MediaPayload> {
        self.media_fetches
            .lock()
            .unwrap()
            .push((url.to_string(), referer.map(VideoId::cache_key)));

        if self.fail_media_url.lock().unwrap().as_deref() == Some(url) {
            return Err(MirrorError::Internal(format!("simulated failure for {}", url)));
        }

        let content_type = if url.ends_with(".mp4") {
            "video/mp4"
        } else {
            "image/jpeg"
        };
        Ok(MediaPayload {
            body: Bytes::from(format!("bytes of {}", url)),
            content_type: content_type.to_string(),
        })
    }

    async fn resolve_short_link(&self, code: &str) -> Result<Option<VideoId>> {
        Ok(self.short_links.lock().unwrap().get(code).cloned())
    }
}

/// In-memory store that records every operation and can inject faults.
#[derive(Default)]
pub struct RecordingStore {
    inner: InnerStore,
    pub puts: Mutex<Vec<(String, String)>>,
    pub exists_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub fail_exists: AtomicBool,
    pub fail_metadata_put: AtomicBool,
}

struct InnerStore(ObjectStoreBlobs);

impl Default for InnerStore {
    fn default() -> Self {
        Self(ObjectStoreBlobs::in_memory())
    }
}

impl RecordingStore {
    pub fn put_keys(&self) -> Vec<String> {
        self.puts.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn operation_count(&self) -> usize {
        self.puts.lock().unwrap().len()
            + self.exists_calls.load(Ordering::SeqCst)
            + self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for RecordingStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(MirrorError::Internal("HEAD timed out".to_string()));
        }
        self.inner.0.exists(key).await
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.0.get(key).await
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string()));
        if key.ends_with(".json") && self.fail_metadata_put.load(Ordering::SeqCst) {
            return Err(MirrorError::Internal("PUT rejected".to_string()));
        }
        self.inner.0.put(key, body, content_type).await
    }
}
