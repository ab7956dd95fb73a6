use std::env;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Backing object store selection
#[derive(Clone, Debug, PartialEq)]
pub enum StoreBackend {
    /// S3-compatible bucket, credentials taken from the standard AWS_* variables
    S3,
    /// Process-local store, contents are lost on restart (dev and tests)
    Memory,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Public base URL under which stored objects are served
    pub cache_url: String,
    /// Origin platform root, used for cookie priming, metadata and referers
    pub origin_url: String,
    /// Short-link host, `<short_link_url>/<code>` redirects to a video page
    pub short_link_url: String,
    pub is_dev: bool,
    pub store_backend: StoreBackend,
    /// Bucket name (required when store_backend = S3)
    pub bucket_name: Option<String>,
    /// Timeout applied to every outbound origin and store request
    pub http_timeout_secs: u64,
    /// Cookie names the origin landing page must set for startup to succeed
    pub required_cookies: Vec<String>,
    /// Skip re-uploading images whose key already exists in the store
    pub check_existing_assets: bool,
}

impl Config {
    /// Load configuration from environment variables
    /// In DEV mode, provides sensible defaults. In PROD mode, PORT and CACHE_URL are required.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let is_dev = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let port = if is_dev {
            env::var("PORT")
                .unwrap_or_else(|_| "8082".to_string())
                .parse()?
        } else {
            env::var("PORT")
                .map_err(|_| "PORT is required in production")?
                .parse()?
        };

        let cache_url = if is_dev {
            env::var("CACHE_URL").unwrap_or_else(|_| "http://localhost:9000/tiktok-mirror".to_string())
        } else {
            env::var("CACHE_URL").map_err(|_| "CACHE_URL is required in production")?
        };

        let origin_url =
            env::var("ORIGIN_URL").unwrap_or_else(|_| "https://www.tiktok.com".to_string());
        let short_link_url =
            env::var("SHORT_LINK_URL").unwrap_or_else(|_| "https://vm.tiktok.com".to_string());

        // Store backend: memory by default in dev, s3 otherwise
        let default_backend = if is_dev { "memory" } else { "s3" };
        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| default_backend.to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            _ => StoreBackend::S3,
        };

        let bucket_name = env::var("BUCKET_NAME").ok();
        if store_backend == StoreBackend::S3 && bucket_name.is_none() {
            return Err("BUCKET_NAME is required for the s3 store backend".into());
        }

        // Zero would make every outbound request fail immediately
        let http_timeout_secs: u64 = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let required_cookies = env::var("ORIGIN_REQUIRED_COOKIES")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let check_existing_assets = env::var("CHECK_EXISTING_ASSETS")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        Ok(Config {
            port,
            cache_url,
            origin_url,
            short_link_url,
            is_dev,
            store_backend,
            bucket_name,
            http_timeout_secs,
            required_cookies,
            check_existing_assets,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
