use super::{DEFAULT_CONTENT_TYPE, MediaPayload, Origin, short_link};
use crate::config::Config;
use crate::error::{MirrorError, Result};
use crate::metrics;
use crate::model::{ApiEnvelope, VideoId, VideoMeta};
use async_trait::async_trait;
use reqwest::header::{
    ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, REFERER, SET_COOKIE, USER_AGENT,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:97.0) Gecko/20100101 Firefox/97.0";

/// HTTP client for the TikTok web origin.
///
/// Holds the session cookies captured from the landing page at construction;
/// they are attached to every metadata and media request afterwards.
#[derive(Clone, Debug)]
pub struct TikTokClient {
    http: Client,
    origin_url: String,
    short_link_url: String,
    allowed_hosts: Vec<String>,
    cookie_header: HeaderValue,
}

impl TikTokClient {
    /// Build the client and prime the cookie jar.
    ///
    /// # Errors
    /// Fails when the landing page does not answer 200, sets no cookies, or
    /// omits one of `config.required_cookies`. Without these cookies every
    /// later request would be rejected, so this is fatal at startup.
    pub async fn connect(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout())
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        let origin_url = config.origin_url.trim_end_matches('/').to_string();
        let cookies = prime_cookies(&http, &origin_url, &config.required_cookies).await?;

        let cookie_header = cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        let cookie_header = HeaderValue::from_str(&cookie_header)
            .map_err(|e| MirrorError::CookiePriming(format!("unusable cookie value: {}", e)))?;

        Ok(Self {
            http,
            allowed_hosts: short_link::allowed_hosts(&origin_url),
            origin_url,
            short_link_url: config.short_link_url.trim_end_matches('/').to_string(),
            cookie_header,
        })
    }

    fn with_cookies(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(COOKIE, self.cookie_header.clone())
    }
}

/// GET the origin landing page and collect every `Set-Cookie` name/value.
async fn prime_cookies(
    http: &Client,
    origin_url: &str,
    required: &[String],
) -> Result<BTreeMap<String, String>> {
    let response = http.get(format!("{}/", origin_url)).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        warn!("Cookie priming body: {}", body);
        return Err(MirrorError::CookiePriming(format!(
            "status code = {}",
            status.as_u16()
        )));
    }

    let mut cookies = BTreeMap::new();
    for value in response.headers().get_all(SET_COOKIE) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        let pair = value.split(';').next().unwrap_or_default();
        if let Some((name, value)) = pair.split_once('=') {
            let name = name.trim();
            if !name.is_empty() {
                info!("Found cookie {}", name);
                cookies.insert(name.to_string(), value.trim().to_string());
            }
        }
    }

    if cookies.is_empty() {
        return Err(MirrorError::CookiePriming(
            "landing page did not set any cookies".to_string(),
        ));
    }
    if let Some(missing) = required.iter().find(|name| !cookies.contains_key(*name)) {
        return Err(MirrorError::CookiePriming(format!(
            "expected cookie {} was not set",
            missing
        )));
    }

    Ok(cookies)
}

#[async_trait]
impl Origin for TikTokClient {
    async fn fetch_metadata(&self, id: &VideoId) -> Result<Option<VideoMeta>> {
        let url = format!(
            "{}/node/share/video/@{}/{}",
            self.origin_url,
            id.owner(),
            id.video_id()
        );
        metrics::record_origin_request("metadata");

        let response = self.with_cookies(self.http.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: ApiEnvelope = response.error_for_status()?.json().await?;

        match envelope.status_code {
            0 => {
                if envelope.item_info.item_struct.is_none() {
                    warn!("Origin returned success without item for {}", id);
                }
                Ok(envelope.item_info.item_struct)
            }
            404 => Ok(None),
            code => Err(MirrorError::OriginStatus {
                code,
                message: envelope.status_message,
            }),
        }
    }

    async fn fetch_media(&self, url: &str, referer: Option<&VideoId>) -> Result<MediaPayload> {
        metrics::record_origin_request("media");

        let mut request = self.with_cookies(self.http.get(url));
        if let Some(id) = referer {
            request = request.header(REFERER, id.page_url(&self.origin_url));
        }

        let response = request.send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let body = response.bytes().await?;
        debug!("Fetched {} bytes ({}) from {}", body.len(), content_type, url);

        Ok(MediaPayload { body, content_type })
    }

    async fn resolve_short_link(&self, code: &str) -> Result<Option<VideoId>> {
        metrics::record_origin_request("short_link");

        // reqwest follows redirects; the final URL is the video page
        let response = self
            .http
            .head(format!("{}/{}", self.short_link_url, code))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        short_link::parse_video_page(response.url(), &self.allowed_hosts)
    }
}
