//! Parsing of short-link redirect destinations.

use crate::error::{MirrorError, Result};
use crate::model::VideoId;
use url::Url;

/// Hosts a short link may legitimately land on, derived from the origin URL.
///
/// `www.tiktok.com` also admits the bare `tiktok.com` and vice versa.
pub fn allowed_hosts(origin_url: &str) -> Vec<String> {
    let Some(host) = Url::parse(origin_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
    else {
        return Vec::new();
    };

    let sibling = match host.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => format!("www.{}", host),
    };
    vec![host, sibling]
}

/// Extract the video identity from a final redirect destination.
///
/// The destination must be on an allowed host and have the shape
/// `/@<owner>/video/<id>`. Returns `Ok(None)` when the shape matches but the
/// identity fails validation.
pub fn parse_video_page(dest: &Url, allowed_hosts: &[String]) -> Result<Option<VideoId>> {
    let host = dest.host_str().unwrap_or_default();
    if !allowed_hosts.iter().any(|h| h == host) {
        return Err(MirrorError::InvalidShortLink(format!(
            "not a valid tiktok URL in response: {}",
            dest
        )));
    }

    let parts: Vec<&str> = dest.path().trim_matches('/').split('/').collect();
    match parts.as_slice() {
        [owner, "video", video_id] => Ok(VideoId::parse(owner, video_id)),
        _ => Err(MirrorError::InvalidShortLink(format!(
            "invalid tiktok URL in response: {}",
            dest
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiktok_hosts() -> Vec<String> {
        allowed_hosts("https://www.tiktok.com")
    }

    #[test]
    fn allowed_hosts_include_sibling() {
        assert_eq!(tiktok_hosts(), vec!["www.tiktok.com", "tiktok.com"]);
        assert_eq!(
            allowed_hosts("https://tiktok.com"),
            vec!["tiktok.com", "www.tiktok.com"]
        );
        assert!(allowed_hosts("not a url").is_empty());
    }

    #[test]
    fn parses_canonical_video_page() {
        let dest = Url::parse("https://www.tiktok.com/@alice/video/123").unwrap();
        let id = parse_video_page(&dest, &tiktok_hosts()).unwrap().unwrap();
        assert_eq!(id.owner(), "alice");
        assert_eq!(id.video_id(), "123");
    }

    #[test]
    fn ignores_query_and_trailing_slash() {
        let dest =
            Url::parse("https://tiktok.com/@alice/video/123/?is_from_webapp=1&sender_device=pc")
                .unwrap();
        let id = parse_video_page(&dest, &tiktok_hosts()).unwrap().unwrap();
        assert_eq!(id.cache_key(), "alice/123");
    }

    #[test]
    fn rejects_unrelated_host() {
        let dest = Url::parse("https://evil.example/@alice/video/123").unwrap();
        assert!(matches!(
            parse_video_page(&dest, &tiktok_hosts()),
            Err(MirrorError::InvalidShortLink(_))
        ));
    }

    #[test]
    fn rejects_wrong_path_shape() {
        for path in ["/@alice", "/@alice/photo/123", "/@alice/video/123/extra", "/"] {
            let dest = Url::parse(&format!("https://www.tiktok.com{}", path)).unwrap();
            assert!(
                parse_video_page(&dest, &tiktok_hosts()).is_err(),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn invalid_identity_is_absent() {
        let dest = Url::parse("https://www.tiktok.com/@/video/123").unwrap();
        assert!(parse_video_page(&dest, &tiktok_hosts()).unwrap().is_none());
    }
}
