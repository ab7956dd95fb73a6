use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the mirror pipeline and its HTTP front door.
///
/// "Video not found" is deliberately absent: lookups that find nothing
/// return `Ok(None)` so callers can map them to a 404 without inspecting
/// error variants.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Origin answered with a non-success status envelope other than 404
    #[error("tiktok api response code {code}: {message}")]
    OriginStatus { code: i64, message: String },

    /// Transport failure, timeout or non-2xx HTTP status from the origin
    #[error("origin fetch failed: {0}")]
    OriginFetch(#[from] reqwest::Error),

    /// Initial cookie priming against the origin landing page failed
    #[error("could not get cookies from tiktok: {0}")]
    CookiePriming(String),

    /// Object store fault on get/put (existence checks fail open instead)
    #[error("object store error: {0}")]
    Store(#[from] object_store::Error),

    /// A cached or origin JSON document could not be decoded
    #[error("failed to decode metadata: {0}")]
    Decode(#[from] serde_json::Error),

    /// Origin metadata violates the record's presence rules
    #[error("invalid video metadata: {0}")]
    InvalidMetadata(String),

    /// Short link redirected somewhere that is not a TikTok video page
    #[error("invalid short link destination: {0}")]
    InvalidShortLink(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, MirrorError>;

impl IntoResponse for MirrorError {
    fn into_response(self) -> Response {
        error!("error in response: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
