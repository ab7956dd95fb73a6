use super::not_found;
use crate::{error::Result, model::VideoMeta, server::state::AppState};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub video: VideoMeta,
}

/// Resolve a video through the cache, populating it on a miss
pub async fn serve_video(
    Path((username, video_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Response> {
    info!("Serving video {}/{}", username, video_id);

    match state.resolver.resolve(&username, &video_id).await? {
        Some(video) => Ok((StatusCode::OK, Json(VideoResponse { video })).into_response()),
        None => Ok(not_found("video not found")),
    }
}
