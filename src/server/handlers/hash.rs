use super::not_found;
use crate::{error::Result, server::state::AppState};
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

/// Resolve a short-link code and redirect to the matching video endpoint
pub async fn resolve_hash(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    info!("Resolving short link {}", hash);

    match state.resolver.origin().resolve_short_link(&hash).await? {
        Some(id) => {
            let location = format!("/video/{}/{}", id.owner(), id.video_id());
            Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response())
        }
        None => Ok(not_found("could not find video by hash")),
    }
}
