pub mod handlers;
pub mod state;

use crate::config::Config;
use crate::error::Result;
use axum::{
    Router,
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use state::AppState;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Build the router around an existing state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics))
        .route(
            "/video/{username}/{videoid}",
            get(handlers::video::serve_video),
        )
        .route("/hash/{hash}", get(handlers::hash::resolve_hash))
        .layer(middleware::from_fn(version_header))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Connect to origin and store, then build the router
pub async fn build_router(config: Config) -> Result<Router> {
    let state = AppState::connect(config).await?;
    Ok(router(state))
}

/// Start the Axum HTTP server
pub async fn start(config: Config) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", config.port);

    let app = build_router(config).await?;

    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    info!("🚀 Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

async fn version_header(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response.headers_mut().insert(
        "x-mirror-version",
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    response
}
