use crate::{
    config::Config,
    error::Result,
    metrics,
    origin::{Origin, TikTokClient},
    resolver::VideoResolver,
    store::{BlobStore, ObjectStoreBlobs},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Fetch-or-populate pipeline, shared so its lock table is process-wide
    pub resolver: VideoResolver,
    pub metrics: PrometheusHandle,
    pub started_at: Instant,
}

impl AppState {
    /// Create state around explicit origin and store implementations
    pub fn new(config: Config, origin: Arc<dyn Origin>, store: Arc<dyn BlobStore>) -> Self {
        let resolver = VideoResolver::new(origin, store, &config);
        Self {
            config: Arc::new(config),
            resolver,
            metrics: metrics::init(),
            started_at: Instant::now(),
        }
    }

    /// Connect to the origin (priming cookies) and the configured store
    pub async fn connect(config: Config) -> Result<Self> {
        let store = ObjectStoreBlobs::from_config(&config)?;
        let origin = TikTokClient::connect(&config).await?;
        Ok(Self::new(config, Arc::new(origin), Arc::new(store)))
    }
}
