//! Prometheus metrics.
//!
//! The recorder is installed once per process; later calls to [`init`] hand
//! back the same handle so routers built in tests can share it.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::warn;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder (idempotent).
pub fn init() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                warn!("A global metrics recorder is already installed");
            }
            handle
        })
        .clone()
}

/// Metadata cache lookup outcome: `hit` or `miss`.
pub fn record_cache(result: &'static str) {
    metrics::counter!("mirror_cache_total", "result" => result).increment(1);
}

/// Outbound origin request by kind: `metadata`, `media` or `short_link`.
pub fn record_origin_request(kind: &'static str) {
    metrics::counter!("mirror_origin_requests_total", "kind" => kind).increment(1);
}

/// Object uploaded by kind: `clip`, `image` or `metadata`.
pub fn record_upload(kind: &'static str) {
    metrics::counter!("mirror_uploads_total", "kind" => kind).increment(1);
}

pub fn record_resolve_duration(start: Instant) {
    metrics::histogram!("mirror_resolve_duration_seconds").record(start.elapsed().as_secs_f64());
}
