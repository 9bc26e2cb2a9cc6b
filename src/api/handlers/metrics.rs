//! Prometheus exposition of resolution counters.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Renders every recorded metric in the Prometheus text format.
///
/// # Endpoint
///
/// `GET /metrics`
///
/// Served only when `METRICS_ENABLED` is on.
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}
