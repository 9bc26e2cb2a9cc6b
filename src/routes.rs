//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Health check: store, cache, tracker rules (public)
//! - `GET  /metrics`     - Prometheus counters (public, when enabled)
//! - `/api/*`            - REST API (Bearer token when `API_TOKEN` is set)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/api/*`
//! - **Authentication** - Optional bearer token
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, metrics_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
/// - `metrics` - recorder handle rendered at `/metrics`; the route is absent when `None`
pub fn app_router(
    state: AppState,
    behind_proxy: bool,
    metrics: Option<PrometheusHandle>,
) -> NormalizePath<Router> {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
    let api_router = rate_limit::apply(api_router, behind_proxy);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state);

    if let Some(handle) = metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics_handler))
                .with_state(handle),
        );
    }

    let router = router.layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
