//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "postgres, 120 entries" },
///     "cache": { "status": "ok", "message": "redis connected" },
///     "tracker_rules": { "status": "ok", "message": "14 rules" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store = check_store(&state).await;
    let cache = check_cache(&state).await;
    let tracker_rules = CheckStatus::ok(format!("{} rules", state.tracker_rules.len()));

    let all_healthy = store.is_ok() && cache.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            store,
            cache,
            tracker_rules,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks the cache store by counting its entries.
async fn check_store(state: &AppState) -> CheckStatus {
    match state.resolved_redirect_service.count().await {
        Ok(count) => CheckStatus::ok(format!("{}, {} entries", state.store_backend, count)),
        Err(e) => CheckStatus::error(format!("{} error: {}", state.store_backend, e)),
    }
}

/// Checks the Redis layer via PING.
async fn check_cache(state: &AppState) -> CheckStatus {
    let backend = state.cache.backend();

    if backend == "none" {
        return CheckStatus::ok("disabled");
    }

    if state.cache.health_check().await {
        CheckStatus::ok(format!("{} connected", backend))
    } else {
        CheckStatus::error(format!("{} connection failed", backend))
    }
}
