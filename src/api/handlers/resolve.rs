//! Handlers for redirect resolution endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::json;
use std::time::Duration;
use validator::Validate;

use crate::api::dto::resolve::{
    BatchResolveRequest, BatchResolveResponse, BatchSummary, ResolveOptions, ResolveQuery,
    ResolveResponse, ResolveResultItem,
};
use crate::domain::resolution::ResolveRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves a single URL.
///
/// # Endpoint
///
/// `GET /api/resolve?url=<url>&cache=<bool>&only_trackers=<bool>&remote=<bool>&timeout_ms=<n>`
///
/// Flags left out fall back to the configured defaults.
///
/// # Response
///
/// ```json
/// {
///   "url": "https://bit.ly/abc",
///   "type": "local",
///   "resolvedUrl": "https://example.com/article"
/// }
/// ```
///
/// `type` is one of `cache`, `remote`, `local`, `not_resolved`.
///
/// # Errors
///
/// - 400 if the URL is invalid or the remote resolver is requested but not configured
/// - 502 if the target or the remote resolver fails
pub async fn resolve_handler(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, AppError> {
    query.validate()?;

    let request = build_request(&state, query.url.clone(), &query.options())?;

    let outcome = state
        .redirect_follower
        .follow_redirects(&request, &state.tracker_rules)
        .await?;

    Ok(Json(ResolveResponse::new(request.url, outcome)))
}

/// Resolves a batch of URLs with shared options.
///
/// # Endpoint
///
/// `POST /api/resolve`
///
/// # Request Body
///
/// ```json
/// {
///   "urls": [{ "url": "https://bit.ly/abc" }, { "url": "https://t.co/xyz" }],
///   "options": { "cache": true, "only_trackers": false, "remote": false, "timeout_ms": 5000 }
/// }
/// ```
///
/// URLs are processed independently. A failed resolution is reported in its
/// item and does not affect the others.
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails (1 to 100 URLs).
pub async fn resolve_batch_handler(
    State(state): State<AppState>,
    Json(payload): Json<BatchResolveRequest>,
) -> Result<Json<BatchResolveResponse>, AppError> {
    payload.validate()?;

    let mut summary = BatchSummary {
        total: payload.urls.len(),
        ..BatchSummary::default()
    };
    let mut items = Vec::with_capacity(summary.total);

    for item in payload.urls {
        let request = build_request(&state, item.url, &payload.options)?;

        match state
            .redirect_follower
            .follow_redirects(&request, &state.tracker_rules)
            .await
        {
            Ok(outcome) => {
                summary.successful += 1;
                items.push(ResolveResultItem::Success(ResolveResponse::new(
                    request.url,
                    outcome,
                )));
            }
            Err(err) => {
                summary.failed += 1;
                items.push(ResolveResultItem::Error {
                    url: request.url,
                    error: AppError::from(err).into_info(),
                });
            }
        }
    }

    Ok(Json(BatchResolveResponse { summary, items }))
}

/// Applies configured defaults and checks that a requested remote is available.
fn build_request(
    state: &AppState,
    url: String,
    options: &ResolveOptions,
) -> Result<ResolveRequest, AppError> {
    let request = state.defaults.request(
        url,
        options.cache,
        options.only_trackers,
        options.remote,
        options.timeout_ms.map(Duration::from_millis),
    );

    if request.external_service && !state.remote_available {
        return Err(AppError::bad_request(
            "Remote resolver is not configured",
            json!({ "option": "remote" }),
        ));
    }

    Ok(request)
}
