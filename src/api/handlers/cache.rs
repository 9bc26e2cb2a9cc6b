//! Handlers for cache administration endpoints.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::cache::{
    CacheEntryDto, CacheListResponse, CacheUrlQuery, ClearCacheResponse, PaginationParams,
};
use crate::error::AppError;
use crate::state::AppState;

/// Lists resolved redirects, newest first.
///
/// # Endpoint
///
/// `GET /api/cache?page=1&page_size=25`
///
/// # Response
///
/// ```json
/// {
///   "pagination": { "page": 1, "page_size": 25, "total_items": 2, "total_pages": 1 },
///   "items": [
///     { "url": "https://bit.ly/abc", "resolved_url": "https://example.com", "created_at": "..." }
///   ]
/// }
/// ```
pub async fn cache_list_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<CacheListResponse>, AppError> {
    let page = state
        .resolved_redirect_service
        .list(params.page, params.page_size)
        .await?;

    Ok(Json(CacheListResponse::from(page)))
}

/// Returns the cache entry for a URL.
///
/// # Endpoint
///
/// `GET /api/cache/lookup?url=<url>`
///
/// # Errors
///
/// Returns 404 if the URL has no cache entry.
pub async fn cache_lookup_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheUrlQuery>,
) -> Result<Json<CacheEntryDto>, AppError> {
    query.validate()?;

    let entry = state.resolved_redirect_service.get(&query.url).await?;

    Ok(Json(CacheEntryDto::from(entry)))
}

/// Removes the cache entry for a URL.
///
/// # Endpoint
///
/// `DELETE /api/cache?url=<url>`
///
/// Returns 204 No Content, or 404 if the URL has no cache entry.
pub async fn cache_delete_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheUrlQuery>,
) -> Result<StatusCode, AppError> {
    query.validate()?;

    state.resolved_redirect_service.delete(&query.url).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Removes every cache entry.
///
/// # Endpoint
///
/// `POST /api/cache/clear`
///
/// # Response
///
/// ```json
/// { "removed": 42 }
/// ```
pub async fn cache_clear_handler(
    State(state): State<AppState>,
) -> Result<Json<ClearCacheResponse>, AppError> {
    let removed = state.resolved_redirect_service.clear().await?;

    Ok(Json(ClearCacheResponse { removed }))
}
