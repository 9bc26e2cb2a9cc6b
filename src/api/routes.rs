//! API route configuration.
//!
//! All API endpoints pass through [`crate::api::middleware::auth`], which
//! enforces the bearer token when `API_TOKEN` is set.

use crate::api::handlers::{
    cache_clear_handler, cache_delete_handler, cache_list_handler, cache_lookup_handler,
    resolve_batch_handler, resolve_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes.
///
/// # Endpoints
///
/// - `GET    /resolve`       - Resolve one URL
/// - `POST   /resolve`       - Resolve a batch of URLs
/// - `GET    /cache`         - List resolved redirects (paginated)
/// - `DELETE /cache?url=`    - Remove one resolved redirect
/// - `GET    /cache/lookup`  - Fetch one resolved redirect
/// - `POST   /cache/clear`   - Remove all resolved redirects
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/resolve", get(resolve_handler).post(resolve_batch_handler))
        .route("/cache", get(cache_list_handler).delete(cache_delete_handler))
        .route("/cache/lookup", get(cache_lookup_handler))
        .route("/cache/clear", post(cache_clear_handler))
}
