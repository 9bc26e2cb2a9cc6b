//! Bearer token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{error::AppError, state::AppState};

/// Authenticates requests using Bearer tokens from Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// When no `API_TOKEN` is configured every request passes through.
///
/// # Errors
///
/// Returns `401 Unauthorized` with `WWW-Authenticate: Bearer` if the header is
/// missing, malformed, or carries the wrong token.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/api/cache", get(cache_list_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !st.auth_service.is_enabled() {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();

    let token = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|AuthBearer(token)| token);

    st.auth_service.authenticate(token.as_deref())?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}
