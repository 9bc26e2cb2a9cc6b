//! HTTP client contract used by the resolution step.

use crate::domain::resolution::ResolveError;
use async_trait::async_trait;
use std::time::Duration;

/// Raw reply of the remote resolution service.
///
/// Status and body are handed back untouched; interpreting them (status check,
/// JSON parsing) belongs to the resolution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RemoteResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Performs the network side of redirect resolution.
///
/// # Implementations
///
/// - [`crate::infrastructure::http::ReqwestRedirectResolver`] - reqwest-backed client
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedirectResolver: Send + Sync {
    /// Asks the remote resolution service to resolve `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Io`] if the request cannot be sent or the body
    /// cannot be read. Non-200 statuses are not errors at this level.
    async fn resolve_remote(&self, url: &str, timeout: Duration)
    -> Result<RemoteResponse, ResolveError>;

    /// Fetches `url` locally, following redirects, and returns the final URL reached.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Io`] on any transport failure, including timeouts
    /// and exceeding the redirect limit.
    async fn resolve_local(&self, url: &str, timeout: Duration) -> Result<String, ResolveError>;
}
