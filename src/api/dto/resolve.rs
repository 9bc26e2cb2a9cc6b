//! DTOs for the resolve endpoints.
//!
//! The single-URL response uses the same shape a remote resolver is expected
//! to return, so one instance of this service can act as another's remote.

use crate::domain::resolution::FollowRedirect;
use crate::error::ErrorInfo;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string of `GET /api/resolve`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveQuery {
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    pub cache: Option<bool>,
    pub only_trackers: Option<bool>,
    pub remote: Option<bool>,

    #[validate(range(min = 1, max = 120000))]
    pub timeout_ms: Option<u64>,
}

impl ResolveQuery {
    pub fn options(&self) -> ResolveOptions {
        ResolveOptions {
            cache: self.cache,
            only_trackers: self.only_trackers,
            remote: self.remote,
            timeout_ms: self.timeout_ms,
        }
    }
}

/// Per-request overrides of the configured defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct ResolveOptions {
    /// Read from and write to the cache store.
    pub cache: Option<bool>,
    /// Leave URLs that match no tracker rule unresolved.
    pub only_trackers: Option<bool>,
    /// Use the remote resolution service.
    pub remote: Option<bool>,

    #[validate(range(min = 1, max = 120000))]
    pub timeout_ms: Option<u64>,
}

/// Request to resolve one or more URLs with shared options.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchResolveRequest {
    #[validate(length(min = 1, max = 100), nested)]
    pub urls: Vec<UrlItem>,

    #[serde(default)]
    #[validate(nested)]
    pub options: ResolveOptions,
}

/// Individual URL to be resolved.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UrlItem {
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
}

/// Result of resolving a single URL.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "resolvedUrl")]
    pub resolved_url: String,
}

impl ResolveResponse {
    pub fn new(url: String, outcome: FollowRedirect) -> Self {
        Self {
            url,
            kind: outcome.kind().as_str(),
            resolved_url: outcome.into_resolved_url(),
        }
    }
}

/// Response containing batch processing results.
#[derive(Debug, Serialize)]
pub struct BatchResolveResponse {
    pub summary: BatchSummary,
    pub items: Vec<ResolveResultItem>,
}

/// Individual result for a URL in the batch.
///
/// Uses untagged enum for cleaner JSON structure (no discriminator field).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResolveResultItem {
    Success(ResolveResponse),
    Error { url: String, error: ErrorInfo },
}

/// Summary statistics for batch processing.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
