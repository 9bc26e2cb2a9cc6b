//! Resolution request, outcome, and error types.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// Input of a single resolution attempt.
///
/// The URL is treated as an opaque string: it is used verbatim as the cache key
/// and passed unchanged to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub url: String,
    /// Read from and write back to the cache store.
    pub local_cache: bool,
    /// Only resolve URLs matched by the tracker rule set.
    pub only_known_trackers: bool,
    /// Ask the remote resolution service instead of following redirects locally.
    pub external_service: bool,
    pub timeout: Duration,
}

impl ResolveRequest {
    /// Creates a request with caching enabled, no tracker restriction, local resolution.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            local_cache: true,
            only_known_trackers: false,
            external_service: false,
            timeout,
        }
    }

    pub fn with_local_cache(mut self, enabled: bool) -> Self {
        self.local_cache = enabled;
        self
    }

    pub fn with_only_known_trackers(mut self, enabled: bool) -> Self {
        self.only_known_trackers = enabled;
        self
    }

    pub fn with_external_service(mut self, enabled: bool) -> Self {
        self.external_service = enabled;
        self
    }
}

/// Configured fallbacks for flags a caller leaves unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveDefaults {
    pub local_cache: bool,
    pub only_known_trackers: bool,
    pub external_service: bool,
    pub timeout: Duration,
}

impl Default for ResolveDefaults {
    fn default() -> Self {
        Self {
            local_cache: true,
            only_known_trackers: false,
            external_service: false,
            timeout: Duration::from_millis(15_000),
        }
    }
}

impl ResolveDefaults {
    /// Builds a request for `url`, overriding defaults with any explicit flags.
    pub fn request(
        &self,
        url: impl Into<String>,
        local_cache: Option<bool>,
        only_known_trackers: Option<bool>,
        external_service: Option<bool>,
        timeout: Option<Duration>,
    ) -> ResolveRequest {
        ResolveRequest::new(url, timeout.unwrap_or(self.timeout))
            .with_local_cache(local_cache.unwrap_or(self.local_cache))
            .with_only_known_trackers(only_known_trackers.unwrap_or(self.only_known_trackers))
            .with_external_service(external_service.unwrap_or(self.external_service))
    }
}

/// Where a resolution outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveKind {
    Cache,
    Remote,
    Local,
    NotResolved,
}

impl ResolveKind {
    /// Stable identifier used in API responses, logs, and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Remote => "remote",
            Self::Local => "local",
            Self::NotResolved => "not_resolved",
        }
    }
}

impl fmt::Display for ResolveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful resolution attempt, carrying the resulting URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowRedirect {
    /// Served from the cache store without network access.
    Cache(String),
    /// Resolved by the remote resolution service.
    Remote(String),
    /// Resolved by following redirects locally.
    Local(String),
    /// Not a known tracker; carries the original URL unchanged.
    NotResolved(String),
}

impl FollowRedirect {
    pub fn kind(&self) -> ResolveKind {
        match self {
            Self::Cache(_) => ResolveKind::Cache,
            Self::Remote(_) => ResolveKind::Remote,
            Self::Local(_) => ResolveKind::Local,
            Self::NotResolved(_) => ResolveKind::NotResolved,
        }
    }

    pub fn resolved_url(&self) -> &str {
        match self {
            Self::Cache(url) | Self::Remote(url) | Self::Local(url) | Self::NotResolved(url) => {
                url
            }
        }
    }

    pub fn into_resolved_url(self) -> String {
        match self {
            Self::Cache(url) | Self::Remote(url) | Self::Local(url) | Self::NotResolved(url) => {
                url
            }
        }
    }

    pub fn is_not_resolved(&self) -> bool {
        matches!(self, Self::NotResolved(_))
    }
}

/// Errors that fail a resolution attempt.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Transport failure from the HTTP layer (connect, timeout, TLS, redirect limit).
    #[error("I/O failure while resolving redirect: {0}")]
    Io(#[source] Box<dyn StdError + Send + Sync>),

    /// The remote service answered with something other than a usable resolution.
    #[error("{0}")]
    Protocol(String),
}

impl ResolveError {
    pub fn io<E>(source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::Io(source.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}
