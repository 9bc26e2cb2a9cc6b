//! Cache entry mapping an original URL to the URL it resolved to.

use chrono::{DateTime, Utc};

/// A persisted resolution result.
///
/// Unique by `short_url`: a store holds at most one entry per original URL and
/// a second insert for the same URL replaces the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRedirect {
    pub short_url: String,
    pub resolved_url: String,
    pub created_at: DateTime<Utc>,
}

impl ResolvedRedirect {
    /// Creates a new ResolvedRedirect instance.
    pub fn new(short_url: String, resolved_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            short_url,
            resolved_url,
            created_at,
        }
    }

    /// Returns true if resolving did not change the URL.
    pub fn is_identity(&self) -> bool {
        self.short_url == self.resolved_url
    }
}

/// Input data for writing a cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResolvedRedirect {
    pub short_url: String,
    pub resolved_url: String,
}

impl NewResolvedRedirect {
    pub fn new(short_url: impl Into<String>, resolved_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
            resolved_url: resolved_url.into(),
        }
    }
}
