//! Repository trait for resolved redirect cache entries.

use crate::domain::entities::{NewResolvedRedirect, ResolvedRedirect};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the resolved redirect cache.
///
/// Entries are unique by original URL; [`Self::insert`] replaces an existing
/// entry for the same URL.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgResolvedRedirectRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::InMemoryResolvedRedirectRepository`] - process memory
/// - [`crate::infrastructure::persistence::CachedResolvedRedirectRepository`] - Redis
///   read-through wrapper
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResolvedRedirectRepository: Send + Sync {
    /// Returns the resolved URL stored for `short_url`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn lookup(&self, short_url: &str) -> Result<Option<String>, AppError>;

    /// Returns the full entry stored for `short_url`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find(&self, short_url: &str) -> Result<Option<ResolvedRedirect>, AppError>;

    /// Inserts or replaces the entry for `entry.short_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, entry: NewResolvedRedirect) -> Result<ResolvedRedirect, AppError>;

    /// Lists entries, newest first.
    ///
    /// # Arguments
    ///
    /// - `offset` - Number of entries to skip
    /// - `limit` - Maximum number of entries to return
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ResolvedRedirect>, AppError>;

    /// Counts stored entries.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Deletes the entry for `short_url`.
    ///
    /// Returns `Ok(true)` if an entry was removed, `Ok(false)` if none existed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete(&self, short_url: &str) -> Result<bool, AppError>;

    /// Deletes every entry and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn clear(&self) -> Result<u64, AppError>;
}
