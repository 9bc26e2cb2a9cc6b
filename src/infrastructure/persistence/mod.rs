//! Resolved redirect store implementations.
//!
//! # Repositories
//!
//! - [`PgResolvedRedirectRepository`] - PostgreSQL table `resolved_redirects`
//! - [`InMemoryResolvedRedirectRepository`] - Process-local map, used without a database
//! - [`CachedResolvedRedirectRepository`] - Read-through wrapper over
//!   [`crate::infrastructure::cache::CacheService`]

pub mod cached_resolved_redirect_repository;
pub mod memory_resolved_redirect_repository;
pub mod pg_resolved_redirect_repository;

pub use cached_resolved_redirect_repository::CachedResolvedRedirectRepository;
pub use memory_resolved_redirect_repository::InMemoryResolvedRedirectRepository;
pub use pg_resolved_redirect_repository::PgResolvedRedirectRepository;
