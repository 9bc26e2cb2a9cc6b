//! Repository trait definitions for the domain layer.
//!
//! The cache store is modelled as a repository so the resolution step can run
//! against PostgreSQL, an in-memory map, or a Redis-fronted combination without
//! knowing which.
//!
//! # Available Repositories
//!
//! - [`ResolvedRedirectRepository`] - Resolved redirect cache entries
//!
//! # Testing
//!
//! See integration tests in `tests/repository_resolved_redirect.rs`.

pub mod resolved_redirect_repository;

pub use resolved_redirect_repository::ResolvedRedirectRepository;

#[cfg(test)]
pub use resolved_redirect_repository::MockResolvedRedirectRepository;
