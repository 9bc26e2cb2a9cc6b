//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for persistence, caching, and outgoing HTTP.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`http`] - reqwest-backed redirect resolver
//! - [`persistence`] - Cache store implementations (PostgreSQL, in-memory, Redis-fronted)

pub mod cache;
pub mod http;
pub mod persistence;
