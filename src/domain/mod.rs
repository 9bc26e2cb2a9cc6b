//! Domain layer containing resolution entities, rules, and collaborator traits.
//!
//! This module holds the pieces of redirect resolution that do not depend on a
//! concrete database, cache, or HTTP client.
//!
//! # Architecture
//!
//! - [`entities`] - Cache entry data structures
//! - [`repositories`] - Cache store trait definitions
//! - [`resolution`] - Resolution request, outcome, and error types
//! - [`redirect_resolver`] - HTTP client trait used to follow redirects
//! - [`tracker_rules`] - Known tracker / shortener rule set
//!
//! # Resolution Flow
//!
//! 1. Caller builds a [`resolution::ResolveRequest`]
//! 2. [`crate::application::services::RedirectFollower`] consults the cache store
//! 3. On a miss, [`tracker_rules::TrackerRules`] gates whether to resolve at all
//! 4. [`redirect_resolver::RedirectResolver`] performs the remote or local call
//! 5. Successful resolutions are written back via [`repositories::ResolvedRedirectRepository`]

pub mod entities;
pub mod redirect_resolver;
pub mod repositories;
pub mod resolution;
pub mod tracker_rules;
