//! Shared state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AuthService, RedirectFollower, ResolvedRedirectService};
use crate::domain::redirect_resolver::RedirectResolver;
use crate::domain::repositories::ResolvedRedirectRepository;
use crate::domain::resolution::ResolveDefaults;
use crate::domain::tracker_rules::TrackerRules;
use crate::infrastructure::cache::CacheService;

/// Resolution step wired to trait objects, as held by [`AppState`].
pub type DynRedirectFollower =
    RedirectFollower<dyn ResolvedRedirectRepository, dyn RedirectResolver>;

/// Cache administration wired to a trait object, as held by [`AppState`].
pub type DynResolvedRedirectService = ResolvedRedirectService<dyn ResolvedRedirectRepository>;

#[derive(Clone)]
pub struct AppState {
    pub redirect_follower: Arc<DynRedirectFollower>,
    pub resolved_redirect_service: Arc<DynResolvedRedirectService>,
    pub auth_service: Arc<AuthService>,
    pub tracker_rules: Arc<TrackerRules>,
    pub defaults: ResolveDefaults,
    /// Whether a remote resolution service is configured.
    pub remote_available: bool,
    pub cache: Arc<dyn CacheService>,
    /// `"postgres"` or `"memory"`, reported by the health check.
    pub store_backend: &'static str,
}
