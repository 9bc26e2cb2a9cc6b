#![allow(dead_code)]

use async_trait::async_trait;
use redirect_resolver::application::services::{
    AuthService, RedirectFollower, ResolvedRedirectService,
};
use redirect_resolver::domain::entities::NewResolvedRedirect;
use redirect_resolver::domain::redirect_resolver::{RedirectResolver, RemoteResponse};
use redirect_resolver::domain::repositories::ResolvedRedirectRepository;
use redirect_resolver::domain::resolution::{ResolveDefaults, ResolveError};
use redirect_resolver::domain::tracker_rules::TrackerRules;
use redirect_resolver::infrastructure::cache::NullCache;
use redirect_resolver::infrastructure::persistence::InMemoryResolvedRedirectRepository;
use redirect_resolver::state::AppState;
use redirect_resolver::utils::redact::UrlRedactor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Resolver double that answers without network access and counts calls.
///
/// - Local resolution maps `.../<seg>` to `https://destination.example/<seg>`,
///   and fails with an I/O error for URLs containing `unreachable`.
/// - Remote resolution answers `{"resolvedUrl": "https://remote.example/<seg>"}`,
///   or a body without `resolvedUrl` for URLs containing `malformed`.
#[derive(Default)]
pub struct StubResolver {
    pub local_calls: AtomicUsize,
    pub remote_calls: AtomicUsize,
}

impl StubResolver {
    pub fn local_calls(&self) -> usize {
        self.local_calls.load(Ordering::SeqCst)
    }

    pub fn remote_calls(&self) -> usize {
        self.remote_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.local_calls() + self.remote_calls()
    }
}

fn last_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or_default()
}

#[async_trait]
impl RedirectResolver for StubResolver {
    async fn resolve_remote(
        &self,
        url: &str,
        _timeout: Duration,
    ) -> Result<RemoteResponse, ResolveError> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);

        if url.contains("malformed") {
            return Ok(RemoteResponse::new(200, br#"{"unexpected": true}"#.to_vec()));
        }

        let body = serde_json::json!({
            "resolvedUrl": format!("https://remote.example/{}", last_segment(url))
        });
        Ok(RemoteResponse::new(200, body.to_string()))
    }

    async fn resolve_local(&self, url: &str, _timeout: Duration) -> Result<String, ResolveError> {
        self.local_calls.fetch_add(1, Ordering::SeqCst);

        if url.contains("unreachable") {
            return Err(ResolveError::io(std::io::Error::other("connection refused")));
        }

        Ok(format!("https://destination.example/{}", last_segment(url)))
    }
}

pub struct TestContext {
    pub state: AppState,
    pub resolver: Arc<StubResolver>,
    pub store: Arc<InMemoryResolvedRedirectRepository>,
}

/// In-memory state with the bundled tracker rules, a remote resolver
/// available, and authentication disabled.
pub fn create_test_state() -> TestContext {
    let store = Arc::new(InMemoryResolvedRedirectRepository::new());
    let resolver = Arc::new(StubResolver::default());

    let repository: Arc<dyn ResolvedRedirectRepository> = store.clone();
    let dyn_resolver: Arc<dyn RedirectResolver> = resolver.clone();

    let state = AppState {
        redirect_follower: Arc::new(RedirectFollower::new(
            repository.clone(),
            dyn_resolver,
            UrlRedactor::disabled(),
        )),
        resolved_redirect_service: Arc::new(ResolvedRedirectService::new(repository)),
        auth_service: Arc::new(AuthService::new(None)),
        tracker_rules: Arc::new(TrackerRules::bundled().unwrap()),
        defaults: ResolveDefaults::default(),
        remote_available: true,
        cache: Arc::new(NullCache::new()),
        store_backend: "memory",
    };

    TestContext {
        state,
        resolver,
        store,
    }
}

pub async fn seed_entry(store: &InMemoryResolvedRedirectRepository, url: &str, resolved: &str) {
    store
        .insert(NewResolvedRedirect::new(url, resolved))
        .await
        .unwrap();
}
