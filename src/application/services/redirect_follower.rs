//! Redirect resolution step.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::NewResolvedRedirect;
use crate::domain::redirect_resolver::{RedirectResolver, RemoteResponse};
use crate::domain::repositories::ResolvedRedirectRepository;
use crate::domain::resolution::{FollowRedirect, ResolveError, ResolveKind, ResolveRequest};
use crate::domain::tracker_rules::TrackerRules;
use crate::utils::redact::UrlRedactor;

/// Resolves URLs to their destination, consulting and filling the cache store.
///
/// # Resolution Order
///
/// 1. Cache store (when `local_cache` is set)
/// 2. Tracker gate (when `only_known_trackers` is set)
/// 3. Remote resolution service or local redirect following
/// 4. Cache write-back for `Remote` / `Local` outcomes
///
/// Cache store errors never fail a resolution: a failed lookup counts as a
/// miss and a failed write is logged.
pub struct RedirectFollower<R, H>
where
    R: ResolvedRedirectRepository + ?Sized,
    H: RedirectResolver + ?Sized,
{
    repository: Arc<R>,
    resolver: Arc<H>,
    redactor: UrlRedactor,
}

impl<R, H> RedirectFollower<R, H>
where
    R: ResolvedRedirectRepository + ?Sized,
    H: RedirectResolver + ?Sized,
{
    /// Creates a new redirect follower.
    ///
    /// # Arguments
    ///
    /// - `repository` - cache store for resolved redirects
    /// - `resolver` - HTTP client performing remote and local resolution
    /// - `redactor` - applied to every URL written to the logs
    pub fn new(repository: Arc<R>, resolver: Arc<H>, redactor: UrlRedactor) -> Self {
        Self {
            repository,
            resolver,
            redactor,
        }
    }

    /// Resolves `request.url`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Io`] if the HTTP layer fails and
    /// [`ResolveError::Protocol`] if the remote service answers with a non-200
    /// status or a body without a string `resolvedUrl`.
    pub async fn follow_redirects(
        &self,
        request: &ResolveRequest,
        rules: &TrackerRules,
    ) -> Result<FollowRedirect, ResolveError> {
        if request.local_cache {
            match self.repository.lookup(&request.url).await {
                Ok(Some(resolved)) => {
                    debug!(url = %self.redactor.redact(&request.url), "From local cache");
                    record_outcome(ResolveKind::Cache.as_str());
                    return Ok(FollowRedirect::Cache(resolved));
                }
                Ok(None) => {}
                Err(e) => warn!(
                    url = %self.redactor.redact(&request.url),
                    "Cache lookup failed, resolving anyway: {}", e
                ),
            }
        }

        let outcome = self.follow_redirects_impl(request, rules).await;
        record_outcome(match &outcome {
            Ok(resolved) => resolved.kind().as_str(),
            Err(_) => "error",
        });

        if request.local_cache
            && let Ok(resolved) = &outcome
            && !resolved.is_not_resolved()
        {
            let entry = NewResolvedRedirect::new(&request.url, resolved.resolved_url());
            if let Err(e) = self.repository.insert(entry).await {
                warn!(
                    url = %self.redactor.redact(&request.url),
                    "Failed to store resolved redirect: {}", e
                );
            }
        }

        outcome
    }

    async fn follow_redirects_impl(
        &self,
        request: &ResolveRequest,
        rules: &TrackerRules,
    ) -> Result<FollowRedirect, ResolveError> {
        let url = request.url.as_str();
        debug!(url = %self.redactor.redact(url), "Following redirects");

        if request.only_known_trackers && !rules.is_tracker(url) {
            debug!(url = %self.redactor.redact(url), "Not a known tracker, leaving as is");
            return Ok(FollowRedirect::NotResolved(url.to_string()));
        }

        if request.external_service {
            debug!(url = %self.redactor.redact(url), "Using external service");

            let response = self.resolver.resolve_remote(url, request.timeout).await?;
            return parse_remote_response(&response).map(FollowRedirect::Remote);
        }

        debug!(url = %self.redactor.redact(url), "Using local service");

        let resolved = self.resolver.resolve_local(url, request.timeout).await?;
        Ok(FollowRedirect::Local(resolved))
    }
}

/// Extracts `resolvedUrl` from a remote resolver reply.
fn parse_remote_response(response: &RemoteResponse) -> Result<String, ResolveError> {
    if !response.is_ok() {
        return Err(ResolveError::protocol(format!(
            "Something went wrong while resolving redirect (status {})",
            response.status
        )));
    }

    let body: Value = serde_json::from_slice(&response.body).map_err(|e| {
        ResolveError::protocol(format!("Something went wrong while reading response: {e}"))
    })?;

    // Only an object with a string `resolvedUrl` counts; arrays and scalars do not.
    body.as_object()
        .and_then(|reply| reply.get("resolvedUrl"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ResolveError::protocol(
                "Something went wrong while reading response: missing resolvedUrl",
            )
        })
}

fn record_outcome(label: &'static str) {
    metrics::counter!("redirect_resolutions_total", "type" => label).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::redirect_resolver::MockRedirectResolver;
    use crate::domain::repositories::MockResolvedRedirectRepository;
    use crate::error::AppError;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    const SHORT: &str = "https://bit.ly/abc";
    const TARGET: &str = "https://example.com/article";

    fn request() -> ResolveRequest {
        ResolveRequest::new(SHORT, Duration::from_secs(5))
    }

    fn follower(
        repo: MockResolvedRedirectRepository,
        resolver: MockRedirectResolver,
    ) -> RedirectFollower<MockResolvedRedirectRepository, MockRedirectResolver> {
        RedirectFollower::new(Arc::new(repo), Arc::new(resolver), UrlRedactor::disabled())
    }

    fn stored(short_url: &str, resolved_url: &str) -> crate::domain::entities::ResolvedRedirect {
        crate::domain::entities::ResolvedRedirect::new(
            short_url.to_string(),
            resolved_url.to_string(),
            chrono::Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_cache_hit_short_circuits_network() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup()
            .withf(|url| url == SHORT)
            .times(1)
            .returning(|_| Ok(Some(TARGET.to_string())));
        repo.expect_insert().times(0);

        let mut resolver = MockRedirectResolver::new();
        resolver.expect_resolve_remote().times(0);
        resolver.expect_resolve_local().times(0);

        let result = follower(repo, resolver)
            .follow_redirects(&request(), &TrackerRules::empty())
            .await
            .unwrap();

        assert_eq!(result, FollowRedirect::Cache(TARGET.to_string()));
    }

    #[tokio::test]
    async fn test_cache_disabled_skips_lookup_and_write() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().times(0);
        repo.expect_insert().times(0);

        let mut resolver = MockRedirectResolver::new();
        resolver
            .expect_resolve_local()
            .times(1)
            .returning(|_, _| Ok(TARGET.to_string()));

        let result = follower(repo, resolver)
            .follow_redirects(&request().with_local_cache(false), &TrackerRules::empty())
            .await
            .unwrap();

        assert_eq!(result, FollowRedirect::Local(TARGET.to_string()));
    }

    #[tokio::test]
    async fn test_tracker_gate_returns_not_resolved_without_network() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().times(1).returning(|_| Ok(None));
        repo.expect_insert().times(0);

        let mut resolver = MockRedirectResolver::new();
        resolver.expect_resolve_remote().times(0);
        resolver.expect_resolve_local().times(0);

        let rules = TrackerRules::from_json(&json!({ "tracker": ["t.co"] })).unwrap();

        let result = follower(repo, resolver)
            .follow_redirects(&request().with_only_known_trackers(true), &rules)
            .await
            .unwrap();

        assert_eq!(result, FollowRedirect::NotResolved(SHORT.to_string()));
    }

    #[tokio::test]
    async fn test_tracker_gate_lets_known_tracker_through() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().times(1).returning(|_| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|e| Ok(stored(&e.short_url, &e.resolved_url)));

        let mut resolver = MockRedirectResolver::new();
        resolver
            .expect_resolve_local()
            .times(1)
            .returning(|_, _| Ok(TARGET.to_string()));

        let rules = TrackerRules::from_json(&json!({ "tracker": ["bit.ly"] })).unwrap();

        let result = follower(repo, resolver)
            .follow_redirects(&request().with_only_known_trackers(true), &rules)
            .await
            .unwrap();

        assert_eq!(result, FollowRedirect::Local(TARGET.to_string()));
    }

    #[tokio::test]
    async fn test_remote_success() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().returning(|_| Ok(None));
        repo.expect_insert()
            .withf(|e| e.short_url == SHORT && e.resolved_url == "https://x")
            .times(1)
            .returning(|e| Ok(stored(&e.short_url, &e.resolved_url)));

        let mut resolver = MockRedirectResolver::new();
        resolver
            .expect_resolve_remote()
            .withf(|url, timeout| url == SHORT && *timeout == Duration::from_secs(5))
            .times(1)
            .returning(|_, _| Ok(RemoteResponse::new(200, r#"{"resolvedUrl":"https://x"}"#)));
        resolver.expect_resolve_local().times(0);

        let result = follower(repo, resolver)
            .follow_redirects(&request().with_external_service(true), &TrackerRules::empty())
            .await
            .unwrap();

        assert_eq!(result, FollowRedirect::Remote("https://x".to_string()));
    }

    #[tokio::test]
    async fn test_remote_missing_field_fails() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().returning(|_| Ok(None));
        repo.expect_insert().times(0);

        let mut resolver = MockRedirectResolver::new();
        resolver
            .expect_resolve_remote()
            .times(1)
            .returning(|_, _| Ok(RemoteResponse::new(200, r#"{"url":"https://x"}"#)));

        let result = follower(repo, resolver)
            .follow_redirects(&request().with_external_service(true), &TrackerRules::empty())
            .await;

        assert!(matches!(result, Err(ResolveError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_remote_non_200_fails() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().returning(|_| Ok(None));
        repo.expect_insert().times(0);

        let mut resolver = MockRedirectResolver::new();
        resolver
            .expect_resolve_remote()
            .times(1)
            .returning(|_, _| Ok(RemoteResponse::new(500, r#"{"resolvedUrl":"https://x"}"#)));

        let result = follower(repo, resolver)
            .follow_redirects(&request().with_external_service(true), &TrackerRules::empty())
            .await;

        assert!(matches!(result, Err(ResolveError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_remote_io_error_fails() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().returning(|_| Ok(None));
        repo.expect_insert().times(0);

        let mut resolver = MockRedirectResolver::new();
        resolver.expect_resolve_remote().times(1).returning(|_, _| {
            Err(ResolveError::io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        });

        let result = follower(repo, resolver)
            .follow_redirects(&request().with_external_service(true), &TrackerRules::empty())
            .await;

        assert!(matches!(result, Err(ResolveError::Io(_))));
    }

    #[tokio::test]
    async fn test_local_success_persists_exactly_one_entry() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().times(1).returning(|_| Ok(None));
        repo.expect_insert()
            .withf(|e| e.short_url == SHORT && e.resolved_url == TARGET)
            .times(1)
            .returning(|e| Ok(stored(&e.short_url, &e.resolved_url)));

        let mut resolver = MockRedirectResolver::new();
        resolver
            .expect_resolve_local()
            .withf(|url, _| url == SHORT)
            .times(1)
            .returning(|_, _| Ok(TARGET.to_string()));
        resolver.expect_resolve_remote().times(0);

        let result = follower(repo, resolver)
            .follow_redirects(&request(), &TrackerRules::empty())
            .await
            .unwrap();

        assert_eq!(result, FollowRedirect::Local(TARGET.to_string()));
    }

    #[tokio::test]
    async fn test_local_io_error_fails_without_write() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().returning(|_| Ok(None));
        repo.expect_insert().times(0);

        let mut resolver = MockRedirectResolver::new();
        resolver.expect_resolve_local().times(1).returning(|_, _| {
            Err(ResolveError::io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "timed out",
            )))
        });

        let result = follower(repo, resolver)
            .follow_redirects(&request(), &TrackerRules::empty())
            .await;

        assert!(matches!(result, Err(ResolveError::Io(_))));
    }

    #[tokio::test]
    async fn test_cache_lookup_error_is_treated_as_miss() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        repo.expect_insert()
            .times(1)
            .returning(|e| Ok(stored(&e.short_url, &e.resolved_url)));

        let mut resolver = MockRedirectResolver::new();
        resolver
            .expect_resolve_local()
            .times(1)
            .returning(|_, _| Ok(TARGET.to_string()));

        let result = follower(repo, resolver)
            .follow_redirects(&request(), &TrackerRules::empty())
            .await
            .unwrap();

        assert_eq!(result, FollowRedirect::Local(TARGET.to_string()));
    }

    #[tokio::test]
    async fn test_cache_write_error_keeps_outcome() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().returning(|_| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let mut resolver = MockRedirectResolver::new();
        resolver
            .expect_resolve_local()
            .returning(|_, _| Ok(TARGET.to_string()));

        let result = follower(repo, resolver)
            .follow_redirects(&request(), &TrackerRules::empty())
            .await
            .unwrap();

        assert_eq!(result, FollowRedirect::Local(TARGET.to_string()));
    }

    fn resolution_counts(recorder: &DebuggingRecorder) -> HashMap<String, u64> {
        recorder
            .snapshotter()
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, ..)| key.key().name() == "redirect_resolutions_total")
            .filter_map(|(key, _, _, value)| {
                let label = key.key().labels().find(|l| l.key() == "type")?;
                match value {
                    DebugValue::Counter(n) => Some((label.value().to_string(), n)),
                    _ => None,
                }
            })
            .collect()
    }

    #[test]
    fn test_outcomes_are_counted_by_type() {
        let recorder = DebuggingRecorder::new();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let mut repo = MockResolvedRedirectRepository::new();
                repo.expect_lookup().returning(|_| Ok(Some(TARGET.to_string())));
                follower(repo, MockRedirectResolver::new())
                    .follow_redirects(&request(), &TrackerRules::empty())
                    .await
                    .unwrap();

                let mut repo = MockResolvedRedirectRepository::new();
                repo.expect_lookup().returning(|_| Ok(None));
                follower(repo, MockRedirectResolver::new())
                    .follow_redirects(
                        &request().with_only_known_trackers(true),
                        &TrackerRules::empty(),
                    )
                    .await
                    .unwrap();

                let mut repo = MockResolvedRedirectRepository::new();
                repo.expect_lookup().returning(|_| Ok(None));
                let mut resolver = MockRedirectResolver::new();
                resolver
                    .expect_resolve_local()
                    .returning(|_, _| Err(ResolveError::protocol("bad gateway")));
                follower(repo, resolver)
                    .follow_redirects(&request(), &TrackerRules::empty())
                    .await
                    .unwrap_err();
            })
        });

        let counts = resolution_counts(&recorder);
        assert_eq!(counts.get("cache"), Some(&1));
        assert_eq!(counts.get("not_resolved"), Some(&1));
        assert_eq!(counts.get("error"), Some(&1));
        assert_eq!(counts.get("local"), None);
    }

    #[test]
    fn test_parse_remote_response_rejects_non_string_field() {
        let response = RemoteResponse::new(200, r#"{"resolvedUrl":42}"#);
        assert!(matches!(
            parse_remote_response(&response),
            Err(ResolveError::Protocol(_))
        ));
    }

    #[test]
    fn test_parse_remote_response_rejects_non_object_body() {
        for body in [r#"["https://evil.example"]"#, r#""https://evil.example""#, "null"] {
            let response = RemoteResponse::new(200, body);
            assert!(
                matches!(parse_remote_response(&response), Err(ResolveError::Protocol(_))),
                "body {body} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_remote_array_body_is_not_cached() {
        let mut repo = MockResolvedRedirectRepository::new();
        repo.expect_lookup().returning(|_| Ok(None));
        repo.expect_insert().times(0);

        let mut resolver = MockRedirectResolver::new();
        resolver
            .expect_resolve_remote()
            .times(1)
            .returning(|_, _| Ok(RemoteResponse::new(200, r#"["https://evil.example"]"#)));

        let result = follower(repo, resolver)
            .follow_redirects(&request().with_external_service(true), &TrackerRules::empty())
            .await;

        assert!(matches!(result, Err(ResolveError::Protocol(_))));
    }

    #[test]
    fn test_parse_remote_response_rejects_invalid_json() {
        let response = RemoteResponse::new(200, "<html>oops</html>");
        assert!(matches!(
            parse_remote_response(&response),
            Err(ResolveError::Protocol(_))
        ));
    }

    #[test]
    fn test_parse_remote_response_ignores_extra_fields() {
        let response = RemoteResponse::new(
            200,
            r#"{"url":"https://bit.ly/a","type":"local","resolvedUrl":"https://x"}"#,
        );
        assert_eq!(parse_remote_response(&response).unwrap(), "https://x");
    }
}
