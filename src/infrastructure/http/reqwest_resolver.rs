//! reqwest-backed redirect resolver.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header, redirect::Policy};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::domain::redirect_resolver::{RedirectResolver, RemoteResponse};
use crate::domain::resolution::ResolveError;

/// Options used to build the HTTP client.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Redirect hops followed before local resolution fails.
    pub max_redirects: usize,
    pub user_agent: String,
    /// Remote resolution service; queried as `GET <endpoint>?url=<url>`.
    pub remote_endpoint: Option<Url>,
    /// Sent as a Bearer token to the remote service.
    pub remote_token: Option<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_redirects: 10,
            user_agent: concat!("redirect-resolver/", env!("CARGO_PKG_VERSION")).to_string(),
            remote_endpoint: None,
            remote_token: None,
        }
    }
}

/// Resolves redirects with a shared reqwest [`Client`].
///
/// Local resolution sends `HEAD` and lets reqwest follow redirects up to
/// [`ResolverSettings::max_redirects`]; servers that reject `HEAD` with 405 or
/// 501 are retried once with `GET`. The URL of the last response is the
/// resolved URL, whatever its status.
pub struct ReqwestRedirectResolver {
    client: Client,
    settings: ResolverSettings,
}

impl ReqwestRedirectResolver {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the TLS backend cannot be initialised.
    pub fn new(settings: ResolverSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(Policy::limited(settings.max_redirects))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self { client, settings })
    }

    /// Returns true if a remote resolution service is configured.
    pub fn has_remote(&self) -> bool {
        self.settings.remote_endpoint.is_some()
    }

    fn remote_request_url(&self, url: &str) -> Result<Url, ResolveError> {
        let mut endpoint = self
            .settings
            .remote_endpoint
            .clone()
            .ok_or_else(|| ResolveError::protocol("Remote resolver is not configured"))?;

        endpoint.query_pairs_mut().append_pair("url", url);
        Ok(endpoint)
    }
}

#[async_trait]
impl RedirectResolver for ReqwestRedirectResolver {
    async fn resolve_remote(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<RemoteResponse, ResolveError> {
        let endpoint = self.remote_request_url(url)?;

        let mut request = self
            .client
            .get(endpoint)
            .timeout(timeout)
            .header(header::ACCEPT, "application/json");

        if let Some(token) = &self.settings.remote_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ResolveError::io)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(ResolveError::io)?;

        debug!("Remote resolver answered {} ({} bytes)", status, body.len());

        Ok(RemoteResponse::new(status, body.to_vec()))
    }

    async fn resolve_local(&self, url: &str, timeout: Duration) -> Result<String, ResolveError> {
        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(ResolveError::io)?;

        if matches!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
        ) {
            debug!("HEAD rejected with {}, retrying with GET", response.status());

            let response = self
                .client
                .get(url)
                .timeout(timeout)
                .send()
                .await
                .map_err(ResolveError::io)?;

            return Ok(response.url().to_string());
        }

        Ok(response.url().to_string())
    }
}
