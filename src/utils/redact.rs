//! URL redaction for log output.
//!
//! Shared links routinely carry personal data in their path or query. Logs
//! keep only scheme and host plus a keyed digest of the full URL, which is
//! enough to correlate log lines for the same link without revealing it.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Number of hex characters of the digest kept in redacted output.
const DIGEST_LEN: usize = 16;

/// Redacts URLs before they reach the logs.
#[derive(Clone)]
pub struct UrlRedactor {
    key: Option<Vec<u8>>,
}

impl UrlRedactor {
    /// Redacts with a fixed key, so digests are stable across restarts.
    pub fn with_key(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: Some(key.as_ref().to_vec()),
        }
    }

    /// Redacts with a key generated for this process.
    pub fn random() -> Self {
        let key: [u8; 32] = rand::rng().random();
        Self {
            key: Some(key.to_vec()),
        }
    }

    /// Passes URLs through unchanged.
    pub fn disabled() -> Self {
        Self { key: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Returns the loggable form of `url`.
    ///
    /// ```ignore
    /// let redactor = UrlRedactor::with_key("k");
    /// // "https://bit.ly/#3f1c...": scheme and host survive, the rest is a digest
    /// redactor.redact("https://bit.ly/abc?user=me");
    /// ```
    pub fn redact(&self, url: &str) -> String {
        let Some(key) = &self.key else {
            return url.to_string();
        };

        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
        mac.update(url.as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());
        let digest = &digest[..DIGEST_LEN];

        match Url::parse(url) {
            Ok(parsed) if parsed.host_str().is_some() => format!(
                "{}://{}/#{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or_default(),
                digest
            ),
            _ => format!("#{}", digest),
        }
    }
}

impl std::fmt::Debug for UrlRedactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlRedactor")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
