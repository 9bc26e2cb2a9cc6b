//! Authentication service for API bearer tokens.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Checks bearer tokens against the configured `API_TOKEN`.
///
/// The configured token is never compared directly: both sides are run through
/// HMAC-SHA256 under a per-process key and the MACs are compared in constant
/// time. With no token configured, every request is accepted.
pub struct AuthService {
    key: [u8; 32],
    expected_mac: Option<Vec<u8>>,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `api_token` - required bearer token, or `None` to disable authentication
    pub fn new(api_token: Option<String>) -> Self {
        let key: [u8; 32] = rand::random();

        let expected_mac = api_token
            .filter(|t| !t.is_empty())
            .map(|t| Self::mac(&key, &t).finalize().into_bytes().to_vec());

        Self { key, expected_mac }
    }

    /// Returns true if requests must carry a bearer token.
    pub fn is_enabled(&self) -> bool {
        self.expected_mac.is_some()
    }

    fn mac(key: &[u8], token: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        mac
    }

    /// Authenticates a raw bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if authentication is enabled and the
    /// token does not match.
    pub fn authenticate(&self, token: Option<&str>) -> Result<(), AppError> {
        let Some(expected) = &self.expected_mac else {
            return Ok(());
        };

        let token = token.ok_or_else(|| {
            AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

        Self::mac(&self.key, token)
            .verify_slice(expected)
            .map_err(|_| {
                AppError::unauthorized("Unauthorized", json!({"reason": "Invalid token"}))
            })
    }
}
