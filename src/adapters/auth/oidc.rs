//! OIDC adapter for access-token validation.
//!
//! Implements `SessionValidator` against any OpenID Connect issuer that
//! publishes its signing keys as a JWKS document (the campus SSO in
//! production). A token is accepted when:
//!
//! 1. Its `kid` names a key in the issuer's JWKS
//! 2. The signature verifies with that key
//! 3. `iss`, `aud` and `exp` match the configuration
//!
//! The key set is fetched lazily and cached for `jwks_cache_ttl`.
//!
//! # Example
//!
//! ```ignore
//! let config = OidcConfig::new("https://sso.campus.edu", "campus-realtime");
//! let validator = OidcSessionValidator::new(config)?;
//! let user = validator.validate("eyJ...").await?;
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{
    decode, decode_header,
    jwk::{JwkSet, KeyAlgorithm},
    Algorithm, DecodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

const DEFAULT_JWKS_TTL: Duration = Duration::from_secs(3600);
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the OIDC adapter.
#[derive(Debug, Clone)]
pub struct OidcConfig {
    /// Issuer URL, used for JWKS discovery and `iss` validation.
    pub issuer_url: String,

    /// Expected `aud` claim.
    pub audience: String,

    pub jwks_cache_ttl: Duration,
}

impl OidcConfig {
    pub fn new(issuer_url: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer_url: issuer_url.into(),
            audience: audience.into(),
            jwks_cache_ttl: DEFAULT_JWKS_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_cache_ttl = ttl;
        self
    }

    fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.issuer_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CampusClaims {
    sub: String,
    iss: String,
    #[serde(default)]
    aud: Audience,
    exp: i64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
}

/// `aud` may be a single string or an array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
enum Audience {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::None => false,
            Audience::Single(s) => s == expected,
            Audience::Multiple(v) => v.iter().any(|s| s == expected),
        }
    }
}

struct CachedKeys {
    jwks: JwkSet,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedKeys {
    fn new(jwks: JwkSet, ttl: Duration) -> Self {
        Self {
            jwks,
            fetched_at: Instant::now(),
            ttl,
        }
    }

    fn is_stale(&self) -> bool {
        self.fetched_at.elapsed() > self.ttl
    }
}

/// Production `SessionValidator`.
pub struct OidcSessionValidator {
    config: OidcConfig,
    http_client: reqwest::Client,
    keys: Arc<RwLock<Option<CachedKeys>>>,
}

impl OidcSessionValidator {
    /// Builds the validator. Keys are fetched on first use, not here.
    pub fn new(config: OidcConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::service_unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            keys: Arc::new(RwLock::new(None)),
        })
    }

    /// Seeds the key cache, e.g. with a static key set.
    pub async fn with_jwks(self, jwks: JwkSet) -> Self {
        *self.keys.write().await = Some(CachedKeys::new(jwks, self.config.jwks_cache_ttl));
        self
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let url = self.config.jwks_url();
        tracing::debug!(%url, "fetching JWKS");

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            tracing::error!(error = %e, "JWKS request failed");
            AuthError::service_unavailable(format!("JWKS request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(%status, "JWKS endpoint returned an error");
            return Err(AuthError::service_unavailable(format!(
                "JWKS endpoint returned {}",
                status
            )));
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "JWKS body is not a key set");
            AuthError::service_unavailable(format!("Failed to parse JWKS: {}", e))
        })?;

        tracing::debug!(keys = jwks.keys.len(), "JWKS fetched");
        Ok(jwks)
    }

    async fn current_keys(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.keys.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| !c.is_stale()) {
                return Ok(cached.jwks.clone());
            }
        }

        let jwks = self.fetch_jwks().await?;
        *self.keys.write().await = Some(CachedKeys::new(jwks.clone(), self.config.jwks_cache_ttl));
        Ok(jwks)
    }

    fn decoding_key(header: &Header, jwks: &JwkSet) -> Result<(DecodingKey, Algorithm), AuthError> {
        let kid = header.kid.as_deref().ok_or_else(|| {
            tracing::warn!("token has no kid header");
            AuthError::InvalidToken
        })?;

        let jwk = jwks.find(kid).ok_or_else(|| {
            tracing::warn!(kid, "no JWKS key for kid");
            AuthError::InvalidToken
        })?;

        let algorithm = match jwk.common.key_algorithm {
            Some(KeyAlgorithm::RS256) | None => Algorithm::RS256,
            Some(KeyAlgorithm::RS384) => Algorithm::RS384,
            Some(KeyAlgorithm::RS512) => Algorithm::RS512,
            Some(KeyAlgorithm::ES256) => Algorithm::ES256,
            Some(KeyAlgorithm::ES384) => Algorithm::ES384,
            Some(KeyAlgorithm::HS256) => Algorithm::HS256,
            Some(other) => {
                tracing::warn!(algorithm = ?other, "unsupported signing algorithm");
                return Err(AuthError::InvalidToken);
            }
        };

        let key = DecodingKey::from_jwk(jwk).map_err(|e| {
            tracing::warn!(error = %e, "unusable JWKS key");
            AuthError::InvalidToken
        })?;

        Ok((key, algorithm))
    }

    fn decode_claims(
        &self,
        token: &str,
        key: &DecodingKey,
        algorithm: Algorithm,
    ) -> Result<CampusClaims, AuthError> {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.config.issuer_url]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<CampusClaims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => {
                        tracing::warn!(error = %e, "token rejected");
                        AuthError::InvalidToken
                    }
                }
            })
    }
}

#[async_trait]
impl SessionValidator for OidcSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
        let jwks = self.current_keys().await?;
        let (key, algorithm) = Self::decoding_key(&header, &jwks)?;
        let claims = self.decode_claims(token, &key, algorithm)?;

        if claims.iss != self.config.issuer_url || !claims.aud.contains(&self.config.audience) {
            return Err(AuthError::InvalidToken);
        }

        let user_id = UserId::new(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let display_name = claims.name.or(claims.preferred_username);
        let email = claims.email.unwrap_or_default();

        Ok(AuthenticatedUser::new(user_id, email, display_name))
    }
}

impl std::fmt::Debug for OidcSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcSessionValidator")
            .field("issuer_url", &self.config.issuer_url)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}
