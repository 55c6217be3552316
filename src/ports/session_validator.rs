//! Session validation port for connection credentials.
//!
//! A client presents a bearer token when it opens a real-time connection
//! (query parameter or `Authorization` header). This port turns that token
//! into a principal. It is provider-agnostic: production uses any OIDC issuer
//! that publishes a JWKS document, tests use a token table.
//!
//! # Security Requirements
//!
//! All implementations MUST validate:
//! - **Issuer (iss)**: Token must come from the configured issuer
//! - **Audience (aud)**: Token must be intended for this service
//! - **Expiry (exp)**: Token must not be expired

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// # Contract
///
/// - `AuthError::InvalidToken` for malformed tokens or bad signatures
/// - `AuthError::TokenExpired` for expired tokens
/// - `AuthError::ServiceUnavailable` when the key set cannot be fetched
///
/// Callers treat every error as a refused credential; the distinction only
/// drives logging.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
