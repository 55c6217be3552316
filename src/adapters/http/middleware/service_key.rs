//! Service-key middleware for internal endpoints.
//!
//! Internal callers (the CRUD services) authenticate with a shared key sent
//! as `Authorization: Bearer <key>`. The comparison is constant-time.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::adapters::http::realtime::ErrorResponse;

/// Middleware state - the configured key.
pub type ServiceKeyState = Arc<SecretString>;

fn key_matches(expected: &SecretString, presented: &str) -> bool {
    expected
        .expose_secret()
        .as_bytes()
        .ct_eq(presented.as_bytes())
        .into()
}

/// Rejects requests that do not carry the configured service key.
pub async fn service_key_middleware(
    State(expected): State<ServiceKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match presented {
        Some(key) if key_matches(&expected, key) => next.run(request).await,
        _ => {
            tracing::warn!(path = %request.uri().path(), "internal request with bad service key");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("UNAUTHENTICATED", "Invalid service key")),
            )
                .into_response()
        }
    }
}
