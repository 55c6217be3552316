//! Axum router configuration for real-time endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_presence, health, publish_event, recent_events, RealtimeAppState};

/// Liveness and registry size. No authentication.
///
/// # Routes
/// - `GET /health`
pub fn health_routes() -> Router<RealtimeAppState> {
    Router::new().route("/health", get(health))
}

/// User-facing presence query. Mount behind `auth_middleware`.
///
/// # Routes
/// - `GET /channels/:channel/presence` - Participants of a channel
pub fn presence_routes() -> Router<RealtimeAppState> {
    Router::new().route("/channels/:channel/presence", get(get_presence))
}

/// Endpoints for other platform services. Mount behind `service_key_middleware`.
///
/// # Routes
/// - `POST /events` - Publish a real-time event
/// - `GET /diagnostics/events` - Recently published events (when enabled)
pub fn internal_routes(diagnostics: bool) -> Router<RealtimeAppState> {
    let router = Router::new().route("/events", post(publish_event));
    if diagnostics {
        router.route("/diagnostics/events", get(recent_events))
    } else {
        router
    }
}
