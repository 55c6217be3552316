//! HTTP handlers for real-time endpoints.
//!
//! These handlers connect Axum routes to the real-time command/query handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::websocket::{RecordingObserver, RoomRegistry};
use crate::application::{
    ChannelAuthorizer, GetPresenceHandler, GetPresenceQuery, PublishEventHandler,
};
use crate::domain::realtime::{ChannelName, RealtimeError, RealtimeEvent};
use crate::ports::{EnrollmentChecker, EventPublisher, RoomMembership};

use super::dto::{ErrorResponse, HealthResponse, PublishAcceptedResponse, RecentEventsResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the real-time HTTP endpoints.
#[derive(Clone)]
pub struct RealtimeAppState {
    pub registry: Arc<RoomRegistry>,
    pub membership: Arc<dyn RoomMembership>,
    pub enrollment: Arc<dyn EnrollmentChecker>,
    pub publisher: Arc<dyn EventPublisher>,
    /// Present when diagnostics are enabled.
    pub recorder: Option<Arc<RecordingObserver>>,
}

impl RealtimeAppState {
    pub fn presence_handler(&self) -> GetPresenceHandler {
        GetPresenceHandler::new(
            ChannelAuthorizer::new(self.enrollment.clone()),
            self.membership.clone(),
        )
    }

    pub fn publish_handler(&self) -> PublishEventHandler {
        PublishEventHandler::new(self.publisher.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health
pub async fn health(State(state): State<RealtimeAppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        connections: state.registry.connection_count().await,
        channels: state.registry.channel_count().await,
    })
}

/// GET /api/channels/:channel/presence
pub async fn get_presence(
    State(state): State<RealtimeAppState>,
    RequireAuth(user): RequireAuth,
    Path(channel): Path<String>,
) -> Result<impl IntoResponse, RealtimeApiError> {
    let channel: ChannelName = channel.parse().map_err(RealtimeError::from)?;

    let view = state
        .presence_handler()
        .handle(GetPresenceQuery { user, channel })
        .await?;

    Ok(Json(view))
}

/// POST /internal/events
pub async fn publish_event(
    State(state): State<RealtimeAppState>,
    body: Result<Json<RealtimeEvent>, JsonRejection>,
) -> Result<impl IntoResponse, RealtimeApiError> {
    let Json(event) = body.map_err(|rejection| {
        RealtimeApiError::BadRequest(rejection.body_text())
    })?;
    let event_type = event.event_type().to_string();

    let report = state.publish_handler().handle(event).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishAcceptedResponse { event_type, report }),
    ))
}

/// GET /internal/diagnostics/events
pub async fn recent_events(State(state): State<RealtimeAppState>) -> impl IntoResponse {
    let events = match &state.recorder {
        Some(recorder) => recorder.recent().await,
        None => Vec::new(),
    };
    Json(RecentEventsResponse { events })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub enum RealtimeApiError {
    Domain(RealtimeError),
    /// Body could not be decoded at all.
    BadRequest(String),
}

impl From<RealtimeError> for RealtimeApiError {
    fn from(err: RealtimeError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for RealtimeApiError {
    fn into_response(self) -> axum::response::Response {
        let err = match self {
            RealtimeApiError::BadRequest(message) => {
                let body = ErrorResponse::new("BAD_REQUEST", message);
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            RealtimeApiError::Domain(err) => err,
        };

        let status = match &err {
            RealtimeError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            RealtimeError::Forbidden(_) => StatusCode::FORBIDDEN,
            RealtimeError::NotFound(_) => StatusCode::NOT_FOUND,
            RealtimeError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            RealtimeError::ConnectionClosed(_) => StatusCode::GONE,
        };

        let code = err.code();
        let body = match &err {
            RealtimeError::ValidationFailed { field, .. } => ErrorResponse::with_details(
                code.as_str(),
                err.to_string(),
                serde_json::json!({ "field": field }),
            ),
            _ => ErrorResponse::new(code.as_str(), err.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
