//! WebSocket upgrade handler for real-time connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Authenticate the bearer credential (401 before any handshake)
//! 2. Upgrade to WebSocket
//! 3. Register the connection and send `connected`
//! 4. Dispatch client messages and forward deliveries until disconnect
//! 5. Drop the connection from every channel

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::adapters::http::realtime::ErrorResponse;
use crate::application::{
    AuthenticateConnectionCommand, AuthenticateConnectionHandler, ChannelAuthorizer,
    DisconnectCommand, DisconnectHandler, JoinChannelHandler, LeaveChannelHandler,
};
use crate::domain::foundation::Timestamp;
use crate::domain::realtime::ConnectionLifecycle;
use crate::ports::{EnrollmentChecker, RoomMembership, SessionValidator};

use super::{
    messages::{ConnectedMessage, ServerMessage},
    presence::PresenceTracker,
    rooms::RoomRegistry,
    session::ConnectionSession,
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub registry: Arc<RoomRegistry>,
    pub authenticate: Arc<AuthenticateConnectionHandler>,
    pub join: Arc<JoinChannelHandler>,
    pub leave: Arc<LeaveChannelHandler>,
    pub disconnect: Arc<DisconnectHandler>,
    /// Text frames above this size are answered with `BAD_REQUEST`.
    pub max_frame_bytes: usize,
}

impl WebSocketState {
    /// Wires the connection handlers around one registry.
    pub fn new(
        registry: Arc<RoomRegistry>,
        validator: Arc<dyn SessionValidator>,
        enrollment: Arc<dyn EnrollmentChecker>,
        max_frame_bytes: usize,
    ) -> Self {
        let membership: Arc<dyn RoomMembership> = Arc::new(PresenceTracker::new(registry.clone()));
        let authorizer = ChannelAuthorizer::new(enrollment);

        Self {
            registry,
            authenticate: Arc::new(AuthenticateConnectionHandler::new(validator)),
            join: Arc::new(JoinChannelHandler::new(authorizer, membership.clone())),
            leave: Arc::new(LeaveChannelHandler::new(membership.clone())),
            disconnect: Arc::new(DisconnectHandler::new(membership)),
            max_frame_bytes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Browsers cannot set headers on a WebSocket handshake, so the query
/// parameter wins over `Authorization`.
fn extract_token(params: &ConnectParams, headers: &HeaderMap) -> Option<String> {
    params.token.clone().or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
    })
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws?token=<jwt>`
pub async fn ws_handler(
    ws: Option<WebSocketUpgrade>,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    State(state): State<WebSocketState>,
) -> Response {
    let cmd = AuthenticateConnectionCommand::new(extract_token(&params, &headers));
    let user = match state.authenticate.handle(cmd).await {
        Ok(user) => user,
        Err(err) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(err.code().as_str(), err.to_string())),
            )
                .into_response();
        }
    };

    let Some(ws) = ws else {
        return (
            StatusCode::UPGRADE_REQUIRED,
            Json(ErrorResponse::new(
                "UPGRADE_REQUIRED",
                "expected a WebSocket upgrade request",
            )),
        )
            .into_response();
    };

    let mut lifecycle = ConnectionLifecycle::connecting();
    if let Err(e) = lifecycle.authenticate(user) {
        tracing::error!(error = %e, "connection lifecycle rejected authentication");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("INTERNAL_ERROR", "connection setup failed")),
        )
            .into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, lifecycle, state))
}

/// Runs for the lifetime of one authenticated connection.
async fn handle_socket(socket: WebSocket, mut lifecycle: ConnectionLifecycle, state: WebSocketState) {
    let connection_id = lifecycle.id();
    let Some(user) = lifecycle.principal().cloned() else {
        return;
    };

    let (mut sender, mut receiver) = socket.split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();

    // The registry holds the only sender, so `shutdown` or a drop ends the writer.
    state
        .registry
        .register(connection_id, user.clone(), outbound)
        .await;
    tracing::info!(connection_id = %connection_id, user_id = %user.id, "connection opened");

    let connected = ServerMessage::Connected(ConnectedMessage {
        connection_id,
        user_id: user.id.clone(),
        timestamp: Timestamp::now().to_rfc3339(),
    });
    if state.registry.send_to(connection_id, connected).await.is_err() {
        state
            .disconnect
            .handle(DisconnectCommand {
                connection_id,
                user_id: user.id.clone(),
            })
            .await;
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = send_message(&mut sender, &msg).await {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Send error, closing connection: {}",
                    e
                );
                break;
            }
        }
        let _ = sender.close().await;
    });

    let session = ConnectionSession::new(
        connection_id,
        user.clone(),
        state.join.clone(),
        state.leave.clone(),
        state.max_frame_bytes,
    );
    let registry = state.registry.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let reply = session.handle_text(&text).await;
                    if registry.send_to(connection_id, reply).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        "Received unsupported binary message"
                    );
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    if let Err(e) = lifecycle.disconnect() {
        tracing::debug!(connection_id = %connection_id, error = %e, "lifecycle already closed");
    }
    state
        .disconnect
        .handle(DisconnectCommand {
            connection_id,
            user_id: user.id,
        })
        .await;
}

/// Send a JSON message over the WebSocket.
async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

/// Create axum router for the WebSocket endpoint.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(websocket_router().with_state(ws_state));
/// ```
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}
