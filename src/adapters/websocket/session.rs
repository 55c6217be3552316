//! Per-connection protocol handling.
//!
//! A `ConnectionSession` turns each inbound text frame into exactly one
//! reply: an acknowledgement, a pong, or an `error` event. Errors never
//! close the connection.

use std::sync::Arc;

use crate::application::{
    JoinChannelCommand, JoinChannelHandler, JoinChannelResult, JoinTarget, LeaveChannelCommand,
    LeaveChannelHandler,
};
use crate::domain::foundation::{AuthenticatedUser, ConnectionId, Timestamp};
use crate::domain::realtime::ChannelKind;

use super::messages::{ClientMessage, ErrorMessage, JoinedMessage, LeftMessage, ServerMessage};

/// Protocol state of one authenticated socket.
pub struct ConnectionSession {
    connection_id: ConnectionId,
    user: AuthenticatedUser,
    join: Arc<JoinChannelHandler>,
    leave: Arc<LeaveChannelHandler>,
    max_frame_bytes: usize,
}

impl ConnectionSession {
    pub fn new(
        connection_id: ConnectionId,
        user: AuthenticatedUser,
        join: Arc<JoinChannelHandler>,
        leave: Arc<LeaveChannelHandler>,
        max_frame_bytes: usize,
    ) -> Self {
        Self {
            connection_id,
            user,
            join,
            leave,
            max_frame_bytes,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn user(&self) -> &AuthenticatedUser {
        &self.user
    }

    /// Parses and dispatches one text frame.
    pub async fn handle_text(&self, text: &str) -> ServerMessage {
        if text.len() > self.max_frame_bytes {
            tracing::debug!(
                connection_id = %self.connection_id,
                size = text.len(),
                limit = self.max_frame_bytes,
                "frame too large"
            );
            return ServerMessage::Error(ErrorMessage::bad_request(format!(
                "frame exceeds {} bytes",
                self.max_frame_bytes
            )));
        }

        match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => self.dispatch(message).await,
            Err(e) => {
                tracing::debug!(
                    connection_id = %self.connection_id,
                    error = %e,
                    "unparseable client message"
                );
                ServerMessage::Error(ErrorMessage::bad_request(format!(
                    "invalid message: {}",
                    e
                )))
            }
        }
    }

    pub async fn dispatch(&self, message: ClientMessage) -> ServerMessage {
        let target = match message {
            ClientMessage::Ping => {
                tracing::trace!(connection_id = %self.connection_id, "ping");
                return ServerMessage::pong();
            }
            ClientMessage::Leave { channel } => {
                self.leave
                    .handle(LeaveChannelCommand {
                        connection_id: self.connection_id,
                        channel: channel.clone(),
                    })
                    .await;
                return ServerMessage::Left(LeftMessage {
                    channel,
                    timestamp: Timestamp::now().to_rfc3339(),
                });
            }
            ClientMessage::JoinNotifications => JoinTarget::Notifications,
            ClientMessage::JoinChat => JoinTarget::Chat,
            ClientMessage::JoinClass { course_id } => JoinTarget::Class(course_id),
            ClientMessage::JoinAnnouncements { course_id } => JoinTarget::Announcements(course_id),
        };

        let cmd = JoinChannelCommand {
            connection_id: self.connection_id,
            user: self.user.clone(),
            target,
        };
        match self.join.handle(cmd).await {
            Ok(result) => joined_ack(&result),
            Err(err) => ServerMessage::error(&err),
        }
    }
}

fn joined_ack(result: &JoinChannelResult) -> ServerMessage {
    let ack = JoinedMessage {
        channels: result.channels(),
        participant_count: result.participant_count(),
        timestamp: Timestamp::now().to_rfc3339(),
    };
    match result.target.kind() {
        ChannelKind::Notifications => ServerMessage::NotificationsJoined(ack),
        ChannelKind::Chat => ServerMessage::ChatJoined(ack),
        ChannelKind::Class => ServerMessage::ClassJoined(ack),
        ChannelKind::Announcements => ServerMessage::AnnouncementsJoined(ack),
    }
}
