//! WebSocket message types for the real-time protocol.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection status, join acknowledgements, domain
//!   events, presence notices, errors, pongs
//! - Client → Server: joins, leaves, pings

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConnectionId, CourseId, Timestamp, UserId};
use crate::domain::realtime::{
    AnnouncementPayload, ChannelName, ClassUpdatePayload, MessagePayload, NotificationPayload,
    RealtimeError, RealtimeEvent,
};

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Connection authenticated and registered.
    #[serde(rename = "connected")]
    Connected(ConnectedMessage),

    #[serde(rename = "notifications:joined")]
    NotificationsJoined(JoinedMessage),

    #[serde(rename = "chat:joined")]
    ChatJoined(JoinedMessage),

    #[serde(rename = "class:joined")]
    ClassJoined(JoinedMessage),

    #[serde(rename = "announcements:joined")]
    AnnouncementsJoined(JoinedMessage),

    #[serde(rename = "left")]
    Left(LeftMessage),

    #[serde(rename = "new:notification")]
    NewNotification(NotificationPayload),

    #[serde(rename = "new:message")]
    NewMessage(MessagePayload),

    #[serde(rename = "new:announcement")]
    NewAnnouncement(AnnouncementPayload),

    #[serde(rename = "class:update")]
    ClassUpdate(ClassUpdatePayload),

    /// Someone else entered a class room this connection is in.
    #[serde(rename = "class:participant:joined")]
    ParticipantJoined(ParticipantNotice),

    /// Someone else left (or dropped out of) a class room.
    #[serde(rename = "class:participant:left")]
    ParticipantLeft(ParticipantNotice),

    #[serde(rename = "error")]
    Error(ErrorMessage),

    #[serde(rename = "pong")]
    Pong(PongMessage),
}

impl ServerMessage {
    /// Wire name of the message, for logging.
    pub fn message_type(&self) -> &'static str {
        match self {
            ServerMessage::Connected(_) => "connected",
            ServerMessage::NotificationsJoined(_) => "notifications:joined",
            ServerMessage::ChatJoined(_) => "chat:joined",
            ServerMessage::ClassJoined(_) => "class:joined",
            ServerMessage::AnnouncementsJoined(_) => "announcements:joined",
            ServerMessage::Left(_) => "left",
            ServerMessage::NewNotification(_) => "new:notification",
            ServerMessage::NewMessage(_) => "new:message",
            ServerMessage::NewAnnouncement(_) => "new:announcement",
            ServerMessage::ClassUpdate(_) => "class:update",
            ServerMessage::ParticipantJoined(_) => "class:participant:joined",
            ServerMessage::ParticipantLeft(_) => "class:participant:left",
            ServerMessage::Error(_) => "error",
            ServerMessage::Pong(_) => "pong",
        }
    }

    pub fn error(err: &RealtimeError) -> Self {
        ServerMessage::Error(ErrorMessage::from_error(err))
    }

    pub fn pong() -> Self {
        ServerMessage::Pong(PongMessage {
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }
}

impl From<RealtimeEvent> for ServerMessage {
    fn from(event: RealtimeEvent) -> Self {
        match event {
            RealtimeEvent::NewNotification(p) => ServerMessage::NewNotification(p),
            RealtimeEvent::NewMessage(p) => ServerMessage::NewMessage(p),
            RealtimeEvent::NewAnnouncement(p) => ServerMessage::NewAnnouncement(p),
            RealtimeEvent::ClassUpdate(p) => ServerMessage::ClassUpdate(p),
        }
    }
}

/// Sent once after the upgrade succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub timestamp: String,
}

/// Acknowledges a join with the channels actually joined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedMessage {
    pub channels: Vec<ChannelName>,
    /// Set for class joins only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_count: Option<usize>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeftMessage {
    pub channel: ChannelName,
    pub timestamp: String,
}

/// Presence change in a class channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantNotice {
    pub channel: ChannelName,
    pub course_id: CourseId,
    pub user_id: UserId,
    pub display_name: String,
    /// Members right after the change.
    pub participant_count: usize,
    pub at: String,
}

/// Error message sent to client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorMessage {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Timestamp::now().to_rfc3339(),
        }
    }

    pub fn from_error(err: &RealtimeError) -> Self {
        Self::new(err.code().as_str(), err.to_string())
    }

    /// For frames that could not be understood at all.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}

/// Heartbeat response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join:notifications")]
    JoinNotifications,

    #[serde(rename = "join:chat")]
    JoinChat,

    #[serde(rename = "join:class", rename_all = "camelCase")]
    JoinClass { course_id: CourseId },

    /// Without a course id only the global channel is joined.
    #[serde(rename = "join:announcements", rename_all = "camelCase")]
    JoinAnnouncements {
        #[serde(default)]
        course_id: Option<CourseId>,
    },

    #[serde(rename = "leave")]
    Leave { channel: ChannelName },

    /// Heartbeat request.
    #[serde(rename = "ping")]
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_join_messages() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"join:class","courseId":"CS101"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinClass {
                course_id: CourseId::new("CS101").unwrap()
            }
        );

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"join:announcements"}"#).unwrap();
        assert_eq!(msg, ClientMessage::JoinAnnouncements { course_id: None });

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"join:chat"}"#).unwrap();
        assert_eq!(msg, ClientMessage::JoinChat);
    }

    #[test]
    fn parses_leave_with_channel_name() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"leave","channel":"announcements:global"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Leave {
                channel: ChannelName::GlobalAnnouncements
            }
        );
    }

    #[test]
    fn rejects_bad_frames() {
        for frame in [
            r#"{"type":"join:class"}"#,
            r#"{"type":"join:class","courseId":"global"}"#,
            r#"{"type":"leave","channel":"lobby:1"}"#,
            r#"{"type":"subscribe"}"#,
            "not json",
        ] {
            assert!(serde_json::from_str::<ClientMessage>(frame).is_err(), "{}", frame);
        }
    }

    #[test]
    fn class_joined_carries_participant_count() {
        let msg = ServerMessage::ClassJoined(JoinedMessage {
            channels: vec![ChannelName::class(CourseId::new("CS101").unwrap())],
            participant_count: Some(2),
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "class:joined");
        assert_eq!(json["channels"], json!(["class:CS101"]));
        assert_eq!(json["participantCount"], 2);
    }

    #[test]
    fn chat_joined_omits_participant_count() {
        let msg = ServerMessage::ChatJoined(JoinedMessage {
            channels: vec![ChannelName::chat(UserId::new("u").unwrap())],
            participant_count: None,
            timestamp: "t".to_string(),
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("participantCount").is_none());
    }

    #[test]
    fn domain_events_keep_their_tag() {
        let event = RealtimeEvent::NewMessage(MessagePayload {
            id: "m1".to_string(),
            sender_id: UserId::new("a").unwrap(),
            recipient_id: UserId::new("b").unwrap(),
            content: "hello".to_string(),
            sent_at: Timestamp::now(),
        });
        let event_json = serde_json::to_value(&event).unwrap();

        let msg = ServerMessage::from(event);
        assert_eq!(msg.message_type(), "new:message");
        assert_eq!(serde_json::to_value(&msg).unwrap(), event_json);
    }

    #[test]
    fn error_message_uses_error_code() {
        let msg = ServerMessage::error(&RealtimeError::forbidden("not enrolled"));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["message"], "Forbidden: not enrolled");
    }

    #[test]
    fn participant_notice_serializes_camel_case() {
        let msg = ServerMessage::ParticipantLeft(ParticipantNotice {
            channel: ChannelName::class(CourseId::new("CS101").unwrap()),
            course_id: CourseId::new("CS101").unwrap(),
            user_id: UserId::new("v").unwrap(),
            display_name: "Vic".to_string(),
            participant_count: 1,
            at: "t".to_string(),
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "class:participant:left");
        assert_eq!(json["courseId"], "CS101");
        assert_eq!(json["displayName"], "Vic");
        assert_eq!(json["participantCount"], 1);
    }
}
