//! Domain events handed to the fan-out by the CRUD layer.
//!
//! Every event kind carries its own payload schema and its own channel
//! resolution rule. Payloads are validated at publish time; an event that
//! fails validation is never delivered.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, Timestamp, UserId, ValidationError};

use super::channel::ChannelName;

/// Maximum characters in a title field.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum characters in a free-text body field.
pub const MAX_BODY_CHARS: usize = 10_000;

/// A server-side event to deliver to live connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RealtimeEvent {
    #[serde(rename = "new:notification")]
    NewNotification(NotificationPayload),

    #[serde(rename = "new:message")]
    NewMessage(MessagePayload),

    #[serde(rename = "new:announcement")]
    NewAnnouncement(AnnouncementPayload),

    #[serde(rename = "class:update")]
    ClassUpdate(ClassUpdatePayload),
}

/// A notification for one user (grade posted, quiz opened, material added...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: String,
    pub recipient_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub created_at: Timestamp,
}

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: String,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub content: String,
    pub sent_at: Timestamp,
}

/// A course or platform-wide announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementPayload {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<CourseId>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub global: bool,
    pub author_id: UserId,
    pub posted_at: Timestamp,
}

/// State of a live class session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    Scheduled,
    Live,
    Ended,
    Updated,
}

/// A change to a live class (started, ended, material shared...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassUpdatePayload {
    pub course_id: CourseId,
    pub status: ClassStatus,
    #[serde(default)]
    pub details: serde_json::Value,
    pub updated_at: Timestamp,
}

impl RealtimeEvent {
    /// Wire name of the event kind.
    pub fn event_type(&self) -> &'static str {
        match self {
            RealtimeEvent::NewNotification(_) => "new:notification",
            RealtimeEvent::NewMessage(_) => "new:message",
            RealtimeEvent::NewAnnouncement(_) => "new:announcement",
            RealtimeEvent::ClassUpdate(_) => "class:update",
        }
    }

    /// Channels this event is delivered to.
    ///
    /// An announcement that is neither course-scoped nor global resolves to
    /// nothing; `validate` rejects it before that matters.
    pub fn target_channels(&self) -> Vec<ChannelName> {
        match self {
            RealtimeEvent::NewNotification(n) => {
                vec![ChannelName::notifications(n.recipient_id.clone())]
            }
            RealtimeEvent::NewMessage(m) => vec![ChannelName::chat(m.recipient_id.clone())],
            RealtimeEvent::NewAnnouncement(a) => {
                let mut channels = Vec::with_capacity(2);
                if let Some(course_id) = &a.course_id {
                    channels.push(ChannelName::announcements(course_id.clone()));
                }
                if a.global {
                    channels.push(ChannelName::GlobalAnnouncements);
                }
                channels
            }
            RealtimeEvent::ClassUpdate(c) => vec![ChannelName::class(c.course_id.clone())],
        }
    }

    /// Checks the payload against its schema.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            RealtimeEvent::NewNotification(n) => {
                require_text("id", &n.id, MAX_TITLE_CHARS)?;
                require_text("title", &n.title, MAX_TITLE_CHARS)?;
                require_text("message", &n.message, MAX_BODY_CHARS)?;
                Ok(())
            }
            RealtimeEvent::NewMessage(m) => {
                require_text("id", &m.id, MAX_TITLE_CHARS)?;
                require_text("content", &m.content, MAX_BODY_CHARS)?;
                if m.sender_id == m.recipient_id {
                    return Err(ValidationError::invalid_format(
                        "recipient_id",
                        "sender and recipient must differ",
                    ));
                }
                Ok(())
            }
            RealtimeEvent::NewAnnouncement(a) => {
                require_text("id", &a.id, MAX_TITLE_CHARS)?;
                require_text("title", &a.title, MAX_TITLE_CHARS)?;
                require_text("content", &a.content, MAX_BODY_CHARS)?;
                if a.course_id.is_none() && !a.global {
                    return Err(ValidationError::invalid_format(
                        "course_id",
                        "announcement needs a course or the global flag",
                    ));
                }
                Ok(())
            }
            RealtimeEvent::ClassUpdate(c) => {
                if !(c.details.is_null() || c.details.is_object()) {
                    return Err(ValidationError::invalid_format(
                        "details",
                        "must be an object",
                    ));
                }
                Ok(())
            }
        }
    }
}

fn require_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::too_long(field, max, len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn course(id: &str) -> CourseId {
        CourseId::new(id).unwrap()
    }

    fn announcement(course_id: Option<&str>, global: bool) -> RealtimeEvent {
        RealtimeEvent::NewAnnouncement(AnnouncementPayload {
            id: "ann-1".to_string(),
            course_id: course_id.map(course),
            title: "Midterm moved".to_string(),
            content: "The midterm is now on Friday.".to_string(),
            global,
            author_id: user("prof-1"),
            posted_at: Timestamp::now(),
        })
    }

    fn message(from: &str, to: &str) -> RealtimeEvent {
        RealtimeEvent::NewMessage(MessagePayload {
            id: "msg-1".to_string(),
            sender_id: user(from),
            recipient_id: user(to),
            content: "See you in lab".to_string(),
            sent_at: Timestamp::now(),
        })
    }

    #[test]
    fn message_targets_recipient_chat() {
        assert_eq!(
            message("u1", "u2").target_channels(),
            vec![ChannelName::chat(user("u2"))]
        );
    }

    #[test]
    fn global_course_announcement_targets_both_channels() {
        assert_eq!(
            announcement(Some("COURSE1"), true).target_channels(),
            vec![
                ChannelName::announcements(course("COURSE1")),
                ChannelName::GlobalAnnouncements
            ]
        );
    }

    #[test]
    fn course_only_announcement_targets_course_channel() {
        assert_eq!(
            announcement(Some("COURSE1"), false).target_channels(),
            vec![ChannelName::announcements(course("COURSE1"))]
        );
    }

    #[test]
    fn announcement_without_scope_is_invalid() {
        assert!(announcement(None, false).validate().is_err());
        assert!(announcement(None, true).validate().is_ok());
    }

    #[test]
    fn message_to_self_is_invalid() {
        let err = message("u1", "u1").validate().unwrap_err();
        assert_eq!(err.field(), "recipient_id");
    }

    #[test]
    fn blank_notification_title_is_invalid() {
        let event = RealtimeEvent::NewNotification(NotificationPayload {
            id: "n-1".to_string(),
            recipient_id: user("u1"),
            title: "   ".to_string(),
            message: "Quiz 3 is open".to_string(),
            category: None,
            link: None,
            created_at: Timestamp::now(),
        });
        assert_eq!(event.validate().unwrap_err(), ValidationError::empty_field("title"));
    }

    #[test]
    fn oversized_content_is_invalid() {
        let event = RealtimeEvent::NewMessage(MessagePayload {
            id: "m".to_string(),
            sender_id: user("a"),
            recipient_id: user("b"),
            content: "x".repeat(MAX_BODY_CHARS + 1),
            sent_at: Timestamp::now(),
        });
        assert!(matches!(
            event.validate(),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn class_update_details_must_be_object() {
        let mut payload = ClassUpdatePayload {
            course_id: course("CS101"),
            status: ClassStatus::Live,
            details: json!(["not", "an", "object"]),
            updated_at: Timestamp::now(),
        };
        assert!(RealtimeEvent::ClassUpdate(payload.clone()).validate().is_err());

        payload.details = json!({"room": "B12"});
        assert!(RealtimeEvent::ClassUpdate(payload).validate().is_ok());
    }

    #[test]
    fn deserializes_from_tagged_json() {
        let event: RealtimeEvent = serde_json::from_value(json!({
            "type": "new:announcement",
            "id": "a-9",
            "courseId": "COURSE1",
            "title": "Welcome",
            "content": "Hello class",
            "global": true,
            "authorId": "prof-1",
            "postedAt": "2026-09-01T08:00:00Z"
        }))
        .unwrap();

        assert_eq!(event.event_type(), "new:announcement");
        assert_eq!(event.target_channels().len(), 2);
    }

    #[test]
    fn deserialization_rejects_unknown_type() {
        let result = serde_json::from_value::<RealtimeEvent>(json!({
            "type": "new:grade",
            "id": "g-1"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn serializes_with_type_tag_and_camel_case() {
        let json = serde_json::to_value(message("u1", "u2")).unwrap();
        assert_eq!(json["type"], "new:message");
        assert_eq!(json["recipientId"], "u2");
    }
}
