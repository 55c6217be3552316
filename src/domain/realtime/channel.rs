//! Channel names - the logical broadcast groups connections join.
//!
//! ```text
//! notifications:<userId>     one principal, every device
//! chat:<userId>              one principal, every device
//! class:<courseId>           many principals, presence-tracked
//! announcements:<courseId>   many principals
//! announcements:global       every authenticated principal may join
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{CourseId, UserId, ValidationError, RESERVED_GLOBAL_COURSE};

/// Kind of channel, independent of the entity it is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Notifications,
    Chat,
    Class,
    Announcements,
}

impl ChannelKind {
    /// Prefix used in the canonical channel name.
    pub fn prefix(&self) -> &'static str {
        match self {
            ChannelKind::Notifications => "notifications",
            ChannelKind::Chat => "chat",
            ChannelKind::Class => "class",
            ChannelKind::Announcements => "announcements",
        }
    }
}

/// Name of a logical broadcast channel.
///
/// Identity is the canonical string form; serializes as that string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChannelName {
    /// Per-user notification feed.
    Notifications(UserId),
    /// Per-user direct-message inbox.
    Chat(UserId),
    /// Live class room for a course.
    Class(CourseId),
    /// Announcements for one course.
    Announcements(CourseId),
    /// Platform-wide announcements.
    GlobalAnnouncements,
}

impl ChannelName {
    pub fn notifications(user_id: UserId) -> Self {
        ChannelName::Notifications(user_id)
    }

    pub fn chat(user_id: UserId) -> Self {
        ChannelName::Chat(user_id)
    }

    pub fn class(course_id: CourseId) -> Self {
        ChannelName::Class(course_id)
    }

    pub fn announcements(course_id: CourseId) -> Self {
        ChannelName::Announcements(course_id)
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelName::Notifications(_) => ChannelKind::Notifications,
            ChannelName::Chat(_) => ChannelKind::Chat,
            ChannelName::Class(_) => ChannelKind::Class,
            ChannelName::Announcements(_) | ChannelName::GlobalAnnouncements => {
                ChannelKind::Announcements
            }
        }
    }

    /// Only class channels keep participant presence.
    pub fn is_presence_tracked(&self) -> bool {
        matches!(self, ChannelName::Class(_))
    }

    /// The user a per-user channel belongs to.
    pub fn owner(&self) -> Option<&UserId> {
        match self {
            ChannelName::Notifications(user) | ChannelName::Chat(user) => Some(user),
            _ => None,
        }
    }

    /// The course a course-scoped channel belongs to.
    pub fn course(&self) -> Option<&CourseId> {
        match self {
            ChannelName::Class(course) | ChannelName::Announcements(course) => Some(course),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelName::Notifications(user) | ChannelName::Chat(user) => {
                write!(f, "{}:{}", self.kind().prefix(), user)
            }
            ChannelName::Class(course) | ChannelName::Announcements(course) => {
                write!(f, "{}:{}", self.kind().prefix(), course)
            }
            ChannelName::GlobalAnnouncements => {
                write!(f, "announcements:{}", RESERVED_GLOBAL_COURSE)
            }
        }
    }
}

impl FromStr for ChannelName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, key) = s
            .split_once(':')
            .ok_or_else(|| ValidationError::invalid_format("channel", "expected '<kind>:<id>'"))?;

        match prefix {
            "notifications" => Ok(ChannelName::Notifications(UserId::new(key)?)),
            "chat" => Ok(ChannelName::Chat(UserId::new(key)?)),
            "class" => Ok(ChannelName::Class(CourseId::new(key)?)),
            "announcements" if key == RESERVED_GLOBAL_COURSE => {
                Ok(ChannelName::GlobalAnnouncements)
            }
            "announcements" => Ok(ChannelName::Announcements(CourseId::new(key)?)),
            other => Err(ValidationError::invalid_format(
                "channel",
                format!("unknown channel kind '{}'", other),
            )),
        }
    }
}

impl TryFrom<String> for ChannelName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChannelName> for String {
    fn from(channel: ChannelName) -> Self {
        channel.to_string()
    }
}
