//! Results of membership mutations and fan-out.

use serde::Serialize;

use crate::domain::foundation::{ConnectionId, Timestamp, UserId};

use super::channel::ChannelName;

/// Outcome of a join, leave or drop on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipChange {
    pub channel: ChannelName,
    /// False when the operation was a no-op (already joined, not a member).
    pub applied: bool,
    /// Membership size right after the operation.
    pub member_count: usize,
}

impl MembershipChange {
    pub fn applied(channel: ChannelName, member_count: usize) -> Self {
        Self {
            channel,
            applied: true,
            member_count,
        }
    }

    pub fn unchanged(channel: ChannelName, member_count: usize) -> Self {
        Self {
            channel,
            applied: false,
            member_count,
        }
    }
}

/// One member of a presence-tracked channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub display_name: String,
    pub joined_at: Timestamp,
}

/// What a single publish reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    /// Channels the event resolved to.
    pub channels: Vec<ChannelName>,
    /// Distinct connections found across those channels.
    pub recipients: usize,
    pub delivered: usize,
    /// Connections whose outbound queue was already closed.
    pub failed: usize,
}

impl DeliveryReport {
    pub fn empty(channels: Vec<ChannelName>) -> Self {
        Self {
            channels,
            ..Self::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.recipients == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CourseId;

    #[test]
    fn empty_report_is_noop() {
        let report = DeliveryReport::empty(vec![ChannelName::GlobalAnnouncements]);
        assert!(report.is_noop());
        assert_eq!(report.delivered, 0);
        assert_eq!(report.channels.len(), 1);
    }

    #[test]
    fn report_serializes_channel_names() {
        let report = DeliveryReport {
            channels: vec![ChannelName::class(CourseId::new("CS1").unwrap())],
            recipients: 2,
            delivered: 1,
            failed: 1,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["channels"][0], "class:CS1");
        assert_eq!(json["recipients"], 2);
    }

    #[test]
    fn membership_change_constructors() {
        let applied = MembershipChange::applied(ChannelName::GlobalAnnouncements, 3);
        assert!(applied.applied);
        let unchanged = MembershipChange::unchanged(ChannelName::GlobalAnnouncements, 3);
        assert!(!unchanged.applied);
        assert_eq!(unchanged.member_count, 3);
    }
}
