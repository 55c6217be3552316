//! Presence tracking for class channels.
//!
//! `PresenceTracker` is the `RoomMembership` the application layer talks to.
//! It forwards to the registry and, for class channels only, tells the other
//! members who came and went. Notices go out inside the same registry write
//! section as the mutation, so every member sees counts in mutation order.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{ConnectionId, Timestamp};
use crate::domain::realtime::{ChannelName, MembershipChange, Participant, RealtimeError};
use crate::ports::RoomMembership;

use super::messages::{ParticipantNotice, ServerMessage};
use super::rooms::{MemberContext, RoomRegistry};

/// Which side of a presence change a notice reports.
#[derive(Debug, Clone, Copy)]
enum Presence {
    Arrived,
    Departed,
}

/// Builds the notice for a class-channel change. Other kinds stay silent.
fn presence_notice(
    presence: Presence,
    member: MemberContext<'_>,
    change: &MembershipChange,
) -> Option<ServerMessage> {
    let ChannelName::Class(course_id) = &change.channel else {
        return None;
    };

    let notice = ParticipantNotice {
        channel: change.channel.clone(),
        course_id: course_id.clone(),
        user_id: member.user.id.clone(),
        display_name: member.user.display_name_or_email().to_string(),
        participant_count: change.member_count,
        at: Timestamp::now().to_rfc3339(),
    };

    Some(match presence {
        Presence::Arrived => ServerMessage::ParticipantJoined(notice),
        Presence::Departed => ServerMessage::ParticipantLeft(notice),
    })
}

/// Room membership with presence notices for class channels.
#[derive(Clone)]
pub struct PresenceTracker {
    registry: Arc<RoomRegistry>,
}

impl PresenceTracker {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }
}

#[async_trait]
impl RoomMembership for PresenceTracker {
    async fn join(
        &self,
        connection_id: ConnectionId,
        channel: &ChannelName,
    ) -> Result<MembershipChange, RealtimeError> {
        self.registry
            .join_and_notify(connection_id, channel, |member, change| {
                presence_notice(Presence::Arrived, member, change)
            })
            .await
    }

    async fn leave(&self, connection_id: ConnectionId, channel: &ChannelName) -> MembershipChange {
        self.registry
            .leave_and_notify(connection_id, channel, |member, change| {
                presence_notice(Presence::Departed, member, change)
            })
            .await
    }

    async fn drop_connection(&self, connection_id: ConnectionId) -> Vec<MembershipChange> {
        let changes = self
            .registry
            .drop_connection_and_notify(connection_id, |member, change| {
                presence_notice(Presence::Departed, member, change)
            })
            .await;

        if !changes.is_empty() {
            tracing::debug!(
                connection_id = %connection_id,
                channels = changes.len(),
                "connection removed from channels"
            );
        }
        changes
    }

    async fn member_count(&self, channel: &ChannelName) -> usize {
        self.registry.member_count(channel).await
    }

    async fn participants(&self, channel: &ChannelName) -> Vec<Participant> {
        self.registry.participants(channel).await
    }
}
