//! Leave and disconnect handlers.

use std::sync::Arc;

use crate::domain::foundation::{ConnectionId, UserId};
use crate::domain::realtime::{ChannelName, MembershipChange};
use crate::ports::RoomMembership;

#[derive(Debug, Clone)]
pub struct LeaveChannelCommand {
    pub connection_id: ConnectionId,
    pub channel: ChannelName,
}

/// Handler for explicit leaves. Leaving a channel the connection is not in
/// succeeds with `applied == false`.
pub struct LeaveChannelHandler {
    membership: Arc<dyn RoomMembership>,
}

impl LeaveChannelHandler {
    pub fn new(membership: Arc<dyn RoomMembership>) -> Self {
        Self { membership }
    }

    pub async fn handle(&self, cmd: LeaveChannelCommand) -> MembershipChange {
        let change = self.membership.leave(cmd.connection_id, &cmd.channel).await;
        tracing::debug!(
            connection_id = %cmd.connection_id,
            channel = %cmd.channel,
            applied = change.applied,
            members = change.member_count,
            "left channel"
        );
        change
    }
}

#[derive(Debug, Clone)]
pub struct DisconnectCommand {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
}

/// Handler run once when a transport closes.
pub struct DisconnectHandler {
    membership: Arc<dyn RoomMembership>,
}

impl DisconnectHandler {
    pub fn new(membership: Arc<dyn RoomMembership>) -> Self {
        Self { membership }
    }

    /// Removes the connection from every channel it was in.
    pub async fn handle(&self, cmd: DisconnectCommand) -> Vec<MembershipChange> {
        let changes = self.membership.drop_connection(cmd.connection_id).await;
        tracing::info!(
            connection_id = %cmd.connection_id,
            user_id = %cmd.user_id,
            channels = changes.len(),
            "connection dropped"
        );
        changes
    }
}
