//! RoomMembership port - channel membership as seen by the application layer.
//!
//! The registry behind it is in-memory and process-local. Implementations
//! apply each mutation (and any presence notice it causes) atomically.

use async_trait::async_trait;

use crate::domain::foundation::ConnectionId;
use crate::domain::realtime::{ChannelName, MembershipChange, Participant, RealtimeError};

#[async_trait]
pub trait RoomMembership: Send + Sync {
    /// Add a connection to a channel. Idempotent.
    ///
    /// Fails with `ConnectionClosed` if the connection is not registered.
    async fn join(
        &self,
        connection_id: ConnectionId,
        channel: &ChannelName,
    ) -> Result<MembershipChange, RealtimeError>;

    /// Remove a connection from a channel. Leaving a channel the connection
    /// is not in is a no-op, not an error.
    async fn leave(&self, connection_id: ConnectionId, channel: &ChannelName) -> MembershipChange;

    /// Remove a connection from every channel and forget it.
    ///
    /// Returns one change per channel the connection was in.
    async fn drop_connection(&self, connection_id: ConnectionId) -> Vec<MembershipChange>;

    async fn member_count(&self, channel: &ChannelName) -> usize;

    /// Current members of a channel, oldest join first.
    async fn participants(&self, channel: &ChannelName) -> Vec<Participant>;
}
