//! In-memory room registry.
//!
//! Tracks live connections, the channels each one has joined, and the
//! outbound queue that reaches its socket writer.
//!
//! # Architecture
//!
//! ```text
//! connections                       channels
//! ├── conn-a (u1) ─┐                ├── class:CS101 ──── {conn-a, conn-c}
//! ├── conn-b (u1)  │ outbound mpsc  ├── chat:u1 ──────── {conn-a, conn-b}
//! └── conn-c (u2)  └─► writer task  └── announcements:global {conn-c}
//! ```
//!
//! Both maps live behind one `RwLock`. Every mutation, together with any
//! notice it sends to the remaining members, runs inside one write-lock
//! section; deliveries snapshot membership under the read lock. A fan-out
//! therefore never sees a half-applied join, leave or drop.

use std::collections::{HashMap, HashSet};

use tokio::sync::{mpsc, RwLock};

use crate::domain::foundation::{AuthenticatedUser, ConnectionId, Timestamp};
use crate::domain::realtime::{
    ChannelName, DeliveryReport, MembershipChange, Participant, RealtimeError,
};

use super::messages::ServerMessage;

/// Outbound queue of one connection. The socket writer owns the receiver.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

struct ConnectionEntry {
    user: AuthenticatedUser,
    outbound: OutboundSender,
    channels: HashSet<ChannelName>,
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    /// channel → member → join time
    channels: HashMap<ChannelName, HashMap<ConnectionId, Timestamp>>,
}

impl RegistryState {
    fn member_count(&self, channel: &ChannelName) -> usize {
        self.channels.get(channel).map_or(0, HashMap::len)
    }

    /// Pushes to every member of `channel` except `skip`.
    fn send_to_others(&self, channel: &ChannelName, skip: ConnectionId, message: &ServerMessage) {
        let Some(members) = self.channels.get(channel) else {
            return;
        };
        for id in members.keys().filter(|id| **id != skip) {
            if let Some(entry) = self.connections.get(id) {
                if entry.outbound.send(message.clone()).is_err() {
                    tracing::debug!(connection_id = %id, %channel, "notice not delivered, queue closed");
                }
            }
        }
    }

    /// Removes `id` from `channel`, dropping the channel once empty.
    fn remove_member(&mut self, channel: &ChannelName, id: ConnectionId) -> Option<usize> {
        let members = self.channels.get_mut(channel)?;
        members.remove(&id)?;
        let remaining = members.len();
        if remaining == 0 {
            self.channels.remove(channel);
        }
        Some(remaining)
    }
}

/// Who a presence notice is about.
pub struct MemberContext<'a> {
    pub connection_id: ConnectionId,
    pub user: &'a AuthenticatedUser,
}

/// Registry of live connections and channel membership.
///
/// One instance per process, created at startup and shared by `Arc`.
#[derive(Default)]
pub struct RoomRegistry {
    state: RwLock<RegistryState>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks a freshly authenticated connection.
    pub async fn register(&self, id: ConnectionId, user: AuthenticatedUser, outbound: OutboundSender) {
        let mut state = self.state.write().await;
        state.connections.insert(
            id,
            ConnectionEntry {
                user,
                outbound,
                channels: HashSet::new(),
            },
        );
    }

    pub async fn is_registered(&self, id: ConnectionId) -> bool {
        self.state.read().await.connections.contains_key(&id)
    }

    /// Pushes one message to one connection.
    pub async fn send_to(&self, id: ConnectionId, message: ServerMessage) -> Result<(), RealtimeError> {
        let state = self.state.read().await;
        let entry = state
            .connections
            .get(&id)
            .ok_or(RealtimeError::ConnectionClosed(id))?;
        entry
            .outbound
            .send(message)
            .map_err(|_| RealtimeError::ConnectionClosed(id))
    }

    pub async fn join(&self, id: ConnectionId, channel: &ChannelName) -> Result<MembershipChange, RealtimeError> {
        self.join_and_notify(id, channel, |_, _| None).await
    }

    /// Joins and, when the join was applied, sends `notice(..)` to every other
    /// member, all under the same write lock.
    pub async fn join_and_notify<F>(
        &self,
        id: ConnectionId,
        channel: &ChannelName,
        notice: F,
    ) -> Result<MembershipChange, RealtimeError>
    where
        F: FnOnce(MemberContext<'_>, &MembershipChange) -> Option<ServerMessage>,
    {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let entry = state
            .connections
            .get_mut(&id)
            .ok_or(RealtimeError::ConnectionClosed(id))?;
        let newly_joined = entry.channels.insert(channel.clone());

        let members = state.channels.entry(channel.clone()).or_default();
        if newly_joined {
            members.insert(id, Timestamp::now());
        }
        let count = members.len();

        let change = if newly_joined {
            MembershipChange::applied(channel.clone(), count)
        } else {
            MembershipChange::unchanged(channel.clone(), count)
        };

        if change.applied {
            if let Some(entry) = state.connections.get(&id) {
                let ctx = MemberContext {
                    connection_id: id,
                    user: &entry.user,
                };
                if let Some(message) = notice(ctx, &change) {
                    state.send_to_others(channel, id, &message);
                }
            }
        }

        Ok(change)
    }

    pub async fn leave(&self, id: ConnectionId, channel: &ChannelName) -> MembershipChange {
        self.leave_and_notify(id, channel, |_, _| None).await
    }

    /// Leaves and, when applied, notifies the remaining members.
    pub async fn leave_and_notify<F>(
        &self,
        id: ConnectionId,
        channel: &ChannelName,
        notice: F,
    ) -> MembershipChange
    where
        F: FnOnce(MemberContext<'_>, &MembershipChange) -> Option<ServerMessage>,
    {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let was_member = state
            .connections
            .get_mut(&id)
            .map_or(false, |entry| entry.channels.remove(channel));

        if !was_member {
            return MembershipChange::unchanged(channel.clone(), state.member_count(channel));
        }

        let remaining = state.remove_member(channel, id).unwrap_or(0);
        let change = MembershipChange::applied(channel.clone(), remaining);

        if let Some(entry) = state.connections.get(&id) {
            let ctx = MemberContext {
                connection_id: id,
                user: &entry.user,
            };
            if let Some(message) = notice(ctx, &change) {
                state.send_to_others(channel, id, &message);
            }
        }

        change
    }

    pub async fn drop_connection(&self, id: ConnectionId) -> Vec<MembershipChange> {
        self.drop_connection_and_notify(id, |_, _| None).await
    }

    /// Removes the connection from all its channels and forgets it. `notice`
    /// is asked once per channel left.
    pub async fn drop_connection_and_notify<F>(&self, id: ConnectionId, mut notice: F) -> Vec<MembershipChange>
    where
        F: FnMut(MemberContext<'_>, &MembershipChange) -> Option<ServerMessage>,
    {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let Some(entry) = state.connections.remove(&id) else {
            return Vec::new();
        };

        let mut channels: Vec<ChannelName> = entry.channels.iter().cloned().collect();
        channels.sort();

        let mut changes = Vec::with_capacity(channels.len());
        for channel in channels {
            let remaining = state.remove_member(&channel, id).unwrap_or(0);
            let change = MembershipChange::applied(channel, remaining);

            let ctx = MemberContext {
                connection_id: id,
                user: &entry.user,
            };
            if let Some(message) = notice(ctx, &change) {
                state.send_to_others(&change.channel, id, &message);
            }
            changes.push(change);
        }

        changes
    }

    /// Pushes `message` once to every distinct member of `channels`.
    ///
    /// A connection whose queue is closed counts as failed; nothing is retried.
    pub async fn deliver(&self, channels: &[ChannelName], message: &ServerMessage) -> DeliveryReport {
        let state = self.state.read().await;

        let recipients: HashSet<ConnectionId> = channels
            .iter()
            .filter_map(|channel| state.channels.get(channel))
            .flat_map(|members| members.keys().copied())
            .collect();

        let mut report = DeliveryReport::empty(channels.to_vec());
        report.recipients = recipients.len();

        for id in recipients {
            let sent = state
                .connections
                .get(&id)
                .map_or(false, |entry| entry.outbound.send(message.clone()).is_ok());
            if sent {
                report.delivered += 1;
            } else {
                report.failed += 1;
                tracing::debug!(
                    connection_id = %id,
                    message_type = message.message_type(),
                    "delivery skipped, connection closing"
                );
            }
        }

        report
    }

    pub async fn member_count(&self, channel: &ChannelName) -> usize {
        self.state.read().await.member_count(channel)
    }

    pub async fn members(&self, channel: &ChannelName) -> Vec<ConnectionId> {
        self.state
            .read()
            .await
            .channels
            .get(channel)
            .map(|members| members.keys().copied().collect())
            .unwrap_or_default()
    }

    pub async fn is_member(&self, id: ConnectionId, channel: &ChannelName) -> bool {
        self.state
            .read()
            .await
            .channels
            .get(channel)
            .map_or(false, |members| members.contains_key(&id))
    }

    /// Channels a connection is in, sorted by name.
    pub async fn channels_of(&self, id: ConnectionId) -> Vec<ChannelName> {
        let state = self.state.read().await;
        let mut channels: Vec<ChannelName> = state
            .connections
            .get(&id)
            .map(|entry| entry.channels.iter().cloned().collect())
            .unwrap_or_default();
        channels.sort();
        channels
    }

    /// Members of a channel with identity and join time, oldest first.
    pub async fn participants(&self, channel: &ChannelName) -> Vec<Participant> {
        let state = self.state.read().await;
        let Some(members) = state.channels.get(channel) else {
            return Vec::new();
        };

        let mut participants: Vec<Participant> = members
            .iter()
            .filter_map(|(id, joined_at)| {
                state.connections.get(id).map(|entry| Participant {
                    connection_id: *id,
                    user_id: entry.user.id.clone(),
                    display_name: entry.user.display_name_or_email().to_string(),
                    joined_at: *joined_at,
                })
            })
            .collect();
        participants.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.connection_id.cmp(&b.connection_id))
        });
        participants
    }

    pub async fn active_channels(&self) -> Vec<ChannelName> {
        let mut channels: Vec<ChannelName> =
            self.state.read().await.channels.keys().cloned().collect();
        channels.sort();
        channels
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }

    pub async fn channel_count(&self) -> usize {
        self.state.read().await.channels.len()
    }

    /// Forgets every connection and channel. Dropping the outbound senders
    /// ends each socket writer.
    pub async fn shutdown(&self) -> usize {
        let mut state = self.state.write().await;
        let closed = state.connections.len();
        state.connections.clear();
        state.channels.clear();
        closed
    }
}
