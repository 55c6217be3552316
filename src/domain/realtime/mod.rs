//! Real-time domain - channels, connection lifecycle and the events pushed
//! to connected clients.
//!
//! Everything here is transport-agnostic. The WebSocket adapter and the
//! in-memory registry build on these types.

mod channel;
mod connection;
mod errors;
mod event;
mod membership;

pub use channel::{ChannelKind, ChannelName};
pub use connection::{ConnectionLifecycle, ConnectionState};
pub use errors::RealtimeError;
pub use event::{
    AnnouncementPayload, ClassStatus, ClassUpdatePayload, MessagePayload, NotificationPayload,
    RealtimeEvent, MAX_BODY_CHARS, MAX_TITLE_CHARS,
};
pub use membership::{DeliveryReport, MembershipChange, Participant};
