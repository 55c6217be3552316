//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Connection-facing commands (authenticate, join, leave, disconnect) and the
//! publish entry point used by the rest of the platform live here.

pub mod handlers;

pub use handlers::realtime::{
    AuthenticateConnectionCommand, AuthenticateConnectionHandler, ChannelAuthorizer,
    DisconnectCommand, DisconnectHandler, GetPresenceHandler, GetPresenceQuery,
    JoinChannelCommand, JoinChannelHandler, JoinChannelResult, JoinTarget, LeaveChannelCommand,
    LeaveChannelHandler, PresenceView, PublishEventHandler,
};
