//! Real-time command and query handlers.

mod authenticate_connection;
mod authorize_channel;
mod get_presence;
mod join_channel;
mod leave_channel;
mod publish_event;

pub use authenticate_connection::{AuthenticateConnectionCommand, AuthenticateConnectionHandler};
pub use authorize_channel::ChannelAuthorizer;
pub use get_presence::{GetPresenceHandler, GetPresenceQuery, PresenceView};
pub use join_channel::{JoinChannelCommand, JoinChannelHandler, JoinChannelResult, JoinTarget};
pub use leave_channel::{
    DisconnectCommand, DisconnectHandler, LeaveChannelCommand, LeaveChannelHandler,
};
pub use publish_event::PublishEventHandler;
