//! WebSocket adapters for real-time channels.
//!
//! This module owns the live side of the service: the room registry, class
//! presence, event fan-out and the per-socket protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     CRUD layer / POST /internal/events              │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ publish(RealtimeEvent)
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    WebSocketEventBridge                              │
//! │   - Validates the payload                                           │
//! │   - Resolves target channels                                        │
//! │   - Notifies observers with the delivery report                     │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ deliver (one copy per connection)
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      RoomRegistry                                    │
//! │   class:CS101          chat:u1              announcements:global    │
//! │   ├── conn-a           ├── conn-a           ├── conn-c              │
//! │   └── conn-c           └── conn-b           └── conn-d              │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     ▲
//!                                     │ join / leave / drop (+ presence)
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │          ws_handler → ConnectionSession → PresenceTracker           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`rooms`] - Channel membership and delivery
//! - [`presence`] - Participant notices for class channels
//! - [`event_bridge`] - `EventPublisher` over the registry
//! - [`diagnostics`] - Event observers
//! - [`session`] - Client message dispatch
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod diagnostics;
pub mod event_bridge;
pub mod handler;
pub mod messages;
pub mod presence;
pub mod rooms;
pub mod session;

pub use diagnostics::{RecordedEvent, RecordingObserver, TracingObserver};
pub use event_bridge::WebSocketEventBridge;
pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::{
    ClientMessage, ConnectedMessage, ErrorMessage, JoinedMessage, LeftMessage, ParticipantNotice,
    PongMessage, ServerMessage,
};
pub use presence::PresenceTracker;
pub use rooms::{MemberContext, OutboundSender, RoomRegistry};
pub use session::ConnectionSession;
