//! Real-time HTTP endpoints.
//!
//! Health, presence queries and the internal publish entry point.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, HealthResponse, PublishAcceptedResponse, RecentEventsResponse};
pub use handlers::{
    get_presence, health, publish_event, recent_events, RealtimeApiError, RealtimeAppState,
};
pub use routes::{health_routes, internal_routes, presence_routes};
