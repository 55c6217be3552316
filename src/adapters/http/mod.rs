//! HTTP adapters - REST API implementations.
//!
//! - `middleware` - Bearer-token and service-key guards
//! - `realtime` - Health, presence and internal publish endpoints

pub mod middleware;
pub mod realtime;

// Re-export key types for convenience
pub use realtime::{ErrorResponse, RealtimeAppState};
