//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Session validation (OIDC, mock)
//! - `enrollment` - Course roster lookups (LMS core, in-memory)
//! - `websocket` - Room registry, presence, fan-out and the socket protocol
//! - `http` - Health, presence and internal endpoints

pub mod auth;
pub mod enrollment;
pub mod http;
pub mod websocket;
