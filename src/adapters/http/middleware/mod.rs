//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `auth` - Bearer-token authentication and extractors
//! - `service_key` - Shared-key guard for internal endpoints

pub mod auth;
pub mod service_key;

pub use auth::{auth_middleware, AuthRejection, AuthState, RequireAuth};
pub use service_key::{service_key_middleware, ServiceKeyState};
