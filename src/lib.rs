//! Campus Realtime - live channels for the campus learning platform
//!
//! This crate authenticates WebSocket connections, tracks channel membership
//! and class presence, and fans out domain events from the CRUD services to
//! the connections subscribed to them.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;
