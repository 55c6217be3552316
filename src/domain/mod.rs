//! Domain layer containing the real-time vocabulary.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, auth, errors)
//! - `realtime` - Channels, connection lifecycle, events and delivery results

pub mod foundation;
pub mod realtime;
