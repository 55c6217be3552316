//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Inbound checks
//!
//! - `SessionValidator` - Bearer token to principal
//! - `EnrollmentChecker` - Course enrollment lookup for course channels
//!
//! ## Real-time
//!
//! - `RoomMembership` - Join, leave and disconnect against the room registry
//! - `EventPublisher` - Fan-out of domain events to channel members
//! - `EventObserver` - Opt-in tap on every published event

mod enrollment_checker;
mod event_observer;
mod event_publisher;
mod room_membership;
mod session_validator;

pub use enrollment_checker::{CourseAccess, CourseRole, EnrollmentChecker};
pub use event_observer::EventObserver;
pub use event_publisher::EventPublisher;
pub use room_membership::RoomMembership;
pub use session_validator::SessionValidator;
