//! Enrollment adapters.
//!
//! Implementations of the `EnrollmentChecker` port:
//!
//! - `http` - LMS core REST API (production)
//! - `in_memory` - Roster table for tests and local development

mod http;
mod in_memory;

pub use http::HttpEnrollmentChecker;
pub use in_memory::InMemoryEnrollmentDirectory;
