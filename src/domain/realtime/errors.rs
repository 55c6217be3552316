//! Real-time error taxonomy.

use thiserror::Error;

use crate::domain::foundation::{ConnectionId, ErrorCode, ValidationError};

/// Errors reported to the originating client.
///
/// None of these are fatal to the server process; they are sent back as an
/// `error` event (or an HTTP error body) and the connection stays open,
/// except for `Unauthenticated` which refuses the connection outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RealtimeError {
    /// Bad, missing or expired credential at connect time.
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Authenticated but not allowed on the requested channel.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The entity a channel is keyed by does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A client message or event payload failed validation.
    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// The connection is no longer registered.
    #[error("Connection {0} is closed")]
    ConnectionClosed(ConnectionId),
}

impl RealtimeError {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        RealtimeError::Unauthenticated(reason.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        RealtimeError::Forbidden(reason.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        RealtimeError::NotFound(what.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RealtimeError::Unauthenticated(_) => ErrorCode::Unauthenticated,
            RealtimeError::Forbidden(_) => ErrorCode::Forbidden,
            RealtimeError::NotFound(_) => ErrorCode::CourseNotFound,
            RealtimeError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            RealtimeError::ConnectionClosed(_) => ErrorCode::ConnectionClosed,
        }
    }
}

impl From<ValidationError> for RealtimeError {
    fn from(err: ValidationError) -> Self {
        RealtimeError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_taxonomy() {
        assert_eq!(
            RealtimeError::unauthenticated("missing token").code().as_str(),
            "UNAUTHENTICATED"
        );
        assert_eq!(RealtimeError::forbidden("x").code().as_str(), "FORBIDDEN");
        assert_eq!(RealtimeError::not_found("course").code().as_str(), "NOT_FOUND");
        assert_eq!(
            RealtimeError::from(ValidationError::empty_field("title"))
                .code()
                .as_str(),
            "VALIDATION_FAILED"
        );
    }

    #[test]
    fn validation_error_converts_with_field() {
        let err: RealtimeError = ValidationError::empty_field("course_id").into();
        match err {
            RealtimeError::ValidationFailed { field, message } => {
                assert_eq!(field, "course_id");
                assert!(message.contains("cannot be empty"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn display_includes_reason() {
        let err = RealtimeError::forbidden("not enrolled in CS101");
        assert_eq!(err.to_string(), "Forbidden: not enrolled in CS101");
    }
}
