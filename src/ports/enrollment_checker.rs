//! Enrollment port for course-scoped channel access.
//!
//! Class rooms and course announcements are only open to people enrolled in
//! the course (students and instructors alike). The course catalogue lives in
//! the LMS core service; this port asks it.
//!
//! # Design
//!
//! Callers follow a **fail-secure** rule: when the check itself errors, the
//! join is refused. Only `CourseNotFound` is reported differently, so clients
//! can tell a typo from a missing enrollment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, DomainError, UserId};

/// Role a user holds in a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseRole {
    Student,
    Instructor,
}

/// Answer to "may this user see this course?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseAccess {
    Enrolled(CourseRole),
    NotEnrolled,
    CourseNotFound,
}

impl CourseAccess {
    pub fn is_enrolled(&self) -> bool {
        matches!(self, CourseAccess::Enrolled(_))
    }
}

/// Port for looking up course enrollment.
#[async_trait]
pub trait EnrollmentChecker: Send + Sync {
    /// Returns the user's standing in the course.
    ///
    /// `Err` means the answer is unknown (service down, bad response).
    async fn check(&self, user_id: &UserId, course_id: &CourseId)
        -> Result<CourseAccess, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_enrolled_counts_as_enrolled() {
        assert!(CourseAccess::Enrolled(CourseRole::Student).is_enrolled());
        assert!(CourseAccess::Enrolled(CourseRole::Instructor).is_enrolled());
        assert!(!CourseAccess::NotEnrolled.is_enrolled());
        assert!(!CourseAccess::CourseNotFound.is_enrolled());
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CourseRole::Instructor).unwrap(),
            "\"instructor\""
        );
        let role: CourseRole = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, CourseRole::Student);
    }

    #[test]
    fn enrollment_checker_is_object_safe() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn EnrollmentChecker>();
    }
}
