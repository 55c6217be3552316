//! In-memory enrollment directory for tests and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, UserId};
use crate::ports::{CourseAccess, CourseRole, EnrollmentChecker};

/// Course roster table.
///
/// A course with no entry is reported as `CourseNotFound`; a known course
/// without the user is `NotEnrolled`.
#[derive(Debug, Default)]
pub struct InMemoryEnrollmentDirectory {
    courses: RwLock<HashMap<CourseId, HashMap<UserId, CourseRole>>>,
    unavailable: AtomicBool,
}

impl InMemoryEnrollmentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a course with an empty roster.
    pub fn with_course(mut self, course_id: CourseId) -> Self {
        self.courses.get_mut().entry(course_id).or_default();
        self
    }

    pub fn with_enrollment(mut self, course_id: CourseId, user_id: UserId, role: CourseRole) -> Self {
        self.courses
            .get_mut()
            .entry(course_id)
            .or_default()
            .insert(user_id, role);
        self
    }

    pub async fn enroll(&self, course_id: CourseId, user_id: UserId, role: CourseRole) {
        self.courses
            .write()
            .await
            .entry(course_id)
            .or_default()
            .insert(user_id, role);
    }

    pub async fn unenroll(&self, course_id: &CourseId, user_id: &UserId) {
        if let Some(roster) = self.courses.write().await.get_mut(course_id) {
            roster.remove(user_id);
        }
    }

    /// Makes every check fail, as if the LMS core were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl EnrollmentChecker for InMemoryEnrollmentDirectory {
    async fn check(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<CourseAccess, DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::ServiceUnavailable,
                "enrollment directory unavailable",
            ));
        }

        let courses = self.courses.read().await;
        let access = match courses.get(course_id) {
            None => CourseAccess::CourseNotFound,
            Some(roster) => roster
                .get(user_id)
                .map(|role| CourseAccess::Enrolled(*role))
                .unwrap_or(CourseAccess::NotEnrolled),
        };
        Ok(access)
    }
}
