//! ChannelAuthorizer - decides whether a principal may join or inspect a channel.
//!
//! ```text
//! notifications:<u> / chat:<u>      only u
//! class:<c> / announcements:<c>     enrolled in c (student or instructor)
//! announcements:global              anyone authenticated
//! ```

use std::sync::Arc;

use crate::domain::foundation::AuthenticatedUser;
use crate::domain::realtime::{ChannelName, RealtimeError};
use crate::ports::{CourseAccess, EnrollmentChecker};

/// Authorization for channel access. Fail-secure on lookup errors.
#[derive(Clone)]
pub struct ChannelAuthorizer {
    enrollment: Arc<dyn EnrollmentChecker>,
}

impl ChannelAuthorizer {
    pub fn new(enrollment: Arc<dyn EnrollmentChecker>) -> Self {
        Self { enrollment }
    }

    pub async fn authorize(
        &self,
        user: &AuthenticatedUser,
        channel: &ChannelName,
    ) -> Result<(), RealtimeError> {
        if let Some(owner) = channel.owner() {
            return if owner == &user.id {
                Ok(())
            } else {
                Err(RealtimeError::forbidden(format!(
                    "{} belongs to another user",
                    channel
                )))
            };
        }

        let Some(course_id) = channel.course() else {
            // Global announcements are open to every authenticated user.
            return Ok(());
        };
        match self.enrollment.check(&user.id, course_id).await {
            Ok(CourseAccess::Enrolled(_)) => Ok(()),
            Ok(CourseAccess::NotEnrolled) => Err(RealtimeError::forbidden(format!(
                "not enrolled in {}",
                course_id
            ))),
            Ok(CourseAccess::CourseNotFound) => {
                Err(RealtimeError::not_found(format!("course {}", course_id)))
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %user.id,
                    course_id = %course_id,
                    error = %err,
                    "enrollment check failed, denying access"
                );
                Err(RealtimeError::forbidden("enrollment could not be verified"))
            }
        }
    }
}
