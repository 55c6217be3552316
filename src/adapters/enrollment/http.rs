//! HTTP enrollment client against the LMS core service.
//!
//! ```text
//! GET {base_url}/api/courses/{courseId}/enrollments/{userId}
//! Authorization: Bearer <service key>
//!
//! 200 {"enrolled": true, "role": "student"}   -> Enrolled(Student)
//! 200 {"enrolled": false}                     -> NotEnrolled
//! 404                                         -> CourseNotFound
//! anything else                               -> Err
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, UserId};
use crate::ports::{CourseAccess, CourseRole, EnrollmentChecker};

#[derive(Debug, Deserialize)]
struct EnrollmentResponse {
    enrolled: bool,
    #[serde(default)]
    role: Option<CourseRole>,
}

/// `EnrollmentChecker` backed by the LMS core REST API.
///
/// Course and user ids are pushed as percent-encoded path segments, so an
/// id can never address another resource on the LMS host.
pub struct HttpEnrollmentChecker {
    base_url: Url,
    service_key: SecretString,
    client: reqwest::Client,
}

impl HttpEnrollmentChecker {
    pub fn new(
        base_url: impl Into<String>,
        service_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?;

        let base_url = Url::parse(&base_url.into())
            .map_err(|e| DomainError::new(ErrorCode::InternalError, format!("bad base url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "enrollment base url cannot carry a path",
            ));
        }

        Ok(Self {
            base_url,
            service_key,
            client,
        })
    }

    fn enrollment_url(&self, user_id: &UserId, course_id: &CourseId) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "api",
                "courses",
                course_id.as_str(),
                "enrollments",
                user_id.as_str(),
            ]);
        }
        url
    }
}

#[async_trait]
impl EnrollmentChecker for HttpEnrollmentChecker {
    async fn check(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<CourseAccess, DomainError> {
        let unavailable = |message: String| {
            DomainError::new(ErrorCode::ServiceUnavailable, message)
                .with_detail("course_id", course_id.as_str())
        };

        let response = self
            .client
            .get(self.enrollment_url(user_id, course_id))
            .bearer_auth(self.service_key.expose_secret())
            .send()
            .await
            .map_err(|e| unavailable(format!("enrollment request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(CourseAccess::CourseNotFound),
            status if status.is_success() => {
                let body: EnrollmentResponse = response
                    .json()
                    .await
                    .map_err(|e| unavailable(format!("bad enrollment response: {}", e)))?;

                Ok(match (body.enrolled, body.role) {
                    (true, Some(role)) => CourseAccess::Enrolled(role),
                    (true, None) => CourseAccess::Enrolled(CourseRole::Student),
                    (false, _) => CourseAccess::NotEnrolled,
                })
            }
            status => Err(unavailable(format!(
                "enrollment service returned {}",
                status
            ))),
        }
    }
}

impl std::fmt::Debug for HttpEnrollmentChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEnrollmentChecker")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::get,
        Json, Router,
    };
    use serde_json::json;

    async fn roster(
        Path((course_id, user_id)): Path<(String, String)>,
        headers: HeaderMap,
    ) -> Result<Json<serde_json::Value>, AxumStatus> {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer svc-key") {
            return Err(AxumStatus::UNAUTHORIZED);
        }
        match (course_id.as_str(), user_id.as_str()) {
            ("CS101", "prof") => Ok(Json(json!({"enrolled": true, "role": "instructor"}))),
            ("CS101", "legacy") => Ok(Json(json!({"enrolled": true}))),
            ("CS101", _) => Ok(Json(json!({"enrolled": false}))),
            ("BROKEN", _) => Err(AxumStatus::INTERNAL_SERVER_ERROR),
            _ => Err(AxumStatus::NOT_FOUND),
        }
    }

    async fn spawn_lms(key: &str) -> HttpEnrollmentChecker {
        let app = Router::new().route("/api/courses/:course_id/enrollments/:user_id", get(roster));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        HttpEnrollmentChecker::new(
            format!("http://{}/", addr),
            SecretString::new(key.to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn course(id: &str) -> CourseId {
        CourseId::new(id).unwrap()
    }

    #[tokio::test]
    async fn maps_enrolled_role() {
        let checker = spawn_lms("svc-key").await;

        let access = checker.check(&user("prof"), &course("CS101")).await.unwrap();

        assert_eq!(access, CourseAccess::Enrolled(CourseRole::Instructor));
    }

    #[tokio::test]
    async fn missing_role_defaults_to_student() {
        let checker = spawn_lms("svc-key").await;

        let access = checker.check(&user("legacy"), &course("CS101")).await.unwrap();

        assert_eq!(access, CourseAccess::Enrolled(CourseRole::Student));
    }

    #[tokio::test]
    async fn maps_not_enrolled_and_not_found() {
        let checker = spawn_lms("svc-key").await;

        assert_eq!(
            checker.check(&user("stranger"), &course("CS101")).await.unwrap(),
            CourseAccess::NotEnrolled
        );
        assert_eq!(
            checker.check(&user("stranger"), &course("NOPE1")).await.unwrap(),
            CourseAccess::CourseNotFound
        );
    }

    #[tokio::test]
    async fn server_errors_and_bad_keys_are_errors() {
        let checker = spawn_lms("svc-key").await;
        let err = checker.check(&user("u"), &course("BROKEN")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);

        let wrong_key = spawn_lms("other-key").await;
        assert!(wrong_key.check(&user("prof"), &course("CS101")).await.is_err());
    }

    #[test]
    fn url_has_no_double_slash() {
        let checker = HttpEnrollmentChecker::new(
            "https://lms.campus.edu/",
            SecretString::new("k".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            checker.enrollment_url(&user("u1"), &course("CS101")).as_str(),
            "https://lms.campus.edu/api/courses/CS101/enrollments/u1"
        );
    }

    #[test]
    fn ids_are_encoded_as_single_segments() {
        let checker = HttpEnrollmentChecker::new(
            "https://lms.campus.edu/core",
            SecretString::new("k".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();

        let url = checker.enrollment_url(&user("oidc-42/../x?y#z"), &course("CS101"));

        assert_eq!(
            url.path(),
            "/core/api/courses/CS101/enrollments/oidc-42%2F..%2Fx%3Fy%23z"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[tokio::test]
    async fn user_id_cannot_redirect_lookup_to_another_user() {
        let checker = spawn_lms("svc-key").await;

        let access = checker
            .check(&user("stranger/../../CS101/enrollments/prof#"), &course("CS101"))
            .await
            .unwrap();

        assert_eq!(access, CourseAccess::NotEnrolled);
    }

    #[test]
    fn rejects_unusable_base_url() {
        for base in ["not a url", "mailto:lms@campus.edu"] {
            assert!(HttpEnrollmentChecker::new(
                base,
                SecretString::new("k".to_string()),
                Duration::from_secs(1),
            )
            .is_err());
        }
    }
}
