//! Enrollment service configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Where course rosters come from.
///
/// Without `base_url` the service falls back to an empty in-memory
/// directory, which is only allowed outside production.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentConfig {
    /// LMS core base URL, e.g. `https://lms.campus.edu`
    pub base_url: Option<String>,

    /// Bearer key presented to the LMS core
    pub service_key: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl EnrollmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_remote(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        match &self.base_url {
            Some(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ValidationError::InvalidEnrollmentUrl);
                }
                if self.service_key.is_none() {
                    return Err(ValidationError::MissingRequired("ENROLLMENT__SERVICE_KEY"));
                }
            }
            None if *environment == Environment::Production => {
                return Err(ValidationError::EnrollmentServiceRequired);
            }
            None => {}
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            service_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
