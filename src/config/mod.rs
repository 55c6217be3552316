//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CAMPUS_REALTIME` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use campus_realtime::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod enrollment;
mod error;
mod realtime;
mod server;

pub use auth::AuthConfig;
pub use enrollment::EnrollmentConfig;
pub use error::{ConfigError, ValidationError};
pub use realtime::RealtimeConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CAMPUS_REALTIME";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration (OIDC issuer)
    #[serde(default)]
    pub auth: AuthConfig,

    /// Enrollment lookups (LMS core)
    #[serde(default)]
    pub enrollment: EnrollmentConfig,

    /// Socket limits, internal API and diagnostics
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CAMPUS_REALTIME` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CAMPUS_REALTIME__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CAMPUS_REALTIME__AUTH__ISSUER_URL=...` -> `auth.issuer_url = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - Bind address, timeouts and log filter
    /// - Issuer presence, HTTPS in production
    /// - Enrollment service required in production
    /// - Frame limit and internal key strength
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.enrollment.validate(&self.server.environment)?;
        self.realtime.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "CAMPUS_REALTIME__AUTH__ISSUER_URL",
        "CAMPUS_REALTIME__AUTH__AUDIENCE",
        "CAMPUS_REALTIME__SERVER__PORT",
        "CAMPUS_REALTIME__SERVER__ENVIRONMENT",
        "CAMPUS_REALTIME__SERVER__LOG_JSON",
        "CAMPUS_REALTIME__ENROLLMENT__BASE_URL",
        "CAMPUS_REALTIME__ENROLLMENT__SERVICE_KEY",
        "CAMPUS_REALTIME__REALTIME__INTERNAL_API_KEY",
        "CAMPUS_REALTIME__REALTIME__DIAGNOSTICS_ENABLED",
    ];

    fn set_minimal_env() {
        env::set_var("CAMPUS_REALTIME__AUTH__ISSUER_URL", "https://sso.campus.edu");
        env::set_var("CAMPUS_REALTIME__AUTH__AUDIENCE", "campus-realtime");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.auth.issuer_url, "https://sso.campus.edu");
        assert_eq!(config.auth.audience, "campus-realtime");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert!(!config.realtime.internal_routes_enabled());
    }

    #[test]
    fn test_nested_overrides() {
        let config = load_with(&[
            ("CAMPUS_REALTIME__SERVER__PORT", "3000"),
            ("CAMPUS_REALTIME__SERVER__LOG_JSON", "true"),
            ("CAMPUS_REALTIME__REALTIME__DIAGNOSTICS_ENABLED", "true"),
            (
                "CAMPUS_REALTIME__REALTIME__INTERNAL_API_KEY",
                "internal-key-0123456789",
            ),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert!(config.server.log_json);
        assert!(config.realtime.diagnostics_enabled);
        assert!(config.realtime.internal_routes_enabled());
    }

    #[test]
    fn test_production_requires_enrollment_service() {
        let config = load_with(&[("CAMPUS_REALTIME__SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::EnrollmentServiceRequired)
        );

        let config = load_with(&[
            ("CAMPUS_REALTIME__SERVER__ENVIRONMENT", "production"),
            ("CAMPUS_REALTIME__ENROLLMENT__BASE_URL", "https://lms.campus.edu"),
            ("CAMPUS_REALTIME__ENROLLMENT__SERVICE_KEY", "lms-key"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }
}
