//! Real-time layer configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

const MIN_INTERNAL_KEY_CHARS: usize = 16;

/// Socket protocol limits and the internal surface.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Key for `/internal/*`. Internal routes are not mounted without it.
    pub internal_api_key: Option<SecretString>,

    /// Log every published event and keep a recent-events buffer
    #[serde(default)]
    pub diagnostics_enabled: bool,

    /// Size of the recent-events buffer
    #[serde(default = "default_diagnostics_capacity")]
    pub diagnostics_capacity: usize,

    /// Largest accepted client text frame
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl RealtimeConfig {
    pub fn internal_routes_enabled(&self) -> bool {
        self.internal_api_key.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_frame_bytes == 0 || self.max_frame_bytes > 1024 * 1024 {
            return Err(ValidationError::InvalidFrameSize);
        }
        if let Some(key) = &self.internal_api_key {
            if key.expose_secret().chars().count() < MIN_INTERNAL_KEY_CHARS {
                return Err(ValidationError::InternalKeyTooShort);
            }
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            internal_api_key: None,
            diagnostics_enabled: false,
            diagnostics_capacity: default_diagnostics_capacity(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

fn default_diagnostics_capacity() -> usize {
    100
}

fn default_max_frame_bytes() -> usize {
    16 * 1024
}
