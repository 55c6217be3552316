//! AuthenticateConnectionHandler - turns a connection credential into a principal.

use std::sync::Arc;

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::domain::realtime::RealtimeError;
use crate::ports::SessionValidator;

/// Credential presented when a client opens a connection.
#[derive(Debug, Clone, Default)]
pub struct AuthenticateConnectionCommand {
    pub token: Option<String>,
}

impl AuthenticateConnectionCommand {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

/// Handler for connection authentication.
///
/// Every failure is `Unauthenticated`; nothing is retried.
pub struct AuthenticateConnectionHandler {
    validator: Arc<dyn SessionValidator>,
}

impl AuthenticateConnectionHandler {
    pub fn new(validator: Arc<dyn SessionValidator>) -> Self {
        Self { validator }
    }

    pub async fn handle(
        &self,
        cmd: AuthenticateConnectionCommand,
    ) -> Result<AuthenticatedUser, RealtimeError> {
        let token = cmd
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RealtimeError::unauthenticated("missing credential"))?;

        self.validator.validate(token).await.map_err(|err| {
            if err.is_transient() {
                tracing::error!(error = %err, "auth provider unavailable, refusing connection");
            } else {
                tracing::debug!(error = %err, "connection credential rejected");
            }
            match err {
                AuthError::TokenExpired => RealtimeError::unauthenticated("credential expired"),
                AuthError::ServiceUnavailable(_) => {
                    RealtimeError::unauthenticated("credential could not be verified")
                }
                _ => RealtimeError::unauthenticated("invalid credential"),
            }
        })
    }
}
