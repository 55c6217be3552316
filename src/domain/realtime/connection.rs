//! Connection lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AuthenticatedUser, ConnectionId, StateMachine, Timestamp, ValidationError,
};

/// Lifecycle state of one client connection.
///
/// ```text
/// Connecting ──► Authenticated ──► Disconnected
///      └──────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Authenticated,
    Disconnected,
}

impl StateMachine for ConnectionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Connecting, Authenticated) | (Connecting, Disconnected) | (Authenticated, Disconnected)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            Connecting => vec![Authenticated, Disconnected],
            Authenticated => vec![Disconnected],
            Disconnected => vec![],
        }
    }
}

/// Server-side record of a connection's identity and lifecycle.
#[derive(Debug, Clone)]
pub struct ConnectionLifecycle {
    id: ConnectionId,
    state: ConnectionState,
    principal: Option<AuthenticatedUser>,
    opened_at: Timestamp,
}

impl ConnectionLifecycle {
    /// A freshly accepted transport, not yet authenticated.
    pub fn connecting() -> Self {
        Self {
            id: ConnectionId::new(),
            state: ConnectionState::Connecting,
            principal: None,
            opened_at: Timestamp::now(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn principal(&self) -> Option<&AuthenticatedUser> {
        self.principal.as_ref()
    }

    pub fn opened_at(&self) -> Timestamp {
        self.opened_at
    }

    /// Attaches the principal once the credential has been accepted.
    pub fn authenticate(&mut self, user: AuthenticatedUser) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(ConnectionState::Authenticated)?;
        self.principal = Some(user);
        Ok(())
    }

    /// Moves to the terminal state. Disconnecting twice is rejected.
    pub fn disconnect(&mut self) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(ConnectionState::Disconnected)?;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Authenticated
    }
}
