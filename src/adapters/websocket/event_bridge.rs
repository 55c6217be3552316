//! Event fan-out from the CRUD layer to WebSocket clients.
//!
//! # Event Flow
//!
//! ```text
//! RealtimeEvent published
//!          │
//!          ▼
//! ┌────────────────────┐
//! │  validate payload  │──► ValidationFailed (nothing delivered)
//! └────────────────────┘
//!          │
//!          ▼
//! ┌────────────────────┐
//! │  resolve channels  │   notifications:<u> │ chat:<u> │ class:<c>
//! └────────────────────┘   announcements:<c> + announcements:global
//!          │
//!          ▼
//! ┌────────────────────┐
//! │  deliver once per  │
//! │  live connection   │
//! └────────────────────┘
//!          │
//!          ▼
//! ┌────────────────────┐
//! │  notify observers  │
//! └────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::realtime::{DeliveryReport, RealtimeError, RealtimeEvent};
use crate::ports::{EventObserver, EventPublisher};

use super::messages::ServerMessage;
use super::rooms::RoomRegistry;

/// Publishes events to the members of their target channels.
pub struct WebSocketEventBridge {
    registry: Arc<RoomRegistry>,
    observers: Vec<Arc<dyn EventObserver>>,
}

impl WebSocketEventBridge {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self {
            registry,
            observers: Vec::new(),
        }
    }

    /// Adds an observer that sees every successful publish.
    pub fn with_observer(mut self, observer: Arc<dyn EventObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

#[async_trait]
impl EventPublisher for WebSocketEventBridge {
    async fn publish(&self, event: RealtimeEvent) -> Result<DeliveryReport, RealtimeError> {
        event.validate()?;

        let channels = event.target_channels();
        let message = ServerMessage::from(event.clone());
        let report = self.registry.deliver(&channels, &message).await;

        for observer in &self.observers {
            observer.on_published(&event, &report).await;
        }

        Ok(report)
    }
}
