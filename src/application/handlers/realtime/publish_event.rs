//! PublishEventHandler - entry point for the CRUD side to push an event.

use std::sync::Arc;

use crate::domain::realtime::{DeliveryReport, RealtimeError, RealtimeEvent};
use crate::ports::EventPublisher;

/// Publishes one event and logs what it reached.
///
/// Invalid events are rejected with `ValidationFailed`; delivery problems
/// never surface here.
pub struct PublishEventHandler {
    publisher: Arc<dyn EventPublisher>,
}

impl PublishEventHandler {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    pub async fn handle(&self, event: RealtimeEvent) -> Result<DeliveryReport, RealtimeError> {
        let event_type = event.event_type();

        match self.publisher.publish(event).await {
            Ok(report) => {
                tracing::debug!(
                    event_type,
                    recipients = report.recipients,
                    delivered = report.delivered,
                    failed = report.failed,
                    "event published"
                );
                Ok(report)
            }
            Err(err) => {
                tracing::warn!(event_type, error = %err, "event rejected");
                Err(err)
            }
        }
    }
}
