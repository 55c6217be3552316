//! EventPublisher port - Interface for pushing real-time events to clients.
//!
//! The CRUD side of the platform (notification service, messaging, course
//! management) hands events to this port without knowing which sockets,
//! if any, are listening.

use async_trait::async_trait;

use crate::domain::realtime::{DeliveryReport, RealtimeError, RealtimeEvent};

/// Port for publishing real-time events.
///
/// Implementations must ensure:
/// - Delivery is best-effort and at-most-once per connection
/// - A connection in several target channels gets one copy
/// - Per-connection failures are counted in the report, never returned
///
/// # Example
///
/// ```ignore
/// let report = publisher.publish(RealtimeEvent::NewMessage(payload)).await?;
/// tracing::debug!(delivered = report.delivered, "message pushed");
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver one event to every live member of its target channels.
    ///
    /// Only invalid events produce an error.
    async fn publish(&self, event: RealtimeEvent) -> Result<DeliveryReport, RealtimeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventPublisher) {}

    #[test]
    fn event_publisher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn EventPublisher>();
    }
}
