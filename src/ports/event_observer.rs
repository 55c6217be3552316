//! EventObserver port - opt-in tap on every published event.
//!
//! Used for diagnostics (structured log lines, a bounded recent-events
//! buffer). Observers run after delivery and cannot influence it.

use async_trait::async_trait;

use crate::domain::realtime::{DeliveryReport, RealtimeEvent};

/// Receives a copy of each published event together with its delivery report.
#[async_trait]
pub trait EventObserver: Send + Sync {
    /// Called once per publish, after fan-out finished.
    async fn on_published(&self, event: &RealtimeEvent, report: &DeliveryReport);

    /// Observer name for logging.
    fn name(&self) -> &'static str;
}
