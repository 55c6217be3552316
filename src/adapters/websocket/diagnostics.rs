//! Event observers for diagnostics.
//!
//! - [`TracingObserver`] writes one structured log line per published event.
//! - [`RecordingObserver`] keeps the last N events and reports in memory,
//!   served by `GET /internal/diagnostics/events`.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::domain::foundation::Timestamp;
use crate::domain::realtime::{DeliveryReport, RealtimeEvent};
use crate::ports::EventObserver;

/// Logs every publish at info, or debug when nobody was listening.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

#[async_trait]
impl EventObserver for TracingObserver {
    async fn on_published(&self, event: &RealtimeEvent, report: &DeliveryReport) {
        let channels: Vec<String> = report.channels.iter().map(ToString::to_string).collect();
        if report.is_noop() {
            tracing::debug!(
                event_type = event.event_type(),
                channels = ?channels,
                "event published with no live recipients"
            );
        } else {
            tracing::info!(
                event_type = event.event_type(),
                channels = ?channels,
                recipients = report.recipients,
                delivered = report.delivered,
                failed = report.failed,
                "event published"
            );
        }
    }

    fn name(&self) -> &'static str {
        "TracingObserver"
    }
}

/// One entry in the recent-events buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedEvent {
    pub event: RealtimeEvent,
    pub report: DeliveryReport,
    pub published_at: Timestamp,
}

/// Bounded in-memory buffer of recent publishes, oldest evicted first.
#[derive(Debug)]
pub struct RecordingObserver {
    capacity: usize,
    events: Mutex<VecDeque<RecordedEvent>>,
}

impl RecordingObserver {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Recorded events, newest first.
    pub async fn recent(&self) -> Vec<RecordedEvent> {
        self.events.lock().await.iter().rev().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

#[async_trait]
impl EventObserver for RecordingObserver {
    async fn on_published(&self, event: &RealtimeEvent, report: &DeliveryReport) {
        if self.capacity == 0 {
            return;
        }
        let mut events = self.events.lock().await;
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(RecordedEvent {
            event: event.clone(),
            report: report.clone(),
            published_at: Timestamp::now(),
        });
    }

    fn name(&self) -> &'static str {
        "RecordingObserver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CourseId, UserId};
    use crate::domain::realtime::{ClassStatus, ClassUpdatePayload, NotificationPayload};

    fn notification(id: &str) -> RealtimeEvent {
        RealtimeEvent::NewNotification(NotificationPayload {
            id: id.to_string(),
            recipient_id: UserId::new("u").unwrap(),
            title: "Grade posted".to_string(),
            message: "Quiz 3".to_string(),
            category: None,
            link: None,
            created_at: Timestamp::now(),
        })
    }

    #[tokio::test]
    async fn recording_observer_keeps_newest_first() {
        let observer = RecordingObserver::new(10);
        let report = DeliveryReport::default();

        observer.on_published(&notification("n1"), &report).await;
        observer.on_published(&notification("n2"), &report).await;

        let recent = observer.recent().await;
        assert_eq!(recent.len(), 2);
        assert!(matches!(&recent[0].event, RealtimeEvent::NewNotification(n) if n.id == "n2"));
    }

    #[tokio::test]
    async fn recording_observer_evicts_oldest() {
        let observer = RecordingObserver::new(2);
        let report = DeliveryReport::default();

        for id in ["n1", "n2", "n3"] {
            observer.on_published(&notification(id), &report).await;
        }

        let ids: Vec<String> = observer
            .recent()
            .await
            .into_iter()
            .map(|r| match r.event {
                RealtimeEvent::NewNotification(n) => n.id,
                other => panic!("unexpected event: {:?}", other),
            })
            .collect();
        assert_eq!(ids, vec!["n3", "n2"]);
    }

    #[tokio::test]
    async fn zero_capacity_records_nothing() {
        let observer = RecordingObserver::new(0);
        observer
            .on_published(&notification("n1"), &DeliveryReport::default())
            .await;
        assert_eq!(observer.len().await, 0);
    }

    #[tokio::test]
    async fn tracing_observer_accepts_any_event() {
        let event = RealtimeEvent::ClassUpdate(ClassUpdatePayload {
            course_id: CourseId::new("CS101").unwrap(),
            status: ClassStatus::Live,
            details: serde_json::Value::Null,
            updated_at: Timestamp::now(),
        });
        TracingObserver.on_published(&event, &DeliveryReport::default()).await;
        assert_eq!(TracingObserver.name(), "TracingObserver");
    }

    #[test]
    fn recorded_event_serializes_event_tag() {
        let recorded = RecordedEvent {
            event: notification("n1"),
            report: DeliveryReport::default(),
            published_at: Timestamp::now(),
        };
        let json = serde_json::to_value(&recorded).unwrap();
        assert_eq!(json["event"]["type"], "new:notification");
        assert!(json.get("publishedAt").is_some());
    }
}
