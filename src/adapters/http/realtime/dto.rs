//! Data Transfer Objects for the real-time HTTP endpoints.
//!
//! Presence views and delivery reports already serialize in wire shape, so
//! only the envelopes live here.

use serde::Serialize;

use crate::adapters::websocket::RecordedEvent;
use crate::domain::realtime::DeliveryReport;

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// `GET /health`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub connections: usize,
    pub channels: usize,
}

/// `POST /internal/events` (202)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublishAcceptedResponse {
    pub event_type: String,
    pub report: DeliveryReport,
}

/// `GET /internal/diagnostics/events`
#[derive(Debug, Clone, Serialize)]
pub struct RecentEventsResponse {
    pub events: Vec<RecordedEvent>,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::realtime::ChannelName;

    #[test]
    fn error_response_omits_empty_details() {
        let json = serde_json::to_string(&ErrorResponse::new("NOT_FOUND", "course CS9")).unwrap();
        assert!(!json.contains("details"));
        assert!(json.contains("\"error_code\":\"NOT_FOUND\""));
    }

    #[test]
    fn error_response_keeps_details() {
        let details = serde_json::json!({"field": "title"});
        let response = ErrorResponse::with_details("VALIDATION_FAILED", "empty", details.clone());
        assert_eq!(response.details, Some(details));
    }

    #[test]
    fn publish_accepted_nests_report() {
        let response = PublishAcceptedResponse {
            event_type: "new:announcement".to_string(),
            report: DeliveryReport {
                channels: vec![ChannelName::GlobalAnnouncements],
                recipients: 3,
                delivered: 3,
                failed: 0,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["eventType"], "new:announcement");
        assert_eq!(json["report"]["delivered"], 3);
        assert_eq!(json["report"]["channels"][0], "announcements:global");
    }
}
