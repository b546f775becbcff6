//! Remote calendar integration.
//!
//! The appointment table is the system of record; the remote calendar is a
//! best-effort mirror. Sync failures are logged and swallowed by callers,
//! local state is never rolled back, and the remote is never read back to
//! validate a booking.

pub mod client;
pub mod sync;

pub use client::RestCalendarClient;
pub use sync::CalendarSync;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event timestamp as the remote API represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

/// Remote calendar event. `id` is assigned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
}

/// Narrow client surface over the remote calendar API. Token acquisition
/// and refresh belong to the caller; implementations only need an
/// already-authorized handle.
pub trait CalendarApi {
    /// List events, optionally bounded to [time_min, time_max] (RFC 3339).
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: Option<&str>,
        time_max: Option<&str>,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;

    /// Insert an event; returns the remote event id.
    fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<String, CalendarError>;

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), CalendarError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_uses_remote_field_names() {
        let event = CalendarEvent {
            id: None,
            summary: "Appointment".into(),
            description: "Patient: pat, Practitioner: doc, Appointment ID: abc".into(),
            start: EventTime {
                date_time: "2024-06-03T09:00:00".into(),
                time_zone: "GMT".into(),
            },
            end: EventTime {
                date_time: "2024-06-03T09:20:00".into(),
                time_zone: "GMT".into(),
            },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["start"]["dateTime"], "2024-06-03T09:00:00");
        assert_eq!(json["start"]["timeZone"], "GMT");
        // Unassigned ids stay off the wire.
        assert!(json.get("id").is_none());
    }

    #[test]
    fn event_list_item_parses_without_description() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{
                "id": "evt-1",
                "summary": "Team meeting",
                "start": {"dateTime": "2024-06-03T13:00:00", "timeZone": "GMT"},
                "end": {"dateTime": "2024-06-03T14:00:00", "timeZone": "GMT"}
            }"#,
        )
        .unwrap();
        assert_eq!(event.id.as_deref(), Some("evt-1"));
        assert_eq!(event.description, "");
    }
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("cannot reach calendar service at {0}")]
    Connection(String),

    #[error("calendar request timed out after {0}s")]
    Timeout(u64),

    #[error("calendar service returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),
}
