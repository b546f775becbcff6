//! Calendar synchronizer: mirrors appointment actions onto the remote
//! calendar.
//!
//! Events are correlated by a literal `"Appointment ID: {id}"` tag embedded
//! in the event description; there is no local mapping table. Cancellation
//! therefore scans the full remote event list, acceptable while event
//! volume stays small.

use chrono::{NaiveDate, TimeDelta};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{CalendarApi, CalendarError, CalendarEvent, EventTime};
use crate::config;
use crate::models::Appointment;

/// Description tag used to find an event for an appointment later.
fn appointment_tag(id: &Uuid) -> String {
    format!("Appointment ID: {id}")
}

pub struct CalendarSync<A: CalendarApi> {
    api: A,
    calendar_id: String,
}

impl<A: CalendarApi> CalendarSync<A> {
    pub fn new(api: A, calendar_id: &str) -> Self {
        Self {
            api,
            calendar_id: calendar_id.to_string(),
        }
    }

    /// Push a freshly booked appointment to the remote calendar. Returns the
    /// remote event id. On failure the caller logs and moves on; the local
    /// appointment stands either way.
    pub fn on_create(
        &self,
        appointment: &Appointment,
        patient_name: &str,
        practitioner_name: &str,
    ) -> Result<String, CalendarError> {
        let start = appointment.start();
        let end = start + TimeDelta::minutes(appointment.duration.minutes());

        let event = CalendarEvent {
            id: None,
            summary: "Appointment".into(),
            description: format!(
                "Patient: {patient_name}, Practitioner: {practitioner_name}, {}",
                appointment_tag(&appointment.id)
            ),
            start: EventTime {
                date_time: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                time_zone: config::CALENDAR_TIME_ZONE.into(),
            },
            end: EventTime {
                date_time: end.format("%Y-%m-%dT%H:%M:%S").to_string(),
                time_zone: config::CALENDAR_TIME_ZONE.into(),
            },
        };

        let event_id = self
            .api
            .insert_event(&self.calendar_id, &event)
            .map_err(|e| {
                warn!(appointment = %appointment.id, error = %e, "calendar insert failed");
                e
            })?;
        info!(appointment = %appointment.id, event = %event_id, "calendar event created");
        Ok(event_id)
    }

    /// Remove the event tagged with this appointment id. Scans all remote
    /// events and deletes the first match. Returns false when no event
    /// carries the tag: not an error, the calendars have simply drifted.
    pub fn on_cancel(&self, appointment_id: &Uuid) -> Result<bool, CalendarError> {
        let tag = appointment_tag(appointment_id);
        let events = self.api.list_events(&self.calendar_id, None, None)?;

        for event in events {
            if event.description.contains(&tag) {
                if let Some(event_id) = event.id.as_deref() {
                    self.api.delete_event(&self.calendar_id, event_id)?;
                    info!(appointment = %appointment_id, event = event_id, "calendar event deleted");
                    return Ok(true);
                }
            }
        }

        info!(appointment = %appointment_id, "no calendar event found to delete");
        Ok(false)
    }

    /// Forwarding is a local-only annotation; the remote event keeps its
    /// original description. Logged so the gap stays visible.
    pub fn on_forward(&self, appointment: &Appointment) {
        debug!(
            appointment = %appointment.id,
            "appointment forwarded; remote calendar event left unchanged"
        );
    }

    /// Delete every event on the calendar, unconditionally, including
    /// events this system did not create. Admin-triggered paths only.
    /// Returns the number of events deleted; a second call over an empty
    /// calendar deletes nothing.
    pub fn clear_all(&self) -> Result<usize, CalendarError> {
        let events = self.api.list_events(&self.calendar_id, None, None)?;
        let mut deleted = 0;
        for event in &events {
            if let Some(event_id) = event.id.as_deref() {
                self.api.delete_event(&self.calendar_id, event_id)?;
                deleted += 1;
            }
        }
        info!(deleted, "cleared remote calendar");
        Ok(deleted)
    }

    /// A practitioner's events for one day, matched by the literal
    /// `"Practitioner: {name}"` fragment in the description. Feeds the
    /// staff schedule page.
    pub fn events_for_practitioner(
        &self,
        practitioner_name: &str,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let time_min = format!("{date}T00:00:00Z");
        let time_max = format!("{date}T23:59:59Z");
        let events =
            self.api
                .list_events(&self.calendar_id, Some(&time_min), Some(&time_max))?;

        let needle = format!("Practitioner: {practitioner_name}");
        Ok(events
            .into_iter()
            .filter(|e| e.description.contains(&needle))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Duration;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use std::cell::RefCell;

    /// In-memory calendar backend recording every call.
    struct MockCalendar {
        events: RefCell<Vec<CalendarEvent>>,
        next_id: RefCell<u32>,
        fail_inserts: bool,
    }

    impl MockCalendar {
        fn new() -> Self {
            Self {
                events: RefCell::new(Vec::new()),
                next_id: RefCell::new(1),
                fail_inserts: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_inserts: true,
                ..Self::new()
            }
        }

        fn event_count(&self) -> usize {
            self.events.borrow().len()
        }
    }

    impl CalendarApi for MockCalendar {
        fn list_events(
            &self,
            _calendar_id: &str,
            _time_min: Option<&str>,
            _time_max: Option<&str>,
        ) -> Result<Vec<CalendarEvent>, CalendarError> {
            Ok(self.events.borrow().clone())
        }

        fn insert_event(
            &self,
            _calendar_id: &str,
            event: &CalendarEvent,
        ) -> Result<String, CalendarError> {
            if self.fail_inserts {
                return Err(CalendarError::Remote {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            let id = format!("evt-{}", self.next_id.replace_with(|n| *n + 1));
            let mut stored = event.clone();
            stored.id = Some(id.clone());
            self.events.borrow_mut().push(stored);
            Ok(id)
        }

        fn delete_event(&self, _calendar_id: &str, event_id: &str) -> Result<(), CalendarError> {
            let mut events = self.events.borrow_mut();
            let before = events.len();
            events.retain(|e| e.id.as_deref() != Some(event_id));
            if events.len() == before {
                return Err(CalendarError::Remote {
                    status: 404,
                    body: "not found".into(),
                });
            }
            Ok(())
        }
    }

    fn appointment() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            practitioner_id: Uuid::new_v4(),
            price: Decimal::new(6000, 2),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration: Duration::TwentyMinutes,
            description: String::new(),
            is_paid: false,
            forward_reason: String::new(),
        }
    }

    #[test]
    fn create_builds_tagged_gmt_event() {
        let sync = CalendarSync::new(MockCalendar::new(), "primary");
        let appt = appointment();
        sync.on_create(&appt, "pat", "doc").unwrap();

        let events = sync.api.events.borrow();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.summary, "Appointment");
        assert_eq!(
            event.description,
            format!("Patient: pat, Practitioner: doc, Appointment ID: {}", appt.id)
        );
        assert_eq!(event.start.date_time, "2024-06-03T09:00:00");
        assert_eq!(event.end.date_time, "2024-06-03T09:20:00");
        assert_eq!(event.start.time_zone, "GMT");
    }

    #[test]
    fn create_failure_surfaces_error() {
        let sync = CalendarSync::new(MockCalendar::failing(), "primary");
        let result = sync.on_create(&appointment(), "pat", "doc");
        assert!(matches!(result, Err(CalendarError::Remote { status: 503, .. })));
    }

    #[test]
    fn cancel_deletes_first_matching_event_only() {
        let sync = CalendarSync::new(MockCalendar::new(), "primary");
        let appt = appointment();
        let other = appointment();
        sync.on_create(&appt, "pat", "doc").unwrap();
        sync.on_create(&other, "pat2", "doc").unwrap();

        assert!(sync.on_cancel(&appt.id).unwrap());
        assert_eq!(sync.api.event_count(), 1);
        // The surviving event belongs to the other appointment.
        assert!(sync.api.events.borrow()[0]
            .description
            .contains(&other.id.to_string()));
    }

    #[test]
    fn cancel_without_match_reports_not_found() {
        let sync = CalendarSync::new(MockCalendar::new(), "primary");
        sync.on_create(&appointment(), "pat", "doc").unwrap();

        assert!(!sync.on_cancel(&Uuid::new_v4()).unwrap());
        assert_eq!(sync.api.event_count(), 1);
    }

    #[test]
    fn clear_all_is_idempotent() {
        let sync = CalendarSync::new(MockCalendar::new(), "primary");
        sync.on_create(&appointment(), "pat", "doc").unwrap();
        sync.on_create(&appointment(), "pat2", "doc").unwrap();

        assert_eq!(sync.clear_all().unwrap(), 2);
        assert_eq!(sync.api.event_count(), 0);
        // Second pass over the now-empty calendar is a no-op.
        assert_eq!(sync.clear_all().unwrap(), 0);
        assert_eq!(sync.api.event_count(), 0);
    }

    #[test]
    fn practitioner_filter_matches_description() {
        let sync = CalendarSync::new(MockCalendar::new(), "primary");
        sync.on_create(&appointment(), "pat", "dr-jones").unwrap();
        sync.on_create(&appointment(), "pat2", "dr-smith").unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let events = sync.events_for_practitioner("dr-jones", date).unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].description.contains("dr-jones"));
    }

    #[test]
    fn forward_leaves_remote_untouched() {
        let sync = CalendarSync::new(MockCalendar::new(), "primary");
        let appt = appointment();
        sync.on_create(&appt, "pat", "doc").unwrap();
        let before = sync.api.events.borrow().clone();

        sync.on_forward(&appt);
        assert_eq!(*sync.api.events.borrow(), before);
    }
}
