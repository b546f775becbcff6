//! HTTP client for the remote calendar REST API.
//!
//! Speaks the Google Calendar v3 event surface (list/insert/delete on
//! `/calendars/{id}/events`). Authorization is a bearer token supplied by
//! the caller; token lifecycle lives outside this crate. Every request
//! carries a bounded timeout so a remote hang cannot block a clinic request
//! indefinitely.

use serde::Deserialize;

use super::{CalendarApi, CalendarError, CalendarEvent};

pub struct RestCalendarClient {
    base_url: String,
    token: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl RestCalendarClient {
    pub fn new(base_url: &str, token: &str, timeout_secs: u64) -> Result<Self, CalendarError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CalendarError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Client for the hosted calendar service with the default timeout.
    pub fn with_defaults(token: &str) -> Result<Self, CalendarError> {
        Self::new(
            crate::config::CALENDAR_BASE_URL,
            token,
            crate::config::CALENDAR_TIMEOUT_SECS,
        )
    }

    fn map_transport_error(&self, e: reqwest::Error) -> CalendarError {
        if e.is_connect() {
            CalendarError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            CalendarError::Timeout(self.timeout_secs)
        } else {
            CalendarError::Http(e.to_string())
        }
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, CalendarError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CalendarError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Response body for the event list endpoint.
#[derive(Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

/// Response body for event insertion.
#[derive(Deserialize)]
struct InsertedEvent {
    id: String,
}

impl CalendarApi for RestCalendarClient {
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: Option<&str>,
        time_max: Option<&str>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let url = format!("{}/calendars/{calendar_id}/events", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
            ("maxResults", "100"),
        ];
        if let Some(min) = time_min {
            query.push(("timeMin", min));
        }
        if let Some(max) = time_max {
            query.push(("timeMax", max));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let body: EventListResponse = Self::check_status(response)?
            .json()
            .map_err(|e| CalendarError::Http(e.to_string()))?;
        Ok(body.items)
    }

    fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<String, CalendarError> {
        let url = format!("{}/calendars/{calendar_id}/events", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(event)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let body: InsertedEvent = Self::check_status(response)?
            .json()
            .map_err(|e| CalendarError::Http(e.to_string()))?;
        Ok(body.id)
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), CalendarError> {
        let url = format!(
            "{}/calendars/{calendar_id}/events/{event_id}",
            self.base_url
        );

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        Self::check_status(response)?;
        Ok(())
    }
}
