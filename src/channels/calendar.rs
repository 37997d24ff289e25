//! Google Calendar scheduler over the REST API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::channels::{EventRecord, EventRequest, Scheduler};
use crate::error::SchedulerError;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Creates events (with a Meet conference) on one calendar.
pub struct GoogleCalendar {
    base_url: String,
    calendar_id: String,
    token: SecretString,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventResponse {
    id: String,
    #[serde(default)]
    html_link: Option<String>,
    #[serde(default)]
    hangout_link: Option<String>,
}

impl GoogleCalendar {
    pub fn new(
        base_url: impl Into<String>,
        calendar_id: impl Into<String>,
        token: SecretString,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            calendar_id: calendar_id.into(),
            token,
            client: reqwest::Client::new(),
        }
    }
}

/// Calendar API event resource for a request.
fn event_body(request: &EventRequest) -> serde_json::Value {
    let time_format = "%Y-%m-%dT%H:%M:%S";
    serde_json::json!({
        "summary": request.summary,
        "location": request.location,
        "description": request.description,
        "start": {
            "dateTime": request.start.format(time_format).to_string(),
            "timeZone": request.timezone,
        },
        "end": {
            "dateTime": request.end.format(time_format).to_string(),
            "timeZone": request.timezone,
        },
        "attendees": request
            .attendees
            .iter()
            .map(|email| serde_json::json!({ "email": email }))
            .collect::<Vec<_>>(),
        "reminders": {
            "useDefault": false,
            "overrides": request.reminders,
        },
        "conferenceData": {
            "createRequest": {
                "requestId": request.idempotency_token,
                "conferenceSolutionKey": { "type": "hangoutsMeet" },
            }
        },
    })
}

#[async_trait]
impl Scheduler for GoogleCalendar {
    async fn create_event(&self, request: &EventRequest) -> Result<EventRecord, SchedulerError> {
        tracing::info!(
            summary = %request.summary,
            start = %request.start,
            "Scheduling calendar event"
        );

        let resp = self
            .client
            .post(format!(
                "{}/calendars/{}/events",
                self.base_url, self.calendar_id
            ))
            .bearer_auth(self.token.expose_secret())
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .json(&event_body(request))
            .send()
            .await
            .map_err(|e| SchedulerError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SchedulerError::Api { status, body });
        }

        let event: EventResponse = resp
            .json()
            .await
            .map_err(|e| SchedulerError::InvalidResponse(e.to_string()))?;

        tracing::info!(event = %event.id, meet = ?event.hangout_link, "Event created");
        Ok(EventRecord {
            id: event.id,
            html_link: event.html_link,
            meet_link: event.hangout_link,
        })
    }
}
