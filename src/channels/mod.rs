//! Outbound collaborators: mail delivery, task tracking and calendar.
//!
//! Each adapter is pure I/O behind a small trait. Credentials are handed in
//! ready to use; token refresh is the adapter owner's problem.

pub mod asana;
pub mod calendar;
pub mod cli;
pub mod email;

pub use asana::AsanaTracker;
pub use calendar::GoogleCalendar;
pub use email::SmtpDelivery;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DeliveryError, SchedulerError, TrackerError};

// ── Message delivery ────────────────────────────────────────────────

/// Proof that a message was accepted for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub message_id: String,
    pub recipient: String,
    pub accepted_at: DateTime<Utc>,
}

#[async_trait]
pub trait MessageDelivery: Send + Sync {
    /// Send an HTML message.
    async fn send(
        &self,
        sender: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}

// ── Task tracking ───────────────────────────────────────────────────

/// A task created in the external tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink_url: Option<String>,
}

#[async_trait]
pub trait TaskTracker: Send + Sync {
    /// Add `email` to the workspace. Callers treat failures as ignorable.
    async fn invite(&self, workspace: &str, email: &str) -> Result<(), TrackerError>;

    async fn create_task(
        &self,
        workspace: &str,
        project: &str,
        assignee: &str,
        title: &str,
    ) -> Result<TaskRecord, TrackerError>;
}

// ── Scheduling ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Popup,
}

/// A reminder override on a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub minutes: u32,
}

impl Reminder {
    /// Popup 30 minutes before the event.
    pub fn default_overrides() -> Vec<Reminder> {
        vec![Reminder {
            method: ReminderMethod::Popup,
            minutes: 30,
        }]
    }
}

/// Everything needed to create one calendar event.
///
/// `start` and `end` are wall-clock times in `timezone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRequest {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub attendees: Vec<String>,
    pub timezone: String,
    pub reminders: Vec<Reminder>,
    /// Repeating a request with the same token must not create a second conference.
    pub idempotency_token: String,
}

/// A created calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_link: Option<String>,
}

#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn create_event(&self, request: &EventRequest) -> Result<EventRecord, SchedulerError>;
}
