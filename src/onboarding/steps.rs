//! The five steps of the per-employee onboarding chain.
//!
//! Each step reads what earlier steps left in the `PipelineState`, performs
//! one collaborator call, writes its result back, and returns the audit line
//! the orchestrator appends to the state log.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::channels::{EventRequest, MessageDelivery, Reminder, Scheduler, TaskTracker};
use crate::clock::Clock;
use crate::error::StepError;

use super::drafter::{TextGenerator, WelcomeFields};
use super::mentor::MentorSelector;
use super::prompts::strip_code_fences;
use super::state::{PipelineStage, PipelineState};

/// Identifies a step in failure reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    DraftMessage,
    DeliverMessage,
    FileTask,
    SelectMentor,
    ScheduleMeeting,
}

impl StepKind {
    /// All steps in chain order.
    pub const CHAIN: [StepKind; 5] = [
        Self::DraftMessage,
        Self::DeliverMessage,
        Self::FileTask,
        Self::SelectMentor,
        Self::ScheduleMeeting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DraftMessage => "draft_message",
            Self::DeliverMessage => "deliver_message",
            Self::FileTask => "file_task",
            Self::SelectMentor => "select_mentor",
            Self::ScheduleMeeting => "schedule_meeting",
        }
    }

    /// Human-readable label for progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DraftMessage => "Generate welcome email",
            Self::DeliverMessage => "Send welcome email",
            Self::FileTask => "Create onboarding task",
            Self::SelectMentor => "Find mentor",
            Self::ScheduleMeeting => "Schedule intro call with mentor",
        }
    }

    /// The stage the pipeline is in while this step runs.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::DraftMessage => PipelineStage::DraftingMessage,
            Self::DeliverMessage => PipelineStage::DeliveringMessage,
            Self::FileTask => PipelineStage::FilingTask,
            Self::SelectMentor => PipelineStage::SelectingMentor,
            Self::ScheduleMeeting => PipelineStage::SchedulingMeeting,
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work in the chain.
///
/// Returns the audit message on success. The orchestrator owns logging and
/// stage transitions so every step records exactly one entry.
#[async_trait]
pub trait PipelineStep: Send + Sync {
    fn kind(&self) -> StepKind;

    async fn run(&self, state: &mut PipelineState) -> Result<String, StepError>;
}

// ── Draft ───────────────────────────────────────────────────────────

pub struct DraftMessage {
    generator: Arc<dyn TextGenerator>,
    fallback_manager: String,
}

impl DraftMessage {
    pub fn new(generator: Arc<dyn TextGenerator>, fallback_manager: impl Into<String>) -> Self {
        Self {
            generator,
            fallback_manager: fallback_manager.into(),
        }
    }
}

#[async_trait]
impl PipelineStep for DraftMessage {
    fn kind(&self) -> StepKind {
        StepKind::DraftMessage
    }

    async fn run(&self, state: &mut PipelineState) -> Result<String, StepError> {
        let fields = WelcomeFields::for_employee(state.employee(), &self.fallback_manager);
        let raw = self.generator.draft(&fields).await?;
        state.message_body = Some(strip_code_fences(&raw));
        Ok(format!("Generated email for {}", state.employee().email))
    }
}

// ── Deliver ─────────────────────────────────────────────────────────

pub struct DeliverMessage {
    delivery: Arc<dyn MessageDelivery>,
    sender: String,
}

impl DeliverMessage {
    pub fn new(delivery: Arc<dyn MessageDelivery>, sender: impl Into<String>) -> Self {
        Self {
            delivery,
            sender: sender.into(),
        }
    }
}

pub fn welcome_subject(name: &str) -> String {
    format!("Welcome to the team, {name}!")
}

#[async_trait]
impl PipelineStep for DeliverMessage {
    fn kind(&self) -> StepKind {
        StepKind::DeliverMessage
    }

    async fn run(&self, state: &mut PipelineState) -> Result<String, StepError> {
        let body = state.message_body()?;
        let employee = state.employee();
        let receipt = self
            .delivery
            .send(
                &self.sender,
                &employee.email,
                &welcome_subject(&employee.name),
                body,
            )
            .await?;
        let message = format!("Sent welcome email to {}", employee.email);
        state.delivery = Some(receipt);
        Ok(message)
    }
}

// ── File task ───────────────────────────────────────────────────────

pub struct FileTask {
    tracker: Arc<dyn TaskTracker>,
    workspace: String,
    project: String,
}

impl FileTask {
    pub fn new(
        tracker: Arc<dyn TaskTracker>,
        workspace: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            tracker,
            workspace: workspace.into(),
            project: project.into(),
        }
    }
}

#[async_trait]
impl PipelineStep for FileTask {
    fn kind(&self) -> StepKind {
        StepKind::FileTask
    }

    async fn run(&self, state: &mut PipelineState) -> Result<String, StepError> {
        let employee = state.employee();

        // Already-a-member and similar rejections are expected here.
        if let Err(e) = self.tracker.invite(&self.workspace, &employee.email).await {
            warn!(employee = %employee.email, error = %e, "Workspace invite failed, continuing");
        }

        let title = format!("Onboarding for {} - {}", employee.name, employee.role);
        let task = self
            .tracker
            .create_task(&self.workspace, &self.project, &employee.email, &title)
            .await?;
        let message = format!("Created onboarding task {} for {}", task.id, employee.email);
        state.task = Some(task);
        Ok(message)
    }
}

// ── Select mentor ───────────────────────────────────────────────────

pub struct SelectMentor {
    selector: MentorSelector,
}

impl SelectMentor {
    pub fn new(selector: MentorSelector) -> Self {
        Self { selector }
    }
}

#[async_trait]
impl PipelineStep for SelectMentor {
    fn kind(&self) -> StepKind {
        StepKind::SelectMentor
    }

    async fn run(&self, state: &mut PipelineState) -> Result<String, StepError> {
        let mentor = self.selector.select(&state.employee().location).await?;
        let message = format!(
            "Selected mentor {} for {}",
            mentor.name,
            state.employee().email
        );
        state.mentor = Some(mentor);
        Ok(message)
    }
}

// ── Schedule meeting ────────────────────────────────────────────────

/// Where and when intro meetings are booked.
#[derive(Debug, Clone)]
pub struct MeetingSettings {
    pub timezone: String,
    pub location: String,
}

pub struct ScheduleMeeting {
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    settings: MeetingSettings,
}

impl ScheduleMeeting {
    pub fn new(scheduler: Arc<dyn Scheduler>, clock: Arc<dyn Clock>, settings: MeetingSettings) -> Self {
        Self {
            scheduler,
            clock,
            settings,
        }
    }
}

impl ScheduleMeeting {
    /// Today's date in the meeting timezone. An unknown zone falls back to
    /// the clock's local date.
    fn today(&self) -> NaiveDate {
        match self.settings.timezone.parse::<Tz>() {
            Ok(tz) => self.clock.now_utc().with_timezone(&tz).date_naive(),
            Err(e) => {
                warn!(timezone = %self.settings.timezone, "Unknown meeting timezone: {e}");
                self.clock.today()
            }
        }
    }
}

/// One week out, 10:00 to 11:00 local time.
pub fn meeting_window(today: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let day = today + Duration::days(7);
    (
        day.and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()),
        day.and_time(NaiveTime::from_hms_opt(11, 0, 0).unwrap_or_default()),
    )
}

#[async_trait]
impl PipelineStep for ScheduleMeeting {
    fn kind(&self) -> StepKind {
        StepKind::ScheduleMeeting
    }

    async fn run(&self, state: &mut PipelineState) -> Result<String, StepError> {
        let mentor = state.mentor()?;
        let employee = state.employee();
        let (start, end) = meeting_window(self.today());

        let request = EventRequest {
            summary: format!(
                "Intro chat: {} x {} ({})",
                employee.name, mentor.name, employee.department
            ),
            location: self.settings.location.clone(),
            description: format!(
                "Welcome {}.\nMentor: {} ({}).\nAgenda: Meet the team, tooling overview, first week goals.\nManager: {}.\n",
                employee.name,
                mentor.name,
                mentor.email,
                employee.manager_email.as_deref().unwrap_or("N/A"),
            ),
            start,
            end,
            attendees: vec![employee.email.clone(), mentor.email.clone()],
            timezone: self.settings.timezone.clone(),
            reminders: Reminder::default_overrides(),
            idempotency_token: format!("mentor-{}-{}", employee.id, start.date()),
        };

        let event = self.scheduler.create_event(&request).await?;
        let message = format!("Scheduled mentor call for {}", employee.email);
        state.meeting = Some(event);
        Ok(message)
    }
}
