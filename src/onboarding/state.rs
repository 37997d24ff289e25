//! Per-employee pipeline state and its stage machine.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::channels::{DeliveryReceipt, EventRecord, TaskRecord};
use crate::error::StepError;

use super::model::Employee;

/// The stages one employee's pipeline moves through.
///
/// Progresses linearly: Pending → DraftingMessage → DeliveringMessage →
/// FilingTask → SelectingMentor → SchedulingMeeting → Completed.
/// `Failed` is reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Pending,
    DraftingMessage,
    DeliveringMessage,
    FilingTask,
    SelectingMentor,
    SchedulingMeeting,
    Completed,
    Failed,
}

impl PipelineStage {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: PipelineStage) -> bool {
        use PipelineStage::*;
        if target == Failed {
            return !self.is_terminal();
        }
        self.next() == Some(target)
    }

    /// Whether this stage ends the pipeline.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Next stage on the success path, if any.
    pub fn next(&self) -> Option<PipelineStage> {
        use PipelineStage::*;
        match self {
            Pending => Some(DraftingMessage),
            DraftingMessage => Some(DeliveringMessage),
            DeliveringMessage => Some(FilingTask),
            FilingTask => Some(SelectingMentor),
            SelectingMentor => Some(SchedulingMeeting),
            SchedulingMeeting => Some(Completed),
            Completed | Failed => None,
        }
    }
}

impl Default for PipelineStage {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::DraftingMessage => "drafting_message",
            Self::DeliveringMessage => "delivering_message",
            Self::FilingTask => "filing_task",
            Self::SelectingMentor => "selecting_mentor",
            Self::SchedulingMeeting => "scheduling_meeting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A timestamped audit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: NaiveDateTime,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} | {}", self.at.format("%Y-%m-%dT%H:%M:%S"), self.message)
    }
}

/// Accumulator for exactly one employee and one run.
///
/// Fields are filled in step order; each step only reads what earlier
/// steps produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineState {
    employee: Employee,
    stage: PipelineStage,
    pub message_body: Option<String>,
    pub delivery: Option<DeliveryReceipt>,
    pub task: Option<TaskRecord>,
    pub mentor: Option<Employee>,
    pub meeting: Option<EventRecord>,
    log: Vec<LogEntry>,
}

impl PipelineState {
    pub fn new(employee: Employee) -> Self {
        Self {
            employee,
            stage: PipelineStage::Pending,
            message_body: None,
            delivery: None,
            task: None,
            mentor: None,
            meeting: None,
            log: Vec::new(),
        }
    }

    pub fn employee(&self) -> &Employee {
        &self.employee
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Append an audit line. Timestamps are truncated to whole seconds.
    pub fn record(&mut self, at: NaiveDateTime, message: impl Into<String>) {
        let at = at.with_nanosecond(0).unwrap_or(at);
        self.log.push(LogEntry {
            at,
            message: message.into(),
        });
    }

    /// Move to `target`, rejecting out-of-order transitions.
    pub fn transition(&mut self, target: PipelineStage) -> Result<(), String> {
        if !self.stage.can_transition_to(target) {
            return Err(format!("Cannot transition from {} to {}", self.stage, target));
        }
        self.stage = target;
        Ok(())
    }

    pub fn message_body(&self) -> Result<&str, StepError> {
        self.message_body
            .as_deref()
            .ok_or(StepError::MissingPrecondition {
                field: "message_body",
            })
    }

    pub fn mentor(&self) -> Result<&Employee, StepError> {
        self.mentor
            .as_ref()
            .ok_or(StepError::MissingPrecondition { field: "mentor" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::Level;
    use crate::onboarding::model::fixtures::{date, employee};

    #[test]
    fn valid_transitions() {
        use PipelineStage::*;
        let transitions = [
            (Pending, DraftingMessage),
            (DraftingMessage, DeliveringMessage),
            (DeliveringMessage, FilingTask),
            (FilingTask, SelectingMentor),
            (SelectingMentor, SchedulingMeeting),
            (SchedulingMeeting, Completed),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn failed_reachable_from_any_non_terminal_stage() {
        use PipelineStage::*;
        for stage in [
            Pending,
            DraftingMessage,
            DeliveringMessage,
            FilingTask,
            SelectingMentor,
            SchedulingMeeting,
        ] {
            assert!(stage.can_transition_to(Failed), "{stage} should fail");
        }
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
    }

    #[test]
    fn invalid_transitions() {
        use PipelineStage::*;
        assert!(!Pending.can_transition_to(FilingTask));
        assert!(!SelectingMentor.can_transition_to(DraftingMessage));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!DraftingMessage.can_transition_to(DraftingMessage));
    }

    #[test]
    fn display_matches_serde() {
        use PipelineStage::*;
        for stage in [
            Pending,
            DraftingMessage,
            DeliveringMessage,
            FilingTask,
            SelectingMentor,
            SchedulingMeeting,
            Completed,
            Failed,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(format!("\"{stage}\""), json);
        }
    }

    #[test]
    fn missing_fields_are_precondition_errors() {
        let state = PipelineState::new(employee(
            1,
            "Data Engineer",
            Level::Junior,
            date(2026, 10, 16),
            "Pune",
        ));
        assert!(matches!(
            state.message_body(),
            Err(StepError::MissingPrecondition {
                field: "message_body"
            })
        ));
        assert!(matches!(
            state.mentor(),
            Err(StepError::MissingPrecondition { field: "mentor" })
        ));
    }

    #[test]
    fn log_entries_render_with_second_precision() {
        let mut state = PipelineState::new(employee(
            1,
            "Data Engineer",
            Level::Junior,
            date(2026, 10, 16),
            "Pune",
        ));
        let at = date(2026, 10, 16)
            .and_hms_milli_opt(9, 30, 5, 750)
            .unwrap();
        state.record(at, "Generated email for employee1@example.com");
        assert_eq!(
            state.log()[0].to_string(),
            "2026-10-16T09:30:05 | Generated email for employee1@example.com"
        );
    }

    #[test]
    fn transition_rejects_skips() {
        let mut state = PipelineState::new(employee(
            1,
            "Data Engineer",
            Level::Junior,
            date(2026, 10, 16),
            "Pune",
        ));
        assert!(state.transition(PipelineStage::FilingTask).is_err());
        state.transition(PipelineStage::DraftingMessage).unwrap();
        state.transition(PipelineStage::Failed).unwrap();
        assert!(state.stage().is_terminal());
    }
}
