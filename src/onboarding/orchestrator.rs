//! Drives the step chain over every eligible employee.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::channels::{MessageDelivery, Scheduler, TaskTracker};
use crate::clock::Clock;
use crate::error::{RunError, StepError, StepFailure};
use crate::store::EmployeeStore;

use super::drafter::TextGenerator;
use super::eligibility::EligibilityQuery;
use super::mentor::MentorSelector;
use super::model::{Employee, FailureDescriptor, RunSummary};
use super::progress::{NullProgress, ProgressSink};
use super::state::{PipelineStage, PipelineState};
use super::steps::{
    DeliverMessage, DraftMessage, FileTask, MeetingSettings, PipelineStep, ScheduleMeeting,
    SelectMentor, StepKind,
};

/// External services the chain talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn EmployeeStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub delivery: Arc<dyn MessageDelivery>,
    pub tracker: Arc<dyn TaskTracker>,
    pub scheduler: Arc<dyn Scheduler>,
    pub clock: Arc<dyn Clock>,
}

/// Fixed parameters of the chain, resolved once at startup.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub target_role: String,
    pub fallback_manager: String,
    pub sender: String,
    pub tracker_workspace: String,
    pub tracker_project: String,
    pub meeting: MeetingSettings,
}

/// Final state of one employee's chain.
#[derive(Debug, Serialize)]
pub struct EmployeeOutcome {
    pub state: PipelineState,
    #[serde(skip)]
    pub failure: Option<StepFailure>,
}

impl EmployeeOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.state.stage() == PipelineStage::Completed
    }
}

pub struct Orchestrator {
    eligibility: EligibilityQuery,
    steps: Vec<Box<dyn PipelineStep>>,
    clock: Arc<dyn Clock>,
    progress: Arc<dyn ProgressSink>,
}

impl Orchestrator {
    /// Build the orchestrator and its step chain.
    pub fn new(collaborators: Collaborators, settings: PipelineSettings) -> Self {
        let role = settings.target_role.clone();
        let steps: Vec<Box<dyn PipelineStep>> = vec![
            Box::new(DraftMessage::new(
                collaborators.generator,
                settings.fallback_manager,
            )),
            Box::new(DeliverMessage::new(collaborators.delivery, settings.sender)),
            Box::new(FileTask::new(
                collaborators.tracker,
                settings.tracker_workspace,
                settings.tracker_project,
            )),
            Box::new(SelectMentor::new(MentorSelector::new(
                collaborators.store.clone(),
                role.clone(),
            ))),
            Box::new(ScheduleMeeting::new(
                collaborators.scheduler,
                collaborators.clock.clone(),
                settings.meeting,
            )),
        ];

        Self {
            eligibility: EligibilityQuery::new(collaborators.store, role),
            steps,
            clock: collaborators.clock,
            progress: Arc::new(NullProgress),
        }
    }

    /// Send run progress to `progress` instead of discarding it.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn step_kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|s| s.kind()).collect()
    }

    /// Onboard everyone who joined within the last `window_days`.
    pub async fn run_onboarding(&self, window_days: u32) -> Result<RunSummary, RunError> {
        let progress = self.progress.clone();
        self.run_onboarding_with(window_days, progress.as_ref()).await
    }

    /// As `run_onboarding`, reporting to a caller-supplied sink.
    pub async fn run_onboarding_with(
        &self,
        window_days: u32,
        progress: &dyn ProgressSink,
    ) -> Result<RunSummary, RunError> {
        let role = self.eligibility.role().to_string();
        let employees = self.eligibility.find(window_days, self.clock.today()).await?;

        if employees.is_empty() {
            let message = format!("No new {role}s found");
            info!(window_days, "{message}");
            progress.report(&message);
            return Ok(RunSummary::empty(message));
        }

        self.preview(&employees, &role, window_days, progress);

        let mut summary = RunSummary {
            processed: employees.len(),
            ..Default::default()
        };

        for employee in employees {
            let email = employee.email.clone();
            let id = employee.id;
            let outcome = self.run_employee(employee).await;
            match outcome.failure {
                None => {
                    summary.successes += 1;
                    progress.report(&format!("Onboarded {email}"));
                }
                Some(failure) => {
                    progress.report(&format!("Failed {email}: {failure}"));
                    summary.failures.push(FailureDescriptor {
                        employee_id: id,
                        email,
                        step: failure.step,
                        reason: failure.error.to_string(),
                    });
                }
            }
        }

        info!(
            processed = summary.processed,
            successes = summary.successes,
            failures = summary.failures.len(),
            "Onboarding run finished"
        );
        progress.report("Workflow completed.");
        Ok(summary)
    }

    /// Run the full chain for one employee. Never fails as a whole; the
    /// first step error is captured in the outcome.
    pub async fn run_employee(&self, employee: Employee) -> EmployeeOutcome {
        let mut state = PipelineState::new(employee);

        for step in &self.steps {
            let kind = step.kind();
            let result = match state.transition(kind.stage()) {
                Ok(()) => {
                    info!(employee = %state.employee().email, step = %kind, "Step started");
                    step.run(&mut state).await
                }
                Err(reason) => Err(StepError::InvalidTransition(reason)),
            };

            match result {
                Ok(message) => {
                    info!(employee = %state.employee().email, step = %kind, "Step finished");
                    state.record(self.clock.now(), message);
                }
                Err(error) => {
                    error!(employee = %state.employee().email, step = %kind, error = %error, "Step failed");
                    let message = format!("{kind} failed for {}: {error}", state.employee().email);
                    state.record(self.clock.now(), message);
                    if let Err(reason) = state.transition(PipelineStage::Failed) {
                        warn!("{reason}");
                    }
                    return EmployeeOutcome {
                        state,
                        failure: Some(StepFailure { step: kind, error }),
                    };
                }
            }
        }

        if let Err(reason) = state.transition(PipelineStage::Completed) {
            warn!("{reason}");
        }
        EmployeeOutcome {
            state,
            failure: None,
        }
    }

    fn preview(
        &self,
        employees: &[Employee],
        role: &str,
        window_days: u32,
        progress: &dyn ProgressSink,
    ) {
        progress.report(&format!(
            "Found {} new {role}s who joined in the last {window_days} days.",
            employees.len()
        ));
        progress.report("Details of new joiners:");
        for employee in employees {
            progress.report(&format!("- {} - {}", employee.name, employee.email));
        }
        progress.report("They will be onboarded with the following steps:");
        for step in &self.steps {
            progress.report(&format!("- {}", step.kind().label()));
        }
        progress.report("Starting onboarding workflow...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::channels::{DeliveryReceipt, EventRecord, EventRequest, TaskRecord};
    use crate::clock::FixedClock;
    use crate::error::{DeliveryError, LlmError, SchedulerError, TrackerError};
    use crate::onboarding::drafter::WelcomeFields;
    use crate::onboarding::model::Level;
    use crate::onboarding::model::fixtures::{date, employee};
    use crate::onboarding::progress::CollectingProgress;
    use crate::store::InMemoryEmployeeStore;

    #[derive(Default)]
    struct Calls {
        drafts: AtomicUsize,
        sends: Mutex<Vec<String>>,
        tasks: Mutex<Vec<String>>,
        events: Mutex<Vec<String>>,
    }

    struct MockGenerator(Arc<Calls>);

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn draft(&self, fields: &WelcomeFields) -> Result<String, LlmError> {
            self.0.drafts.fetch_add(1, Ordering::SeqCst);
            Ok(format!("<p>Welcome {}</p>", fields.name))
        }
    }

    /// Fails delivery to one address.
    struct MockDelivery {
        calls: Arc<Calls>,
        reject: Option<String>,
    }

    #[async_trait]
    impl MessageDelivery for MockDelivery {
        async fn send(
            &self,
            _sender: &str,
            recipient: &str,
            _subject: &str,
            _body: &str,
        ) -> Result<DeliveryReceipt, DeliveryError> {
            if self.reject.as_deref() == Some(recipient) {
                return Err(DeliveryError::Transport("connection reset".into()));
            }
            self.calls.sends.lock().unwrap().push(recipient.to_string());
            Ok(DeliveryReceipt {
                message_id: format!("<{recipient}>"),
                recipient: recipient.to_string(),
                accepted_at: Utc::now(),
            })
        }
    }

    struct MockTracker(Arc<Calls>);

    #[async_trait]
    impl TaskTracker for MockTracker {
        async fn invite(&self, _workspace: &str, _email: &str) -> Result<(), TrackerError> {
            Ok(())
        }

        async fn create_task(
            &self,
            _workspace: &str,
            _project: &str,
            assignee: &str,
            title: &str,
        ) -> Result<TaskRecord, TrackerError> {
            self.0.tasks.lock().unwrap().push(assignee.to_string());
            Ok(TaskRecord {
                id: format!("task-{assignee}"),
                name: title.to_string(),
                permalink_url: None,
            })
        }
    }

    struct MockScheduler(Arc<Calls>);

    #[async_trait]
    impl Scheduler for MockScheduler {
        async fn create_event(&self, request: &EventRequest) -> Result<EventRecord, SchedulerError> {
            self.0.events.lock().unwrap().push(request.attendees[0].clone());
            Ok(EventRecord {
                id: format!("evt-{}", request.idempotency_token),
                html_link: None,
                meet_link: None,
            })
        }
    }

    fn today() -> chrono::NaiveDate {
        date(2026, 10, 16)
    }

    fn orchestrator(
        employees: Vec<Employee>,
        reject: Option<&str>,
    ) -> (Orchestrator, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let collaborators = Collaborators {
            store: Arc::new(InMemoryEmployeeStore::new(employees)),
            generator: Arc::new(MockGenerator(calls.clone())),
            delivery: Arc::new(MockDelivery {
                calls: calls.clone(),
                reject: reject.map(str::to_string),
            }),
            tracker: Arc::new(MockTracker(calls.clone())),
            scheduler: Arc::new(MockScheduler(calls.clone())),
            clock: Arc::new(FixedClock(today().and_hms_opt(9, 0, 0).unwrap())),
        };
        let settings = PipelineSettings {
            target_role: "Data Engineer".into(),
            fallback_manager: "hr@company.com".into(),
            sender: "hr@example.com".into(),
            tracker_workspace: "ws".into(),
            tracker_project: "proj".into(),
            meeting: MeetingSettings {
                timezone: "Asia/Kolkata".into(),
                location: "Google Meet".into(),
            },
        };
        (Orchestrator::new(collaborators, settings), calls)
    }

    fn mentor() -> Employee {
        employee(100, "Data Engineer", Level::Senior, date(2020, 1, 1), "Pune")
    }

    #[tokio::test]
    async fn empty_run_invokes_no_collaborator() {
        let (orch, calls) = orchestrator(vec![mentor()], None);
        let summary = orch.run_onboarding(14).await.unwrap();

        assert_eq!(summary.processed, 0);
        assert_eq!(summary.successes, 0);
        assert!(summary.failures.is_empty());
        assert_eq!(summary.message.as_deref(), Some("No new Data Engineers found"));
        assert_eq!(calls.drafts.load(Ordering::SeqCst), 0);
        assert!(calls.sends.lock().unwrap().is_empty());
        assert!(calls.tasks.lock().unwrap().is_empty());
        assert!(calls.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_isolated_to_one_employee() {
        let joined = date(2026, 10, 14);
        let (orch, calls) = orchestrator(
            vec![
                employee(1, "Data Engineer", Level::Junior, joined, "Pune"),
                employee(2, "Data Engineer", Level::Junior, joined, "Pune"),
                employee(3, "Data Engineer", Level::Junior, joined, "Pune"),
                mentor(),
            ],
            Some("employee2@example.com"),
        );

        let summary = orch.run_onboarding(14).await.unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.successes, 2);
        assert_eq!(summary.failures.len(), 1);
        let failure = &summary.failures[0];
        assert_eq!(failure.employee_id, 2);
        assert_eq!(failure.step, StepKind::DeliverMessage);
        assert!(failure.reason.contains("connection reset"));

        assert_eq!(
            *calls.sends.lock().unwrap(),
            vec!["employee1@example.com", "employee3@example.com"]
        );
        assert_eq!(calls.tasks.lock().unwrap().len(), 2);
        assert_eq!(calls.events.lock().unwrap().len(), 2);
        // Drafting happened for all three; nothing is rolled back.
        assert_eq!(calls.drafts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn successful_chain_logs_five_ordered_entries() {
        let (orch, _calls) = orchestrator(vec![mentor()], None);
        let joiner = employee(1, "Data Engineer", Level::Junior, today(), "Pune");

        let outcome = orch.run_employee(joiner).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.state.stage(), PipelineStage::Completed);

        let log = outcome.state.log();
        assert_eq!(log.len(), 5);
        assert!(log.windows(2).all(|w| w[0].at <= w[1].at));
        assert_eq!(log[0].message, "Generated email for employee1@example.com");
        assert_eq!(log[4].message, "Scheduled mentor call for employee1@example.com");
        assert_eq!(
            outcome.state.meeting.as_ref().unwrap().id,
            "evt-mentor-1-2026-10-23"
        );
    }

    #[tokio::test]
    async fn missing_mentor_fails_after_four_entries() {
        let (orch, calls) = orchestrator(vec![], None);
        let joiner = employee(1, "Data Engineer", Level::Junior, today(), "Pune");

        let outcome = orch.run_employee(joiner).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.state.stage(), PipelineStage::Failed);
        assert_eq!(outcome.state.log().len(), 4);
        assert!(outcome.state.log()[3].message.starts_with("select_mentor failed"));

        let failure = outcome.failure.unwrap();
        assert_eq!(failure.step, StepKind::SelectMentor);
        assert!(matches!(failure.error, StepError::SelectionExhausted { .. }));
        // Earlier side effects stay in place.
        assert_eq!(calls.sends.lock().unwrap().len(), 1);
        assert!(calls.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn progress_previews_joiners_and_steps() {
        let (orch, _calls) = orchestrator(
            vec![
                employee(1, "Data Engineer", Level::Junior, today(), "Pune"),
                mentor(),
            ],
            None,
        );
        let sink = CollectingProgress::new();
        orch.run_onboarding_with(14, &sink).await.unwrap();

        let lines = sink.into_lines();
        assert_eq!(
            lines[0],
            "Found 1 new Data Engineers who joined in the last 14 days."
        );
        assert!(lines.contains(&"- Employee 1 - employee1@example.com".to_string()));
        assert!(lines.contains(&"- Schedule intro call with mentor".to_string()));
        assert!(lines.contains(&"Starting onboarding workflow...".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Workflow completed."));
    }

    #[test]
    fn chain_order_is_fixed() {
        let (orch, _calls) = orchestrator(vec![], None);
        assert_eq!(orch.step_kinds(), StepKind::CHAIN.to_vec());
    }
}
