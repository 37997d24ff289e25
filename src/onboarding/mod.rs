//! Onboarding pipeline: eligibility, the per-employee step chain, and
//! the orchestrator that drives it.
//!
//! One run loads every eligible employee once, then walks each through
//! draft → deliver → file task → select mentor → schedule meeting. A step
//! failure stops that employee's chain and is recorded in the run summary;
//! the remaining employees are still processed.

pub mod chat;
pub mod drafter;
pub mod eligibility;
pub mod mentor;
pub mod model;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod routes;
pub mod state;
pub mod steps;

pub use chat::{ChatAssistant, ChatReply};
pub use drafter::{DrafterConfig, LlmTextGenerator, TextGenerator, WelcomeFields};
pub use eligibility::EligibilityQuery;
pub use mentor::MentorSelector;
pub use model::{Employee, FailureDescriptor, Level, RunSummary};
pub use orchestrator::{Collaborators, EmployeeOutcome, Orchestrator, PipelineSettings};
pub use progress::{CollectingProgress, NullProgress, ProgressSink};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use state::{LogEntry, PipelineStage, PipelineState};
pub use steps::{MeetingSettings, PipelineStep, StepKind};
