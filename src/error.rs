//! Error types for Onboardia.

use std::time::Duration;

use crate::onboarding::StepKind;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Task tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Run error: {0}")]
    Run(#[from] RunError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Outbound message delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Message rejected by server: {0}")]
    Rejected(String),
}

/// Task tracker errors.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Tracker returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response from tracker: {0}")]
    InvalidResponse(String),
}

/// Calendar scheduling errors.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Calendar returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response from calendar: {0}")]
    InvalidResponse(String),
}

/// Why a single pipeline step failed.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("text generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("task filing failed: {0}")]
    Tracker(#[from] TrackerError),

    #[error("meeting scheduling failed: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("employee store lookup failed: {0}")]
    Store(#[from] DatabaseError),

    #[error("No senior {role} available as mentor")]
    SelectionExhausted { role: String },

    #[error("{field} has not been populated by an earlier step")]
    MissingPrecondition { field: &'static str },

    #[error("Invalid stage transition: {0}")]
    InvalidTransition(String),
}

/// A step failure scoped to one employee's chain.
///
/// Caught at the per-employee boundary of the orchestrator and never
/// propagated past it.
#[derive(Debug, thiserror::Error)]
#[error("{step} failed: {error}")]
pub struct StepFailure {
    pub step: StepKind,
    #[source]
    pub error: StepError,
}

/// Errors that abort a whole onboarding run before any employee is processed.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Employee store unavailable: {0}")]
    Store(#[from] DatabaseError),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
