//! REST endpoints for onboarding runs and HR chat.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::chat::ChatAssistant;
use super::model::RunSummary;
use super::orchestrator::Orchestrator;
use super::progress::CollectingProgress;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub orchestrator: Arc<Orchestrator>,
    pub chat: Arc<ChatAssistant>,
    pub default_window_days: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub window_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    #[serde(flatten)]
    pub summary: RunSummary,
    pub progress: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub farewell: bool,
}

/// POST /api/onboarding/run
///
/// Runs the pipeline once and returns the summary with the progress lines.
async fn run_onboarding(
    State(state): State<OnboardingRouteState>,
    body: Option<Json<RunRequest>>,
) -> impl IntoResponse {
    let window_days = body
        .and_then(|Json(req)| req.window_days)
        .unwrap_or(state.default_window_days);

    let progress = CollectingProgress::new();
    match state
        .orchestrator
        .run_onboarding_with(window_days, &progress)
        .await
    {
        Ok(summary) => Json(RunResponse {
            summary,
            progress: progress.into_lines(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Onboarding run aborted: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// POST /api/chat
async fn chat(
    State(state): State<OnboardingRouteState>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    match state.chat.respond(&req.message).await {
        Ok(reply) => Json(ChatResponse {
            reply: reply.text().to_string(),
            farewell: reply.is_farewell(),
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("Chat reply failed: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// GET /api/health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/run", post(run_onboarding))
        .route("/api/chat", post(chat))
        .route("/api/health", get(health))
        .with_state(state)
}
