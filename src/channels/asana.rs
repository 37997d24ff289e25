//! Asana task tracker over the REST API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::channels::{TaskRecord, TaskTracker};
use crate::error::TrackerError;

pub const DEFAULT_BASE_URL: &str = "https://app.asana.com/api/1.0";

const TASK_OPT_FIELDS: &str = "name,assignee,assignee.name,projects,projects.name,workspace,workspace.name,created_at,permalink_url";

/// Asana REST client authenticated with a personal access token.
pub struct AsanaTracker {
    base_url: String,
    token: SecretString,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct TaskData {
    gid: String,
    name: String,
    #[serde(default)]
    permalink_url: Option<String>,
}

impl AsanaTracker {
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    async fn post(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: serde_json::Value,
    ) -> Result<reqwest::Response, TrackerError> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(self.token.expose_secret())
            .query(query)
            .json(&body)
            .send()
            .await
            .map_err(|e| TrackerError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TrackerError::Api { status, body });
        }
        Ok(resp)
    }
}

#[async_trait]
impl TaskTracker for AsanaTracker {
    async fn invite(&self, workspace: &str, email: &str) -> Result<(), TrackerError> {
        self.post(
            &format!("/workspaces/{workspace}/addUser"),
            &[("opt_fields", "email,name")],
            serde_json::json!({ "data": { "user": email } }),
        )
        .await?;
        tracing::debug!(workspace, email, "Added user to Asana workspace");
        Ok(())
    }

    async fn create_task(
        &self,
        workspace: &str,
        project: &str,
        assignee: &str,
        title: &str,
    ) -> Result<TaskRecord, TrackerError> {
        let resp = self
            .post(
                "/tasks",
                &[("opt_fields", TASK_OPT_FIELDS)],
                serde_json::json!({
                    "data": {
                        "name": title,
                        "assignee": assignee,
                        "workspace": workspace,
                        "projects": [project],
                    }
                }),
            )
            .await?;

        let envelope: Envelope<TaskData> = resp
            .json()
            .await
            .map_err(|e| TrackerError::InvalidResponse(e.to_string()))?;

        tracing::info!(task = %envelope.data.gid, assignee, "Asana task created");
        Ok(TaskRecord {
            id: envelope.data.gid,
            name: envelope.data.name,
            permalink_url: envelope.data.permalink_url,
        })
    }
}
