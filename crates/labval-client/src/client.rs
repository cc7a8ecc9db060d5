//! labval API client.

use chrono::{DateTime, NaiveDate, Utc};
use labval_core::catalog::TemplateSummary;
use labval_core::scraper::ScraperRequest;
use labval_core::{
    Algorithm, AlgorithmDefinition, DocumentId, Parameter, PatientRecord, Workflow,
    WorkflowDefinition,
};
use labval_workflows::{
    AlgorithmReport, ExecutionId, ExecutionRequest, ExecutionState, ExecutionStatus,
};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Answer of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    /// `OK` when the store is ready
    pub status: String,
    /// Server time
    pub timestamp: DateTime<Utc>,
    /// Storage backend name
    pub store: String,
    /// Server version
    pub version: String,
    /// When the server started
    pub started_at: DateTime<Utc>,
    /// Seconds since `started_at`
    pub uptime_seconds: u64,
}

/// A template with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDetail {
    /// Lookup key
    pub key: String,
    /// Display name
    pub name: String,
    /// Default parameters
    pub parameters: Vec<Parameter>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct Preview {
    code: String,
}

/// Async client for the labval HTTP API.
#[derive(Debug, Clone)]
pub struct LabvalClient {
    http: reqwest::Client,
    base_url: String,
}

impl LabvalClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: format!("{}/api", config.base_url.trim_end_matches('/')),
        })
    }

    /// The `/api` root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Checks that the server is up.
    pub async fn check_health(&self) -> Result<Health> {
        self.fetch(self.http.get(self.url("/health"))).await
    }

    // ========================================================================
    // Algorithms
    // ========================================================================

    /// Lists algorithms.
    pub async fn get_algorithms(&self) -> Result<Vec<Algorithm>> {
        self.fetch(self.http.get(self.url("/algorithms"))).await
    }

    /// Lists algorithms, or nothing when the server cannot be reached.
    pub async fn get_algorithms_or_empty(&self) -> Vec<Algorithm> {
        self.get_algorithms().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to fetch algorithms, using empty list");
            Vec::new()
        })
    }

    /// Fetches one algorithm.
    pub async fn get_algorithm(&self, id: &DocumentId) -> Result<Algorithm> {
        self.fetch(self.http.get(self.url(&format!("/algorithms/{id}"))))
            .await
    }

    /// Updates the algorithm when `id` is given, creates it otherwise.
    pub async fn save_algorithm(
        &self,
        id: Option<&DocumentId>,
        definition: &AlgorithmDefinition,
    ) -> Result<Algorithm> {
        let request = match id {
            Some(id) => self.http.put(self.url(&format!("/algorithms/{id}"))),
            None => self.http.post(self.url("/algorithms")),
        };
        self.fetch(request.json(definition)).await
    }

    /// Deletes an algorithm.
    pub async fn delete_algorithm(&self, id: &DocumentId) -> Result<()> {
        self.execute(self.http.delete(self.url(&format!("/algorithms/{id}"))))
            .await
    }

    /// Stores a copy of an algorithm; the default name is `"<name> (Copy)"`.
    pub async fn duplicate_algorithm(
        &self,
        id: &DocumentId,
        name: Option<&str>,
    ) -> Result<Algorithm> {
        let request = self
            .http
            .post(self.url(&format!("/algorithms/{id}/duplicate")))
            .json(&json!({ "name": name }));
        self.fetch(request).await
    }

    /// Checks a patient record against an algorithm.
    pub async fn evaluate_algorithm(
        &self,
        id: &DocumentId,
        patient: &PatientRecord,
        today: Option<NaiveDate>,
    ) -> Result<AlgorithmReport> {
        let request = self
            .http
            .post(self.url(&format!("/algorithms/{id}/evaluate")))
            .json(&json!({ "patient": patient, "today": today }));
        self.fetch(request).await
    }

    // ========================================================================
    // Workflows
    // ========================================================================

    /// Lists workflows.
    pub async fn get_workflows(&self) -> Result<Vec<Workflow>> {
        self.fetch(self.http.get(self.url("/workflows"))).await
    }

    /// Lists workflows, or nothing when the server cannot be reached.
    pub async fn get_workflows_or_empty(&self) -> Vec<Workflow> {
        self.get_workflows().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to fetch workflows, using empty list");
            Vec::new()
        })
    }

    /// Fetches one workflow.
    pub async fn get_workflow(&self, id: &DocumentId) -> Result<Workflow> {
        self.fetch(self.http.get(self.url(&format!("/workflows/{id}"))))
            .await
    }

    /// Updates the workflow when `id` is given, creates it otherwise.
    pub async fn save_workflow(
        &self,
        id: Option<&DocumentId>,
        definition: &WorkflowDefinition,
    ) -> Result<Workflow> {
        let request = match id {
            Some(id) => self.http.put(self.url(&format!("/workflows/{id}"))),
            None => self.http.post(self.url("/workflows")),
        };
        self.fetch(request.json(definition)).await
    }

    /// Deletes a workflow.
    pub async fn delete_workflow(&self, id: &DocumentId) -> Result<()> {
        self.execute(self.http.delete(self.url(&format!("/workflows/{id}"))))
            .await
    }

    // ========================================================================
    // Catalog and templates
    // ========================================================================

    /// Parameter definitions, optionally filtered on `isGlobal`.
    pub async fn parameter_definitions(&self, global: Option<bool>) -> Result<Vec<Value>> {
        let path = match global {
            Some(global) => format!("/catalog/parameters?global={global}"),
            None => "/catalog/parameters".to_string(),
        };
        self.fetch(self.http.get(self.url(&path))).await
    }

    /// Global parameter definitions.
    pub async fn global_parameters(&self) -> Result<Vec<Value>> {
        self.fetch(self.http.get(self.url("/catalog/global-parameters")))
            .await
    }

    /// Lists templates.
    pub async fn templates(&self) -> Result<Vec<TemplateSummary>> {
        self.fetch(self.http.get(self.url("/templates"))).await
    }

    /// Fetches a template with its parameters.
    pub async fn template(&self, key: &str) -> Result<TemplateDetail> {
        self.fetch(self.http.get(self.url(&format!("/templates/{key}"))))
            .await
    }

    /// Creates an algorithm from a template.
    pub async fn instantiate_template(
        &self,
        key: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Algorithm> {
        let request = self
            .http
            .post(self.url(&format!("/templates/{key}/instantiate")))
            .json(&json!({ "name": name, "description": description }));
        self.fetch(request).await
    }

    // ========================================================================
    // Executions
    // ========================================================================

    /// Starts an execution; the returned status is usually still pending.
    pub async fn start_execution(&self, request: &ExecutionRequest) -> Result<ExecutionStatus> {
        self.fetch(self.http.post(self.url("/executions")).json(request))
            .await
    }

    /// Current status of an execution.
    pub async fn execution(&self, id: &ExecutionId) -> Result<ExecutionStatus> {
        self.fetch(self.http.get(self.url(&format!("/executions/{id}"))))
            .await
    }

    /// Status of every execution the server retains.
    pub async fn executions(&self) -> Result<Vec<ExecutionStatus>> {
        self.fetch(self.http.get(self.url("/executions"))).await
    }

    /// Polls an execution every `poll` until it finishes.
    ///
    /// # Errors
    ///
    /// [`Error::ExecutionFailed`] when the execution failed and
    /// [`Error::Timeout`] when it is still running after `timeout`.
    pub async fn wait_for_execution(
        &self,
        id: &ExecutionId,
        poll: Duration,
        timeout: Duration,
    ) -> Result<ExecutionStatus> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let status = self.execution(id).await?;
            match status.state {
                ExecutionState::Completed => return Ok(status),
                ExecutionState::Failed => {
                    return Err(Error::ExecutionFailed {
                        id: *id,
                        reason: status.error.unwrap_or_default(),
                    });
                }
                _ => {}
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(Error::Timeout {
                    id: *id,
                    waited: timeout,
                });
            }
            tracing::trace!(execution_id = %id, progress = status.progress, "Waiting for execution");
            tokio::time::sleep(poll).await;
        }
    }

    // ========================================================================
    // Scraper
    // ========================================================================

    /// Generates a scraper script.
    pub async fn scraper_preview(&self, request: &ScraperRequest) -> Result<String> {
        let preview: Preview = self
            .fetch(self.http.post(self.url("/scraper/preview")).json(request))
            .await?;
        Ok(preview.code)
    }

    // ========================================================================
    // Transport
    // ========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = checked(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<()> {
        checked(request.send().await?).await?;
        Ok(())
    }
}

async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .ok()
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.to_string());
    tracing::debug!(status = status.as_u16(), %message, "API request failed");
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
