use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use stylecast_core::error::{Error, Result};

/// User-facing message for 401/403 from the remote API.
pub const AUTH_ERROR_MESSAGE: &str =
    "Invalid or unauthorized API key. Please check your API key in settings.";

pub const UNKNOWN_API_ERROR: &str = "Unknown API error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    Processing,
    Completed,
    Failed,
    Error,
    /// Anything else the service reports (queued, starting, ...) is
    /// treated as still in flight.
    #[serde(other)]
    Pending,
}

impl RemoteStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RemoteStatus::Completed | RemoteStatus::Failed | RemoteStatus::Error
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: RemoteStatus,
    #[serde(default)]
    pub output: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<RemoteError>,
}

impl StatusResponse {
    pub fn completed(outputs: &[&str]) -> Self {
        Self {
            status: RemoteStatus::Completed,
            output: Some(outputs.iter().map(|s| s.to_string()).collect()),
            error: None,
        }
    }

    pub fn processing() -> Self {
        Self {
            status: RemoteStatus::Processing,
            output: None,
            error: None,
        }
    }

    pub fn failed(message: Option<&str>) -> Self {
        Self {
            status: RemoteStatus::Failed,
            output: None,
            error: Some(RemoteError {
                message: message.map(|s| s.to_string()),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// The remote job API: submit a run, poll its status. The seam the
/// action runner is tested against.
#[async_trait]
pub trait TryOnApi: Send + Sync {
    async fn run(&self, payload: &Value) -> Result<String>;
    async fn status(&self, id: &str) -> Result<StatusResponse>;
}

pub struct ApiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl TryOnApi for ApiClient {
    async fn run(&self, payload: &Value) -> Result<String> {
        let url = format!("{}/run", self.endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("run request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Auth(AUTH_ERROR_MESSAGE.to_string()));
        }
        if !status.is_success() {
            let detail = response
                .json::<RunResponse>()
                .await
                .ok()
                .and_then(|r| r.detail)
                .unwrap_or_else(|| status.to_string());
            return Err(Error::Api(format!("API run failed: {}", detail)));
        }

        let body: RunResponse = response
            .json()
            .await
            .map_err(|e| Error::Api(format!("invalid run response: {}", e)))?;
        let id = body
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Api("missing job id in run response".to_string()))?;
        debug!(job_id = %id, "Job submitted");
        Ok(id)
    }

    async fn status(&self, id: &str) -> Result<StatusResponse> {
        let url = format!("{}/status/{}", self.endpoint, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("status poll failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // Left as a transport error so the poll loop retries it on
            // the next tick instead of failing the job.
            return Err(Error::Transport(format!("status poll failed: {}", status)));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("invalid status response: {}", e)))
    }
}
