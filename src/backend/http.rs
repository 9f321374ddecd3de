use crate::config::BackendConfig;
use crate::error::{AppError, Result};
use reqwest::{Client, Response, Url};
use std::time::Duration;
use tracing::debug;

/// Shared HTTP plumbing for the client data collaborators
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    timeout_secs: u64,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::Configuration(format!("Invalid backend base URL '{}': {}", config.base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "Backend base URL '{}' cannot carry path segments",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// Per-request timeout in seconds
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Build an endpoint URL below the base URL
    ///
    /// Each segment is percent-encoded as a single path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Issue a GET request
    pub async fn get(&self, url: Url) -> std::result::Result<Response, reqwest::Error> {
        debug!(url = %url, "GET");
        self.client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
    }
}

/// Extract the collaborator-supplied `detail` string from an error response
pub async fn error_detail(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    detail_from_body(&body)
}

fn detail_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")?
        .as_str()
        .map(str::trim)
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}

/// Describe a transport-level failure
pub fn transport_detail(err: &reqwest::Error, timeout_secs: u64) -> String {
    if err.is_timeout() {
        format!("request timed out after {} seconds", timeout_secs)
    } else if err.is_connect() {
        format!("failed to connect: {}", err)
    } else if err.is_decode() {
        format!("failed to read response body: {}", err)
    } else {
        format!("request failed: {}", err)
    }
}
