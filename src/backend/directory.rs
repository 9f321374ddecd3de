use crate::backend::http::{error_detail, transport_detail, BackendClient};
use crate::error::{AppError, Result};
use crate::models::ClientListEntry;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of the selectable clients
#[async_trait]
pub trait ClientDirectory: Send + Sync + 'static {
    /// List selectable clients in collaborator order
    async fn list_clients(&self) -> Result<Vec<ClientListEntry>>;
}

/// Directory backed by `GET /clients`
#[derive(Clone)]
pub struct HttpClientDirectory {
    backend: Arc<BackendClient>,
}

impl HttpClientDirectory {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ClientDirectory for HttpClientDirectory {
    async fn list_clients(&self) -> Result<Vec<ClientListEntry>> {
        let url = self.backend.endpoint(&["clients"]);

        let response = self.backend.get(url).await.map_err(|e| {
            AppError::DirectoryUnavailable(transport_detail(&e, self.backend.timeout_secs()))
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await.unwrap_or_else(|| {
                format!("client directory returned HTTP {}", status.as_u16())
            });
            warn!(status = status.as_u16(), detail = %detail, "Client directory request failed");
            return Err(AppError::DirectoryUnavailable(detail));
        }

        let body = response.bytes().await.map_err(|e| {
            AppError::DirectoryUnavailable(transport_detail(&e, self.backend.timeout_secs()))
        })?;

        let entries: Vec<ClientListEntry> = serde_json::from_slice(&body).map_err(|e| {
            AppError::DirectoryUnavailable(format!("invalid client list payload: {}", e))
        })?;

        debug!(count = entries.len(), "Client directory loaded");
        Ok(entries)
    }
}
