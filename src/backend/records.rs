use crate::backend::http::{error_detail, transport_detail, BackendClient};
use crate::error::{AppError, Result};
use crate::models::ClientRecord;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of full client records
#[async_trait]
pub trait ClientRecordFetcher: Send + Sync + 'static {
    /// Fetch profile, accounts and payment methods for one client
    async fn fetch_record(&self, identifier: &str) -> Result<ClientRecord>;
}

/// Record fetcher backed by `GET /clients/{identifier}`
#[derive(Clone)]
pub struct HttpClientRecordFetcher {
    backend: Arc<BackendClient>,
}

impl HttpClientRecordFetcher {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ClientRecordFetcher for HttpClientRecordFetcher {
    async fn fetch_record(&self, identifier: &str) -> Result<ClientRecord> {
        if identifier.trim().is_empty() {
            return Err(AppError::Validation(
                "client identifier must not be empty".to_string(),
            ));
        }

        let url = self.backend.endpoint(&["clients", identifier]);

        let response = self.backend.get(url).await.map_err(|e| {
            AppError::RecordFetchFailed(transport_detail(&e, self.backend.timeout_secs()))
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let detail = error_detail(response).await.unwrap_or_else(|| {
                format!("Client with identifier '{}' not found.", identifier)
            });
            return Err(AppError::RecordNotFound(detail));
        }

        if !status.is_success() {
            let detail = error_detail(response).await.unwrap_or_else(|| {
                format!("client record service returned HTTP {}", status.as_u16())
            });
            warn!(
                identifier = %identifier,
                status = status.as_u16(),
                detail = %detail,
                "Client record request failed"
            );
            return Err(AppError::RecordFetchFailed(detail));
        }

        let body = response.bytes().await.map_err(|e| {
            AppError::RecordFetchFailed(transport_detail(&e, self.backend.timeout_secs()))
        })?;

        let mut record: ClientRecord = serde_json::from_slice(&body).map_err(|e| {
            AppError::RecordFetchFailed(format!("invalid client record payload: {}", e))
        })?;

        if record.profile.client_identifier.is_empty() {
            record.profile.client_identifier = identifier.to_string();
        } else if record.profile.client_identifier != identifier {
            return Err(AppError::RecordFetchFailed(format!(
                "record service returned client '{}' for requested '{}'",
                record.profile.client_identifier, identifier
            )));
        }

        debug!(
            identifier = %identifier,
            accounts = record.accounts.len(),
            payment_methods = record.payment_methods.len(),
            "Client record fetched"
        );

        Ok(record)
    }
}
