use thiserror::Error;

/// Application error types
///
/// Each collaborator failure carries the detail text the collaborator supplied
/// (or a generic fallback) so it can be surfaced to the view verbatim.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client directory could not be listed
    #[error("Client directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// Record collaborator reported the identifier does not exist
    #[error("Client record not found: {0}")]
    RecordNotFound(String),

    /// Network, parse or server failure while fetching a record
    #[error("Client record fetch failed: {0}")]
    RecordFetchFailed(String),

    /// Enrichment collaborator failed
    #[error("Enrichment failed: {0}")]
    EnrichmentFailed(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid session state transition
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::DirectoryUnavailable(_) => "DIRECTORY_UNAVAILABLE",
            AppError::RecordNotFound(_) => "RECORD_NOT_FOUND",
            AppError::RecordFetchFailed(_) => "RECORD_FETCH_FAILED",
            AppError::EnrichmentFailed(_) => "ENRICHMENT_FAILED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Io(_) => "IO_ERROR",
            AppError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Detail text without the category prefix, as shown to the user
    pub fn detail(&self) -> String {
        match self {
            AppError::DirectoryUnavailable(d)
            | AppError::RecordNotFound(d)
            | AppError::RecordFetchFailed(d)
            | AppError::EnrichmentFailed(d)
            | AppError::Validation(d)
            | AppError::Configuration(d)
            | AppError::Serialization(d)
            | AppError::Timeout(d)
            | AppError::InvalidStateTransition(d)
            | AppError::Internal(d) => d.clone(),
            AppError::Io(e) => e.to_string(),
        }
    }

    /// Whether the error came from the base-record collaborator
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            AppError::RecordNotFound(_) | AppError::RecordFetchFailed(_)
        )
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::RecordNotFound("x".to_string()).error_code(),
            "RECORD_NOT_FOUND"
        );
        assert_eq!(
            AppError::EnrichmentFailed("x".to_string()).error_code(),
            "ENRICHMENT_FAILED"
        );
        assert_eq!(
            AppError::DirectoryUnavailable("x".to_string()).error_code(),
            "DIRECTORY_UNAVAILABLE"
        );
    }

    #[test]
    fn test_detail_is_verbatim() {
        let err = AppError::RecordNotFound("client not found".to_string());
        assert_eq!(err.detail(), "client not found");
        assert_eq!(err.to_string(), "Client record not found: client not found");
    }

    #[test]
    fn test_record_error_classification() {
        assert!(AppError::RecordFetchFailed("boom".to_string()).is_record_error());
        assert!(!AppError::EnrichmentFailed("boom".to_string()).is_record_error());
    }
}
