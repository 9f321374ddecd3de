use crate::enrichment::{ContextBuilder, EnrichmentConfig, InvokerKind};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an optional configuration file
pub const CONFIG_PATH_ENV: &str = "CLIENT_ENRICHMENT_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/client-enrichment.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Client data collaborator configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Enrichment configuration
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from defaults, the optional config file and environment
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    /// Load configuration using an explicit config file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix: CLIENT_ENRICHMENT__)
            .add_source(
                config::Environment::with_prefix("CLIENT_ENRICHMENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the collaborators cannot be built from
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(AppError::Configuration(
                "backend.base_url must not be empty".to_string(),
            ));
        }

        if self.enrichment.invoker == InvokerKind::Http
            && self
                .enrichment
                .endpoint
                .as_deref()
                .map_or(true, |e| e.trim().is_empty())
        {
            return Err(AppError::Configuration(
                "enrichment.endpoint is required when enrichment.invoker = \"http\"".to_string(),
            ));
        }

        if self.backend.request_timeout_secs == 0 {
            return Err(AppError::Configuration(
                "backend.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.enrichment.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "enrichment.timeout_secs must be greater than 0".to_string(),
            ));
        }

        ContextBuilder::with_max_chars(self.enrichment.max_context_chars)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the client data service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("client-enrichment/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_base_url(), "http://localhost:8000");
        assert_eq!(default_request_timeout(), 10);
        assert_eq!(default_log_level(), "info");
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[backend]
base_url = "http://records.internal:9000"

[enrichment]
invoker = "http"
endpoint = "http://inference.internal/enrich"
max_context_chars = 1000
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.backend.base_url, "http://records.internal:9000");
        assert_eq!(config.backend.request_timeout_secs, 10);
        assert_eq!(config.enrichment.invoker, InvokerKind::Http);
        assert_eq!(config.enrichment.max_context_chars, 1000);
        assert!(config.enrichment.enabled);
    }

    #[test]
    fn test_missing_file_uses_embedded_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.enrichment.max_context_chars, 30_000);
        assert_eq!(config.enrichment.invoker, InvokerKind::Heuristic);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_http_invoker_without_endpoint_is_rejected() {
        let mut config = Config::default();
        config.enrichment.invoker = InvokerKind::Http;

        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        let mut config = Config::default();
        config.backend.request_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration(_))
        ));

        let mut config = Config::default();
        config.enrichment.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_tiny_context_limit_is_rejected() {
        let mut config = Config::default();
        config.enrichment.max_context_chars = 5;

        assert!(config.validate().is_err());
    }
}
