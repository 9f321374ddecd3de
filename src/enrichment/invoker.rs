use crate::backend::http::{error_detail, transport_detail};
use crate::enrichment::models::{EnrichmentConfig, EnrichmentResult, InvokerKind};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Capability that turns a client context into inferred attributes
///
/// One logical call per invocation, no retry. Implementations report every
/// collaborator failure as [`AppError::EnrichmentFailed`] and may leave any
/// subset of the result fields empty.
#[async_trait]
pub trait EnrichmentInvoker: Send + Sync + 'static {
    async fn invoke(&self, context: &str) -> Result<EnrichmentResult>;
}

/// Keyword rule used by the heuristic invoker
struct OccupationRule {
    keyword: &'static str,
    occupation: &'static str,
    typical_age: Option<u32>,
}

const OCCUPATION_RULES: &[OccupationRule] = &[
    OccupationRule {
        keyword: "pension",
        occupation: "Retiree",
        typical_age: Some(68),
    },
    OccupationRule {
        keyword: "student",
        occupation: "Student",
        typical_age: Some(22),
    },
    OccupationRule {
        keyword: "business",
        occupation: "Business owner",
        typical_age: Some(48),
    },
    OccupationRule {
        keyword: "salary",
        occupation: "Salaried employee",
        typical_age: None,
    },
];

const FACT_RULES: &[(&str, &str)] = &[
    ("investment", "Holds an investment portfolio"),
    ("mortgage", "Finances a property with a mortgage"),
    ("3a", "Saves for retirement with a pillar 3a account"),
    ("credit card", "Uses a credit card for everyday payments"),
    ("crypto", "Has exposure to digital assets"),
];

/// Stand-in invoker that guesses attributes from keywords in the context
///
/// Deterministic for a given context. Declines to produce a summary.
#[derive(Debug, Clone, Default)]
pub struct HeuristicInvoker {
    latency: Duration,
}

impl HeuristicInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every invocation, imitating a remote call
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl EnrichmentInvoker for HeuristicInvoker {
    async fn invoke(&self, context: &str) -> Result<EnrichmentResult> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if context.trim().is_empty() {
            return Err(AppError::EnrichmentFailed(
                "empty context, nothing to infer from".to_string(),
            ));
        }

        let evidence: Vec<Vec<String>> = evidence_lines(context).into_iter().map(words).collect();

        let rule = OCCUPATION_RULES
            .iter()
            .find(|rule| mentions(&evidence, rule.keyword));

        let fun_facts: Vec<String> = FACT_RULES
            .iter()
            .filter(|(keyword, _)| mentions(&evidence, keyword))
            .map(|(_, fact)| fact.to_string())
            .collect();

        let result = EnrichmentResult {
            age: rule.and_then(|r| r.typical_age),
            occupation: rule.map(|r| r.occupation.to_string()),
            fun_facts: (!fun_facts.is_empty()).then_some(fun_facts),
            summary: None,
        };

        debug!(
            fields = result.present_fields(),
            "Heuristic enrichment produced partial result"
        );

        Ok(result)
    }
}

/// Free-text values of the context that describe products and activity
///
/// Section headers, placeholder lines and identifiers (account numbers,
/// ISINs, masked card numbers) are left out.
fn evidence_lines(context: &str) -> Vec<&str> {
    const VALUE_LABELS: &[&str] = &["account_type:", "notes:", "Client_client_type:"];

    context
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            if let Some(rest) = line
                .strip_prefix("Account:")
                .or_else(|| line.strip_prefix("Holding:"))
            {
                return rest.split(" (").next();
            }
            if let Some(rest) = line.strip_prefix("PaymentMethod:") {
                return rest.split("), ").next();
            }
            if let Some(rest) = line.strip_prefix("-- Category:") {
                return Some(rest.trim_end_matches("--"));
            }
            if line.starts_with("TxID") {
                return line
                    .split_once("Desc=")
                    .and_then(|(_, rest)| rest.split(", Amount=").next());
            }
            VALUE_LABELS
                .iter()
                .find_map(|label| line.strip_prefix(*label))
        })
        .collect()
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Check if any line contains `keyword` as a run of whole words
///
/// The last keyword word may be a prefix, so "investment" matches "investments".
fn mentions(lines: &[Vec<String>], keyword: &str) -> bool {
    let needle: Vec<&str> = keyword.split(' ').collect();

    lines.iter().any(|line| {
        line.windows(needle.len()).any(|window| {
            window.iter().zip(&needle).enumerate().all(|(i, (word, wanted))| {
                if i + 1 == needle.len() {
                    word.starts_with(*wanted)
                } else {
                    word.as_str() == *wanted
                }
            })
        })
    })
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    context: &'a str,
}

/// Invoker backed by a JSON-over-HTTP inference collaborator
///
/// Sends `{"context": ...}` and expects `{age?, occupation?, funFacts?, summary?}`.
#[derive(Clone)]
pub struct HttpEnrichmentInvoker {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

impl HttpEnrichmentInvoker {
    /// Create a new HTTP invoker
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(AppError::Configuration(
                "enrichment endpoint must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("client-enrichment/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EnrichmentInvoker for HttpEnrichmentInvoker {
    async fn invoke(&self, context: &str) -> Result<EnrichmentResult> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { context })
            .send()
            .await
            .map_err(|e| AppError::EnrichmentFailed(transport_detail(&e, self.timeout_secs)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await.unwrap_or_else(|| {
                format!("inference service returned HTTP {}", status.as_u16())
            });
            return Err(AppError::EnrichmentFailed(detail));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::EnrichmentFailed(transport_detail(&e, self.timeout_secs)))?;

        serde_json::from_slice(&body).map_err(|e| {
            AppError::EnrichmentFailed(format!("invalid inference response: {}", e))
        })
    }
}

/// Build the invoker selected by configuration
pub fn build_invoker(config: &EnrichmentConfig) -> Result<Arc<dyn EnrichmentInvoker>> {
    let invoker: Arc<dyn EnrichmentInvoker> = match config.invoker {
        InvokerKind::Heuristic => Arc::new(HeuristicInvoker::with_latency(
            Duration::from_millis(config.simulated_latency_ms),
        )),
        InvokerKind::Http => {
            let endpoint = config.endpoint.clone().ok_or_else(|| {
                AppError::Configuration("enrichment.endpoint is required for the http invoker".to_string())
            })?;
            Arc::new(HttpEnrichmentInvoker::new(endpoint, config.timeout_secs)?)
        }
    };

    info!(invoker = %config.invoker, "Enrichment invoker configured");
    Ok(invoker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::ContextBuilder;
    use crate::models::{Account, ClientProfile, ClientRecord, Holding};

    #[tokio::test]
    async fn test_heuristic_partial_result() {
        let invoker = HeuristicInvoker::new();
        let result = invoker
            .invoke("Account: Pension fund\n  Account: Investment depot")
            .await
            .unwrap();

        assert_eq!(result.occupation.as_deref(), Some("Retiree"));
        assert_eq!(result.age, Some(68));
        assert_eq!(
            result.fun_facts,
            Some(vec!["Holds an investment portfolio".to_string()])
        );
        assert!(result.summary.is_none());
    }

    #[tokio::test]
    async fn test_heuristic_may_infer_nothing() {
        let invoker = HeuristicInvoker::new();
        let result = invoker.invoke("Client_client_identifier: A").await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_heuristic_is_deterministic() {
        let invoker = HeuristicInvoker::new();
        let context = "  Account: Salary account (No: CH-1, ID: 1)\n    account_type: Mortgage\n  PaymentMethod: Visa (Credit Card), ID: **** 3A01";

        let first = invoker.invoke(context).await.unwrap();
        let second = invoker.invoke(context).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.occupation.as_deref(), Some("Salaried employee"));
        assert!(first.age.is_none());
    }

    #[tokio::test]
    async fn test_heuristic_ignores_placeholders_of_empty_record() {
        let record = ClientRecord::new(ClientProfile::new("A"));
        let context = ContextBuilder::new().build_context(&record);

        let result = HeuristicInvoker::new().invoke(&context).await.unwrap();

        assert!(result.fun_facts.is_none());
        assert!(result.occupation.is_none());
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_heuristic_ignores_identifiers() {
        let mut record = ClientRecord::new(ClientProfile::new("3A.111.111.1"));
        record.accounts.push(Account {
            account_number: "CH93-3A-PENSION".to_string(),
            account_type: "Current".to_string(),
            currency: "CHF".to_string(),
            holdings: vec![Holding {
                security_name: "Swiss Equity Fund".to_string(),
                isin: Some("CH003A-INVESTMENT".to_string()),
                quantity: 10.0,
                currency: "CHF".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        });
        let context = ContextBuilder::new().build_context(&record);

        let result = HeuristicInvoker::new().invoke(&context).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_heuristic_reads_account_values_from_built_context() {
        let mut record = ClientRecord::new(ClientProfile::new("A"));
        record.accounts.push(Account {
            account_number: "CH-1".to_string(),
            account_type: "Pillar 3a".to_string(),
            account_name: Some("Retirement savings".to_string()),
            asset_category: Some("Investments".to_string()),
            currency: "CHF".to_string(),
            ..Default::default()
        });
        let context = ContextBuilder::new().build_context(&record);

        let result = HeuristicInvoker::new().invoke(&context).await.unwrap();

        assert_eq!(
            result.fun_facts,
            Some(vec![
                "Holds an investment portfolio".to_string(),
                "Saves for retirement with a pillar 3a account".to_string(),
            ])
        );
        assert!(result.occupation.is_none());
    }

    #[tokio::test]
    async fn test_heuristic_rejects_empty_context() {
        let invoker = HeuristicInvoker::new();
        let err = invoker.invoke("   ").await.unwrap_err();

        assert!(matches!(err, AppError::EnrichmentFailed(_)));
    }

    #[test]
    fn test_build_invoker_requires_endpoint_for_http() {
        let config = EnrichmentConfig {
            invoker: InvokerKind::Http,
            endpoint: None,
            ..Default::default()
        };

        assert!(matches!(
            build_invoker(&config),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_build_invoker_heuristic() {
        let config = EnrichmentConfig::default();
        assert!(build_invoker(&config).is_ok());
    }

    #[test]
    fn test_http_invoker_rejects_blank_endpoint() {
        assert!(HttpEnrichmentInvoker::new("  ", 5).is_err());
    }
}
