use crate::models::lenient;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default cap on the rendered context, in characters
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 30_000;

/// Configuration for client enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Enable enrichment after a successful base fetch
    pub enabled: bool,

    /// Which invoker implementation to wire
    pub invoker: InvokerKind,

    /// Inference endpoint (required for the http invoker)
    pub endpoint: Option<String>,

    /// Enrichment timeout (seconds)
    pub timeout_secs: u64,

    /// Maximum context length (characters)
    pub max_context_chars: usize,

    /// Artificial delay for the heuristic invoker (milliseconds)
    pub simulated_latency_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            invoker: InvokerKind::Heuristic,
            endpoint: None,
            timeout_secs: 30,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            simulated_latency_ms: 0,
        }
    }
}

/// Available enrichment invoker implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvokerKind {
    /// Local keyword heuristics, no network
    #[default]
    Heuristic,
    /// JSON-over-HTTP inference collaborator
    Http,
}

/// Attributes inferred for a client
///
/// Every field is independently optional: the collaborator may decline to
/// infer any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<u32>,

    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub occupation: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub fun_facts: Option<Vec<String>>,

    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<ClientSummary>,
}

impl EnrichmentResult {
    /// Check if nothing was inferred
    pub fn is_empty(&self) -> bool {
        self.present_fields() == 0
    }

    /// Number of inferred fields
    pub fn present_fields(&self) -> usize {
        [
            self.age.is_some(),
            self.occupation.is_some(),
            self.fun_facts.is_some(),
            self.summary.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

/// Short narrative about the client for meeting preparation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub description: String,
    pub meeting_tip: String,
}
