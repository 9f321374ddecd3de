/// Client enrichment module
///
/// This module provides the enrichment step of a client session:
/// - Deterministic, length-bounded context rendering from a client record
/// - The enrichment invoker seam with a heuristic stand-in and an HTTP implementation
/// - Partial enrichment results and their configuration

pub mod context;
pub mod invoker;
pub mod models;

pub use context::{ContextBuilder, TRUNCATION_MARKER};
pub use invoker::{build_invoker, EnrichmentInvoker, HeuristicInvoker, HttpEnrichmentInvoker};
pub use models::{
    ClientSummary, EnrichmentConfig, EnrichmentResult, InvokerKind, DEFAULT_MAX_CONTEXT_CHARS,
};
