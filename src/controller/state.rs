//! Session state machine for the selected client.
//!
//! ```text
//! Idle ──select──▶ LoadingBase ──ok──▶ LoadingEnrichment ──ok──▶ Ready
//!                      │                      │
//!                      └─err─▶ BaseError      └─err─▶ EnrichmentError
//! ```
//!
//! Any new selection restarts at `LoadingBase` under a fresh epoch.

use crate::enrichment::EnrichmentResult;
use crate::error::{AppError, Result};
use crate::models::{ClientListEntry, ClientRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Load phase of the selected client
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Idle,
    LoadingBase,
    BaseError,
    LoadingEnrichment,
    EnrichmentError,
    Ready,
}

impl LoadPhase {
    /// Check if a collaborator call is outstanding
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadPhase::LoadingBase | LoadPhase::LoadingEnrichment)
    }

    /// Check if the selection cycle has finished
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            LoadPhase::BaseError | LoadPhase::EnrichmentError | LoadPhase::Ready
        )
    }

    /// Check if the base record is displayed in this phase
    pub fn shows_record(&self) -> bool {
        matches!(
            self,
            LoadPhase::LoadingEnrichment | LoadPhase::EnrichmentError | LoadPhase::Ready
        )
    }
}

/// State of the currently selected client
///
/// `base_record` is either absent or belongs to `selected_identifier`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub selected_identifier: Option<String>,
    pub load_phase: LoadPhase,
    pub base_record: Option<ClientRecord>,
    pub enrichment: Option<EnrichmentResult>,
    pub base_error: Option<String>,
    pub enrichment_error: Option<String>,
    pub base_loaded_at: Option<DateTime<Utc>>,
    pub enriched_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    epoch: u64,
}

impl SessionState {
    /// Selection epoch; bumped on every new selection or reset
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start a new selection cycle and return its epoch
    pub(crate) fn begin(&mut self, identifier: String) -> u64 {
        self.epoch += 1;
        *self = SessionState {
            selected_identifier: Some(identifier),
            load_phase: LoadPhase::LoadingBase,
            epoch: self.epoch,
            ..Default::default()
        };
        self.epoch
    }

    /// Drop the selection and return to `Idle`
    pub(crate) fn reset(&mut self) -> u64 {
        self.epoch += 1;
        *self = SessionState {
            epoch: self.epoch,
            ..Default::default()
        };
        self.epoch
    }

    /// Store the fetched base record
    pub(crate) fn base_loaded(&mut self, record: ClientRecord, enrich: bool) -> Result<()> {
        self.expect(LoadPhase::LoadingBase, "base_loaded")?;

        if self.selected_identifier.as_deref() != Some(record.identifier()) {
            return Err(AppError::InvalidStateTransition(format!(
                "record for '{}' does not match selection {:?}",
                record.identifier(),
                self.selected_identifier
            )));
        }

        self.base_record = Some(record);
        self.enrichment = None;
        self.base_loaded_at = Some(Utc::now());
        self.load_phase = if enrich {
            LoadPhase::LoadingEnrichment
        } else {
            LoadPhase::Ready
        };
        Ok(())
    }

    pub(crate) fn base_failed(&mut self, detail: String) -> Result<()> {
        self.expect(LoadPhase::LoadingBase, "base_failed")?;

        self.base_record = None;
        self.base_error = Some(detail);
        self.load_phase = LoadPhase::BaseError;
        Ok(())
    }

    pub(crate) fn enrichment_ready(&mut self, result: EnrichmentResult) -> Result<()> {
        self.expect(LoadPhase::LoadingEnrichment, "enrichment_ready")?;

        self.enrichment = Some(result);
        self.enriched_at = Some(Utc::now());
        self.load_phase = LoadPhase::Ready;
        Ok(())
    }

    pub(crate) fn enrichment_failed(&mut self, detail: String) -> Result<()> {
        self.expect(LoadPhase::LoadingEnrichment, "enrichment_failed")?;

        self.enrichment = None;
        self.enrichment_error = Some(detail);
        self.load_phase = LoadPhase::EnrichmentError;
        Ok(())
    }

    fn expect(&self, phase: LoadPhase, transition: &str) -> Result<()> {
        if self.load_phase != phase {
            return Err(AppError::InvalidStateTransition(format!(
                "{} is not allowed in phase {}",
                transition, self.load_phase
            )));
        }
        Ok(())
    }
}

/// Lifecycle of the client list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum DirectoryState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<ClientListEntry>),
    Failed(String),
}

impl DirectoryState {
    /// Entries if the list has loaded
    pub fn entries(&self) -> Option<&[ClientListEntry]> {
        match self {
            DirectoryState::Loaded(entries) => Some(entries),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientProfile;

    fn record(identifier: &str) -> ClientRecord {
        ClientRecord::new(ClientProfile::new(identifier))
    }

    #[test]
    fn test_begin_resets_previous_selection() {
        let mut state = SessionState::default();
        let first = state.begin("A".to_string());
        state.base_loaded(record("A"), true).unwrap();
        state
            .enrichment_ready(EnrichmentResult {
                age: Some(40),
                ..Default::default()
            })
            .unwrap();

        let second = state.begin("B".to_string());

        assert!(second > first);
        assert_eq!(state.epoch(), second);
        assert_eq!(state.selected_identifier.as_deref(), Some("B"));
        assert_eq!(state.load_phase, LoadPhase::LoadingBase);
        assert!(state.base_record.is_none());
        assert!(state.enrichment.is_none());
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut state = SessionState::default();
        state.begin("A".to_string());

        state.base_loaded(record("A"), true).unwrap();
        assert_eq!(state.load_phase, LoadPhase::LoadingEnrichment);
        assert!(state.base_loaded_at.is_some());

        state.enrichment_ready(EnrichmentResult::default()).unwrap();
        assert_eq!(state.load_phase, LoadPhase::Ready);
        assert!(state.enriched_at.is_some());
    }

    #[test]
    fn test_enrichment_disabled_goes_straight_to_ready() {
        let mut state = SessionState::default();
        state.begin("A".to_string());
        state.base_loaded(record("A"), false).unwrap();

        assert_eq!(state.load_phase, LoadPhase::Ready);
        assert!(state.enrichment.is_none());
    }

    #[test]
    fn test_base_failure_keeps_record_absent() {
        let mut state = SessionState::default();
        state.begin("A".to_string());
        state.base_failed("client not found".to_string()).unwrap();

        assert_eq!(state.load_phase, LoadPhase::BaseError);
        assert_eq!(state.base_error.as_deref(), Some("client not found"));
        assert!(state.base_record.is_none());
        assert!(state.enrichment_error.is_none());
    }

    #[test]
    fn test_enrichment_failure_keeps_base_record() {
        let mut state = SessionState::default();
        state.begin("A".to_string());
        state.base_loaded(record("A"), true).unwrap();
        state.enrichment_failed("model offline".to_string()).unwrap();

        assert_eq!(state.load_phase, LoadPhase::EnrichmentError);
        assert!(state.base_record.is_some());
        assert!(state.base_error.is_none());
        assert_eq!(state.enrichment_error.as_deref(), Some("model offline"));
    }

    #[test]
    fn test_record_for_other_client_is_rejected() {
        let mut state = SessionState::default();
        state.begin("B".to_string());

        let err = state.base_loaded(record("A"), true).unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));
        assert!(state.base_record.is_none());
    }

    #[test]
    fn test_out_of_order_transitions_are_rejected() {
        let mut state = SessionState::default();
        assert!(state.enrichment_ready(EnrichmentResult::default()).is_err());

        state.begin("A".to_string());
        assert!(state.enrichment_failed("x".to_string()).is_err());

        state.base_failed("gone".to_string()).unwrap();
        assert!(state.base_loaded(record("A"), true).is_err());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut state = SessionState::default();
        let selected = state.begin("A".to_string());
        let reset = state.reset();

        assert!(reset > selected);
        assert_eq!(state.load_phase, LoadPhase::Idle);
        assert!(state.selected_identifier.is_none());
    }

    #[test]
    fn test_phase_helpers() {
        assert!(LoadPhase::LoadingBase.is_loading());
        assert!(!LoadPhase::BaseError.shows_record());
        assert!(LoadPhase::EnrichmentError.shows_record());
        assert!(LoadPhase::Ready.is_settled());
        assert_eq!(LoadPhase::LoadingEnrichment.to_string(), "loading_enrichment");
        assert_eq!("base_error".parse::<LoadPhase>().unwrap(), LoadPhase::BaseError);
    }
}
