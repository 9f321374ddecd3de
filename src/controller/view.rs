use crate::controller::state::{LoadPhase, SessionState};
use crate::enrichment::{ClientSummary, EnrichmentResult};
use crate::models::{Account, ClientRecord};
use serde::Serialize;

/// What the profile panel shows for the current session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProfileView {
    /// Nothing selected
    Idle,
    /// Base record is being fetched
    Loading { identifier: String },
    /// Base record could not be fetched
    Error { identifier: String, detail: String },
    /// Base record shown, enrichment fields filled in as they arrive
    Profile {
        model: DisplayViewModel,
        enrichment: EnrichmentStatus,
    },
}

impl ProfileView {
    /// Render the view for a session snapshot
    pub fn from_session(session: &SessionState) -> Self {
        let identifier = session.selected_identifier.clone().unwrap_or_default();

        match (session.load_phase, session.base_record.as_ref()) {
            (LoadPhase::Idle, _) => ProfileView::Idle,
            (LoadPhase::BaseError, _) => ProfileView::Error {
                identifier,
                detail: session
                    .base_error
                    .clone()
                    .unwrap_or_else(|| "Client data could not be loaded.".to_string()),
            },
            (phase, Some(record)) if phase.shows_record() => {
                let enrichment = match phase {
                    LoadPhase::LoadingEnrichment => EnrichmentStatus::Pending,
                    LoadPhase::EnrichmentError => EnrichmentStatus::Failed(
                        session
                            .enrichment_error
                            .clone()
                            .unwrap_or_else(|| "Enrichment unavailable.".to_string()),
                    ),
                    _ if session.enrichment.is_some() => EnrichmentStatus::Ready,
                    _ => EnrichmentStatus::Disabled,
                };

                ProfileView::Profile {
                    model: DisplayViewModel::merge(record, session.enrichment.as_ref()),
                    enrichment,
                }
            }
            _ => ProfileView::Loading { identifier },
        }
    }

    /// The merged view model, when a record is displayed
    pub fn model(&self) -> Option<&DisplayViewModel> {
        match self {
            ProfileView::Profile { model, .. } => Some(model),
            _ => None,
        }
    }
}

/// Status of the enrichment-derived fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum EnrichmentStatus {
    Pending,
    Ready,
    Disabled,
    /// Inline notice; the base record stays visible
    Failed(String),
}

/// Profile fields merged with enrichment-only attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayViewModel {
    pub identifier: String,
    pub display_name: String,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub membership_number: Option<String>,
    pub client_type: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: Option<String>,

    // Enrichment-only attributes
    pub age: Option<u32>,
    pub occupation: Option<String>,
    pub fun_facts: Option<Vec<String>>,
    pub summary: Option<ClientSummary>,

    pub accounts: AccountsSection,
    pub payment_method_count: usize,
}

impl DisplayViewModel {
    /// Merge a base record with an optional enrichment result
    ///
    /// Enrichment only supplies attributes the profile does not define.
    pub fn merge(record: &ClientRecord, enrichment: Option<&EnrichmentResult>) -> Self {
        let profile = &record.profile;

        Self {
            identifier: profile.client_identifier.clone(),
            display_name: profile.display_name(),
            full_name: profile.full_name.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            membership_number: profile.membership_number.clone(),
            client_type: profile.client_type.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
            created_at: profile.created_at.clone(),
            age: enrichment.and_then(|e| e.age),
            occupation: enrichment.and_then(|e| e.occupation.clone()),
            fun_facts: enrichment.and_then(|e| e.fun_facts.clone()),
            summary: enrichment.and_then(|e| e.summary.clone()),
            accounts: AccountsSection::from_accounts(&record.accounts),
            payment_method_count: record.payment_methods.len(),
        }
    }
}

/// Accounts part of the profile panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum AccountsSection {
    /// Explicit "no accounts" indication
    NoAccounts,
    Accounts(Vec<AccountSummary>),
}

impl AccountsSection {
    fn from_accounts(accounts: &[Account]) -> Self {
        if accounts.is_empty() {
            AccountsSection::NoAccounts
        } else {
            AccountsSection::Accounts(accounts.iter().map(AccountSummary::from).collect())
        }
    }
}

/// One line of the accounts list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub account_number: String,
    pub name: String,
    pub account_type: String,
    pub asset_category: Option<String>,
    pub currency: String,
    pub balance: f64,
    pub transaction_count: usize,
    pub holding_count: usize,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            account_number: account.account_number.clone(),
            name: account.display_name().to_string(),
            account_type: account.account_type.clone(),
            asset_category: account.asset_category.clone(),
            currency: account.currency.clone(),
            balance: account.balance,
            transaction_count: account.transactions.len(),
            holding_count: account.holdings.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientProfile;

    fn alice() -> ClientRecord {
        let mut profile = ClientProfile::new("A");
        profile.full_name = Some("Alice".to_string());
        ClientRecord::new(profile)
    }

    #[test]
    fn test_age_only_enrichment_leaves_other_fields_absent() {
        let enrichment = EnrichmentResult {
            age: Some(40),
            ..Default::default()
        };
        let model = DisplayViewModel::merge(&alice(), Some(&enrichment));

        assert_eq!(model.identifier, "A");
        assert_eq!(model.full_name.as_deref(), Some("Alice"));
        assert_eq!(model.age, Some(40));
        assert!(model.occupation.is_none());
        assert!(model.fun_facts.is_none());
        assert!(model.summary.is_none());
    }

    #[test]
    fn test_no_accounts_is_explicit() {
        let model = DisplayViewModel::merge(&alice(), None);

        assert_eq!(model.accounts, AccountsSection::NoAccounts);
        assert_eq!(model.payment_method_count, 0);
    }

    #[test]
    fn test_view_per_phase() {
        let mut session = SessionState::default();
        assert_eq!(ProfileView::from_session(&session), ProfileView::Idle);

        session.begin("A".to_string());
        assert_eq!(
            ProfileView::from_session(&session),
            ProfileView::Loading {
                identifier: "A".to_string()
            }
        );

        session.base_loaded(alice(), true).unwrap();
        match ProfileView::from_session(&session) {
            ProfileView::Profile { model, enrichment } => {
                assert_eq!(enrichment, EnrichmentStatus::Pending);
                assert!(model.age.is_none());
            }
            other => panic!("unexpected view: {:?}", other),
        }

        session.enrichment_failed("model offline".to_string()).unwrap();
        match ProfileView::from_session(&session) {
            ProfileView::Profile { model, enrichment } => {
                assert_eq!(enrichment, EnrichmentStatus::Failed("model offline".to_string()));
                assert_eq!(model.display_name, "Alice");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_base_error_view_shows_only_detail() {
        let mut session = SessionState::default();
        session.begin("A".to_string());
        session.base_failed("client not found".to_string()).unwrap();

        let view = ProfileView::from_session(&session);
        assert_eq!(
            view,
            ProfileView::Error {
                identifier: "A".to_string(),
                detail: "client not found".to_string()
            }
        );
        assert!(view.model().is_none());
    }

    #[test]
    fn test_view_serializes_with_state_tag() {
        let mut session = SessionState::default();
        session.begin("A".to_string());
        session.base_loaded(alice(), false).unwrap();

        let json = serde_json::to_value(ProfileView::from_session(&session)).unwrap();
        assert_eq!(json["state"], "profile");
        assert_eq!(json["enrichment"]["status"], "disabled");
        assert_eq!(json["model"]["accounts"]["kind"], "no_accounts");
    }
}
