use crate::models::account::{Account, PaymentMethod};
use crate::models::lenient;
use serde::{Deserialize, Serialize};

/// Entry in the list of selectable clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientListEntry {
    /// Unique client identifier
    #[serde(rename = "client_identifier")]
    pub identifier: String,

    /// Name shown in the client picker
    #[serde(rename = "full_name", default, deserialize_with = "lenient::optional")]
    pub display_name: Option<String>,
}

impl ClientListEntry {
    /// Label for the picker, falling back to the identifier
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }
}

/// Identity and contact data of a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    /// Identifier in the source system of record
    #[serde(default)]
    pub client_identifier: String,

    /// Internal row id
    #[serde(default, deserialize_with = "lenient::optional")]
    pub client_id: Option<i64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub first_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub last_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub full_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub membership_number: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub client_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub address: Option<String>,

    /// Creation timestamp as supplied by the collaborator
    #[serde(default, deserialize_with = "lenient::optional")]
    pub created_at: Option<String>,
}

impl ClientProfile {
    /// Create a profile carrying only an identifier
    pub fn new(client_identifier: impl Into<String>) -> Self {
        Self {
            client_identifier: client_identifier.into(),
            ..Default::default()
        }
    }

    /// Full name if known, else first and last name, else the identifier
    pub fn display_name(&self) -> String {
        if let Some(full_name) = self.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return full_name.to_string();
        }

        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let joined = joined.trim();

        if joined.is_empty() {
            self.client_identifier.clone()
        } else {
            joined.to_string()
        }
    }
}

/// Full record of one client as returned by the record collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(rename = "client")]
    pub profile: ClientProfile,

    #[serde(default, deserialize_with = "lenient::sequence")]
    pub accounts: Vec<Account>,

    #[serde(default, deserialize_with = "lenient::sequence")]
    pub payment_methods: Vec<PaymentMethod>,
}

impl ClientRecord {
    /// Record with a profile and no accounts or payment methods
    pub fn new(profile: ClientProfile) -> Self {
        Self {
            profile,
            accounts: Vec::new(),
            payment_methods: Vec::new(),
        }
    }

    /// Identifier of the client this record belongs to
    pub fn identifier(&self) -> &str {
        &self.profile.client_identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_entry_wire_names() {
        let entries: Vec<ClientListEntry> = serde_json::from_str(
            r#"[{"client_identifier": "111.111.111.1", "full_name": "Peter Muster"},
                {"client_identifier": "222.222.222.2", "full_name": null}]"#,
        )
        .unwrap();

        assert_eq!(entries[0].identifier, "111.111.111.1");
        assert_eq!(entries[0].label(), "Peter Muster");
        assert!(entries[1].display_name.is_none());
        assert_eq!(entries[1].label(), "222.222.222.2");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut profile = ClientProfile::new("A");
        assert_eq!(profile.display_name(), "A");

        profile.first_name = Some("Anna".to_string());
        profile.last_name = Some("Keller".to_string());
        assert_eq!(profile.display_name(), "Anna Keller");

        profile.full_name = Some("Anna M. Keller".to_string());
        assert_eq!(profile.display_name(), "Anna M. Keller");
    }

    #[test]
    fn test_record_with_nulls_and_malformed_optionals() {
        let record: ClientRecord = serde_json::from_str(
            r#"{
                "client": {
                    "client_id": 7,
                    "client_identifier": "A",
                    "full_name": "Alice",
                    "email": null,
                    "phone": 12345,
                    "created_at": "2023-01-15T09:30:00"
                },
                "accounts": null
            }"#,
        )
        .unwrap();

        assert_eq!(record.identifier(), "A");
        assert_eq!(record.profile.full_name.as_deref(), Some("Alice"));
        assert!(record.profile.email.is_none());
        assert!(record.profile.phone.is_none());
        assert!(record.accounts.is_empty());
        assert!(record.payment_methods.is_empty());
    }
}
