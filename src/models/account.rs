use crate::models::lenient;
use serde::{Deserialize, Serialize};

/// Bank account held by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: i64,
    pub account_number: String,
    pub account_type: String,
    pub currency: String,
    pub balance: f64,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub account_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub asset_category: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub opened_at: Option<String>,

    /// Interest rate as a fraction (0.015 = 1.5%)
    #[serde(default, deserialize_with = "lenient::optional")]
    pub interest_rate: Option<f64>,

    /// Rate margin as a fraction
    #[serde(default, deserialize_with = "lenient::optional")]
    pub rate_margin: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub term_start_date: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub term_end_date: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub cost_basis: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub performance_value: Option<f64>,

    /// Performance in percent points
    #[serde(default, deserialize_with = "lenient::optional")]
    pub performance_percent: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub notes: Option<String>,

    #[serde(default, deserialize_with = "lenient::sequence")]
    pub transactions: Vec<Transaction>,

    #[serde(default, deserialize_with = "lenient::sequence")]
    pub holdings: Vec<Holding>,
}

impl Account {
    /// Account name if set, else the account type
    pub fn display_name(&self) -> &str {
        self.account_name.as_deref().unwrap_or(&self.account_type)
    }
}

/// Booked transaction on an account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: i64,
    pub amount: f64,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub transaction_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub transaction_date: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub related_account_number: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub asset_details: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub running_balance: Option<f64>,
}

/// Security position in an investment account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub holding_id: i64,
    pub security_name: String,
    pub quantity: f64,
    pub currency: String,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub isin: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub valor: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub current_price: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub current_value: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub cost_basis_total: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub performance_value: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub performance_percent: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub last_updated: Option<String>,
}

/// Card or other payment instrument
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub payment_method_id: i64,
    pub method_type: String,
    pub name: String,
    pub currency: String,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub provider: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub masked_identifier: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub expiry_date: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub daily_limit: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub monthly_limit: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_with_nested_data() {
        let account: Account = serde_json::from_str(
            r#"{
                "account_id": 1,
                "account_number": "CH93 0076 2011 6238 5295 7",
                "account_type": "Investment",
                "currency": "CHF",
                "balance": 125000.5,
                "asset_category": "Wertschriften",
                "performance_percent": 4.2,
                "transactions": [
                    {"transaction_id": 10, "amount": -250.0, "description": "Fee", "running_balance": null}
                ],
                "holdings": [
                    {"holding_id": 3, "security_name": "ACME AG", "quantity": 10, "currency": "CHF", "isin": "CH0000000001"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(account.display_name(), "Investment");
        assert_eq!(account.transactions.len(), 1);
        assert!(account.transactions[0].running_balance.is_none());
        assert_eq!(account.holdings[0].quantity, 10.0);
        assert!(account.interest_rate.is_none());
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let result: Result<Account, _> =
            serde_json::from_str(r#"{"account_id": 1, "account_type": "Savings"}"#);
        assert!(result.is_err());
    }
}
