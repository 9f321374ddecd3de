//! Rendering of a client record into the text submitted for enrichment.
//!
//! The output is deterministic for a given record and bounded by a maximum
//! character count. Over-long output is cut and always ends with
//! [`TRUNCATION_MARKER`].

use crate::enrichment::models::DEFAULT_MAX_CONTEXT_CHARS;
use crate::error::{AppError, Result};
use crate::models::{Account, ClientProfile, ClientRecord, PaymentMethod};
use std::fmt::Write;

/// Suffix appended when the context had to be cut
pub const TRUNCATION_MARKER: &str = "\n...[context truncated]";

const MISSING: &str = "N/A";

/// Builds the enrichment context for a client record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextBuilder {
    max_chars: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

impl ContextBuilder {
    /// Create a builder with the default limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with a custom limit
    ///
    /// The limit must leave room for the truncation marker.
    pub fn with_max_chars(max_chars: usize) -> Result<Self> {
        let marker_chars = TRUNCATION_MARKER.chars().count();
        if max_chars <= marker_chars {
            return Err(AppError::Configuration(format!(
                "max_context_chars must be greater than {} (got {})",
                marker_chars, max_chars
            )));
        }

        Ok(Self { max_chars })
    }

    /// Configured limit in characters
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Render the record and enforce the length limit
    pub fn build_context(&self, record: &ClientRecord) -> String {
        self.truncate(render_record(record))
    }

    fn truncate(&self, text: String) -> String {
        if text.chars().count() <= self.max_chars {
            return text;
        }

        let keep = self.max_chars - TRUNCATION_MARKER.chars().count();
        let cut = text
            .char_indices()
            .nth(keep)
            .map(|(index, _)| index)
            .unwrap_or(text.len());

        let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
        truncated.push_str(&text[..cut]);
        truncated.push_str(TRUNCATION_MARKER);
        truncated
    }
}

/// Render a record without applying any limit
pub fn render_record(record: &ClientRecord) -> String {
    let mut out = String::new();
    let name = record.profile.display_name();

    let _ = writeln!(out, "--- Client data start ({}) ---", name);
    render_profile(&mut out, &record.profile);
    render_accounts(&mut out, &record.accounts);
    render_transactions(&mut out, &record.accounts);
    render_holdings(&mut out, &record.accounts);
    render_payment_methods(&mut out, &record.payment_methods);
    let _ = write!(out, "\n--- Client data end ---");

    out
}

fn render_profile(out: &mut String, profile: &ClientProfile) {
    let fields: [(&str, Option<String>); 11] = [
        ("client_identifier", Some(profile.client_identifier.clone())),
        ("client_id", profile.client_id.map(|id| id.to_string())),
        ("first_name", profile.first_name.clone()),
        ("last_name", profile.last_name.clone()),
        ("full_name", profile.full_name.clone()),
        ("membership_number", profile.membership_number.clone()),
        ("client_type", profile.client_type.clone()),
        ("email", profile.email.clone()),
        ("phone", profile.phone.clone()),
        ("address", profile.address.clone()),
        ("created_at", profile.created_at.clone()),
    ];

    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let _ = writeln!(out, "Client_{}: {}", label, value);
        }
    }
    out.push_str("--- End client data ---\n");
}

fn render_accounts(out: &mut String, accounts: &[Account]) {
    out.push_str("\n--- Accounts data ---\n");

    if accounts.is_empty() {
        out.push_str("No accounts found.\n");
    }

    let mut current_category: Option<&str> = None;
    for account in accounts {
        let category = account.asset_category.as_deref().unwrap_or("Uncategorized");
        if current_category != Some(category) {
            let _ = writeln!(out, "\n-- Category: {} --", category);
            current_category = Some(category);
        }

        let _ = writeln!(
            out,
            "  Account: {} (No: {}, ID: {})",
            account.display_name(),
            account.account_number,
            account.account_id
        );

        let details: [(&str, Option<String>); 13] = [
            ("account_type", Some(account.account_type.clone())),
            ("balance", Some(format_amount(account.balance))),
            ("currency", Some(account.currency.clone())),
            ("interest_rate", account.interest_rate.map(format_rate)),
            ("rate_margin", account.rate_margin.map(format_rate)),
            ("term_start_date", account.term_start_date.clone()),
            ("term_end_date", account.term_end_date.clone()),
            ("cost_basis", account.cost_basis.map(format_amount)),
            ("performance_value", account.performance_value.map(format_amount)),
            (
                "performance_percent",
                account.performance_percent.map(format_signed_percent),
            ),
            ("notes", account.notes.clone()),
            ("opened_at", account.opened_at.clone()),
            (
                "positions",
                Some(format!(
                    "{} transactions, {} holdings",
                    account.transactions.len(),
                    account.holdings.len()
                )),
            ),
        ];

        for (label, value) in details {
            if let Some(value) = value {
                let _ = writeln!(out, "    {}: {}", label, value);
            }
        }
    }

    out.push_str("--- End accounts data ---\n");
}

fn render_transactions(out: &mut String, accounts: &[Account]) {
    out.push_str("\n--- Transactions data ---\n");

    let mut any = false;
    for account in accounts.iter().filter(|a| !a.transactions.is_empty()) {
        any = true;
        let _ = writeln!(
            out,
            "\n-- Transactions for account: {} ({}) --",
            account.display_name(),
            account.account_number
        );

        for tx in &account.transactions {
            let _ = writeln!(
                out,
                "  TxID {}: Date={}, Type={}, Desc={}, Amount={}, RunningBalance={}",
                tx.transaction_id,
                or_missing(tx.transaction_date.as_deref()),
                or_missing(tx.transaction_type.as_deref()),
                or_missing(tx.description.as_deref()),
                format_signed_amount(tx.amount),
                tx.running_balance
                    .map(format_amount)
                    .unwrap_or_else(|| MISSING.to_string())
            );
            if let Some(related) = tx.related_account_number.as_deref() {
                let _ = writeln!(out, "      RelatedAcc: {}", related);
            }
            if let Some(asset) = tx.asset_details.as_deref() {
                let _ = writeln!(out, "      AssetDetails: {}", asset);
            }
        }
    }

    if !any {
        out.push_str("No transactions found for any account.\n");
    }
    out.push_str("--- End transactions data ---\n");
}

fn render_holdings(out: &mut String, accounts: &[Account]) {
    out.push_str("\n--- Holdings data ---\n");

    let mut any = false;
    for account in accounts.iter().filter(|a| !a.holdings.is_empty()) {
        any = true;
        let _ = writeln!(
            out,
            "\n-- Holdings for account: {} ({}) --",
            account.display_name(),
            account.account_number
        );

        for holding in &account.holdings {
            let _ = writeln!(
                out,
                "  Holding: {} ({}), Qty: {}, Price: {}, Value: {}, Perf %: {}",
                holding.security_name,
                or_missing(holding.isin.as_deref()),
                holding.quantity,
                holding
                    .current_price
                    .map(format_amount)
                    .unwrap_or_else(|| MISSING.to_string()),
                holding
                    .current_value
                    .map(format_amount)
                    .unwrap_or_else(|| MISSING.to_string()),
                holding
                    .performance_percent
                    .map(format_signed_percent)
                    .unwrap_or_else(|| MISSING.to_string())
            );
        }
    }

    if !any {
        out.push_str("No holdings found for any investment account.\n");
    }
    out.push_str("--- End holdings data ---\n");
}

fn render_payment_methods(out: &mut String, methods: &[PaymentMethod]) {
    out.push_str("\n--- Payment methods data ---\n");

    if methods.is_empty() {
        out.push_str("No payment methods found.\n");
    }

    for method in methods {
        let _ = writeln!(
            out,
            "  PaymentMethod: {} ({}), ID: {}, Expires: {}, DailyLimit: {}, MonthlyLimit: {}",
            method.name,
            method.method_type,
            or_missing(method.masked_identifier.as_deref()),
            or_missing(method.expiry_date.as_deref()),
            method
                .daily_limit
                .map(format_amount)
                .unwrap_or_else(|| MISSING.to_string()),
            method
                .monthly_limit
                .map(format_amount)
                .unwrap_or_else(|| MISSING.to_string())
        );
    }

    out.push_str("--- End payment methods data ---\n");
}

fn or_missing(value: Option<&str>) -> &str {
    value.unwrap_or(MISSING)
}

/// Two decimals with thousands separators, e.g. `-12,345.60`
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let Some((int_part, frac_part)) = fixed.split_once('.') else {
        return format!("{:.2}", value);
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Like [`format_amount`] but always signed, e.g. `+250.00`
pub fn format_signed_amount(value: f64) -> String {
    let formatted = format_amount(value);
    if formatted.starts_with('-') {
        formatted
    } else {
        format!("+{}", formatted)
    }
}

/// Fractional rate as a percentage with three decimals
fn format_rate(fraction: f64) -> String {
    format!("{:.3}%", fraction * 100.0)
}

fn format_signed_percent(percent: f64) -> String {
    format!("{:+.2}%", percent)
}
