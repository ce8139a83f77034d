use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Result, TreasurerError};
use crate::labels::match_key;
use crate::models::Transaction;
use crate::summary::round_money;

/// Declarative filter feeding one row of the Account sheet's payments column.
///
/// Populated fields are ANDed together; `None` places no constraint. All
/// stored text is trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaymentRule {
    pub row_label: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description_contains: Option<String>,
    pub payee_contains: Option<String>,
}

fn to_lower(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_lowercase())
    }
}

impl PaymentRule {
    pub fn new(
        row_label: &str,
        category: &str,
        subcategory: &str,
        description_contains: &str,
        payee_contains: &str,
    ) -> Self {
        Self {
            row_label: row_label.trim().to_string(),
            category: to_lower(category),
            subcategory: to_lower(subcategory),
            description_contains: to_lower(description_contains),
            payee_contains: to_lower(payee_contains),
        }
    }

    /// Receipts never match.
    pub fn matches(&self, txn: &Transaction) -> bool {
        if !txn.is_payment() {
            return false;
        }
        if let Some(category) = &self.category {
            if txn.category.trim().to_lowercase() != *category {
                return false;
            }
        }
        if let Some(subcategory) = &self.subcategory {
            if txn.subcategory.trim().to_lowercase() != *subcategory {
                return false;
            }
        }
        if let Some(needle) = &self.description_contains {
            if !txn.description.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        if let Some(needle) = &self.payee_contains {
            if !txn.payee_payer.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Sum of `|amount|` over the transactions each rule matches.
///
/// Keyed by the rule's [`match_key`]; rules with nothing to report are left
/// out. When two rules share a key the later one wins.
pub fn payment_totals(
    transactions: &[Transaction],
    rules: &[PaymentRule],
) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for rule in rules {
        let total: Decimal = transactions
            .iter()
            .filter(|t| rule.matches(t))
            .map(|t| t.amount.abs())
            .sum();
        if total > Decimal::ZERO {
            totals.insert(match_key(&rule.row_label), round_money(total));
        }
    }
    totals
}

#[derive(Debug, Deserialize)]
struct RuleRecord {
    #[serde(default)]
    row_label: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    subcategory: String,
    #[serde(default)]
    description_contains: String,
    #[serde(default)]
    payee_contains: String,
}

/// Load `row_label,category,subcategory,description_contains,payee_contains`
/// rows. Only `row_label` is required; rows without one are skipped.
pub fn load_payment_rules(path: &Path) -> Result<Vec<PaymentRule>> {
    if !path.exists() {
        return Err(TreasurerError::MissingFile {
            what: "Payments mapping file",
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path)?;
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let mut rules = Vec::new();
    for result in rdr.deserialize::<RuleRecord>() {
        let record = result?;
        if record.row_label.trim().is_empty() {
            continue;
        }
        rules.push(PaymentRule::new(
            &record.row_label,
            &record.category,
            &record.subcategory,
            &record.description_contains,
            &record.payee_contains,
        ));
    }
    Ok(rules)
}
