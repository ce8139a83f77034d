use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Result, TreasurerError};
use crate::labels::{match_key, normalize_label};
use crate::summary::{round_money, CollectionSummaryRow};

/// Which Payee/Payer names pay for each block/flat label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayeeMap {
    entries: HashMap<String, Vec<String>>,
}

/// Split a `payees` cell on `;` or `|`, dropping blanks.
pub fn split_payees(cell: &str) -> Vec<String> {
    cell.split([';', '|'])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl PayeeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `payees` for `label`, replacing any earlier entry. Labels that
    /// normalize to nothing are ignored.
    pub fn insert(&mut self, label: &str, payees: Vec<String>) {
        let label = normalize_label(label);
        if label.is_empty() {
            return;
        }
        self.entries.insert(label, payees);
    }

    pub fn payees_for_label(&self, label: &str) -> &[String] {
        if label.is_empty() {
            return &[];
        }
        self.entries
            .get(&normalize_label(label))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct PayeeRecord {
    #[serde(default)]
    row_label: String,
    #[serde(default)]
    payees: String,
}

/// Load a `row_label,payees` CSV into a [`PayeeMap`].
pub fn load_payee_mapping(path: &Path) -> Result<PayeeMap> {
    if !path.exists() {
        return Err(TreasurerError::MissingFile {
            what: "Payee mapping file",
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path)?;
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let mut map = PayeeMap::new();
    for result in rdr.deserialize::<PayeeRecord>() {
        let record = result?;
        map.insert(&record.row_label, split_payees(&record.payees));
    }
    tracing::debug!(labels = map.len(), path = %path.display(), "loaded payee mapping");
    Ok(map)
}

/// Period receipts per payee, keyed by [`match_key`] of the payee name.
#[derive(Debug, Clone, Default)]
pub struct ReceiptsByPayee {
    totals: HashMap<String, Decimal>,
}

impl ReceiptsByPayee {
    pub fn from_rows(rows: &[CollectionSummaryRow]) -> Self {
        let mut totals: HashMap<String, Decimal> = HashMap::new();
        for row in rows {
            let name = row.payee_payer.trim();
            if name.is_empty() {
                continue;
            }
            *totals.entry(match_key(name)).or_default() += row.receipts;
        }
        Self { totals }
    }

    pub fn sum_for_payees(&self, payees: &[String]) -> Decimal {
        payees
            .iter()
            .filter_map(|p| self.totals.get(&match_key(p)))
            .sum()
    }

    /// Amount collected for `label` this period.
    ///
    /// `None` when the label has no mapped payees or nothing positive was
    /// received from them; a real zero is never reported.
    pub fn resolve(&self, map: &PayeeMap, label: &str) -> Option<Decimal> {
        let payees = map.payees_for_label(label);
        if payees.is_empty() {
            return None;
        }
        let amount = self.sum_for_payees(payees);
        if amount > Decimal::ZERO {
            Some(round_money(amount))
        } else {
            None
        }
    }
}
