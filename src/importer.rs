use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{Result, TreasurerError};
use crate::models::Transaction;

/// Column layout of the Expense Manager export.
pub const CSV_HEADER: [&str; 17] = [
    "Date",
    "Amount",
    "Category",
    "Subcategory",
    "Payment Method",
    "Description",
    "Ref/Check No",
    "Payee/Payer",
    "Status",
    "Receipt Picture",
    "Account",
    "Tag",
    "Tax",
    "Quantity",
    "Split Total",
    "Row Id",
    "Type Id",
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn is_header(record: &csv::StringRecord) -> bool {
    record.len() == CSV_HEADER.len()
        && record
            .iter()
            .enumerate()
            .all(|(i, field)| {
                let field = if i == 0 {
                    field.trim_start_matches('\u{feff}')
                } else {
                    field
                };
                field == CSV_HEADER[i]
            })
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

// ---------------------------------------------------------------------------
// load_transactions
// ---------------------------------------------------------------------------

/// Load every transaction from an Expense Manager CSV export.
///
/// Blank rows are ignored. Some exports start with a stray row before the
/// header; that single row is tolerated, anything else fails with
/// [`TreasurerError::UnexpectedHeader`].
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        records.push(record);
    }
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let data_start = if is_header(&records[0]) {
        1
    } else if records.len() > 1 && is_header(&records[1]) {
        2
    } else {
        return Err(TreasurerError::UnexpectedHeader(path.to_path_buf()));
    };

    let mut transactions = Vec::new();
    for record in &records[data_start..] {
        if let Some(txn) = parse_record(record)? {
            transactions.push(txn);
        }
    }
    tracing::debug!(count = transactions.len(), path = %path.display(), "loaded transactions");
    Ok(transactions)
}

fn parse_record(record: &csv::StringRecord) -> Result<Option<Transaction>> {
    let field = |i: usize| record.get(i).unwrap_or("").to_string();
    let line = record.position().map_or(0, |p| p.line() as usize);

    let raw_date = field(0);
    if raw_date.is_empty() {
        return Ok(None);
    }
    let date = parse_date(&raw_date).ok_or_else(|| TreasurerError::InvalidDate {
        row: line,
        value: raw_date.clone(),
    })?;
    let raw_amount = field(1);
    let amount = parse_amount(&raw_amount).ok_or(TreasurerError::InvalidAmount {
        row: line,
        value: raw_amount,
    })?;
    let raw_row_id = field(15);
    let row_id = raw_row_id.trim().parse::<i64>().ok();

    Ok(Some(Transaction {
        date,
        amount,
        category: field(2),
        subcategory: field(3),
        payment_method: field(4),
        description: field(5),
        ref_check_no: field(6),
        payee_payer: field(7),
        status: field(8),
        receipt_picture: field(9),
        account: field(10),
        tag: field(11),
        tax: field(12),
        quantity: field(13),
        split_total: field(14),
        row_id,
        type_id: field(16),
    }))
}

/// Transactions dated within `start..=end`.
pub fn filter_by_date(
    transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| start <= t.date && t.date <= end)
        .cloned()
        .collect()
}
