//! Filling the Paid columns of the monthly statement workbook.
//!
//! The template is not addressed by fixed coordinates. The Collection
//! Summary header row is found by looking for "Paid", and each repeating
//! Block / Flat / Paid... group in that row becomes a [`PaidSection`]. The
//! Account sheet adjustments are the exception: they target cells agreed
//! with the template's layout.
//!
//! Everything here works on the [`SheetView`] / [`SheetWriter`] traits so
//! the algorithm can run against the live workbook, the formula-resolved
//! copy of the template, or an in-memory grid in tests.

pub mod xlsx;

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{Result, TreasurerError};
use crate::labels::{label_from_cells, match_key, normalize_label};
use crate::models::Transaction;
use crate::payee_map::{PayeeMap, ReceiptsByPayee};
use crate::payment_rules::{payment_totals, PaymentRule};
use crate::summary::{round_money, CollectionSummaryRow};

/// Rows searched for the header.
const HEADER_SEARCH_ROWS: u32 = 10;
const COLLECTION_SHEET_KEYS: [&str; 2] = ["collectionsummary", "collectionsummarry"];
const ACCOUNT_SHEET: &str = "account";

// Collection Summary: C1 shows the period end.
const PERIOD_END_CELL: (u32, u32) = (1, 3);

// Account sheet layout, (row, column), 1-based.
const ACCOUNT_STALE_ROWS: std::ops::RangeInclusive<u32> = 5..=21;
const ACCOUNT_VALUE_COL: u32 = 5;
const ACCOUNT_LABEL_COL: u32 = 2;
const OPENING_SOURCE: (u32, u32) = (31, 3);
const OPENING_TARGET: (u32, u32) = (4, 3);
const CARRY_SOURCE_ROW: u32 = 56;
const CARRY_TARGET_ROW: u32 = 36;
const CARRY_COLS: std::ops::RangeInclusive<u32> = 3..=9;
const ACCOUNT_START_CELL: (u32, u32) = (4, 1);
const ACCOUNT_END_CELL: (u32, u32) = (31, 1);

// ---------------------------------------------------------------------------
// Cell access
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn money(amount: Decimal) -> Self {
        // Parsing the decimal text gives the nearest f64 to the rounded amount.
        Self::Number(round_money(amount).to_string().parse().unwrap_or_default())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The text a label is built from: numbers print without a trailing
    /// `.0`, empty cells give an empty string.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    fn is_header(&self, name: &str) -> bool {
        self.as_text()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(name))
    }

    fn mentions_paid(&self) -> bool {
        self.as_text()
            .is_some_and(|s| s.to_lowercase().contains("paid"))
    }
}

/// Read access to one sheet. Rows and columns are 1-based.
pub trait SheetView {
    fn title(&self) -> &str;
    fn max_row(&self) -> u32;
    fn max_column(&self) -> u32;
    fn value(&self, row: u32, col: u32) -> CellValue;

    fn row_values(&self, row: u32) -> Vec<CellValue> {
        (1..=self.max_column()).map(|col| self.value(row, col)).collect()
    }
}

pub trait SheetWriter: SheetView {
    fn set_value(&mut self, row: u32, col: u32, value: CellValue);
}

/// A workbook whose sheets can be looked up by position.
pub trait Workbook {
    type Sheet: SheetWriter;

    fn sheet_titles(&self) -> Vec<String>;
    fn sheet_mut(&mut self, index: usize) -> Option<&mut Self::Sheet>;
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// One Block / Flat / Paid... group in the header row. Columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaidSection {
    pub block_col: u32,
    pub flat_col: u32,
    pub paid_cols: Vec<u32>,
}

/// Index of the Collection Summary sheet, or the first sheet when no title
/// matches.
pub fn find_collection_sheet(titles: &[String]) -> Result<usize> {
    if titles.is_empty() {
        return Err(TreasurerError::NoSheets);
    }
    let index = titles
        .iter()
        .position(|t| {
            let key = match_key(t).replace(' ', "");
            COLLECTION_SHEET_KEYS.contains(&key.as_str())
        })
        .unwrap_or(0);
    Ok(index)
}

pub fn find_sheet_by_name(titles: &[String], name: &str) -> Option<usize> {
    let target = match_key(name);
    titles.iter().position(|t| match_key(t) == target)
}

/// First row within the first ten whose text mentions "paid".
pub fn find_header_row<S: SheetView + ?Sized>(sheet: &S) -> Result<u32> {
    let last = sheet.max_row().min(HEADER_SEARCH_ROWS);
    (1..=last)
        .find(|&row| sheet.row_values(row).iter().any(CellValue::mentions_paid))
        .ok_or(TreasurerError::NoHeaderRow)
}

/// Split a header row into Block / Flat / Paid... sections.
///
/// `header[0]` is column 1. A "Block" header opens a section whose flat
/// column is the next one; every column up to the next "Block" whose header
/// mentions "paid" is one of its paid columns. Sections without a flat
/// column or without a paid column are dropped.
pub fn detect_sections(header: &[CellValue]) -> Result<Vec<PaidSection>> {
    let max_col = header.len();
    let mut sections = Vec::new();
    let mut col = 0;
    while col < max_col {
        if !header[col].is_header("block") {
            col += 1;
            continue;
        }
        let has_flat = col + 1 < max_col;
        let mut scan = col;
        let mut paid_cols = Vec::new();
        while scan < max_col {
            let cell = &header[scan];
            if scan != col && cell.is_header("block") {
                break;
            }
            if cell.mentions_paid() {
                paid_cols.push(scan as u32 + 1);
            }
            scan += 1;
        }
        if has_flat && !paid_cols.is_empty() {
            sections.push(PaidSection {
                block_col: col as u32 + 1,
                flat_col: col as u32 + 2,
                paid_cols,
            });
        }
        col = scan;
    }
    if sections.is_empty() {
        return Err(TreasurerError::NoSections);
    }
    Ok(sections)
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Inputs for one Paid-column update.
#[derive(Debug, Clone, Copy)]
pub struct PaidUpdate<'a> {
    pub collection_rows: &'a [CollectionSummaryRow],
    pub period_transactions: &'a [Transaction],
    pub payee_map: &'a PayeeMap,
    pub payment_rules: &'a [PaymentRule],
    /// Labels always written as fully paid, with the amount to write.
    pub fixed_overrides: &'a HashMap<String, Decimal>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    pub sheet: String,
    pub header_row: u32,
    pub sections: usize,
    pub paid_rows: usize,
    pub fixed_rows: usize,
    pub blank_rows: usize,
    pub account_sheet: bool,
    pub payment_totals: usize,
}

/// Fill the Paid columns of `book` and apply the Account sheet adjustments.
///
/// `template_account` is the Account sheet of the template as last
/// calculated (formulas resolved to values); without it the carry-forward
/// copies are skipped.
pub fn apply_update<W: Workbook>(
    book: &mut W,
    template_account: Option<&dyn SheetView>,
    update: &PaidUpdate<'_>,
) -> Result<UpdateReport> {
    let titles = book.sheet_titles();
    let collection_index = find_collection_sheet(&titles)?;
    let overrides: HashMap<String, Decimal> = update
        .fixed_overrides
        .iter()
        .map(|(label, amount)| (normalize_label(label), *amount))
        .collect();
    let receipts = ReceiptsByPayee::from_rows(update.collection_rows);
    let totals = payment_totals(update.period_transactions, update.payment_rules);

    let mut report = UpdateReport {
        payment_totals: totals.len(),
        ..UpdateReport::default()
    };

    {
        let sheet = book
            .sheet_mut(collection_index)
            .ok_or(TreasurerError::NoSheets)?;
        report.sheet = sheet.title().to_string();
        let header_row = find_header_row(&*sheet)?;
        let sections = detect_sections(&sheet.row_values(header_row))?;
        tracing::debug!(
            sheet = %report.sheet,
            header_row,
            sections = sections.len(),
            "detected paid sections"
        );
        report.header_row = header_row;
        report.sections = sections.len();

        for section in &sections {
            for row in header_row + 1..=sheet.max_row() {
                let block = sheet.value(row, section.block_col).display();
                let flat = sheet.value(row, section.flat_col).display();
                let Some(label) = label_from_cells(&block, &flat) else {
                    continue;
                };
                let key = normalize_label(&label);
                let value = if let Some(amount) = overrides.get(&key) {
                    report.fixed_rows += 1;
                    CellValue::money(*amount)
                } else if let Some(amount) = receipts.resolve(update.payee_map, &label) {
                    report.paid_rows += 1;
                    CellValue::money(amount)
                } else {
                    report.blank_rows += 1;
                    CellValue::Empty
                };
                for &col in &section.paid_cols {
                    sheet.set_value(row, col, value.clone());
                }
            }
        }

        if let Some(end) = update.period_end {
            let (row, col) = PERIOD_END_CELL;
            sheet.set_value(row, col, CellValue::Date(end));
        }
    }

    if let Some(index) = find_sheet_by_name(&titles, ACCOUNT_SHEET) {
        if let Some(account) = book.sheet_mut(index) {
            report.account_sheet = true;
            apply_account_adjustments(account, template_account);
            apply_payment_totals(account, &totals);
            if let Some(start) = update.period_start {
                let (row, col) = ACCOUNT_START_CELL;
                account.set_value(row, col, CellValue::Date(start));
            }
            if let Some(end) = update.period_end {
                let (row, col) = ACCOUNT_END_CELL;
                account.set_value(row, col, CellValue::Date(end));
            }
        }
    } else {
        tracing::info!("no account sheet, skipping account adjustments");
    }

    Ok(report)
}

/// Clear last month's values in E5:E21, then carry the template's closing
/// figures forward: C31 into C4 and C56:I56 into C36:I36.
pub fn apply_account_adjustments<S: SheetWriter + ?Sized>(
    account: &mut S,
    template: Option<&dyn SheetView>,
) {
    for row in ACCOUNT_STALE_ROWS {
        account.set_value(row, ACCOUNT_VALUE_COL, CellValue::Empty);
    }
    let Some(template) = template else {
        tracing::debug!("no resolved template values, skipping carry-forward");
        return;
    };
    let (src_row, src_col) = OPENING_SOURCE;
    let (dst_row, dst_col) = OPENING_TARGET;
    account.set_value(dst_row, dst_col, template.value(src_row, src_col));
    for col in CARRY_COLS {
        account.set_value(CARRY_TARGET_ROW, col, template.value(CARRY_SOURCE_ROW, col));
    }
}

/// Write each rule total next to the Account sheet row carrying its label.
pub fn apply_payment_totals<S: SheetWriter + ?Sized>(
    account: &mut S,
    totals: &BTreeMap<String, Decimal>,
) {
    if totals.is_empty() {
        return;
    }
    for row in 1..=account.max_row() {
        let label = account.value(row, ACCOUNT_LABEL_COL);
        let Some(text) = label.as_text() else {
            continue;
        };
        if let Some(total) = totals.get(&match_key(text)) {
            account.set_value(row, ACCOUNT_VALUE_COL, CellValue::money(*total));
        }
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::BTreeMap;

    use super::{CellValue, SheetView, SheetWriter, Workbook};

    /// Grid-backed sheet for exercising the update without a file.
    #[derive(Debug, Clone, Default)]
    pub struct MemorySheet {
        pub title: String,
        pub cells: BTreeMap<(u32, u32), CellValue>,
    }

    impl MemorySheet {
        pub fn new(title: &str) -> Self {
            Self {
                title: title.to_string(),
                cells: BTreeMap::new(),
            }
        }

        pub fn with_row(mut self, row: u32, values: &[CellValue]) -> Self {
            for (i, value) in values.iter().enumerate() {
                self.cells.insert((row, i as u32 + 1), value.clone());
            }
            self
        }

        pub fn get(&self, row: u32, col: u32) -> CellValue {
            self.value(row, col)
        }
    }

    impl SheetView for MemorySheet {
        fn title(&self) -> &str {
            &self.title
        }

        fn max_row(&self) -> u32 {
            self.cells.keys().map(|(r, _)| *r).max().unwrap_or(1)
        }

        fn max_column(&self) -> u32 {
            self.cells.keys().map(|(_, c)| *c).max().unwrap_or(1)
        }

        fn value(&self, row: u32, col: u32) -> CellValue {
            self.cells.get(&(row, col)).cloned().unwrap_or_default()
        }
    }

    impl SheetWriter for MemorySheet {
        fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
            self.cells.insert((row, col), value);
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct MemoryBook {
        pub sheets: Vec<MemorySheet>,
    }

    impl Workbook for MemoryBook {
        type Sheet = MemorySheet;

        fn sheet_titles(&self) -> Vec<String> {
            self.sheets.iter().map(|s| s.title.clone()).collect()
        }

        fn sheet_mut(&mut self, index: usize) -> Option<&mut MemorySheet> {
            self.sheets.get_mut(index)
        }
    }

    pub fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    pub fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    pub fn blank() -> CellValue {
        CellValue::Empty
    }
}
