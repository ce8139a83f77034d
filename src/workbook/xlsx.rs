//! xlsx-backed views of the statement workbook.
//!
//! The template is opened twice. `umya-spreadsheet` loads it for writing and
//! keeps styles and formulas intact; `calamine` reads the cached result of
//! each formula, which is what the carry-forward copies need.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDate;
use umya_spreadsheet::{Spreadsheet, Worksheet};

use super::{
    apply_update, find_sheet_by_name, CellValue, PaidUpdate, SheetView, SheetWriter, UpdateReport,
    Workbook,
};
use crate::error::{Result, TreasurerError};

const DATE_FORMAT: &str = "yyyy-mm-dd";

/// Whether a number format code displays a date.
///
/// Quoted literals, escaped characters and bracketed sections (colours,
/// locales, elapsed time) are ignored; any remaining `d`, `m` or `y` counts.
pub fn is_date_format(code: &str) -> bool {
    let mut chars = code.chars();
    let mut in_quotes = false;
    let mut in_brackets = false;
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '\\' => {
                chars.next();
            }
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            _ if in_brackets => {}
            'd' | 'D' | 'm' | 'M' | 'y' | 'Y' => return true,
            _ => {}
        }
    }
    false
}

/// Days since the 1899-12-30 spreadsheet epoch.
pub fn date_to_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    (date - epoch).num_days() as f64
}

// ---------------------------------------------------------------------------
// Live workbook (umya-spreadsheet)
// ---------------------------------------------------------------------------

impl SheetView for Worksheet {
    fn title(&self) -> &str {
        self.get_name()
    }

    fn max_row(&self) -> u32 {
        self.get_highest_column_and_row().1
    }

    fn max_column(&self) -> u32 {
        self.get_highest_column_and_row().0
    }

    fn value(&self, row: u32, col: u32) -> CellValue {
        let Some(cell) = self.get_cell((col, row)) else {
            return CellValue::Empty;
        };
        let raw = cell.get_value();
        if raw.is_empty() {
            return CellValue::Empty;
        }
        match cell.get_data_type() {
            "n" => raw
                .parse::<f64>()
                .map(CellValue::Number)
                .unwrap_or_else(|_| CellValue::Text(raw.to_string())),
            "b" => CellValue::Bool(raw.eq_ignore_ascii_case("true") || raw == "1"),
            _ => CellValue::Text(raw.to_string()),
        }
    }
}

impl SheetWriter for Worksheet {
    fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
        let cell = self.get_cell_mut((col, row));
        match value {
            CellValue::Empty => {
                cell.set_blank();
            }
            CellValue::Number(n) => {
                cell.set_value_number(n);
            }
            CellValue::Text(s) => {
                cell.set_value_string(s);
            }
            CellValue::Bool(b) => {
                cell.set_value_bool(b);
            }
            CellValue::Date(d) => {
                cell.set_value_number(date_to_serial(d));
                // A template cell already showing a date keeps its format.
                let keep = cell
                    .get_style()
                    .get_number_format()
                    .is_some_and(|f| is_date_format(f.get_format_code()));
                if !keep {
                    cell.get_style_mut()
                        .get_number_format_mut()
                        .set_format_code(DATE_FORMAT);
                }
            }
        }
    }
}

impl Workbook for Spreadsheet {
    type Sheet = Worksheet;

    fn sheet_titles(&self) -> Vec<String> {
        self.get_sheet_collection()
            .iter()
            .map(|s| s.get_name().to_string())
            .collect()
    }

    fn sheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.get_sheet_collection_mut().get_mut(index)
    }
}

// ---------------------------------------------------------------------------
// Resolved values (calamine)
// ---------------------------------------------------------------------------

/// One sheet of the template with every formula replaced by its last
/// calculated value.
#[derive(Debug, Clone)]
pub struct ResolvedSheet {
    title: String,
    range: Range<Data>,
}

impl ResolvedSheet {
    pub fn new(title: &str, range: Range<Data>) -> Self {
        Self {
            title: title.to_string(),
            range,
        }
    }
}

fn from_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

impl SheetView for ResolvedSheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn max_row(&self) -> u32 {
        self.range.end().map_or(0, |(row, _)| row + 1)
    }

    fn max_column(&self) -> u32 {
        self.range.end().map_or(0, |(_, col)| col + 1)
    }

    fn value(&self, row: u32, col: u32) -> CellValue {
        if row == 0 || col == 0 {
            return CellValue::Empty;
        }
        self.range
            .get_value((row - 1, col - 1))
            .map(from_data)
            .unwrap_or_default()
    }
}

/// The sheet called `name` (compared loosely) from the template's cached
/// values, if there is one.
pub fn read_resolved_sheet(path: &Path, name: &str) -> Result<Option<ResolvedSheet>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| TreasurerError::Xlsx(format!("Failed to open {}: {e}", path.display())))?;
    let titles = workbook.sheet_names();
    let Some(index) = find_sheet_by_name(&titles, name) else {
        return Ok(None);
    };
    let title = &titles[index];
    let range = workbook
        .worksheet_range(title)
        .map_err(|e| TreasurerError::Xlsx(format!("Failed to read sheet '{title}': {e}")))?;
    Ok(Some(ResolvedSheet::new(title, range)))
}

// ---------------------------------------------------------------------------
// update_paid_columns
// ---------------------------------------------------------------------------

/// Read `template`, fill in the Paid columns and Account sheet, and save the
/// result to `output`. Nothing is written if any step fails, and the
/// template itself is never modified.
pub fn update_paid_columns(
    template: &Path,
    output: &Path,
    update: &PaidUpdate<'_>,
) -> Result<UpdateReport> {
    if same_file(template, output) {
        return Err(TreasurerError::Other(format!(
            "Refusing to overwrite the template {}; choose a different --excel-output",
            template.display()
        )));
    }

    let mut book = umya_spreadsheet::reader::xlsx::read(template).map_err(|e| {
        TreasurerError::Xlsx(format!("Failed to open {}: {e}", template.display()))
    })?;
    let resolved_account = read_resolved_sheet(template, "account")?;

    let report = apply_update(
        &mut book,
        resolved_account.as_ref().map(|s| s as &dyn SheetView),
        update,
    )?;

    umya_spreadsheet::writer::xlsx::write(&book, output).map_err(|e| {
        TreasurerError::Xlsx(format!("Failed to write {}: {e}", output.display()))
    })?;
    tracing::info!(output = %output.display(), "workbook saved");
    Ok(report)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_to_serial() {
        assert_eq!(date_to_serial(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()), 45667.0);
        assert_eq!(date_to_serial(NaiveDate::from_ymd_opt(1900, 3, 1).unwrap()), 61.0);
    }

    #[test]
    fn test_is_date_format() {
        assert!(is_date_format("mmmm yyyy"));
        assert!(is_date_format("dd/mm/yy"));
        assert!(is_date_format("[$-409]d-mmm-yy;@"));
        assert!(!is_date_format("General"));
        assert!(!is_date_format("#,##0.00"));
        assert!(!is_date_format("0.00\" days\""));
        assert!(!is_date_format("[Red]0.00"));
    }

    fn format_code(sheet: &Worksheet, row: u32, col: u32) -> Option<String> {
        sheet
            .get_cell((col, row))
            .and_then(|c| c.get_style().get_number_format())
            .map(|f| f.get_format_code().to_string())
    }

    #[test]
    fn test_date_write_keeps_template_date_format() {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        book.new_sheet("Collection Summary").unwrap();
        let sheet = book.sheet_mut(0).unwrap();
        sheet
            .get_cell_mut((3, 1))
            .get_style_mut()
            .get_number_format_mut()
            .set_format_code("mmmm yyyy");
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

        sheet.set_value(1, 3, CellValue::Date(end));
        sheet.set_value(1, 4, CellValue::Date(end));

        assert_eq!(format_code(sheet, 1, 3).as_deref(), Some("mmmm yyyy"));
        assert_eq!(format_code(sheet, 1, 4).as_deref(), Some(DATE_FORMAT));
        assert_eq!(sheet.value(1, 3), CellValue::Number(date_to_serial(end)));
    }

    #[test]
    fn test_resolved_sheet_reads_cached_values() {
        let mut range = Range::new((0, 0), (55, 8));
        range.set_value((30, 2), Data::Float(1234.5));
        range.set_value((55, 2), Data::String("Closing".to_string()));
        range.set_value((55, 3), Data::Int(7));
        let sheet = ResolvedSheet::new("Account", range);
        assert_eq!(sheet.max_row(), 56);
        assert_eq!(sheet.max_column(), 9);
        assert_eq!(sheet.value(31, 3), CellValue::Number(1234.5));
        assert_eq!(sheet.value(56, 3), CellValue::Text("Closing".to_string()));
        assert_eq!(sheet.value(56, 4), CellValue::Number(7.0));
        assert_eq!(sheet.value(1, 1), CellValue::Empty);
        assert_eq!(sheet.value(100, 1), CellValue::Empty);
        assert_eq!(sheet.value(0, 1), CellValue::Empty);
    }

    #[test]
    fn test_worksheet_round_trips_cell_values() {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        book.new_sheet("Collection Summary").unwrap();
        let sheet = book.sheet_mut(0).unwrap();
        sheet.set_value(2, 1, CellValue::Text("Block".to_string()));
        sheet.set_value(3, 2, CellValue::Number(402.0));
        sheet.set_value(4, 3, CellValue::Number(3500.0));
        sheet.set_value(4, 3, CellValue::Empty);
        assert_eq!(sheet.title(), "Collection Summary");
        assert_eq!(sheet.value(2, 1), CellValue::Text("Block".to_string()));
        assert_eq!(sheet.value(3, 2).display(), "402");
        assert_eq!(sheet.value(4, 3), CellValue::Empty);
        assert_eq!(sheet.value(9, 9), CellValue::Empty);
    }
}
