use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::labels::normalize_label;

pub fn run(inputs: &[String]) -> Result<()> {
    println!("{}", format_labels(inputs));
    Ok(())
}

pub(crate) fn format_labels(inputs: &[String]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Input", "Label"]);
    for input in inputs {
        let label = normalize_label(input);
        let shown = if label.is_empty() {
            "(none)".to_string()
        } else {
            label
        };
        table.add_row(vec![Cell::new(input), Cell::new(shown)]);
    }
    table.to_string()
}
