use comfy_table::{Cell, CellAlignment, Table};

use crate::fmt::amount;
use crate::summary::{AccountSummary, CollectionSummaryRow, UNSPECIFIED};

fn or_unspecified(value: &str) -> &str {
    if value.is_empty() {
        UNSPECIFIED
    } else {
        value
    }
}

fn money_cell(value: rust_decimal::Decimal) -> Cell {
    Cell::new(amount(value)).set_alignment(CellAlignment::Right)
}

pub fn format_collection_summary(rows: &[CollectionSummaryRow]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Account", "Payee/Payer", "Receipts", "Payments", "Net"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(or_unspecified(&row.account)),
            Cell::new(or_unspecified(&row.payee_payer)),
            money_cell(row.receipts),
            money_cell(row.payments),
            money_cell(row.net()),
        ]);
    }
    table.to_string()
}

pub fn format_account_summary(summary: &AccountSummary) -> String {
    let mut lines = vec![
        "Statement of Accounts".to_string(),
        format!(
            "Period: {} to {}",
            summary.period_start.format("%Y-%m-%d"),
            summary.period_end.format("%Y-%m-%d")
        ),
        format!("Opening Balance: {}", amount(summary.opening_balance)),
        format!("Closing Balance: {}", amount(summary.closing_balance)),
        format!("Total Receipts: {}", amount(summary.total_receipts)),
        format!("Total Payments: {}", amount(summary.total_payments)),
        String::new(),
    ];

    let mut table = Table::new();
    table.set_header(vec!["Category", "Receipts", "Payments", "Net"]);
    for category in &summary.categories {
        table.add_row(vec![
            Cell::new(&category.category),
            money_cell(category.receipts),
            money_cell(category.payments),
            money_cell(category.net()),
        ]);
    }
    lines.push(table.to_string());

    if !summary.expenses_by_category.is_empty() {
        lines.push(String::new());
        lines.push("Detailed Expenses".to_string());
        for (category, details) in &summary.expenses_by_category {
            if details.is_empty() {
                continue;
            }
            lines.push(format!("{category}:"));
            for detail in details {
                let payee = or_unspecified(&detail.payee_payer);
                let description = if detail.description.is_empty() {
                    payee
                } else {
                    &detail.description
                };
                lines.push(format!(
                    "  - {} | {} | Account: {} | Amount: {}",
                    detail.date.format("%Y-%m-%d"),
                    description,
                    or_unspecified(&detail.account),
                    amount(detail.amount)
                ));
            }
        }
    }

    if !summary.account_balances.is_empty() {
        let mut balances = Table::new();
        balances.set_header(vec!["Account", "Opening", "Receipts", "Payments", "Closing"]);
        for balance in &summary.account_balances {
            balances.add_row(vec![
                Cell::new(or_unspecified(&balance.account)),
                money_cell(balance.opening_balance),
                money_cell(balance.receipts),
                money_cell(balance.payments),
                money_cell(balance.closing_balance),
            ]);
        }
        lines.push(String::new());
        lines.push("Account Balances".to_string());
        lines.push(balances.to_string());
    }

    lines.join("\n")
}

/// The full plain-text report: collection summary then statement of accounts.
pub fn format_report(rows: &[CollectionSummaryRow], summary: &AccountSummary) -> String {
    format!(
        "Collection Summary\n{}\n\n{}\n",
        format_collection_summary(rows),
        format_account_summary(summary)
    )
}
