pub mod text;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use colored::Colorize;

use crate::cli::ReportArgs;
use crate::error::{Result, TreasurerError};
use crate::importer::{filter_by_date, load_transactions};
use crate::models::Transaction;
use crate::payee_map::load_payee_mapping;
use crate::payment_rules::{load_payment_rules, PaymentRule};
use crate::periods::last_month_range;
use crate::settings::{load_settings, Settings};
use crate::summary::{build_account_summary, build_collection_summary, CollectionSummaryRow};
use crate::workbook::xlsx::update_paid_columns;
use crate::workbook::{PaidUpdate, UpdateReport};

pub fn run(args: ReportArgs) -> Result<()> {
    let settings = load_settings();
    let today = Local::now().date_naive();
    let output = generate(&args, &settings, today)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &output.text)?;
            println!("{} {}", "Wrote".green(), path.display());
        }
        None => println!("{}", output.text),
    }

    if let Some(report) = &output.workbook {
        if let Some(path) = &args.excel_output {
            println!(
                "{} {} ({} paid, {} fixed, {} cleared)",
                "Updated".green(),
                path.display(),
                report.paid_rows,
                report.fixed_rows,
                report.blank_rows
            );
        }
    }
    Ok(())
}

/// Everything one `report` invocation produced.
pub struct ReportOutput {
    pub text: String,
    pub period: (NaiveDate, NaiveDate),
    pub workbook: Option<UpdateReport>,
}

/// Load, summarise and (when asked) update the workbook for the month
/// before `as_of`, defaulting to `today`.
pub fn generate(args: &ReportArgs, settings: &Settings, today: NaiveDate) -> Result<ReportOutput> {
    if !args.csv.exists() {
        return Err(TreasurerError::MissingFile {
            what: "CSV file",
            path: args.csv.clone(),
        });
    }

    let transactions = load_transactions(&args.csv)?;
    if transactions.is_empty() {
        return Err(TreasurerError::NoTransactions);
    }

    let (start, end) = last_month_range(args.as_of.unwrap_or(today));
    let period = filter_by_date(&transactions, start, end);
    if period.is_empty() {
        return Err(TreasurerError::EmptyPeriod { start, end });
    }
    tracing::info!(
        %start,
        %end,
        total = transactions.len(),
        in_period = period.len(),
        "summarising period"
    );

    let collection_rows = build_collection_summary(&period);
    let account_summary = build_account_summary(&transactions, &period, start, end);
    let text = text::format_report(&collection_rows, &account_summary);

    let workbook = match (&args.excel_template, &args.excel_output) {
        (Some(template), Some(output)) => Some(update_workbook(
            args,
            settings,
            template,
            output,
            &collection_rows,
            &period,
            (start, end),
        )?),
        _ => None,
    };

    Ok(ReportOutput {
        text,
        period: (start, end),
        workbook,
    })
}

fn update_workbook(
    args: &ReportArgs,
    settings: &Settings,
    template: &Path,
    output: &Path,
    collection_rows: &[CollectionSummaryRow],
    period: &[Transaction],
    (start, end): (NaiveDate, NaiveDate),
) -> Result<UpdateReport> {
    let payee_path = args
        .payee_map
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.payee_map));
    let payee_map = load_payee_mapping(&payee_path)?;

    // Only the settings default may be absent; a path given on the command
    // line has to exist.
    let payment_rules = match &args.payments_map {
        Some(path) => load_payment_rules(path)?,
        None => load_rules_or_empty(Path::new(&settings.payments_map))?,
    };

    let amount = args.fixed_paid_amount.unwrap_or(settings.fixed_paid_amount);
    let overrides = settings.fixed_overrides(amount);

    let update = PaidUpdate {
        collection_rows,
        period_transactions: period,
        payee_map: &payee_map,
        payment_rules: &payment_rules,
        fixed_overrides: &overrides,
        period_start: Some(start),
        period_end: Some(end),
    };
    update_paid_columns(template, output, &update)
}

/// A missing payments mapping only means the Account sheet gets no totals.
fn load_rules_or_empty(path: &Path) -> Result<Vec<PaymentRule>> {
    match load_payment_rules(path) {
        Ok(rules) => Ok(rules),
        Err(TreasurerError::MissingFile { path, .. }) => {
            tracing::info!(
                path = %path.display(),
                "no payments mapping, account payments left as is"
            );
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}
