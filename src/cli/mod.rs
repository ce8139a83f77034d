pub mod init;
pub mod label;
pub mod report;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(
    name = "treasurer",
    version,
    about = "Summarise last month's collections and expenses from an Expense Manager CSV export."
)]
pub struct Cli {
    /// Log progress to stderr (RUST_LOG overrides the level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the monthly summaries and optionally fill in the statement workbook.
    Report(ReportArgs),
    /// Write default settings to ~/.config/treasurer/settings.json.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Show the canonical block/flat label for each input.
    Label {
        /// Labels as they appear in a sheet or mapping file, e.g. b-402
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Path to the Expense Manager CSV export
    #[arg(default_value = "expensemanager.csv")]
    pub csv: PathBuf,
    /// Report on the month before this date (YYYY-MM-DD, default: today)
    #[arg(long = "as-of")]
    pub as_of: Option<NaiveDate>,
    /// Write the summaries to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Statement workbook to read (e.g. Statements-2025.xlsx)
    #[arg(long = "excel-template", requires = "excel_output")]
    pub excel_template: Option<PathBuf>,
    /// Where to save the updated workbook
    #[arg(long = "excel-output", requires = "excel_template")]
    pub excel_output: Option<PathBuf>,
    /// Amount written for always-paid flats (default from settings: 3500)
    #[arg(long = "fixed-paid-amount")]
    pub fixed_paid_amount: Option<Decimal>,
    /// Block/flat to Payee/Payer mapping CSV (default: payee_mapping.csv)
    #[arg(long = "payee-map")]
    pub payee_map: Option<PathBuf>,
    /// Account sheet payments mapping CSV (default: account_payments_mapping.csv)
    #[arg(long = "payments-map")]
    pub payments_map: Option<PathBuf>,
}
