use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TreasurerError};
use crate::labels::normalize_label;

/// Flats that are always written as fully paid.
const DEFAULT_ALWAYS_PAID: &[&str] = &[
    "A 002", "A 003", "A 004", "A 005", "A 101", "A 102", "A 104", "A 105", "A 106", "A 201",
    "A 203", "A 204", "A 205", "A 206", "A 302", "A 304", "A 305", "A 306", "A 401", "A 403",
    "A 404", "A 405", "A 406", "B 003", "B 005", "B 102", "B 106", "B 201", "B 304", "B 306",
    "B 401", "B 403", "B 405",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_always_paid_labels")]
    pub always_paid_labels: Vec<String>,
    #[serde(default = "default_fixed_paid_amount")]
    pub fixed_paid_amount: Decimal,
    #[serde(default = "default_payee_map")]
    pub payee_map: String,
    #[serde(default = "default_payments_map")]
    pub payments_map: String,
}

fn default_always_paid_labels() -> Vec<String> {
    DEFAULT_ALWAYS_PAID.iter().map(|s| s.to_string()).collect()
}

fn default_fixed_paid_amount() -> Decimal {
    Decimal::from(3500)
}

fn default_payee_map() -> String {
    "payee_mapping.csv".to_string()
}

fn default_payments_map() -> String {
    "account_payments_mapping.csv".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            always_paid_labels: default_always_paid_labels(),
            fixed_paid_amount: default_fixed_paid_amount(),
            payee_map: default_payee_map(),
            payments_map: default_payments_map(),
        }
    }
}

impl Settings {
    /// Override map for the Paid-column update: every always-paid label,
    /// normalized, mapped to `amount`.
    pub fn fixed_overrides(&self, amount: Decimal) -> HashMap<String, Decimal> {
        self.always_paid_labels
            .iter()
            .map(|label| normalize_label(label))
            .filter(|label| !label.is_empty())
            .map(|label| (label, amount))
            .collect()
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("treasurer")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Settings stored at `path`, or the defaults when the file is missing or
/// unreadable.
pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring unreadable settings: {e}");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TreasurerError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}
