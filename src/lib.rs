//! Monthly collection summary and statement of accounts for a housing
//! society, built from an Expense Manager CSV export.

pub mod cli;
pub mod error;
pub mod fmt;
pub mod importer;
pub mod labels;
pub mod models;
pub mod payee_map;
pub mod payment_rules;
pub mod periods;
pub mod settings;
pub mod summary;
pub mod workbook;
