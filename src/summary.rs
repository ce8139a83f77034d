use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::Transaction;

pub const UNSPECIFIED: &str = "Unspecified";
pub const UNCATEGORISED: &str = "Uncategorised";

/// Money is reported to the cent, half to even.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    receipts: Decimal,
    payments: Decimal,
}

impl Bucket {
    fn add(&mut self, txn: &Transaction) {
        if txn.is_receipt() {
            self.receipts += txn.amount;
        } else {
            self.payments += txn.amount.abs();
        }
    }
}

// ---------------------------------------------------------------------------
// Collection summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSummaryRow {
    pub account: String,
    pub payee_payer: String,
    pub receipts: Decimal,
    pub payments: Decimal,
}

impl CollectionSummaryRow {
    pub fn net(&self) -> Decimal {
        self.receipts - self.payments
    }
}

/// Receipts and payments per `(account, payee)` pair, ordered
/// case-insensitively by account then payee.
pub fn build_collection_summary(transactions: &[Transaction]) -> Vec<CollectionSummaryRow> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut buckets: Vec<((&str, &str), Bucket)> = Vec::new();

    for txn in transactions {
        let key = (
            or_default(&txn.account, UNSPECIFIED),
            or_default(&txn.payee_payer, UNSPECIFIED),
        );
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push((key, Bucket::default()));
            buckets.len() - 1
        });
        buckets[slot].1.add(txn);
    }

    let mut rows: Vec<CollectionSummaryRow> = buckets
        .into_iter()
        .map(|((account, payee), bucket)| CollectionSummaryRow {
            account: account.to_string(),
            payee_payer: payee.to_string(),
            receipts: round_money(bucket.receipts),
            payments: round_money(bucket.payments),
        })
        .collect();
    rows.sort_by_cached_key(|row| (row.account.to_lowercase(), row.payee_payer.to_lowercase()));
    rows
}

// ---------------------------------------------------------------------------
// Account summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AccountCategoryRow {
    pub category: String,
    pub receipts: Decimal,
    pub payments: Decimal,
}

impl AccountCategoryRow {
    pub fn net(&self) -> Decimal {
        self.receipts - self.payments
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDetail {
    pub date: NaiveDate,
    pub description: String,
    pub payee_payer: String,
    pub account: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalanceRow {
    pub account: String,
    pub opening_balance: Decimal,
    pub receipts: Decimal,
    pub payments: Decimal,
    pub closing_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub total_receipts: Decimal,
    pub total_payments: Decimal,
    pub categories: Vec<AccountCategoryRow>,
    pub expenses_by_category: BTreeMap<String, Vec<ExpenseDetail>>,
    pub account_balances: Vec<AccountBalanceRow>,
}

#[derive(Debug, Default)]
struct AccountBucket {
    opening: Decimal,
    flows: Bucket,
}

/// Statement of accounts for `start..=end`.
///
/// The opening balance is everything in `all_transactions` dated before
/// `start`, however far back it goes. `period_transactions` is normally the
/// slice of `all_transactions` inside the period; it is not re-filtered here.
pub fn build_account_summary(
    all_transactions: &[Transaction],
    period_transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> AccountSummary {
    let before_period: Vec<&Transaction> =
        all_transactions.iter().filter(|t| t.date < start).collect();

    let opening_balance: Decimal = before_period.iter().map(|t| t.amount).sum();
    let period_total: Decimal = period_transactions.iter().map(|t| t.amount).sum();
    let closing_balance = opening_balance + period_total;
    let total_receipts: Decimal = period_transactions
        .iter()
        .filter(|t| t.is_receipt())
        .map(|t| t.amount)
        .sum();
    let total_payments: Decimal = period_transactions
        .iter()
        .filter(|t| t.is_payment())
        .map(|t| -t.amount)
        .sum();

    let mut category_totals: BTreeMap<&str, Bucket> = BTreeMap::new();
    let mut expenses_by_category: BTreeMap<String, Vec<ExpenseDetail>> = BTreeMap::new();
    let mut accounts: BTreeMap<&str, AccountBucket> = BTreeMap::new();

    for txn in &before_period {
        let account = or_default(&txn.account, UNSPECIFIED);
        accounts.entry(account).or_default().opening += txn.amount;
    }

    for txn in period_transactions {
        let category = or_default(&txn.category, UNCATEGORISED);
        let account = or_default(&txn.account, UNSPECIFIED);
        category_totals.entry(category).or_default().add(txn);
        accounts.entry(account).or_default().flows.add(txn);

        if txn.is_payment() {
            let description = or_default(&txn.description, &txn.payee_payer);
            expenses_by_category
                .entry(category.to_string())
                .or_default()
                .push(ExpenseDetail {
                    date: txn.date,
                    description: description.to_string(),
                    payee_payer: or_default(&txn.payee_payer, UNSPECIFIED).to_string(),
                    account: account.to_string(),
                    amount: round_money(txn.amount.abs()),
                });
        }
    }

    let categories = category_totals
        .into_iter()
        .map(|(category, bucket)| AccountCategoryRow {
            category: category.to_string(),
            receipts: round_money(bucket.receipts),
            payments: round_money(bucket.payments),
        })
        .collect();

    let account_balances = accounts
        .into_iter()
        .map(|(account, data)| AccountBalanceRow {
            account: account.to_string(),
            opening_balance: round_money(data.opening),
            receipts: round_money(data.flows.receipts),
            payments: round_money(data.flows.payments),
            closing_balance: round_money(data.opening + data.flows.receipts - data.flows.payments),
        })
        .collect();

    AccountSummary {
        period_start: start,
        period_end: end,
        opening_balance: round_money(opening_balance),
        closing_balance: round_money(closing_balance),
        total_receipts: round_money(total_receipts),
        total_payments: round_money(total_payments),
        categories,
        expenses_by_category,
        account_balances,
    }
}
