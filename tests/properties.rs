//! Property-based tests for the aggregation engine and label handling.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use treasurer::importer::filter_by_date;
use treasurer::labels::normalize_label;
use treasurer::models::Transaction;
use treasurer::payment_rules::PaymentRule;
use treasurer::periods::last_month_range;
use treasurer::summary::{build_account_summary, build_collection_summary};

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-500_000i64..500_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2023i32..2026i32, 1u32..13u32, 1u32..29u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("Bank".to_string()),
        Just("bank".to_string()),
        Just("Cash".to_string()),
        Just("John Smith".to_string()),
        Just("alice".to_string()),
        Just("Zed".to_string()),
    ]
}

fn arb_category() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("Maintenance".to_string()),
        Just("Utilities".to_string()),
        Just("Repairs".to_string()),
    ]
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (arb_date(), arb_amount(), arb_name(), arb_name(), arb_category()).prop_map(
        |(date, amount, account, payee_payer, category)| Transaction {
            date,
            amount,
            category,
            subcategory: String::new(),
            payment_method: String::new(),
            description: String::new(),
            ref_check_no: String::new(),
            payee_payer,
            status: String::new(),
            receipt_picture: String::new(),
            account,
            tag: String::new(),
            tax: String::new(),
            quantity: String::new(),
            split_total: String::new(),
            row_id: None,
            type_id: String::new(),
        },
    )
}

fn arb_label_spelling() -> impl Strategy<Value = (char, u32, String)> {
    (
        prop::sample::select(vec!['A', 'B', 'C', 'a', 'b']),
        0u32..1000u32,
        prop::sample::select(vec!["", " ", "-", " - ", "  "]),
        0usize..3usize,
    )
        .prop_map(|(block, number, sep, zeros)| {
            let spelled = format!("{block}{sep}{}{number}", "0".repeat(zeros));
            (block.to_ascii_uppercase(), number, spelled)
        })
}

// ============================================================================
// Aggregation
// ============================================================================

proptest! {
    #[test]
    fn closing_balance_is_opening_plus_flows(
        txns in prop::collection::vec(arb_transaction(), 0..60),
        as_of in arb_date()
    ) {
        let (start, end) = last_month_range(as_of);
        let period = filter_by_date(&txns, start, end);
        let summary = build_account_summary(&txns, &period, start, end);

        prop_assert_eq!(
            summary.closing_balance,
            summary.opening_balance + summary.total_receipts - summary.total_payments
        );
        for row in &summary.account_balances {
            prop_assert_eq!(row.closing_balance, row.opening_balance + row.receipts - row.payments);
        }
        let account_closing: Decimal =
            summary.account_balances.iter().map(|r| r.closing_balance).sum();
        prop_assert_eq!(account_closing, summary.closing_balance);
    }

    #[test]
    fn collection_summary_accounts_for_every_transaction(
        txns in prop::collection::vec(arb_transaction(), 0..60)
    ) {
        let rows = build_collection_summary(&txns);

        let receipts: Decimal = txns
            .iter()
            .filter(|t| t.amount >= Decimal::ZERO)
            .map(|t| t.amount)
            .sum();
        let payments: Decimal = txns
            .iter()
            .filter(|t| t.amount < Decimal::ZERO)
            .map(|t| -t.amount)
            .sum();
        prop_assert_eq!(rows.iter().map(|r| r.receipts).sum::<Decimal>(), receipts);
        prop_assert_eq!(rows.iter().map(|r| r.payments).sum::<Decimal>(), payments);

        for row in &rows {
            prop_assert!(row.receipts >= Decimal::ZERO);
            prop_assert!(row.payments >= Decimal::ZERO);
            prop_assert!(!row.account.is_empty());
            prop_assert!(!row.payee_payer.is_empty());
        }
    }

    #[test]
    fn collection_summary_is_sorted_case_insensitively(
        txns in prop::collection::vec(arb_transaction(), 0..60)
    ) {
        let rows = build_collection_summary(&txns);
        for pair in rows.windows(2) {
            let a = (pair[0].account.to_lowercase(), pair[0].payee_payer.to_lowercase());
            let b = (pair[1].account.to_lowercase(), pair[1].payee_payer.to_lowercase());
            prop_assert!(a <= b);
        }
    }

    #[test]
    fn category_totals_match_period_totals(
        txns in prop::collection::vec(arb_transaction(), 0..60),
        as_of in arb_date()
    ) {
        let (start, end) = last_month_range(as_of);
        let period = filter_by_date(&txns, start, end);
        let summary = build_account_summary(&txns, &period, start, end);

        let category_receipts: Decimal = summary.categories.iter().map(|c| c.receipts).sum();
        let category_payments: Decimal = summary.categories.iter().map(|c| c.payments).sum();
        prop_assert_eq!(category_receipts, summary.total_receipts);
        prop_assert_eq!(category_payments, summary.total_payments);
        let detailed: usize = summary.expenses_by_category.values().map(Vec::len).sum();
        prop_assert_eq!(detailed, period.iter().filter(|t| t.amount < Decimal::ZERO).count());
    }

    // ========================================================================
    // Labels and rules
    // ========================================================================

    #[test]
    fn label_spellings_fold_to_one_form((block, number, spelled) in arb_label_spelling()) {
        let label = normalize_label(&spelled);
        prop_assert_eq!(&label, &format!("{block} {number:03}"));
        prop_assert_eq!(normalize_label(&label), label);
    }

    #[test]
    fn normalize_is_idempotent(text in "[A-Za-z0-9 -]{0,12}") {
        let once = normalize_label(&text);
        prop_assert_eq!(normalize_label(&once), once);
    }

    #[test]
    fn payment_rules_never_match_receipts(txn in arb_transaction(), category in arb_category()) {
        let rule = PaymentRule::new("Row", &category, "", "", "");
        if txn.amount >= Decimal::ZERO {
            prop_assert!(!rule.matches(&txn));
        }
    }
}
