use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A single row of the Expense Manager CSV export.
///
/// Only the date, amount and the text fields used for grouping take part in
/// aggregation; the rest are carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub subcategory: String,
    pub payment_method: String,
    pub description: String,
    pub ref_check_no: String,
    pub payee_payer: String,
    pub status: String,
    pub receipt_picture: String,
    pub account: String,
    pub tag: String,
    pub tax: String,
    pub quantity: String,
    pub split_total: String,
    pub row_id: Option<i64>,
    pub type_id: String,
}

impl Transaction {
    /// Money received (zero counts as a receipt).
    pub fn is_receipt(&self) -> bool {
        self.amount >= Decimal::ZERO
    }

    pub fn is_payment(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

#[cfg(test)]
pub(crate) fn sample(date: NaiveDate, amount: Decimal) -> Transaction {
    Transaction {
        date,
        amount,
        category: String::new(),
        subcategory: String::new(),
        payment_method: String::new(),
        description: String::new(),
        ref_check_no: String::new(),
        payee_payer: String::new(),
        status: String::new(),
        receipt_picture: String::new(),
        account: String::new(),
        tag: String::new(),
        tax: String::new(),
        quantity: String::new(),
        split_total: String::new(),
        row_id: None,
        type_id: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_amount_is_receipt() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let t = sample(d, Decimal::ZERO);
        assert!(t.is_receipt());
        assert!(!t.is_payment());
        let t = sample(d, dec!(-0.01));
        assert!(t.is_payment());
        assert!(!t.is_receipt());
    }
}
