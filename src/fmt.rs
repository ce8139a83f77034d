use rust_decimal::Decimal;

use crate::summary::round_money;

/// Format an amount with thousands separators and two decimals: 1,234.56
pub fn amount(val: Decimal) -> String {
    let rounded = round_money(val);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let cents = format!("{:.2}", rounded.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_formatting() {
        assert_eq!(amount(dec!(1234.56)), "1,234.56");
        assert_eq!(amount(dec!(-500)), "-500.00");
        assert_eq!(amount(dec!(0)), "0.00");
        assert_eq!(amount(dec!(1000000.99)), "1,000,000.99");
        assert_eq!(amount(dec!(42.1)), "42.10");
        assert_eq!(amount(dec!(999.999)), "1,000.00");
    }

    #[test]
    fn test_amount_negative_zero() {
        assert_eq!(amount(dec!(-0.001)), "0.00");
    }
}
