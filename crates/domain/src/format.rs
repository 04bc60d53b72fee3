//! Display formatting for prices, USD figures and asset amounts.

use rust_decimal::{Decimal, RoundingStrategy};

/// Placeholder shown for unknown values.
pub const UNKNOWN: &str = "—";

/// Sub-cent friendly USD price: up to `max_dp` decimals, trailing zeros trimmed.
#[must_use]
pub fn usd_price(value: Option<Decimal>, max_dp: u32) -> String {
    match value {
        Some(v) => format!(
            "${}",
            v.round_dp_with_strategy(max_dp, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        ),
        None => UNKNOWN.to_string(),
    }
}

/// USD figure with two decimals and thousands separators.
#[must_use]
pub fn usd(value: Option<Decimal>) -> String {
    match value {
        Some(v) => {
            let rounded = v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("${}", group_thousands(&format!("{rounded:.2}")))
        }
        None => UNKNOWN.to_string(),
    }
}

/// Asset amount with at most three decimals and thousands separators.
#[must_use]
pub fn amount(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    group_thousands(&rounded.to_string())
}

/// Percentage with one decimal, e.g. `12.5%`.
#[must_use]
pub fn percent(value: Decimal) -> String {
    format!(
        "{:.1}%",
        value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn group_thousands(number: &str) -> String {
    let (sign, digits) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_usd_price_trims_zeros() {
        assert_eq!(usd_price(Some(dec!(0.00001234567)), 7), "$0.0000123");
        assert_eq!(usd_price(Some(dec!(1.5000)), 7), "$1.5");
        assert_eq!(usd_price(Some(dec!(2)), 7), "$2");
        assert_eq!(usd_price(None, 7), "—");
    }

    #[test]
    fn test_usd_two_decimals() {
        assert_eq!(usd(Some(dec!(1234567.891))), "$1,234,567.89");
        assert_eq!(usd(Some(dec!(0.005))), "$0.01");
        assert_eq!(usd(Some(dec!(12))), "$12.00");
        assert_eq!(usd(None), "—");
    }

    #[test]
    fn test_amount_grouping() {
        assert_eq!(amount(dec!(1000000)), "1,000,000");
        assert_eq!(amount(dec!(1234.56789)), "1,234.568");
        assert_eq!(amount(dec!(-9876.5)), "-9,876.5");
        assert_eq!(amount(dec!(999)), "999");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(dec!(12.46)), "12.5%");
        assert_eq!(percent(dec!(100)), "100.0%");
    }
}
