//! Lenient numeric parsing for upstream JSON.
//!
//! Horizon reports amounts as strings and CoinGecko as numbers; either may be
//! missing or malformed. Anything that does not parse becomes zero (or
//! `None` for optional fields) instead of failing the whole document.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Converts a JSON value into a decimal, zero when it is not numeric.
///
/// Strings have every character except digits, `.` and `-` stripped first.
#[must_use]
pub fn to_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse(&n.to_string()),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            parse(&cleaned)
        }
        _ => Decimal::ZERO,
    }
}

fn parse(s: &str) -> Decimal {
    if s.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .unwrap_or(Decimal::ZERO)
}

/// `deserialize_with` helper: lenient decimal.
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_decimal(&value))
}

/// `deserialize_with` helper: lenient decimal, `None` when null.
pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_null()).map(|v| to_decimal(&v)))
}
