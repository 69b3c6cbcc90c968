//! Conversions from loosely typed upstream values into the shared model.

use std::str::FromStr;

use chrono::NaiveDate;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::models::{ProviderKey, Rate};

/// Parse a `YYYY-MM-DD` date.
pub(crate) fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").ok()
}

/// Parse a decimal written as a string, in plain or scientific notation.
pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Read a JSON number (or numeric string) as a decimal.
pub(crate) fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()).or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Build a rate, rejecting values no healthy upstream would send.
pub(crate) fn build_rate(
    provider: ProviderKey,
    date: NaiveDate,
    from: &str,
    to: &str,
    value: &Value,
) -> Result<Rate, ProviderError> {
    let rate = decimal_from_value(value).ok_or_else(|| {
        ProviderError::upstream(
            provider,
            format!("Non-numeric rate for {} to {} on {}: {}", from, to, date, value),
        )
    })?;

    Rate::try_new(date, from, to, rate)
}
