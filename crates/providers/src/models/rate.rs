use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// Exchange rate for one currency pair on one calendar day.
///
/// `(from, to, date)` is the natural key of a rate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub date: NaiveDate,
    pub from: String,
    pub to: String,
    /// Units of `to` for one unit of `from`. Always strictly positive.
    pub rate: Decimal,
}

impl Rate {
    pub fn new(date: NaiveDate, from: impl Into<String>, to: impl Into<String>, rate: Decimal) -> Self {
        Self {
            date,
            from: from.into(),
            to: to.into(),
            rate,
        }
    }

    /// Like [`new`](Self::new), but rejects a rate of zero or below.
    pub fn try_new(
        date: NaiveDate,
        from: impl Into<String>,
        to: impl Into<String>,
        rate: Decimal,
    ) -> Result<Self, ProviderError> {
        let rate = Self::new(date, from, to, rate);
        if rate.is_valid() {
            Ok(rate)
        } else {
            Err(ProviderError::InvalidValue(format!(
                "Non-positive rate for {} to {} on {}: {}",
                rate.from, rate.to, rate.date, rate.rate
            )))
        }
    }

    /// A rate of zero or below can only come from a broken payload.
    pub fn is_valid(&self) -> bool {
        self.rate > Decimal::ZERO
    }
}
