use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// Closing (or latest) price of a security on one calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub symbol: String,
    pub date: NaiveDate,
    pub price: Decimal,
    /// Quote currency; the provider's native currency when the upstream does not say.
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_operating_mic: Option<String>,
}

impl Price {
    pub fn new(
        symbol: impl Into<String>,
        date: NaiveDate,
        price: Decimal,
        currency: impl Into<String>,
        exchange_operating_mic: Option<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            price,
            currency: currency.into(),
            exchange_operating_mic,
        }
    }

    /// Like [`new`](Self::new), but rejects a negative price.
    pub fn try_new(
        symbol: impl Into<String>,
        date: NaiveDate,
        price: Decimal,
        currency: impl Into<String>,
        exchange_operating_mic: Option<String>,
    ) -> Result<Self, ProviderError> {
        let price = Self::new(symbol, date, price, currency, exchange_operating_mic);
        if price.is_valid() {
            Ok(price)
        } else {
            Err(ProviderError::InvalidValue(format!(
                "Negative price for {} on {}: {}",
                price.symbol, price.date, price.price
            )))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.price >= Decimal::ZERO
    }
}
