//! Concept traits every provider implements.
//!
//! [`Provider`] carries the two universal operations. A provider serves a
//! concept by implementing that concept's trait in full:
//! [`ExchangeRateProvider`] or [`SecurityProvider`].

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{Concept, Price, ProviderKey, Rate, Security, SecurityInfo, UsageData};
use crate::response::ProviderResponse;

/// Operations shared by all providers.
///
/// Every operation returns an envelope; none of them panics or returns a raw
/// error to the caller.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable key of this provider, as used in configuration.
    fn key(&self) -> ProviderKey;

    /// Concepts this provider implements.
    fn concepts(&self) -> &'static [Concept];

    /// `true` iff the upstream is reachable and answers with a well-formed
    /// success payload. Well-formed JSON without the expected content yields
    /// `Success(false)`. A transport failure or a body that is not JSON yields
    /// a failure envelope.
    async fn health_check(&self) -> ProviderResponse<bool>;

    /// Best-effort quota snapshot. Providers without a usage endpoint report a
    /// static value and always succeed.
    async fn usage(&self) -> ProviderResponse<UsageData>;
}

impl fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("key", &self.key())
            .field("concepts", &self.concepts())
            .finish()
    }
}

/// Foreign-exchange rate lookups.
#[async_trait]
pub trait ExchangeRateProvider: Provider {
    /// Rate for a single pair on a single day.
    ///
    /// Fails with `RateNotFound` when the upstream has no data for the triple
    /// and with `UpstreamError` when the call itself fails.
    async fn fetch_exchange_rate(&self, from: &str, to: &str, date: NaiveDate) -> ProviderResponse<Rate>;

    /// Rates for every available day in `[start_date, end_date]`.
    ///
    /// The result is strictly ascending by date and never holds two rates for
    /// the same day. Implementations that fetch day by day leave out the days
    /// that fail and still succeed.
    async fn fetch_exchange_rates(
        &self,
        from: &str,
        to: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ProviderResponse<Vec<Rate>>;
}

/// Security search, metadata and pricing.
#[async_trait]
pub trait SecurityProvider: Provider {
    /// Free-text or symbol search. No match is an empty success, not a failure.
    async fn search_securities(
        &self,
        symbol: &str,
        country_code: Option<&str>,
        exchange_operating_mic: Option<&str>,
    ) -> ProviderResponse<Vec<Security>>;

    /// Extended metadata; `SecurityNotFound` when the upstream has no record.
    async fn fetch_security_info(
        &self,
        symbol: &str,
        exchange_operating_mic: Option<&str>,
    ) -> ProviderResponse<SecurityInfo>;

    /// Price on `date`. Today uses the latest-quote call; a past date behaves
    /// like a one-day range fetch, with an empty result reported as
    /// `SecurityNotFound`.
    async fn fetch_security_price(
        &self,
        symbol: &str,
        exchange_operating_mic: Option<&str>,
        date: NaiveDate,
    ) -> ProviderResponse<Price>;

    /// Prices for `[start_date, end_date]`, ascending, never outside the window.
    async fn fetch_security_prices(
        &self,
        symbol: &str,
        exchange_operating_mic: Option<&str>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ProviderResponse<Vec<Price>>;
}
