//! Frankfurter exchange-rate provider.
//!
//! Free ECB reference rates from <https://api.frankfurter.app>. No API key, no
//! published quota, and a native date-range endpoint (`/{start}..{end}`).

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{ErrorKind, ProviderError};
use crate::models::{Concept, ProviderKey, Rate, UsageData, UsageLimit};
use crate::provider::parsing::{build_rate, parse_date};
use crate::provider::range::normalize_rates;
use crate::provider::{ExchangeRateProvider, Provider, ProviderBase, ProviderServices};
use crate::response::ProviderResponse;

const DEFAULT_BASE_URL: &str = "https://api.frankfurter.app";
const PROVIDER_KEY: ProviderKey = ProviderKey::Frankfurter;

/// `/latest` and `/{date}` response.
#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: Option<HashMap<String, Value>>,
}

/// `/{start}..{end}` response. Entries are checked one by one.
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    rates: Option<BTreeMap<String, Value>>,
}

pub struct FrankfurterProvider {
    base: ProviderBase,
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new(services: &ProviderServices) -> Self {
        Self {
            base: ProviderBase::new(PROVIDER_KEY, services),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Convert one `"YYYY-MM-DD": {"EUR": 0.91}` entry of a time series.
    fn time_series_entry(from: &str, to: &str, date_str: &str, entry: &Value) -> Option<Rate> {
        let date = parse_date(date_str)?;
        let value = entry.get(to)?;
        build_rate(PROVIDER_KEY, date, from, to, value).ok()
    }
}

#[async_trait]
impl Provider for FrankfurterProvider {
    fn key(&self) -> ProviderKey {
        PROVIDER_KEY
    }

    fn concepts(&self) -> &'static [Concept] {
        &[Concept::ExchangeRates]
    }

    async fn health_check(&self) -> ProviderResponse<bool> {
        self.base
            .capture("health_check", vec![], async {
                let response: RatesResponse =
                    self.base.client()?.get_json(&self.url("latest"), &[]).await?;
                Ok(response.rates.is_some_and(|rates| !rates.is_empty()))
            })
            .await
    }

    async fn usage(&self) -> ProviderResponse<UsageData> {
        self.base
            .capture("usage", vec![], async {
                Ok(UsageData::unmetered(UsageLimit::Unlimited, "free"))
            })
            .await
    }
}

#[async_trait]
impl ExchangeRateProvider for FrankfurterProvider {
    async fn fetch_exchange_rate(&self, from: &str, to: &str, date: NaiveDate) -> ProviderResponse<Rate> {
        let context = vec![
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("date", date.to_string()),
        ];

        self.base
            .capture("fetch_exchange_rate", context, async {
                let path = date.format("%Y-%m-%d").to_string();
                let response: RatesResponse = self
                    .base
                    .client()?
                    .get_json(&self.url(&path), &[("from", from), ("to", to)])
                    .await?;

                let value = response
                    .rates
                    .as_ref()
                    .and_then(|rates| rates.get(to))
                    .ok_or_else(|| ProviderError::RateNotFound {
                        from: from.to_string(),
                        to: to.to_string(),
                        date,
                    })?;

                build_rate(PROVIDER_KEY, date, from, to, value)
            })
            .await
    }

    async fn fetch_exchange_rates(
        &self,
        from: &str,
        to: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ProviderResponse<Vec<Rate>> {
        let context = vec![
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("start_date", start_date.to_string()),
            ("end_date", end_date.to_string()),
        ];

        self.base
            .capture("fetch_exchange_rates", context, async {
                if start_date > end_date {
                    return Ok(Vec::new());
                }

                let path = format!(
                    "{}..{}",
                    start_date.format("%Y-%m-%d"),
                    end_date.format("%Y-%m-%d")
                );
                let response: TimeSeriesResponse = self
                    .base
                    .client()?
                    .get_json(&self.url(&path), &[("from", from), ("to", to)])
                    .await?;

                let Some(entries) = response.rates else {
                    debug!("{}: no rates for {} to {} in {}", PROVIDER_KEY, from, to, path);
                    return Ok(Vec::new());
                };

                let mut rates = Vec::with_capacity(entries.len());
                for (date_str, entry) in &entries {
                    match Self::time_series_entry(from, to, date_str, entry) {
                        Some(rate) => rates.push(rate),
                        None => {
                            warn!(
                                "{} returned invalid rate data for pair from: {} to: {} on: {}. Rate data: {}",
                                PROVIDER_KEY, from, to, date_str, entry
                            );
                            self.base.report(
                                "fetch_exchange_rates",
                                ErrorKind::UpstreamError,
                                format!("{} returned invalid rate data", PROVIDER_KEY),
                                vec![
                                    ("from", from.to_string()),
                                    ("to", to.to_string()),
                                    ("date", date_str.clone()),
                                ],
                            );
                        }
                    }
                }

                Ok(normalize_rates(rates, start_date, end_date))
            })
            .await
    }
}
