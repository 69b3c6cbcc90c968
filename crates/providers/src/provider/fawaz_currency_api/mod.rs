//! Fawaz Ahmed's currency API, served as static JSON from the jsDelivr CDN.
//!
//! Each published snapshot is a package version: `@latest` for today's file,
//! `@YYYY-MM-DD` for a past day. There is no range endpoint, so ranges are
//! fetched one day at a time.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::models::{Concept, ProviderKey, Rate, UsageData, UsageLimit};
use crate::provider::parsing::build_rate;
use crate::provider::range::collect_daily_rates;
use crate::provider::{ExchangeRateProvider, Provider, ProviderBase, ProviderServices};
use crate::response::ProviderResponse;

const DEFAULT_BASE_URL: &str = "https://cdn.jsdelivr.net/npm";
const PACKAGE: &str = "@fawazahmed0/currency-api";
const PROVIDER_KEY: ProviderKey = ProviderKey::FawazCurrencyApi;

pub struct FawazCurrencyApiProvider {
    base: ProviderBase,
    base_url: String,
}

impl FawazCurrencyApiProvider {
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

    /// Snapshot tag for `date`: `latest` for today, the ISO date otherwise.
    fn version_tag(&self, date: NaiveDate) -> String {
        if date == self.base.today() {
            "latest".to_string()
        } else {
            date.format("%Y-%m-%d").to_string()
        }
    }

    fn snapshot_url(&self, tag: &str, file: &str) -> String {
        format!("{}/{}@{}/v1/{}", self.base_url, PACKAGE, tag, file)
    }
}

#[async_trait]
impl Provider for FawazCurrencyApiProvider {
    fn key(&self) -> ProviderKey {
        PROVIDER_KEY
    }

    fn concepts(&self) -> &'static [Concept] {
        &[Concept::ExchangeRates]
    }

    async fn health_check(&self) -> ProviderResponse<bool> {
        self.base
            .capture("health_check", vec![], async {
                let body: Value = self
                    .base
                    .client()?
                    .get_json(&self.snapshot_url("latest", "currencies.json"), &[])
                    .await?;
                Ok(body.is_object())
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
impl ExchangeRateProvider for FawazCurrencyApiProvider {
    async fn fetch_exchange_rate(&self, from: &str, to: &str, date: NaiveDate) -> ProviderResponse<Rate> {
        let context = vec![
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("date", date.to_string()),
        ];

        self.base
            .capture("fetch_exchange_rate", context, async {
                let from_key = from.to_lowercase();
                let to_key = to.to_lowercase();
                let url = self.snapshot_url(&self.version_tag(date), &format!("currencies/{}.json", from_key));

                // {"date": "2024-01-02", "usd": {"eur": 0.91, ...}}
                let mut body: HashMap<String, Value> = self.base.client()?.get_json(&url, &[]).await?;

                let not_found = || ProviderError::RateNotFound {
                    from: from.to_string(),
                    to: to.to_string(),
                    date,
                };

                let block = body.remove(&from_key).ok_or_else(not_found)?;
                let rates = block.as_object().ok_or_else(|| {
                    ProviderError::upstream(
                        PROVIDER_KEY,
                        format!("Expected an object of rates under {:?}, got {}", from_key, block),
                    )
                })?;
                let value = rates.get(&to_key).ok_or_else(not_found)?;

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
                Ok(collect_daily_rates(PROVIDER_KEY, from, to, start_date, end_date, |date| {
                    self.fetch_exchange_rate(from, to, date)
                })
                .await)
            })
            .await
    }
}
