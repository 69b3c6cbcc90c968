//! ExchangeRate-API provider.
//!
//! With an API key, calls go to the keyed v6 endpoint
//! (`https://v6.exchangerate-api.com/v6/{key}`); without one, to the open
//! endpoint (`https://open.er-api.com/v6`). Every payload carries a `result`
//! field that must be `"success"`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::models::{Concept, ProviderKey, Rate, UsageData, UsageLimit};
use crate::provider::parsing::build_rate;
use crate::provider::range::collect_daily_rates;
use crate::provider::{ExchangeRateProvider, Provider, ProviderBase, ProviderServices};
use crate::response::ProviderResponse;

const KEYED_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";
const OPEN_BASE_URL: &str = "https://open.er-api.com/v6";
const PROVIDER_KEY: ProviderKey = ProviderKey::ExchangerateApi;

/// Monthly request allowance of the free plan.
const FREE_PLAN_MONTHLY_REQUESTS: u64 = 1500;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
    /// The open endpoint names this field `rates`.
    #[serde(default, alias = "rates")]
    conversion_rates: Option<HashMap<String, Value>>,
}

impl ApiResponse {
    fn is_success(&self) -> bool {
        self.result.as_deref() == Some("success")
    }
}

pub struct ExchangerateApiProvider {
    base: ProviderBase,
    api_key: Option<String>,
    base_url: Option<String>,
}

impl ExchangerateApiProvider {
    pub fn new(services: &ProviderServices, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        Self {
            base: ProviderBase::new(PROVIDER_KEY, services).with_secret(api_key.clone()),
            api_key,
            base_url: None,
        }
    }

    /// Point the provider at another host. The API key, if any, is still
    /// appended as a path segment.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn endpoint_root(&self) -> String {
        let host = match (&self.base_url, &self.api_key) {
            (Some(url), _) => url.as_str(),
            (None, Some(_)) => KEYED_BASE_URL,
            (None, None) => OPEN_BASE_URL,
        };
        match self.api_key {
            Some(ref key) => format!("{}/{}", host, key),
            None => host.to_string(),
        }
    }

    fn check_result(response: &ApiResponse) -> Result<(), ProviderError> {
        if response.is_success() {
            return Ok(());
        }
        let error_type = response.error_type.as_deref().unwrap_or("unknown");
        Err(ProviderError::Upstream {
            provider: PROVIDER_KEY,
            message: format!("API error: {}", error_type),
            upstream_message: response.error_type.clone(),
        })
    }
}

#[async_trait]
impl Provider for ExchangerateApiProvider {
    fn key(&self) -> ProviderKey {
        PROVIDER_KEY
    }

    fn concepts(&self) -> &'static [Concept] {
        &[Concept::ExchangeRates]
    }

    async fn health_check(&self) -> ProviderResponse<bool> {
        self.base
            .capture("health_check", vec![], async {
                let url = format!("{}/latest/USD", self.endpoint_root());
                let response: ApiResponse = self.base.client()?.get_json(&url, &[]).await?;
                Ok(response.is_success())
            })
            .await
    }

    async fn usage(&self) -> ProviderResponse<UsageData> {
        // No usage endpoint on the free plan; report the published allowance.
        self.base
            .capture("usage", vec![], async {
                Ok(UsageData::unmetered(
                    UsageLimit::Limited(FREE_PLAN_MONTHLY_REQUESTS),
                    "free",
                ))
            })
            .await
    }
}

#[async_trait]
impl ExchangeRateProvider for ExchangerateApiProvider {
    async fn fetch_exchange_rate(&self, from: &str, to: &str, date: NaiveDate) -> ProviderResponse<Rate> {
        let context = vec![
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("date", date.to_string()),
        ];

        self.base
            .capture("fetch_exchange_rate", context, async {
                let is_today = date == self.base.today();
                let endpoint = if is_today { "latest" } else { "history" };
                let url = format!("{}/{}/{}", self.endpoint_root(), endpoint, from);

                let date_param = date.format("%Y-%m-%d").to_string();
                let mut query = vec![("base", from)];
                if !is_today {
                    query.push(("date", date_param.as_str()));
                }

                let response: ApiResponse = self.base.client()?.get_json(&url, &query).await?;
                Self::check_result(&response)?;

                let value = response
                    .conversion_rates
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
                Ok(collect_daily_rates(PROVIDER_KEY, from, to, start_date, end_date, |date| {
                    self.fetch_exchange_rate(from, to, date)
                })
                .await)
            })
            .await
    }
}
