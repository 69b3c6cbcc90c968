//! Alpha Vantage securities provider.
//!
//! - Search via `SYMBOL_SEARCH`
//! - Company metadata via `OVERVIEW`
//! - Today's price via `GLOBAL_QUOTE`
//! - Historical closes via `TIME_SERIES_DAILY`
//!
//! Without a configured key the public `demo` key is used (25 calls/day).
//! Prices are reported in USD.

mod models;
mod regions;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::errors::{ErrorKind, ProviderError};
use crate::models::{Concept, Price, ProviderKey, Security, SecurityInfo, UsageData, UsageLimit};
use crate::provider::parsing::{decimal_from_value, parse_date, parse_decimal};
use crate::provider::range::normalize_prices;
use crate::provider::{Provider, ProviderBase, ProviderServices, SecurityProvider};
use crate::response::ProviderResponse;

use models::{
    present, ApiNotice, GlobalQuoteResponse, OverviewResponse, SymbolSearchResponse,
    TimeSeriesResponse,
};
use regions::{exchange_to_mic, region_to_country, region_to_mic};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_KEY: ProviderKey = ProviderKey::AlphaVantage;

/// Public key accepted by Alpha Vantage for a handful of calls.
pub const DEMO_API_KEY: &str = "demo";

const DEMO_DAILY_LIMIT: u64 = 25;
const FREE_DAILY_LIMIT: u64 = 500;

/// `outputsize=compact` covers the latest 100 data points.
const COMPACT_WINDOW_DAYS: u64 = 100;

/// Prices are quoted in the listing currency; Alpha Vantage covers US listings first.
const QUOTE_CURRENCY: &str = "USD";

pub struct AlphaVantageProvider {
    base: ProviderBase,
    api_key: String,
    base_url: String,
}

impl AlphaVantageProvider {
    /// Create a provider. A missing or blank key falls back to [`DEMO_API_KEY`].
    pub fn new(services: &ProviderServices, api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| DEMO_API_KEY.to_string());

        Self {
            base: ProviderBase::new(PROVIDER_KEY, services).with_secret(Some(api_key.clone())),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn is_demo(&self) -> bool {
        self.api_key == DEMO_API_KEY
    }

    /// Call the query endpoint with `params` plus the API key.
    async fn query<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, ProviderError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        self.base.client()?.get_json(&self.base_url, &all_params).await
    }

    /// Turn the top-level notice fields into errors.
    ///
    /// `Error Message` is fatal; an "Invalid API call" means the symbol is
    /// unknown. `Note` and `Information` are only fatal when they announce a
    /// rate limit.
    fn check_api_error(notice: &ApiNotice) -> Result<(), ProviderError> {
        if let Some(ref msg) = notice.error_message {
            if msg.contains("Invalid API call") {
                return Err(ProviderError::SecurityNotFound(msg.clone()));
            }
            return Err(ProviderError::Upstream {
                provider: PROVIDER_KEY,
                message: msg.clone(),
                upstream_message: Some(msg.clone()),
            });
        }

        for msg in [&notice.note, &notice.information].into_iter().flatten() {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(ProviderError::RateLimited {
                    provider: PROVIDER_KEY,
                    upstream_message: Some(msg.clone()),
                });
            }
            warn!("Alpha Vantage notice: {}", msg);
        }

        Ok(())
    }

    /// Outputsize that still reaches back to `start_date`.
    fn output_size(&self, start_date: NaiveDate) -> &'static str {
        let compact_from = self
            .base
            .today()
            .checked_sub_days(Days::new(COMPACT_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN);
        if start_date >= compact_from {
            "compact"
        } else {
            "full"
        }
    }

    async fn fetch_daily_prices(
        &self,
        symbol: &str,
        exchange_operating_mic: Option<&str>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Price>, ProviderError> {
        if start_date > end_date {
            return Ok(Vec::new());
        }

        let params = [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", symbol),
            ("outputsize", self.output_size(start_date)),
        ];
        let response: TimeSeriesResponse = self.query(&params).await?;
        Self::check_api_error(&response.notice)?;

        let time_series = response.time_series.ok_or_else(|| {
            ProviderError::upstream(
                PROVIDER_KEY,
                format!("Failed to fetch prices: {}", response.notice.describe()),
            )
        })?;

        let mut prices = Vec::new();
        for (date_str, bar) in time_series {
            let Some(date) = parse_date(&date_str) else {
                warn!("Alpha Vantage: skipping bar with invalid date {} for {}", date_str, symbol);
                continue;
            };
            if date < start_date || date > end_date {
                continue;
            }

            let price = bar
                .close
                .as_ref()
                .and_then(decimal_from_value)
                .ok_or_else(|| {
                    ProviderError::upstream(
                        PROVIDER_KEY,
                        format!("Invalid close {:?} for {} on {}", bar.close, symbol, date),
                    )
                })
                .and_then(|close| {
                    Price::try_new(
                        symbol,
                        date,
                        close,
                        QUOTE_CURRENCY,
                        exchange_operating_mic.map(str::to_string),
                    )
                });

            match price {
                Ok(price) => prices.push(price),
                Err(e) => {
                    warn!("Alpha Vantage: {}", e);
                    self.base.report(
                        "fetch_security_prices",
                        ErrorKind::UpstreamError,
                        e.to_string(),
                        vec![("symbol", symbol.to_string()), ("date", date.to_string())],
                    );
                }
            }
        }

        debug!(
            "Alpha Vantage: fetched {} prices for {} between {} and {}",
            prices.len(),
            symbol,
            start_date,
            end_date
        );

        Ok(normalize_prices(prices, start_date, end_date))
    }

    async fn fetch_latest_price(
        &self,
        symbol: &str,
        exchange_operating_mic: Option<&str>,
    ) -> Result<Price, ProviderError> {
        let params = [("function", "GLOBAL_QUOTE"), ("symbol", symbol)];
        let response: GlobalQuoteResponse = self.query(&params).await?;
        Self::check_api_error(&response.notice)?;

        let quote = response.global_quote.unwrap_or_default();
        let (Some(price), Some(day)) = (quote.price, quote.latest_trading_day) else {
            return Err(ProviderError::SecurityNotFound(format!(
                "Price not found for {}",
                symbol
            )));
        };

        let price = parse_decimal(&price).ok_or_else(|| {
            ProviderError::upstream(PROVIDER_KEY, format!("Invalid price {:?} for {}", price, symbol))
        })?;
        let date = parse_date(&day).ok_or_else(|| {
            ProviderError::upstream(PROVIDER_KEY, format!("Invalid trading day {:?} for {}", day, symbol))
        })?;

        Price::try_new(
            symbol,
            date,
            price,
            QUOTE_CURRENCY,
            exchange_operating_mic.map(str::to_string),
        )
    }
}

#[async_trait]
impl Provider for AlphaVantageProvider {
    fn key(&self) -> ProviderKey {
        PROVIDER_KEY
    }

    fn concepts(&self) -> &'static [Concept] {
        &[Concept::Securities]
    }

    async fn health_check(&self) -> ProviderResponse<bool> {
        self.base
            .capture("health_check", vec![], async {
                let params = [("function", "GLOBAL_QUOTE"), ("symbol", "AAPL")];
                let response: GlobalQuoteResponse = self.query(&params).await?;
                Ok(response.notice.error_message.is_none() && response.global_quote.is_some())
            })
            .await
    }

    async fn usage(&self) -> ProviderResponse<UsageData> {
        // There is no usage endpoint; report the daily allowance of the plan.
        self.base
            .capture("usage", vec![], async {
                let (limit, plan) = if self.is_demo() {
                    (DEMO_DAILY_LIMIT, "demo")
                } else {
                    (FREE_DAILY_LIMIT, "free")
                };
                Ok(UsageData::unmetered(UsageLimit::Limited(limit), plan))
            })
            .await
    }
}

#[async_trait]
impl SecurityProvider for AlphaVantageProvider {
    async fn search_securities(
        &self,
        symbol: &str,
        country_code: Option<&str>,
        exchange_operating_mic: Option<&str>,
    ) -> ProviderResponse<Vec<Security>> {
        let context = vec![
            ("symbol", symbol.to_string()),
            ("country_code", country_code.unwrap_or_default().to_string()),
            ("mic", exchange_operating_mic.unwrap_or_default().to_string()),
        ];

        self.base
            .capture("search_securities", context, async {
                let params = [("function", "SYMBOL_SEARCH"), ("keywords", symbol)];
                let response: SymbolSearchResponse = self.query(&params).await?;

                match Self::check_api_error(&response.notice) {
                    Err(ProviderError::SecurityNotFound(_)) => return Ok(Vec::new()),
                    other => other?,
                }

                let securities = response
                    .best_matches
                    .unwrap_or_default()
                    .into_iter()
                    .map(|m| {
                        let region = m.region.as_deref().unwrap_or_default();
                        Security::new(m.symbol, m.name)
                            .with_exchange_operating_mic(region_to_mic(region).map(str::to_string))
                            .with_country_code(region_to_country(region).map(str::to_string))
                    })
                    // Region-derived countries are reliable; region-derived MICs are
                    // only a default venue, so the MIC hint does not filter.
                    .filter(|security| match (country_code, security.country_code.as_deref()) {
                        (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
                        _ => true,
                    })
                    .collect();

                Ok(securities)
            })
            .await
    }

    async fn fetch_security_info(
        &self,
        symbol: &str,
        exchange_operating_mic: Option<&str>,
    ) -> ProviderResponse<SecurityInfo> {
        let context = vec![
            ("symbol", symbol.to_string()),
            ("mic", exchange_operating_mic.unwrap_or_default().to_string()),
        ];

        self.base
            .capture("fetch_security_info", context, async {
                let params = [("function", "OVERVIEW"), ("symbol", symbol)];
                let response: OverviewResponse = self.query(&params).await?;
                Self::check_api_error(&response.notice)?;

                let Some(resolved_symbol) = present(response.symbol) else {
                    return Err(ProviderError::SecurityNotFound(format!(
                        "Security info not found for {}",
                        symbol
                    )));
                };

                let mut info = SecurityInfo {
                    name: present(response.name).unwrap_or_else(|| resolved_symbol.clone()),
                    symbol: resolved_symbol,
                    description: present(response.description),
                    kind: present(response.asset_type),
                    exchange_operating_mic: exchange_operating_mic.map(str::to_string).or_else(|| {
                        present(response.exchange)
                            .as_deref()
                            .and_then(exchange_to_mic)
                            .map(str::to_string)
                    }),
                    ..SecurityInfo::default()
                };
                if let Some(website) = present(response.official_site) {
                    info.links.insert("website".to_string(), website);
                }

                Ok(info)
            })
            .await
    }

    async fn fetch_security_price(
        &self,
        symbol: &str,
        exchange_operating_mic: Option<&str>,
        date: NaiveDate,
    ) -> ProviderResponse<Price> {
        let context = vec![
            ("symbol", symbol.to_string()),
            ("mic", exchange_operating_mic.unwrap_or_default().to_string()),
            ("date", date.to_string()),
        ];

        self.base
            .capture("fetch_security_price", context, async {
                if date == self.base.today() {
                    return self.fetch_latest_price(symbol, exchange_operating_mic).await;
                }

                self.fetch_daily_prices(symbol, exchange_operating_mic, date, date)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        ProviderError::SecurityNotFound(format!(
                            "No price for {} on {}",
                            symbol, date
                        ))
                    })
            })
            .await
    }

    async fn fetch_security_prices(
        &self,
        symbol: &str,
        exchange_operating_mic: Option<&str>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ProviderResponse<Vec<Price>> {
        let context = vec![
            ("symbol", symbol.to_string()),
            ("mic", exchange_operating_mic.unwrap_or_default().to_string()),
            ("start_date", start_date.to_string()),
            ("end_date", end_date.to_string()),
        ];

        self.base
            .capture(
                "fetch_security_prices",
                context,
                self.fetch_daily_prices(symbol, exchange_operating_mic, start_date, end_date),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_support::{day, TestHarness};
    use httpmock::prelude::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn provider(harness: &TestHarness, server: &MockServer) -> AlphaVantageProvider {
        AlphaVantageProvider::new(&harness.services(), Some("test-key".to_string()))
            .with_base_url(server.url("/query"))
    }

    fn daily_series() -> serde_json::Value {
        json!({
            "Meta Data": {"2. Symbol": "IBM"},
            "Time Series (Daily)": {
                "2024-01-05": {"1. open": "160.0", "4. close": "159.16", "5. volume": "4000000"},
                "2024-01-04": {"1. open": "161.0", "4. close": "161.10", "5. volume": "3900000"},
                "2024-01-03": {"1. open": "162.0", "4. close": "160.10", "5. volume": "4100000"},
                "2024-01-02": {"1. open": "161.5", "4. close": "158.60", "5. volume": "3800000"},
                "2023-12-29": {"1. open": "163.0", "4. close": "163.55", "5. volume": "3500000"}
            }
        })
    }

    #[test]
    fn test_check_api_error() {
        let notice = ApiNotice {
            error_message: Some("Invalid API call. Please retry or visit the documentation".to_string()),
            ..ApiNotice::default()
        };
        assert_eq!(
            AlphaVantageProvider::check_api_error(&notice).unwrap_err().kind(),
            ErrorKind::SecurityNotFound
        );

        let notice = ApiNotice {
            error_message: Some("the parameter apikey is invalid or missing".to_string()),
            ..ApiNotice::default()
        };
        assert_eq!(
            AlphaVantageProvider::check_api_error(&notice).unwrap_err().kind(),
            ErrorKind::UpstreamError
        );

        let notice = ApiNotice {
            note: Some("Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute.".to_string()),
            ..ApiNotice::default()
        };
        assert_eq!(
            AlphaVantageProvider::check_api_error(&notice).unwrap_err().kind(),
            ErrorKind::RateLimited
        );

        let notice = ApiNotice {
            information: Some("This is a premium endpoint.".to_string()),
            ..ApiNotice::default()
        };
        assert!(AlphaVantageProvider::check_api_error(&notice).is_ok());
    }

    #[test]
    fn test_output_size() {
        let harness = TestHarness::new();
        let provider = AlphaVantageProvider::new(&harness.services(), None);

        assert_eq!(provider.output_size(harness.today), "compact");
        assert_eq!(provider.output_size(day(2024, 3, 1)), "compact");
        assert_eq!(provider.output_size(day(2023, 1, 1)), "full");
    }

    #[tokio::test]
    async fn test_usage_depends_on_key() {
        let harness = TestHarness::new();

        let demo = AlphaVantageProvider::new(&harness.services(), None);
        let usage = demo.usage().await.ok().unwrap();
        assert_eq!(usage.limit, UsageLimit::Limited(25));
        assert_eq!(usage.plan, "demo");

        let keyed = AlphaVantageProvider::new(&harness.services(), Some("abc".to_string()));
        let usage = keyed.usage().await.ok().unwrap();
        assert_eq!(usage.limit, UsageLimit::Limited(500));
        assert_eq!(usage.plan, "free");
        assert_eq!(usage.utilization, 0.0);
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "GLOBAL_QUOTE")
                    .query_param("symbol", "AAPL")
                    .query_param("apikey", "test-key");
                then.status(200).json_body(json!({
                    "Global Quote": {"01. symbol": "AAPL", "05. price": "194.03", "07. latest trading day": "2024-05-31"}
                }));
            })
            .await;

        let harness = TestHarness::new();
        let response = provider(&harness, &server).health_check().await;

        mock.assert_async().await;
        assert_eq!(response, ProviderResponse::Success(true));
    }

    #[tokio::test]
    async fn test_search_securities() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "SYMBOL_SEARCH")
                    .query_param("keywords", "tesco");
                then.status(200).json_body(json!({
                    "bestMatches": [
                        {"1. symbol": "TSCO.LON", "2. name": "Tesco PLC", "3. type": "Equity", "4. region": "United Kingdom", "8. currency": "GBX"},
                        {"1. symbol": "TSCDF", "2. name": "Tesco plc", "3. type": "Equity", "4. region": "United States", "8. currency": "USD"},
                        {"1. symbol": "TCO2.FRK", "2. name": "TESCO PLC ADR", "3. type": "Equity", "4. region": "Frankfurt", "8. currency": "EUR"}
                    ]
                }));
            })
            .await;

        let harness = TestHarness::new();
        let securities = provider(&harness, &server)
            .search_securities("tesco", None, None)
            .await
            .ok()
            .unwrap();

        assert_eq!(securities.len(), 3);
        assert_eq!(securities[0].symbol, "TSCO.LON");
        assert_eq!(securities[0].exchange_operating_mic.as_deref(), Some("XLON"));
        assert_eq!(securities[0].country_code.as_deref(), Some("GB"));
        assert_eq!(securities[1].exchange_operating_mic.as_deref(), Some("XNAS"));
        assert_eq!(securities[1].country_code.as_deref(), Some("US"));
        assert_eq!(securities[2].exchange_operating_mic, None);
        assert_eq!(securities[2].country_code, None);
        assert_eq!(securities[2].logo_url, None);
    }

    #[tokio::test]
    async fn test_search_securities_filters_by_country() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query").query_param("function", "SYMBOL_SEARCH");
                then.status(200).json_body(json!({
                    "bestMatches": [
                        {"1. symbol": "TSCO.LON", "2. name": "Tesco PLC", "4. region": "United Kingdom"},
                        {"1. symbol": "TSCDF", "2. name": "Tesco plc", "4. region": "United States"},
                        {"1. symbol": "TCO2.FRK", "2. name": "TESCO PLC ADR", "4. region": "Frankfurt"}
                    ]
                }));
            })
            .await;

        let harness = TestHarness::new();
        let securities = provider(&harness, &server)
            .search_securities("tesco", Some("gb"), None)
            .await
            .ok()
            .unwrap();

        let symbols: Vec<_> = securities.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TSCO.LON", "TCO2.FRK"]);
    }

    #[tokio::test]
    async fn test_search_securities_no_match_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query").query_param("function", "SYMBOL_SEARCH");
                then.status(200).json_body(json!({"bestMatches": []}));
            })
            .await;

        let harness = TestHarness::new();
        let response = provider(&harness, &server)
            .search_securities("ZZZZZZ", None, None)
            .await;

        assert_eq!(response, ProviderResponse::Success(Vec::new()));
        assert!(harness.reporter.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_security_info() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "OVERVIEW")
                    .query_param("symbol", "IBM");
                then.status(200).json_body(json!({
                    "Symbol": "IBM",
                    "AssetType": "Common Stock",
                    "Name": "International Business Machines",
                    "Description": "International Business Machines Corporation provides integrated solutions.",
                    "Exchange": "NYSE",
                    "OfficialSite": "https://www.ibm.com",
                    "Currency": "USD"
                }));
            })
            .await;

        let harness = TestHarness::new();
        let info = provider(&harness, &server)
            .fetch_security_info("IBM", None)
            .await
            .ok()
            .unwrap();

        assert_eq!(info.symbol, "IBM");
        assert_eq!(info.name, "International Business Machines");
        assert_eq!(info.kind.as_deref(), Some("Common Stock"));
        assert_eq!(info.exchange_operating_mic.as_deref(), Some("XNYS"));
        assert_eq!(info.links.get("website").map(String::as_str), Some("https://www.ibm.com"));
        assert_eq!(info.logo_url, None);
    }

    #[tokio::test]
    async fn test_fetch_security_info_keeps_requested_mic() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query").query_param("function", "OVERVIEW");
                then.status(200).json_body(json!({
                    "Symbol": "IBM",
                    "Name": "International Business Machines",
                    "Exchange": "NYSE",
                    "OfficialSite": "None"
                }));
            })
            .await;

        let harness = TestHarness::new();
        let info = provider(&harness, &server)
            .fetch_security_info("IBM", Some("XNAS"))
            .await
            .ok()
            .unwrap();

        assert_eq!(info.exchange_operating_mic.as_deref(), Some("XNAS"));
        assert!(info.links.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_security_info_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query").query_param("function", "OVERVIEW");
                then.status(200).json_body(json!({}));
            })
            .await;

        let harness = TestHarness::new();
        let response = provider(&harness, &server)
            .fetch_security_info("NOPE", None)
            .await;

        assert_eq!(response.error_kind(), Some(ErrorKind::SecurityNotFound));
        assert!(harness.reporter.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_security_price_today_uses_global_quote() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "GLOBAL_QUOTE")
                    .query_param("symbol", "IBM");
                then.status(200).json_body(json!({
                    "Global Quote": {
                        "01. symbol": "IBM",
                        "05. price": "168.1200",
                        "07. latest trading day": "2024-05-31"
                    }
                }));
            })
            .await;

        let harness = TestHarness::new();
        let price = provider(&harness, &server)
            .fetch_security_price("IBM", Some("XNYS"), harness.today)
            .await
            .ok()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(price.symbol, "IBM");
        assert_eq!(price.date, day(2024, 5, 31));
        assert_eq!(price.price, dec!(168.12));
        assert_eq!(price.currency, "USD");
        assert_eq!(price.exchange_operating_mic.as_deref(), Some("XNYS"));
    }

    #[tokio::test]
    async fn test_fetch_security_price_today_unknown_symbol() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query").query_param("function", "GLOBAL_QUOTE");
                then.status(200).json_body(json!({"Global Quote": {}}));
            })
            .await;

        let harness = TestHarness::new();
        let response = provider(&harness, &server)
            .fetch_security_price("NOPE", None, harness.today)
            .await;

        assert_eq!(response.error_kind(), Some(ErrorKind::SecurityNotFound));
    }

    #[tokio::test]
    async fn test_fetch_security_price_past_date_uses_time_series() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "TIME_SERIES_DAILY")
                    .query_param("symbol", "IBM")
                    .query_param("outputsize", "full");
                then.status(200).json_body(daily_series());
            })
            .await;

        let harness = TestHarness::new();
        let provider = provider(&harness, &server);

        let price = provider
            .fetch_security_price("IBM", None, day(2024, 1, 3))
            .await
            .ok()
            .unwrap();
        assert_eq!(price.date, day(2024, 1, 3));
        assert_eq!(price.price, dec!(160.10));

        let response = provider
            .fetch_security_price("IBM", None, day(2024, 1, 6))
            .await;
        assert_eq!(response.error_kind(), Some(ErrorKind::SecurityNotFound));
    }

    #[tokio::test]
    async fn test_fetch_security_prices_filters_and_sorts() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "TIME_SERIES_DAILY");
                then.status(200).json_body(daily_series());
            })
            .await;

        let harness = TestHarness::new();
        let prices = provider(&harness, &server)
            .fetch_security_prices("IBM", Some("XNYS"), day(2024, 1, 1), day(2024, 1, 4))
            .await
            .ok()
            .unwrap();

        let dates: Vec<_> = prices.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(2024, 1, 2), day(2024, 1, 3), day(2024, 1, 4)]);
        assert_eq!(prices[0].price, dec!(158.60));
        assert!(prices.iter().all(|p| p.exchange_operating_mic.as_deref() == Some("XNYS")));
    }

    #[tokio::test]
    async fn test_fetch_security_prices_skips_bad_bars() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "TIME_SERIES_DAILY");
                then.status(200).json_body(json!({
                    "Time Series (Daily)": {
                        "2024-01-04": {"4. close": 161.10},
                        "2024-01-03": {"1. open": "162.0"},
                        "2024-01-02": {"4. close": "-1.00"}
                    }
                }));
            })
            .await;

        let harness = TestHarness::new();
        let prices = provider(&harness, &server)
            .fetch_security_prices("IBM", None, day(2024, 1, 1), day(2024, 1, 4))
            .await
            .ok()
            .unwrap();

        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].date, day(2024, 1, 4));
        assert_eq!(prices[0].price, dec!(161.10));

        let events = harness.reporter.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == ErrorKind::UpstreamError));
    }

    #[tokio::test]
    async fn test_fetch_security_prices_rate_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query");
                then.status(200).json_body(json!({
                    "Information": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."
                }));
            })
            .await;

        let harness = TestHarness::new();
        let response = provider(&harness, &server)
            .fetch_security_prices("IBM", None, day(2024, 1, 1), day(2024, 1, 4))
            .await;

        let error = response.error().unwrap();
        assert_eq!(error.kind, ErrorKind::RateLimited);
        assert!(error.kind.is_retryable());
        assert_eq!(harness.reporter.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_security_prices_missing_series_is_upstream_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query");
                then.status(200)
                    .json_body(json!({"Information": "This is a premium endpoint."}));
            })
            .await;

        let harness = TestHarness::new();
        let response = provider(&harness, &server)
            .fetch_security_prices("IBM", None, day(2024, 1, 1), day(2024, 1, 4))
            .await;

        let error = response.error().unwrap();
        assert_eq!(error.kind, ErrorKind::UpstreamError);
        assert!(error.message.contains("Failed to fetch prices: This is a premium endpoint."));
    }
}
