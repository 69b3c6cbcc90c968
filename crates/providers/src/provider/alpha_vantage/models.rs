//! Alpha Vantage response payloads.
//!
//! Alpha Vantage answers 200 for almost everything and signals problems with
//! top-level `Error Message`, `Note` or `Information` fields, so every payload
//! flattens in an [`ApiNotice`].

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiNotice {
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

impl ApiNotice {
    /// Best available description of why a payload carried no data.
    pub fn describe(&self) -> &str {
        self.error_message
            .as_deref()
            .or(self.information.as_deref())
            .or(self.note.as_deref())
            .unwrap_or("Unknown error")
    }
}

/// `SYMBOL_SEARCH`
#[derive(Debug, Deserialize)]
pub(super) struct SymbolSearchResponse {
    #[serde(rename = "bestMatches")]
    pub best_matches: Option<Vec<SymbolMatch>>,
    #[serde(flatten)]
    pub notice: ApiNotice,
}

#[derive(Debug, Deserialize)]
pub(super) struct SymbolMatch {
    #[serde(rename = "1. symbol")]
    pub symbol: String,
    #[serde(rename = "2. name")]
    pub name: String,
    #[serde(rename = "4. region")]
    pub region: Option<String>,
}

/// `OVERVIEW`. Only the fields that land in `SecurityInfo`; the API returns
/// dozens more.
#[derive(Debug, Deserialize)]
pub(super) struct OverviewResponse {
    #[serde(rename = "Symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "AssetType")]
    pub asset_type: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Exchange")]
    pub exchange: Option<String>,
    #[serde(rename = "OfficialSite")]
    pub official_site: Option<String>,
    #[serde(flatten)]
    pub notice: ApiNotice,
}

/// `GLOBAL_QUOTE`. An unknown symbol yields an empty `Global Quote` object.
#[derive(Debug, Deserialize)]
pub(super) struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    pub global_quote: Option<GlobalQuote>,
    #[serde(flatten)]
    pub notice: ApiNotice,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct GlobalQuote {
    #[serde(rename = "05. price")]
    pub price: Option<String>,
    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: Option<String>,
}

/// `TIME_SERIES_DAILY`
#[derive(Debug, Deserialize)]
pub(super) struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    pub time_series: Option<BTreeMap<String, DailyBar>>,
    #[serde(flatten)]
    pub notice: ApiNotice,
}

#[derive(Debug, Deserialize)]
pub(super) struct DailyBar {
    /// Usually a numeric string; left loose so one bad bar cannot sink the series.
    #[serde(rename = "4. close")]
    pub close: Option<Value>,
}

/// Alpha Vantage writes `"None"` or `"-"` for fields it has no value for.
pub(super) fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "None" && v != "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_parsing() {
        let json = r#"{
            "Symbol": "IBM",
            "AssetType": "Common Stock",
            "Name": "International Business Machines",
            "Description": "IBM is an American multinational technology company.",
            "Exchange": "NYSE",
            "OfficialSite": "https://www.ibm.com",
            "Sector": "TECHNOLOGY",
            "PERatio": "22.5"
        }"#;

        let response: OverviewResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.symbol.as_deref(), Some("IBM"));
        assert_eq!(response.asset_type.as_deref(), Some("Common Stock"));
        assert_eq!(response.exchange.as_deref(), Some("NYSE"));
        assert!(response.notice.error_message.is_none());
    }

    #[test]
    fn test_empty_overview() {
        let response: OverviewResponse = serde_json::from_str("{}").unwrap();
        assert!(response.symbol.is_none());
        assert_eq!(response.notice.describe(), "Unknown error");
    }

    #[test]
    fn test_notice_parsing() {
        let json = r#"{"Information": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}"#;
        let response: TimeSeriesResponse = serde_json::from_str(json).unwrap();
        assert!(response.time_series.is_none());
        assert!(response.notice.describe().contains("rate limit"));
    }

    #[test]
    fn test_daily_bar_close_is_loose() {
        let json = r#"{"Time Series (Daily)": {
            "2024-01-03": {"4. close": 160.1},
            "2024-01-02": {"1. open": "161.5"}
        }}"#;
        let response: TimeSeriesResponse = serde_json::from_str(json).unwrap();
        let series = response.time_series.unwrap();
        assert!(series["2024-01-03"].close.is_some());
        assert!(series["2024-01-02"].close.is_none());
    }

    #[test]
    fn test_empty_global_quote() {
        let response: GlobalQuoteResponse =
            serde_json::from_str(r#"{"Global Quote": {}}"#).unwrap();
        let quote = response.global_quote.unwrap();
        assert!(quote.price.is_none());
        assert!(quote.latest_trading_day.is_none());
    }

    #[test]
    fn test_present() {
        assert_eq!(present(Some("None".to_string())), None);
        assert_eq!(present(Some(" - ".to_string())), None);
        assert_eq!(present(Some(String::new())), None);
        assert_eq!(
            present(Some("https://www.ibm.com".to_string())),
            Some("https://www.ibm.com".to_string())
        );
    }
}
