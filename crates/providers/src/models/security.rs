use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A tradable instrument candidate returned by a search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub symbol: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_operating_mic: Option<String>,
    /// ISO 3166-1 alpha-2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl Security {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            logo_url: None,
            exchange_operating_mic: None,
            country_code: None,
        }
    }

    pub fn with_exchange_operating_mic(mut self, mic: Option<String>) -> Self {
        self.exchange_operating_mic = mic;
        self
    }

    pub fn with_country_code(mut self, country_code: Option<String>) -> Self {
        self.country_code = country_code;
        self
    }
}

/// Extended metadata for one resolved security.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityInfo {
    pub symbol: String,
    pub name: String,

    /// Named links (website, filings, ...). Empty when the upstream has none.
    #[serde(default)]
    pub links: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Instrument kind as reported upstream (e.g. "Common Stock", "ETF").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_operating_mic: Option<String>,
}
