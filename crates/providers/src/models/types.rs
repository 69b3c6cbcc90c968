use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a provider implementation known to this crate.
///
/// Keys are the stable names used in configuration (`"frankfurter"`,
/// `"alpha_vantage"`, ...). Names that do not parse into a key are treated by
/// the registry as "not configured".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKey {
    Frankfurter,
    FawazCurrencyApi,
    ExchangerateApi,
    AlphaVantage,
}

impl ProviderKey {
    pub const ALL: [ProviderKey; 4] = [
        ProviderKey::Frankfurter,
        ProviderKey::FawazCurrencyApi,
        ProviderKey::ExchangerateApi,
        ProviderKey::AlphaVantage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frankfurter => "frankfurter",
            Self::FawazCurrencyApi => "fawaz_currency_api",
            Self::ExchangerateApi => "exchangerate_api",
            Self::AlphaVantage => "alpha_vantage",
        }
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| s.trim().to_string())
    }
}

/// A named capability contract that several providers can serve interchangeably.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    ExchangeRates,
    Securities,
}

impl Concept {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExchangeRates => "exchange_rates",
            Self::Securities => "securities",
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Concept {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exchange_rates" => Ok(Self::ExchangeRates),
            "securities" => Ok(Self::Securities),
            other => Err(other.to_string()),
        }
    }
}
