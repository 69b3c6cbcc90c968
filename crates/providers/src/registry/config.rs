//! Registry configuration: which providers serve which concept, and how each
//! provider is set up.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::models::{Concept, ProviderKey};
use crate::provider::ClientConfig;

const ENV_EXCHANGE_RATE_PROVIDERS: &str = "FINFEED_EXCHANGE_RATE_PROVIDERS";
const ENV_SECURITIES_PROVIDERS: &str = "FINFEED_SECURITIES_PROVIDERS";
const ENV_DISABLED_PROVIDERS: &str = "FINFEED_DISABLED_PROVIDERS";
const ENV_USER_AGENT: &str = "FINFEED_USER_AGENT";
const ENV_HTTP_TIMEOUT_MS: &str = "FINFEED_HTTP_TIMEOUT_MS";
const ENV_ALPHA_VANTAGE_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
const ENV_EXCHANGERATE_API_KEY: &str = "EXCHANGERATE_API_KEY";

/// Per-provider settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    /// Replaces the provider's upstream host (proxies, tests).
    pub base_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryConfig {
    /// Exchange-rate providers, in preference order.
    pub exchange_rates: Vec<ProviderKey>,
    /// Securities providers, in preference order.
    pub securities: Vec<ProviderKey>,
    /// Settings by provider. Providers without an entry use the defaults.
    pub providers: BTreeMap<ProviderKey, ProviderSettings>,
    pub client: ClientConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            exchange_rates: vec![
                ProviderKey::Frankfurter,
                ProviderKey::FawazCurrencyApi,
                ProviderKey::ExchangerateApi,
            ],
            securities: vec![ProviderKey::AlphaVantage],
            providers: BTreeMap::new(),
            client: ClientConfig::default(),
        }
    }
}

impl RegistryConfig {
    /// Load from the process environment, reading a `.env` file first if one exists.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Unset variables keep their defaults;
    /// unknown provider names are logged and skipped.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(list) = lookup(ENV_EXCHANGE_RATE_PROVIDERS) {
            config.exchange_rates = parse_key_list(ENV_EXCHANGE_RATE_PROVIDERS, &list);
        }
        if let Some(list) = lookup(ENV_SECURITIES_PROVIDERS) {
            config.securities = parse_key_list(ENV_SECURITIES_PROVIDERS, &list);
        }
        if let Some(list) = lookup(ENV_DISABLED_PROVIDERS) {
            for key in parse_key_list(ENV_DISABLED_PROVIDERS, &list) {
                config.settings_mut(key).enabled = false;
            }
        }

        for (key, var) in [
            (ProviderKey::AlphaVantage, ENV_ALPHA_VANTAGE_API_KEY),
            (ProviderKey::ExchangerateApi, ENV_EXCHANGERATE_API_KEY),
        ] {
            if let Some(api_key) = lookup(var).filter(|v| !v.trim().is_empty()) {
                config.settings_mut(key).api_key = Some(api_key.trim().to_string());
            }
        }

        for key in ProviderKey::ALL {
            let var = base_url_var(key);
            if let Some(url) = lookup(&var).filter(|v| !v.trim().is_empty()) {
                config.settings_mut(key).base_url = Some(url.trim().to_string());
            }
        }

        if let Some(user_agent) = lookup(ENV_USER_AGENT).filter(|v| !v.trim().is_empty()) {
            config.client.user_agent = user_agent.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.client.timeout_ms = ms,
                _ => warn!(
                    "Invalid {}={:?}, keeping {}ms",
                    ENV_HTTP_TIMEOUT_MS, raw, config.client.timeout_ms
                ),
            }
        }

        config
    }

    /// Settings for `key`, or the defaults if none were configured.
    pub fn settings(&self, key: ProviderKey) -> ProviderSettings {
        self.providers.get(&key).cloned().unwrap_or_default()
    }

    pub fn settings_mut(&mut self, key: ProviderKey) -> &mut ProviderSettings {
        self.providers.entry(key).or_default()
    }

    pub fn is_enabled(&self, key: ProviderKey) -> bool {
        self.providers.get(&key).map_or(true, |s| s.enabled)
    }

    /// Configured preference order for `concept`.
    pub fn concept_order(&self, concept: Concept) -> &[ProviderKey] {
        match concept {
            Concept::ExchangeRates => &self.exchange_rates,
            Concept::Securities => &self.securities,
        }
    }
}

/// `FINFEED_<KEY>_BASE_URL`, e.g. `FINFEED_FRANKFURTER_BASE_URL`.
fn base_url_var(key: ProviderKey) -> String {
    format!("FINFEED_{}_BASE_URL", key.as_str().to_uppercase())
}

fn parse_key_list(var: &str, list: &str) -> Vec<ProviderKey> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|name| match name.parse::<ProviderKey>() {
            Ok(key) => Some(key),
            Err(unknown) => {
                warn!("Unknown provider '{}' in {}. Skipping.", unknown, var);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::from_lookup(|_| None);
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(
            config.concept_order(Concept::ExchangeRates),
            &[
                ProviderKey::Frankfurter,
                ProviderKey::FawazCurrencyApi,
                ProviderKey::ExchangerateApi
            ]
        );
        assert_eq!(
            config.concept_order(Concept::Securities),
            &[ProviderKey::AlphaVantage]
        );
        assert!(config.is_enabled(ProviderKey::Frankfurter));
        assert_eq!(config.settings(ProviderKey::AlphaVantage).api_key, None);
    }

    #[test]
    fn test_from_lookup() {
        let config = RegistryConfig::from_lookup(lookup_from(&[
            ("FINFEED_EXCHANGE_RATE_PROVIDERS", " fawaz_currency_api, synth ,Frankfurter"),
            ("FINFEED_DISABLED_PROVIDERS", "exchangerate_api"),
            ("ALPHA_VANTAGE_API_KEY", " av-key "),
            ("EXCHANGERATE_API_KEY", ""),
            ("FINFEED_FRANKFURTER_BASE_URL", "http://localhost:9000"),
            ("FINFEED_USER_AGENT", "acme-sync/2.1"),
            ("FINFEED_HTTP_TIMEOUT_MS", "5000"),
        ]));

        assert_eq!(
            config.exchange_rates,
            vec![ProviderKey::FawazCurrencyApi, ProviderKey::Frankfurter]
        );
        assert!(!config.is_enabled(ProviderKey::ExchangerateApi));
        assert_eq!(
            config.settings(ProviderKey::AlphaVantage).api_key.as_deref(),
            Some("av-key")
        );
        assert_eq!(config.settings(ProviderKey::ExchangerateApi).api_key, None);
        assert_eq!(
            config.settings(ProviderKey::Frankfurter).base_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(config.client.user_agent, "acme-sync/2.1");
        assert_eq!(config.client.timeout_ms, 5000);
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        let config = RegistryConfig::from_lookup(lookup_from(&[("FINFEED_HTTP_TIMEOUT_MS", "soon")]));
        assert_eq!(config.client.timeout_ms, 30_000);
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "exchangeRates": ["frankfurter"],
            "providers": {
                "alpha_vantage": {"apiKey": "k"},
                "fawaz_currency_api": {"enabled": false}
            },
            "client": {"userAgent": "svc"}
        }"#;

        let config: RegistryConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.exchange_rates, vec![ProviderKey::Frankfurter]);
        assert_eq!(config.securities, vec![ProviderKey::AlphaVantage]);
        assert_eq!(
            config.settings(ProviderKey::AlphaVantage).api_key.as_deref(),
            Some("k")
        );
        assert!(config.settings(ProviderKey::AlphaVantage).enabled);
        assert!(!config.is_enabled(ProviderKey::FawazCurrencyApi));
        assert_eq!(config.client.user_agent, "svc");
        assert_eq!(config.client.max_retries, 2);
    }
}
