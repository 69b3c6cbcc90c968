//! Provider registry: builds the configured providers once and resolves them
//! by key or by concept.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use once_cell::sync::OnceCell;

use super::{ProviderGroup, ProviderSettings, RegistryConfig};
use crate::errors::RegistryError;
use crate::models::{Concept, ProviderKey};
use crate::provider::{
    AlphaVantageProvider, ExchangeRateProvider, ExchangerateApiProvider, FawazCurrencyApiProvider,
    FrankfurterProvider, Provider, ProviderServices, SecurityProvider,
};

static GLOBAL_REGISTRY: OnceCell<Registry> = OnceCell::new();

/// Type-level handle for a concept, used with [`Registry::for_concept`].
pub trait ConceptKind {
    /// Trait object every provider in this concept's group implements.
    type Provider: ?Sized + Provider;

    const CONCEPT: Concept;

    fn group(registry: &Registry) -> &ProviderGroup<Self::Provider>;
}

pub struct ExchangeRatesConcept;

pub struct SecuritiesConcept;

impl ConceptKind for ExchangeRatesConcept {
    type Provider = dyn ExchangeRateProvider;
    const CONCEPT: Concept = Concept::ExchangeRates;

    fn group(registry: &Registry) -> &ProviderGroup<Self::Provider> {
        &registry.exchange_rates
    }
}

impl ConceptKind for SecuritiesConcept {
    type Provider = dyn SecurityProvider;
    const CONCEPT: Concept = Concept::Securities;

    fn group(registry: &Registry) -> &ProviderGroup<Self::Provider> {
        &registry.securities
    }
}

/// One built provider, kept with its concrete type so each concept view is a
/// checked coercion rather than a downcast.
enum ProviderInstance {
    Frankfurter(Arc<FrankfurterProvider>),
    FawazCurrencyApi(Arc<FawazCurrencyApiProvider>),
    ExchangerateApi(Arc<ExchangerateApiProvider>),
    AlphaVantage(Arc<AlphaVantageProvider>),
}

impl ProviderInstance {
    /// Construct the provider for `key`. No I/O happens here.
    fn build(key: ProviderKey, settings: &ProviderSettings, services: &ProviderServices) -> Self {
        let base_url = settings.base_url.clone();
        match key {
            ProviderKey::Frankfurter => {
                let mut provider = FrankfurterProvider::new(services);
                if let Some(url) = base_url {
                    provider = provider.with_base_url(url);
                }
                Self::Frankfurter(Arc::new(provider))
            }
            ProviderKey::FawazCurrencyApi => {
                let mut provider = FawazCurrencyApiProvider::new(services);
                if let Some(url) = base_url {
                    provider = provider.with_base_url(url);
                }
                Self::FawazCurrencyApi(Arc::new(provider))
            }
            ProviderKey::ExchangerateApi => {
                let mut provider = ExchangerateApiProvider::new(services, settings.api_key.clone());
                if let Some(url) = base_url {
                    provider = provider.with_base_url(url);
                }
                Self::ExchangerateApi(Arc::new(provider))
            }
            ProviderKey::AlphaVantage => {
                let mut provider = AlphaVantageProvider::new(services, settings.api_key.clone());
                if let Some(url) = base_url {
                    provider = provider.with_base_url(url);
                }
                Self::AlphaVantage(Arc::new(provider))
            }
        }
    }

    fn provider(&self) -> Arc<dyn Provider> {
        match self {
            Self::Frankfurter(p) => p.clone() as Arc<dyn Provider>,
            Self::FawazCurrencyApi(p) => p.clone() as Arc<dyn Provider>,
            Self::ExchangerateApi(p) => p.clone() as Arc<dyn Provider>,
            Self::AlphaVantage(p) => p.clone() as Arc<dyn Provider>,
        }
    }

    fn exchange_rate_provider(&self) -> Option<Arc<dyn ExchangeRateProvider>> {
        match self {
            Self::Frankfurter(p) => Some(p.clone() as Arc<dyn ExchangeRateProvider>),
            Self::FawazCurrencyApi(p) => Some(p.clone() as Arc<dyn ExchangeRateProvider>),
            Self::ExchangerateApi(p) => Some(p.clone() as Arc<dyn ExchangeRateProvider>),
            Self::AlphaVantage(_) => None,
        }
    }

    fn security_provider(&self) -> Option<Arc<dyn SecurityProvider>> {
        match self {
            Self::AlphaVantage(p) => Some(p.clone() as Arc<dyn SecurityProvider>),
            Self::Frankfurter(_) | Self::FawazCurrencyApi(_) | Self::ExchangerateApi(_) => None,
        }
    }
}

/// Directory of configured providers.
///
/// Built once from a [`RegistryConfig`]; read-only afterwards.
pub struct Registry {
    instances: BTreeMap<ProviderKey, ProviderInstance>,
    exchange_rates: ProviderGroup<dyn ExchangeRateProvider>,
    securities: ProviderGroup<dyn SecurityProvider>,
}

impl Registry {
    /// Build every enabled provider and the per-concept groups.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ConceptNotImplemented`] if a concept list names
    /// an enabled provider that does not serve that concept.
    pub fn from_config(config: &RegistryConfig, services: ProviderServices) -> Result<Self, RegistryError> {
        let services = services.with_client_config(config.client.clone());

        let mut instances = BTreeMap::new();
        for key in ProviderKey::ALL {
            if !config.is_enabled(key) {
                info!("Provider '{}' is disabled, skipping.", key);
                continue;
            }
            instances.insert(key, ProviderInstance::build(key, &config.settings(key), &services));
        }

        let exchange_rates = build_group(
            Concept::ExchangeRates,
            config.concept_order(Concept::ExchangeRates),
            &instances,
            ProviderInstance::exchange_rate_provider,
        )?;
        let securities = build_group(
            Concept::Securities,
            config.concept_order(Concept::Securities),
            &instances,
            ProviderInstance::security_provider,
        )?;

        if exchange_rates.is_empty() && securities.is_empty() {
            warn!("No providers were configured for any concept. Data lookups will be unavailable.");
        }
        info!(
            "Provider registry ready: exchange_rates={:?}, securities={:?}",
            exchange_rates.keys(),
            securities.keys()
        );

        Ok(Self {
            instances,
            exchange_rates,
            securities,
        })
    }

    /// Process-wide registry, built from [`RegistryConfig::from_env`] on first
    /// use unless [`init_global`](Self::init_global) ran before.
    pub fn global() -> Result<&'static Registry, RegistryError> {
        GLOBAL_REGISTRY.get_or_try_init(|| {
            Registry::from_config(&RegistryConfig::from_env(), ProviderServices::default())
        })
    }

    /// Install the process-wide registry from `config`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyInitialized`] if the global registry exists already.
    pub fn init_global(config: RegistryConfig) -> Result<&'static Registry, RegistryError> {
        if GLOBAL_REGISTRY.get().is_some() {
            return Err(RegistryError::AlreadyInitialized);
        }
        let registry = Registry::from_config(&config, ProviderServices::default())?;
        GLOBAL_REGISTRY
            .try_insert(registry)
            .map_err(|_| RegistryError::AlreadyInitialized)
    }

    /// Look up an enabled provider by its configuration key.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ProviderNotConfigured`] for unknown or disabled keys.
    pub fn get_provider(&self, key: &str) -> Result<Arc<dyn Provider>, RegistryError> {
        key.parse::<ProviderKey>()
            .ok()
            .and_then(|k| self.instances.get(&k))
            .map(ProviderInstance::provider)
            .ok_or_else(|| RegistryError::ProviderNotConfigured(key.trim().to_string()))
    }

    /// Ordered, typed providers for concept `C`. May be empty.
    ///
    /// ```no_run
    /// use finfeed_providers::provider::Provider;
    /// use finfeed_providers::registry::{ExchangeRatesConcept, Registry};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let registry = Registry::global()?;
    /// for provider in registry.for_concept::<ExchangeRatesConcept>().iter() {
    ///     let today = chrono::Utc::now().date_naive();
    ///     if let Some(rate) = provider.fetch_exchange_rate("USD", "EUR", today).await.ok() {
    ///         println!("{} {}", provider.key(), rate.rate);
    ///         break;
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn for_concept<C: ConceptKind>(&self) -> ProviderGroup<C::Provider> {
        C::group(self).clone()
    }

    /// Provider keys serving `concept`, in preference order.
    pub fn concept_keys(&self, concept: Concept) -> Vec<ProviderKey> {
        match concept {
            Concept::ExchangeRates => self.exchange_rates.keys(),
            Concept::Securities => self.securities.keys(),
        }
    }

    /// Keys of every enabled provider.
    pub fn provider_keys(&self) -> Vec<ProviderKey> {
        self.instances.keys().copied().collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.provider_keys())
            .field("exchange_rates", &self.exchange_rates)
            .field("securities", &self.securities)
            .finish()
    }
}

fn build_group<P: ?Sized>(
    concept: Concept,
    order: &[ProviderKey],
    instances: &BTreeMap<ProviderKey, ProviderInstance>,
    project: fn(&ProviderInstance) -> Option<Arc<P>>,
) -> Result<ProviderGroup<P>, RegistryError> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(order.len());

    for &key in order {
        if !seen.insert(key) {
            warn!("Provider '{}' listed twice under {}. Keeping the first.", key, concept);
            continue;
        }

        let Some(instance) = instances.get(&key) else {
            warn!("Provider '{}' is listed under {} but disabled. Skipping.", key, concept);
            continue;
        };

        let provider = project(instance).ok_or(RegistryError::ConceptNotImplemented {
            provider: key,
            concept,
        })?;
        entries.push((key, provider));
    }

    Ok(ProviderGroup::new(entries))
}
