//! Finfeed Data Providers Crate
//!
//! This crate provides a pluggable layer over third-party financial data APIs:
//! foreign-exchange rates and security search, metadata and prices.
//!
//! # Overview
//!
//! The providers crate supports:
//! - Multiple concepts: exchange rates, securities
//! - Multiple providers: Frankfurter, Fawaz currency API, ExchangeRate-API, Alpha Vantage
//! - A uniform response envelope with a small error taxonomy
//! - A configuration-driven registry resolving providers by key or concept
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |     Caller       | --> |    Registry      |  (config-driven, built once)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  ProviderGroup   |  (ordered, typed per concept)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Provider      |  (Frankfurter, Alpha Vantage, etc.)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | ProviderResponse |  (Success(data) | Failure(error))
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Rate`] - Exchange rate for one currency pair on one day
//! - [`Price`] - Closing or latest price of a security on one day
//! - [`Security`] / [`SecurityInfo`] - Search candidates and extended metadata
//! - [`UsageData`] - Quota snapshot of a provider
//! - [`ProviderResponse`] - Envelope returned by every provider operation
//! - [`ErrorKind`] - Classification of failures carried by the envelope
//!
//! # Example
//!
//! ```no_run
//! use finfeed_providers::{Registry, RegistryConfig, ProviderServices, ExchangeRatesConcept};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::from_config(&RegistryConfig::from_env(), ProviderServices::default())?;
//! let providers = registry.for_concept::<ExchangeRatesConcept>();
//! if let Some(provider) = providers.first() {
//!     let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!     let end = chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
//!     let rates = provider.fetch_exchange_rates("USD", "EUR", start, end).await;
//!     println!("{}", serde_json::to_string(&rates)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod reporting;
pub mod response;

// Re-export all public types from models
pub use models::{Concept, Price, ProviderKey, Rate, Security, SecurityInfo, UsageData, UsageLimit};

// Re-export error and envelope types
pub use errors::{ErrorKind, ProviderError, RegistryError};
pub use response::{ErrorInfo, ProviderResponse};

// Re-export provider types
pub use provider::{
    AlphaVantageProvider, ClientConfig, ExchangeRateProvider, ExchangerateApiProvider,
    FawazCurrencyApiProvider, FrankfurterProvider, Provider, ProviderServices, SecurityProvider,
};

// Re-export registry types
pub use registry::{
    ConceptKind, ExchangeRatesConcept, ProviderGroup, ProviderSettings, Registry, RegistryConfig,
    SecuritiesConcept,
};

// Re-export collaborators
pub use clock::{Clock, FixedClock, SystemClock};
pub use reporting::{
    ErrorEvent, ErrorReporter, NoopErrorReporter, RecordingErrorReporter, TracingErrorReporter,
};
