//! Provider abstractions and implementations.
//!
//! This module contains:
//! - The concept traits every provider implements ([`Provider`],
//!   [`ExchangeRateProvider`], [`SecurityProvider`])
//! - [`ProviderBase`], the shared composition root (client, reporter, clock)
//! - The retrying [`UpstreamClient`]
//! - Concrete provider implementations (Frankfurter, Alpha Vantage, etc.)
//!
//! # Architecture
//!
//! Providers never return raw errors. Each operation body produces a
//! `Result<T, ProviderError>` and [`ProviderBase::capture`] turns it into a
//! [`ProviderResponse`](crate::response::ProviderResponse), logging and
//! reporting failures on the way.

mod base;
mod client;
pub(crate) mod parsing;
pub mod range;
mod traits;

pub mod alpha_vantage;
pub mod exchangerate_api;
pub mod fawaz_currency_api;
pub mod frankfurter;

// Re-exports
pub use alpha_vantage::AlphaVantageProvider;
pub use base::{EventContext, ProviderBase, ProviderServices};
pub use client::{ClientConfig, UpstreamClient, DEFAULT_USER_AGENT};
pub use exchangerate_api::ExchangerateApiProvider;
pub use fawaz_currency_api::FawazCurrencyApiProvider;
pub use frankfurter::FrankfurterProvider;
pub use traits::{ExchangeRateProvider, Provider, SecurityProvider};
