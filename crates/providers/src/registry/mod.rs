//! Provider registry module.
//!
//! This module resolves providers by key or by concept:
//! - [`RegistryConfig`]: concept lists, per-provider settings, HTTP client settings
//! - [`Registry`]: builds every enabled provider once and keeps them read-only
//! - [`ProviderGroup`]: the ordered providers serving one concept
//!
//! Concept membership is checked through the type system: a provider lands in
//! `for_concept::<ExchangeRatesConcept>()` only if it implements
//! [`ExchangeRateProvider`](crate::provider::ExchangeRateProvider).

mod config;
mod group;
mod registry;

pub use config::{ProviderSettings, RegistryConfig};
pub use group::ProviderGroup;
pub use registry::{ConceptKind, ExchangeRatesConcept, Registry, SecuritiesConcept};
