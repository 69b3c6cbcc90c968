//! Error types for provider and registry operations.
//!
//! This module provides:
//! - [`ProviderError`]: recognized failures raised inside provider bodies
//! - [`ErrorKind`]: the taxonomy every failure envelope is classified into
//! - [`RegistryError`]: configuration-time failures, returned directly to callers

mod kind;

pub use kind::ErrorKind;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Concept, ProviderKey};

/// Errors raised inside a provider operation.
///
/// These never reach the caller as-is: the capturing boundary converts them into
/// a failure envelope. Each variant maps into an [`ErrorKind`] via
/// [`kind`](Self::kind).
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The upstream answered with something we cannot use.
    #[error("{provider} upstream error: {message}")]
    Upstream {
        provider: ProviderKey,
        message: String,
        /// Raw text the upstream sent back, when there is one.
        upstream_message: Option<String>,
    },

    /// The upstream reported that a quota or frequency limit was hit.
    #[error("{provider} rate limit reached")]
    RateLimited {
        provider: ProviderKey,
        upstream_message: Option<String>,
    },

    /// No rate exists upstream for the requested pair and date.
    #[error("No rate found for {from} to {to} on {date}")]
    RateNotFound {
        from: String,
        to: String,
        date: NaiveDate,
    },

    /// No record exists upstream for the requested symbol.
    #[error("Security not found: {0}")]
    SecurityNotFound(String),

    /// Transport failure after retries were exhausted.
    #[error("Network error: {0}")]
    Network(#[from] reqwest_middleware::Error),

    /// The body was not valid JSON for the expected shape.
    #[error("Malformed upstream payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// A parsed value breaks a model invariant, such as a non-positive rate.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl ProviderError {
    /// Shorthand for an [`Upstream`](Self::Upstream) error without raw upstream text.
    pub fn upstream(provider: ProviderKey, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider,
            message: message.into(),
            upstream_message: None,
        }
    }

    /// Returns the taxonomy kind for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use finfeed_providers::errors::{ErrorKind, ProviderError};
    ///
    /// let error = ProviderError::SecurityNotFound("INVALID".to_string());
    /// assert_eq!(error.kind(), ErrorKind::SecurityNotFound);
    /// assert!(error.kind().is_expected());
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Upstream { .. }
            | Self::Network(_)
            | Self::Payload(_)
            | Self::InvalidValue(_) => ErrorKind::UpstreamError,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::RateNotFound { .. } => ErrorKind::RateNotFound,
            Self::SecurityNotFound(_) => ErrorKind::SecurityNotFound,
        }
    }

    /// Raw message sent by the upstream, if the failure carried one.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Upstream {
                upstream_message, ..
            }
            | Self::RateLimited {
                upstream_message, ..
            } => upstream_message.as_deref(),
            _ => None,
        }
    }
}

/// Errors raised by registry construction and lookups.
///
/// Unlike [`ProviderError`], these are returned to the caller directly: they
/// describe a deployment mistake, not a data-availability condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The key is unknown or the provider is disabled in the current configuration.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// The configuration lists a provider under a concept it does not serve.
    #[error("Provider {provider} does not implement the {concept} concept")]
    ConceptNotImplemented {
        provider: ProviderKey,
        concept: Concept,
    },

    /// `Registry::init_global` was called after the global registry was built.
    #[error("Global provider registry is already initialized")]
    AlreadyInitialized,
}
