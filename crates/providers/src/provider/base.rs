//! State and helpers shared by every provider implementation.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::FutureExt;
use log::{debug, error, warn};
use once_cell::sync::OnceCell;

use crate::clock::{Clock, SystemClock};
use crate::errors::{ErrorKind, ProviderError};
use crate::models::ProviderKey;
use crate::reporting::{ErrorEvent, ErrorReporter, TracingErrorReporter};
use crate::response::{ErrorInfo, ProviderResponse};

use super::client::{ClientConfig, UpstreamClient};

/// Request context attached to reported errors, e.g. `[("symbol", "AAPL")]`.
pub type EventContext = Vec<(&'static str, String)>;

/// Collaborators handed to every provider at construction time.
#[derive(Clone)]
pub struct ProviderServices {
    pub client: ClientConfig,
    pub reporter: Arc<dyn ErrorReporter>,
    pub clock: Arc<dyn Clock>,
}

impl Default for ProviderServices {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            reporter: Arc::new(TracingErrorReporter),
            clock: Arc::new(SystemClock),
        }
    }
}

impl ProviderServices {
    pub fn with_client_config(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Composition root of a provider: identity, lazily built client, reporter, clock.
pub struct ProviderBase {
    key: ProviderKey,
    client_config: ClientConfig,
    secret: Option<String>,
    client: OnceCell<UpstreamClient>,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
}

impl ProviderBase {
    pub fn new(key: ProviderKey, services: &ProviderServices) -> Self {
        Self {
            key,
            client_config: services.client.clone(),
            secret: None,
            client: OnceCell::new(),
            reporter: services.reporter.clone(),
            clock: services.clock.clone(),
        }
    }

    /// Credential that must never appear in logs.
    pub fn with_secret(mut self, secret: Option<String>) -> Self {
        self.secret = secret;
        self
    }

    pub fn key(&self) -> ProviderKey {
        self.key
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// The provider's HTTP client, built on first use.
    ///
    /// Concurrent first calls race safely: one build wins and every caller
    /// observes that same client afterwards.
    pub fn client(&self) -> Result<&UpstreamClient, ProviderError> {
        self.client.get_or_try_init(|| {
            UpstreamClient::build(self.key, &self.client_config, self.secret.as_deref())
        })
    }

    /// Forward a failure to the error reporter.
    pub fn report(
        &self,
        operation: &'static str,
        kind: ErrorKind,
        message: impl Into<String>,
        context: EventContext,
    ) {
        self.reporter.report(ErrorEvent {
            provider: self.key,
            operation,
            kind,
            message: message.into(),
            context,
        });
    }

    /// Run a provider operation body and wrap its outcome in an envelope.
    ///
    /// - `Ok(v)` becomes `Success(v)`.
    /// - Not-found errors become `Failure` and are only logged at debug level.
    /// - Any other error becomes `Failure`, is logged and reported.
    /// - A panic inside `body` is caught and returned as an `Internal` failure.
    pub async fn capture<T, F>(
        &self,
        operation: &'static str,
        context: EventContext,
        body: F,
    ) -> ProviderResponse<T>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        match AssertUnwindSafe(body).catch_unwind().await {
            Ok(Ok(data)) => ProviderResponse::Success(data),
            Ok(Err(e)) => {
                let info = ErrorInfo::from(&e);
                if info.kind.is_expected() {
                    debug!("{} {}: {}", self.key, operation, e);
                } else {
                    warn!("{} {} failed: {}", self.key, operation, e);
                    self.report(operation, info.kind, info.message.clone(), context);
                }
                ProviderResponse::Failure(info)
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                let message = format!("{} {} panicked: {}", self.key, operation, detail);
                error!("{}", message);
                self.report(operation, ErrorKind::Internal, message.clone(), context);
                ProviderResponse::Failure(ErrorInfo::new(ErrorKind::Internal, message))
            }
        }
    }
}
