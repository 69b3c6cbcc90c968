//! Error reporting sink for unexpected provider failures.

use std::sync::{Arc, Mutex};

use crate::errors::ErrorKind;
use crate::models::ProviderKey;

/// A failure worth surfacing to an observability backend.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorEvent {
    pub provider: ProviderKey,
    /// Operation name, e.g. `"fetch_exchange_rate"`.
    pub operation: &'static str,
    pub kind: ErrorKind,
    pub message: String,
    /// Request context such as `from`/`to`/`date` or `symbol`.
    pub context: Vec<(&'static str, String)>,
}

impl ErrorEvent {
    pub fn context_value(&self, name: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Receiver for provider error events.
///
/// # Design Rules
///
/// - `report()` must be fast and non-blocking (no network calls inline)
/// - Implementations that ship events elsewhere should queue them
/// - Reporting never changes the envelope returned to the caller
pub trait ErrorReporter: Send + Sync {
    fn report(&self, event: ErrorEvent);
}

/// Default reporter: emits one structured `tracing` event per failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, event: ErrorEvent) {
        let context = event
            .context
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ");

        tracing::warn!(
            target: "finfeed::report",
            provider = %event.provider,
            operation = event.operation,
            kind = %event.kind,
            context = %context,
            "{}",
            event.message
        );
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopErrorReporter;

impl ErrorReporter for NoopErrorReporter {
    fn report(&self, _event: ErrorEvent) {}
}

/// Collects events in memory. Useful in tests.
#[derive(Clone, Default)]
pub struct RecordingErrorReporter {
    events: Arc<Mutex<Vec<ErrorEvent>>>,
}

impl RecordingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<ErrorEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ErrorEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ErrorReporter for RecordingErrorReporter {
    fn report(&self, event: ErrorEvent) {
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> ErrorEvent {
        ErrorEvent {
            provider: ProviderKey::Frankfurter,
            operation: "fetch_exchange_rates",
            kind: ErrorKind::UpstreamError,
            message: "invalid rate data".to_string(),
            context: vec![("from", "USD".to_string()), ("to", "EUR".to_string())],
        }
    }

    #[test]
    fn test_recording_reporter_collects_events() {
        let reporter = RecordingErrorReporter::new();
        assert!(reporter.is_empty());

        reporter.report(event());
        reporter.report(event());

        assert_eq!(reporter.len(), 2);
        assert_eq!(reporter.events()[0].context_value("from"), Some("USD"));
        assert_eq!(reporter.events()[0].context_value("date"), None);
    }

    #[test]
    fn test_clones_share_storage() {
        let reporter = RecordingErrorReporter::new();
        let handle: Arc<dyn ErrorReporter> = Arc::new(reporter.clone());
        handle.report(event());
        assert_eq!(reporter.len(), 1);
    }
}
