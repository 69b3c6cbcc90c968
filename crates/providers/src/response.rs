//! The success/failure envelope returned by every provider operation.
//!
//! Envelopes are only built by the capturing boundary
//! ([`ProviderBase::capture`](crate::provider::ProviderBase::capture)); provider
//! bodies return plain `Result`s.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::{ErrorKind, ProviderError};

/// Description of a failed provider operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_message: Option<String>,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            upstream_message: None,
        }
    }
}

impl From<&ProviderError> for ErrorInfo {
    fn from(error: &ProviderError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            upstream_message: error.upstream_message().map(str::to_string),
        }
    }
}

impl From<ProviderError> for ErrorInfo {
    fn from(error: ProviderError) -> Self {
        Self::from(&error)
    }
}

/// Outcome of a provider operation: either the data or the reason it is missing.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderResponse<T> {
    Success(T),
    Failure(ErrorInfo),
}

impl<T> ProviderResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Kind of the failure, `None` on success.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(|e| e.kind)
    }

    pub fn into_result(self) -> Result<T, ErrorInfo> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(error) => Err(error),
        }
    }

    pub fn ok(self) -> Option<T> {
        self.into_result().ok()
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ProviderResponse<U> {
        match self {
            Self::Success(data) => ProviderResponse::Success(f(data)),
            Self::Failure(error) => ProviderResponse::Failure(error),
        }
    }
}

impl<T: Serialize> Serialize for ProviderResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProviderResponse", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}
