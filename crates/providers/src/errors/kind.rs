use serde::{Deserialize, Serialize};

/// Classification of a provider failure.
///
/// Every failure envelope carries exactly one kind. The kind decides how the
/// capturing boundary treats the failure:
///
/// | Kind | Expected outcome? | Reported? | Worth retrying later? |
/// |------|-------------------|-----------|-----------------------|
/// | `UpstreamError` | No | Yes | No |
/// | `RateLimited` | No | Yes | Yes |
/// | `RateNotFound` | Yes | No | No |
/// | `SecurityNotFound` | Yes | No | No |
/// | `Internal` | No | Yes | No |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Transport failure, non-2xx status, or a payload we could not make sense of.
    UpstreamError,

    /// The upstream refused the request because a quota or frequency limit was hit.
    RateLimited,

    /// Well-formed upstream answer with no rate for the requested pair and date.
    RateNotFound,

    /// Well-formed upstream answer with no record for the requested symbol.
    SecurityNotFound,

    /// The provider body panicked. Never produced by a provider on purpose.
    Internal,
}

impl ErrorKind {
    /// Not-found outcomes are part of normal operation and are not logged as errors.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::RateNotFound | Self::SecurityNotFound)
    }

    /// Whether the same request may succeed if issued again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::RateNotFound => "RATE_NOT_FOUND",
            Self::SecurityNotFound => "SECURITY_NOT_FOUND",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
