//! Lookup failure causes and setup errors.

use thiserror::Error;

/// Why a lookup degraded to the fallback record.
///
/// These are causes, not propagated errors: every variant ends in the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// Connection refused, DNS failure, reset mid-response.
    #[error("upstream unreachable: {0}")]
    NetworkUnreachable(String),

    /// The call exceeded its connect or request deadline.
    #[error("upstream timed out")]
    Timeout,

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(u16),

    /// 2xx, but the body is not a valid address document.
    #[error("malformed upstream body: {0}")]
    Decode(String),

    /// The breaker is open; no call was made.
    #[error("circuit breaker open")]
    BreakerOpen,
}

impl FailureCause {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FailureCause::NetworkUnreachable(_) => "network",
            FailureCause::Timeout => "timeout",
            FailureCause::UpstreamStatus(_) => "upstream_status",
            FailureCause::Decode(_) => "decode",
            FailureCause::BreakerOpen => "breaker_open",
        }
    }

    /// Classify a transport or body error from the HTTP client.
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FailureCause::Timeout
        } else if error.is_decode() {
            FailureCause::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            FailureCause::UpstreamStatus(status.as_u16())
        } else {
            FailureCause::NetworkUnreachable(error.to_string())
        }
    }
}

/// Errors building the upstream client. These are configuration defects and
/// abort startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid upstream base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
