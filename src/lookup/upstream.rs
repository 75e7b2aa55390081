//! Upstream lookup service client.
//!
//! # Responsibilities
//! - Build `{base_url}/ws/{code}/json/` for a postal code
//! - Issue the GET with connect and total timeouts
//! - Classify the outcome into a record or a [`FailureCause`]

use async_trait::async_trait;
use url::Url;

use crate::config::UpstreamConfig;
use crate::lookup::error::{FailureCause, SetupError};
use crate::lookup::record::{AddressRecord, PostalCode};

/// A service that can resolve a postal code.
///
/// The resilient client only depends on this seam, so tests can script the
/// upstream.
#[async_trait]
pub trait AddressSource: Send + Sync {
    async fn lookup(&self, code: &PostalCode) -> Result<AddressRecord, FailureCause>;
}

/// HTTP client for the ViaCEP lookup API.
#[derive(Debug, Clone)]
pub struct ViaCepSource {
    http: reqwest::Client,
    base_url: Url,
}

impl ViaCepSource {
    pub fn new(config: &UpstreamConfig) -> Result<Self, SetupError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| SetupError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SetupError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "cannot be a base".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        tracing::info!(
            base_url = %base_url,
            connect_timeout_ms = config.connect_timeout_ms,
            request_timeout_ms = config.request_timeout_ms,
            "Upstream client initialized"
        );

        Ok(Self { http, base_url })
    }

    /// Request target for `code`. The code is pushed as a single
    /// percent-encoded path segment.
    pub fn endpoint_for(&self, code: &PostalCode) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base can carry path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["ws", code.as_str(), "json", ""]);
        }
        url
    }
}

#[async_trait]
impl AddressSource for ViaCepSource {
    async fn lookup(&self, code: &PostalCode) -> Result<AddressRecord, FailureCause> {
        let url = self.endpoint_for(code);
        tracing::debug!(cep = %code, url = %url, "Querying upstream");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(FailureCause::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FailureCause::UpstreamStatus(status.as_u16()));
        }

        response
            .json::<AddressRecord>()
            .await
            .map_err(FailureCause::from_reqwest)
    }
}
