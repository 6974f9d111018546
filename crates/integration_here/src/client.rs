//! Shared HTTP plumbing for the HERE endpoints
//!
//! [`HereClient`] owns one `reqwest::Client` configured from [`HereConfig`]
//! and implements the geocoding, routing and matrix traits.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::HereConfig;
use crate::error::HereError;

/// Client for the HERE geocoding, routing and matrix routing APIs
#[derive(Debug, Clone)]
pub struct HereClient {
    client: Client,
    config: HereConfig,
}

impl HereClient {
    /// Create a new HERE client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &HereConfig) -> Result<Self, HereError> {
        config.validate().map_err(HereError::ConfigurationError)?;

        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for HERE requests");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| HereError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// The configuration this client was built from
    #[must_use]
    pub const fn config(&self) -> &HereConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// API key; presence is checked by `HereConfig::validate` in `new`
    pub(crate) fn api_key(&self) -> &str {
        self.config.api_key().unwrap_or_default()
    }

    fn send_error(&self, e: &reqwest::Error) -> HereError {
        if e.is_timeout() {
            HereError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            HereError::ConnectionFailed(e.to_string())
        }
    }

    /// Send a request and parse a JSON body, failing on any non-success status
    pub(crate) async fn fetch_json(&self, request: RequestBuilder) -> Result<Value, HereError> {
        let response = request.send().await.map_err(|e| self.send_error(&e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(HereError::RateLimitExceeded {
                retry_after_secs: response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok()),
            });
        }

        if !status.is_success() {
            return Err(HereError::RequestFailed(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| HereError::ParseError(e.to_string()))
    }

    /// Send a request and parse the JSON body whatever the HTTP status
    ///
    /// The router and matrix router describe failures in a JSON body with a
    /// top-level `status` field; callers inspect that payload themselves.
    /// Only a body that is not JSON is turned into an error here.
    pub(crate) async fn fetch_payload(&self, request: RequestBuilder) -> Result<Value, HereError> {
        let response = request.send().await.map_err(|e| self.send_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HereError::ParseError(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                HereError::ParseError(e.to_string())
            } else {
                debug!(%status, "Non-JSON error body");
                HereError::RequestFailed(format!("HTTP {status}"))
            }
        })
    }
}
