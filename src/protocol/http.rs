// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP implementation of the router API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Serialize;

use crate::error::{Error, ParseError, ProtocolError};
use crate::protocol::{
    ApiResponse, CONFIG_APPLY_RESOURCE, ConfigClient, SnapshotSource, UpdateRequest,
    WAN_STATUS_RESOURCE, WanUpdate,
};
use crate::types::DeviceSnapshot;

// ============================================================================
// HttpConfig
// ============================================================================

/// Connection parameters for a router's local HTTP API.
///
/// # Examples
///
/// ```
/// use peplink_wan::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.50.1")
///     .with_https()
///     .with_access_token("abc123")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "https://192.168.50.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    use_https: bool,
    access_token: Option<String>,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the specified host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_https: false,
            access_token: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    ///
    /// If the port hasn't been explicitly set, it is changed to 443.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        if self.port == Self::DEFAULT_PORT {
            self.port = Self::DEFAULT_HTTPS_PORT;
        }
        self
    }

    /// Sets the API access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether HTTPS is enabled.
    #[must_use]
    pub fn use_https(&self) -> bool {
        self.use_https
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    ///
    /// A host that already carries a scheme is used as is.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            return self.host.trim_end_matches('/').to_string();
        }

        let scheme = if self.use_https { "https" } else { "http" };
        let port_suffix = if (self.use_https && self.port == Self::DEFAULT_HTTPS_PORT)
            || (!self.use_https && self.port == Self::DEFAULT_PORT)
        {
            String::new()
        } else {
            format!(":{}", self.port)
        };
        format!("{scheme}://{}{port_suffix}", self.host)
    }

    /// Creates an [`HttpClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }

        let base_url = self.base_url();
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url,
            client,
            access_token: self.access_token,
            timeout: self.timeout,
        })
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client for the router's `/api/<resource>` endpoints.
///
/// # Examples
///
/// ```no_run
/// use peplink_wan::protocol::{ConfigClient, HttpConfig, WanUpdate};
///
/// # async fn example() -> peplink_wan::Result<()> {
/// let client = HttpConfig::new("192.168.50.1")
///     .with_access_token("abc123")
///     .into_client()?;
///
/// let update = [WanUpdate { id: 2, enable: false }];
/// let response = client.update("config.wan.connection", &update).await?;
/// if response.is_ok() {
///     client.apply().await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    access_token: Option<String>,
    timeout: Duration,
}

impl HttpClient {
    /// Returns the base URL of the router.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL for a resource.
    fn build_url(&self, resource: &str) -> String {
        match &self.access_token {
            Some(token) => format!(
                "{}/api/{}?accessToken={}",
                self.base_url,
                resource,
                urlencoding::encode(token)
            ),
            None => format!("{}/api/{}", self.base_url, resource),
        }
    }

    /// Sends a JSON body to a resource with `POST`.
    async fn post<B: Serialize + Sync>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<ApiResponse, ProtocolError> {
        let url = self.build_url(resource);
        tracing::debug!(resource, "Sending POST request");
        self.execute(self.client.post(&url).json(body)).await
    }

    /// Queries a resource with `GET`.
    async fn get(&self, resource: &str) -> Result<ApiResponse, ProtocolError> {
        let url = self.build_url(resource);
        tracing::debug!(resource, "Sending GET request");
        self.execute(self.client.get(&url)).await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<ApiResponse, ProtocolError> {
        let response = request.send().await.map_err(|e| self.classify(e))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::AuthenticationFailed);
        }

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;

        tracing::debug!(body = %body, "Received HTTP response");

        serde_json::from_str(&body).map_err(|e| ProtocolError::InvalidResponse(e.to_string()))
    }

    fn classify(&self, error: reqwest::Error) -> ProtocolError {
        if error.is_timeout() {
            ProtocolError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
        } else {
            ProtocolError::Http(error)
        }
    }
}

impl ConfigClient for HttpClient {
    async fn update(
        &self,
        resource: &str,
        payload: &[WanUpdate],
    ) -> Result<ApiResponse, ProtocolError> {
        self.post(resource, &UpdateRequest::new(payload)).await
    }

    async fn apply(&self) -> Result<ApiResponse, ProtocolError> {
        self.post(CONFIG_APPLY_RESOURCE, &serde_json::json!({}))
            .await
    }
}

impl SnapshotSource for HttpClient {
    async fn fetch_snapshot(&self) -> Result<DeviceSnapshot, Error> {
        let response = self.get(WAN_STATUS_RESOURCE).await?;

        if !response.is_ok() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "status query rejected: {}",
                response.message_or_default()
            ))
            .into());
        }

        let payload = response
            .response
            .ok_or_else(|| ParseError::MissingField("response".to_string()))?;

        let snapshot: DeviceSnapshot = serde_json::from_value(payload).map_err(ParseError::Json)?;
        Ok(snapshot)
    }
}
