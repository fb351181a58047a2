// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Router configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
#[cfg(feature = "http")]
use crate::protocol::HttpConfig;

/// Connection and timing settings for one router.
///
/// Every field has a default, so a host application can deserialize a partial
/// configuration from any `serde` format and fill in the rest with builders.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use peplink_wan::config::RouterConfig;
///
/// let config = RouterConfig::new("192.168.50.1")
///     .with_https()
///     .with_access_token("token")
///     .with_poll_interval(Duration::from_secs(15));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.poll_interval(), Duration::from_secs(15));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    host: String,
    port: Option<u16>,
    use_https: bool,
    access_token: Option<String>,
    device_name: Option<String>,
    request_timeout_secs: u64,
    poll_interval_secs: u64,
    refresh_delay_ms: u64,
}

impl RouterConfig {
    /// Default request timeout in seconds.
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Default poll interval in seconds.
    pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

    /// Default delay before the post-command refresh, in milliseconds.
    pub const DEFAULT_REFRESH_DELAY_MS: u64 = 3000;

    /// Creates a configuration for the given host with default settings.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Sets the port. Defaults to 80, or 443 with HTTPS.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Enables HTTPS.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        self
    }

    /// Sets the API access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the device name used in toggle unique ids.
    #[must_use]
    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    /// Sets the request timeout. Sub-second precision is dropped.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }

    /// Sets the poll interval. Sub-second precision is dropped.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_secs = interval.as_secs();
        self
    }

    /// Sets the delay between a committed change and the follow-up refresh.
    #[must_use]
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the explicit port, if any.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns `true` if HTTPS is enabled.
    #[must_use]
    pub fn use_https(&self) -> bool {
        self.use_https
    }

    /// Returns the access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the device name, if any.
    #[must_use]
    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Returns the refresh delay.
    #[must_use]
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    /// Checks that the configuration can be used.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the host is empty, or if the poll interval
    /// or request timeout is zero.
    pub fn validate(&self) -> Result<(), Error> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config(
                "poll interval must be at least one second".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the HTTP client configuration.
    #[cfg(feature = "http")]
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        let mut config = HttpConfig::new(self.host.clone()).with_timeout(self.request_timeout());
        if self.use_https {
            config = config.with_https();
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(token) = &self.access_token {
            config = config.with_access_token(token.clone());
        }
        config
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: None,
            use_https: false,
            access_token: None,
            device_name: None,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            poll_interval_secs: Self::DEFAULT_POLL_INTERVAL_SECS,
            refresh_delay_ms: Self::DEFAULT_REFRESH_DELAY_MS,
        }
    }
}
