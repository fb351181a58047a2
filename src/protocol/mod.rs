// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Router API client abstractions.
//!
//! Changing a WAN connection is a two-step operation on the router: the new
//! configuration is written with an `update`, then committed with an `apply`.
//! Each step answers with the vendor envelope modelled by [`ApiResponse`].
//!
//! # Traits
//!
//! - [`ConfigClient`]: the two-phase configuration change
//! - [`SnapshotSource`]: fetching the current WAN status
//!
//! [`HttpClient`] implements both against the router's local HTTP API.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{HttpClient, HttpConfig};

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ProtocolError};
use crate::types::DeviceSnapshot;

/// Resource path of the WAN connection configuration.
pub const WAN_CONNECTION_RESOURCE: &str = "config.wan.connection";

/// Resource path of the configuration commit command.
pub const CONFIG_APPLY_RESOURCE: &str = "cmd.config.apply";

/// Resource path of the WAN status report.
pub const WAN_STATUS_RESOURCE: &str = "status.wan.connection";

/// Response envelope returned by every router API call.
///
/// # Examples
///
/// ```
/// use peplink_wan::protocol::ApiResponse;
///
/// let ok: ApiResponse = serde_json::from_str(r#"{"stat": "ok"}"#).unwrap();
/// assert!(ok.is_ok());
///
/// let err: ApiResponse =
///     serde_json::from_str(r#"{"stat": "fail", "code": 401, "message": "Unauthorized"}"#)
///         .unwrap();
/// assert!(!err.is_ok());
/// assert_eq!(err.code, Some(401));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiResponse {
    /// `"ok"` on success, anything else on failure.
    pub stat: String,
    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Vendor error code on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Payload of successful queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl ApiResponse {
    /// Creates a successful response without payload.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            stat: "ok".to_string(),
            message: None,
            code: None,
            response: None,
        }
    }

    /// Creates an error response.
    #[must_use]
    pub fn error(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            stat: "error".to_string(),
            message: Some(message.into()),
            code,
            response: None,
        }
    }

    /// Returns `true` if the router reported success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.stat == "ok"
    }

    /// Returns the error message, or `"Unknown error"` when none was sent.
    #[must_use]
    pub fn message_or_default(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// One entry of a WAN configuration update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WanUpdate {
    /// Numeric WAN connection id.
    pub id: u32,
    /// Desired enable flag.
    pub enable: bool,
}

/// Request body of a configuration update.
///
/// Serializes to `{"action": "update", "list": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest<'a> {
    action: &'static str,
    list: &'a [WanUpdate],
}

impl<'a> UpdateRequest<'a> {
    /// Wraps a list of updates.
    #[must_use]
    pub fn new(list: &'a [WanUpdate]) -> Self {
        Self {
            action: "update",
            list,
        }
    }
}

/// Two-phase configuration change on the router.
///
/// Both calls are safe to repeat; callers never retry automatically. A
/// non-`ok` [`ApiResponse`] is a successful call carrying a rejection; an
/// `Err` means the exchange itself failed.
pub trait ConfigClient: Send + Sync {
    /// Writes configuration for `resource` without committing it.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request cannot be completed.
    fn update(
        &self,
        resource: &str,
        payload: &[WanUpdate],
    ) -> impl Future<Output = Result<ApiResponse, ProtocolError>> + Send;

    /// Commits all pending configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request cannot be completed.
    fn apply(&self) -> impl Future<Output = Result<ApiResponse, ProtocolError>> + Send;
}

/// Source of full router state snapshots.
pub trait SnapshotSource: Send + Sync {
    /// Fetches the current WAN connection list.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    fn fetch_snapshot(&self) -> impl Future<Output = Result<DeviceSnapshot, Error>> + Send;
}
