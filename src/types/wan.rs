// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WAN connection types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a WAN connection on the router.
///
/// The router reports ids as JSON numbers, but toggles key on the string form
/// so that ids coming from other sources (configuration, entity registries)
/// compare equal. The numeric form is only needed to build update payloads.
///
/// # Examples
///
/// ```
/// use peplink_wan::types::WanId;
///
/// let id = WanId::new("3");
/// assert_eq!(id.as_str(), "3");
/// assert_eq!(id.as_numeric(), Some(3));
///
/// let id: WanId = serde_json::from_str("2").unwrap();
/// assert_eq!(id, WanId::new("2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WanId(String);

impl WanId {
    /// Creates a WAN id from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the id as the integer the router expects in payloads.
    ///
    /// Returns `None` if the id is not a non-negative integer.
    #[must_use]
    pub fn as_numeric(&self) -> Option<u32> {
        self.0.trim().parse().ok()
    }
}

impl fmt::Display for WanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for WanId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for WanId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WanId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for WanId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Reads an optional flag, treating `null` as `false`.
fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// One WAN connection as reported in a router status snapshot.
///
/// Only `id` is required. Everything else falls back to a default so that a
/// partially populated entry still yields a usable connection.
///
/// # Examples
///
/// ```
/// use peplink_wan::types::WanConnection;
///
/// let json = r#"{"id": 1, "name": "Fiber", "enable": true, "statusLed": "green"}"#;
/// let wan: WanConnection = serde_json::from_str(json).unwrap();
/// assert_eq!(wan.id.as_str(), "1");
/// assert!(wan.enable);
/// assert_eq!(wan.status_led.as_deref(), Some("green"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WanConnection {
    /// Connection id.
    pub id: WanId,
    /// Display name configured on the router.
    #[serde(default)]
    name: Option<String>,
    /// Whether the connection is enabled in the router configuration.
    #[serde(default, deserialize_with = "null_as_false")]
    pub enable: bool,
    /// Status LED colour (`"green"`, `"red"`, `"gray"`, ...).
    #[serde(rename = "statusLed", default)]
    pub status_led: Option<String>,
    /// Human-readable connection status.
    #[serde(default)]
    pub message: Option<String>,
    /// Connection type (`"ethernet"`, `"cellular"`, ...).
    #[serde(rename = "type", default)]
    pub connection_type: Option<String>,
    /// Addressing method (`"dhcp"`, `"static"`, ...).
    #[serde(default)]
    pub method: Option<String>,
}

impl WanConnection {
    /// Creates a connection entry with only the id and enable flag set.
    #[must_use]
    pub fn new(id: u32, enable: bool) -> Self {
        Self {
            id: WanId::from(id),
            name: None,
            enable,
            status_led: None,
            message: None,
            connection_type: None,
            method: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the status LED and message.
    #[must_use]
    pub fn with_status(mut self, led: impl Into<String>, message: impl Into<String>) -> Self {
        self.status_led = Some(led.into());
        self.message = Some(message.into());
        self
    }

    /// Returns the display name, or `"WAN <id>"` when the router sent none.
    #[must_use]
    pub fn name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("WAN {}", self.id))
    }
}

/// Extra attributes a host exposes next to a WAN toggle.
///
/// The connection fields are `None` when the latest snapshot holds no entry
/// for the WAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WanDiagnostics {
    /// WAN connection id.
    pub wan_id: WanId,
    /// Name captured when the toggle was created.
    pub wan_name: String,
    /// Status LED colour from the latest snapshot.
    pub status_led: Option<String>,
    /// Status message from the latest snapshot.
    pub message: Option<String>,
    /// Connection type from the latest snapshot.
    #[serde(rename = "type")]
    pub connection_type: Option<String>,
    /// Addressing method from the latest snapshot.
    pub method: Option<String>,
}

impl WanDiagnostics {
    /// Builds diagnostics from an optional snapshot entry.
    #[must_use]
    pub fn new(wan_id: WanId, wan_name: String, connection: Option<&WanConnection>) -> Self {
        Self {
            wan_id,
            wan_name,
            status_led: connection.and_then(|c| c.status_led.clone()),
            message: connection.and_then(|c| c.message.clone()),
            connection_type: connection.and_then(|c| c.connection_type.clone()),
            method: connection.and_then(|c| c.method.clone()),
        }
    }
}
