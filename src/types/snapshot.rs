// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-in-time router state.

use serde::{Deserialize, Serialize};

use super::{WanConnection, WanId};

/// A point-in-time read of the router's WAN connections.
///
/// Connections keep the order the router reported them in. Ids are not
/// checked for uniqueness; lookups return the first matching entry.
///
/// # Examples
///
/// ```
/// use peplink_wan::types::{DeviceSnapshot, WanConnection, WanId};
///
/// let snapshot = DeviceSnapshot::new(vec![
///     WanConnection::new(1, true),
///     WanConnection::new(2, false),
/// ]);
/// assert_eq!(snapshot.enabled(&WanId::new("2")), Some(false));
/// assert_eq!(snapshot.enabled(&WanId::new("9")), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceSnapshot {
    /// WAN connections in router order.
    #[serde(rename = "connection", default)]
    pub connections: Vec<WanConnection>,
}

impl DeviceSnapshot {
    /// Creates a snapshot from a list of connections.
    #[must_use]
    pub fn new(connections: Vec<WanConnection>) -> Self {
        Self { connections }
    }

    /// Returns `true` if the snapshot holds no connections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Finds the first connection with the given id.
    #[must_use]
    pub fn find(&self, wan_id: &WanId) -> Option<&WanConnection> {
        self.connections.iter().find(|c| &c.id == wan_id)
    }

    /// Returns the enable flag of the first connection with the given id.
    #[must_use]
    pub fn enabled(&self, wan_id: &WanId) -> Option<bool> {
        self.find(wan_id).map(|c| c.enable)
    }

    /// Returns the distinct connection ids in first-appearance order.
    #[must_use]
    pub fn wan_ids(&self) -> Vec<WanId> {
        let mut ids: Vec<WanId> = Vec::with_capacity(self.connections.len());
        for connection in &self.connections {
            if !ids.contains(&connection.id) {
                ids.push(connection.id.clone());
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_resolve_to_first_entry() {
        let snapshot = DeviceSnapshot::new(vec![
            WanConnection::new(1, true).with_name("first"),
            WanConnection::new(1, false).with_name("second"),
        ]);

        let wan = snapshot.find(&WanId::new("1")).unwrap();
        assert_eq!(wan.name(), "first");
        assert_eq!(snapshot.enabled(&WanId::new("1")), Some(true));
        assert_eq!(snapshot.wan_ids(), vec![WanId::new("1")]);
    }

    #[test]
    fn deserializes_connection_list() {
        let json = r#"{"connection": [{"id": 1, "enable": true}, {"id": 2}]}"#;
        let snapshot: DeviceSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.connections.len(), 2);
        assert_eq!(snapshot.wan_ids(), vec![WanId::new("1"), WanId::new("2")]);
    }

    #[test]
    fn null_enable_does_not_reject_snapshot() {
        let json = r#"{"connection": [{"id": 1, "enable": null}, {"id": 2, "enable": true}]}"#;
        let snapshot: DeviceSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.enabled(&WanId::new("1")), Some(false));
        assert_eq!(snapshot.enabled(&WanId::new("2")), Some(true));
    }

    #[test]
    fn missing_connection_list_is_empty() {
        let snapshot: DeviceSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.is_empty());
    }
}
