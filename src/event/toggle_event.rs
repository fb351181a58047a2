// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Toggle event types.

use serde::Serialize;

use crate::types::WanId;

/// Events emitted for WAN toggles.
///
/// # Examples
///
/// ```
/// use peplink_wan::event::ToggleEvent;
/// use peplink_wan::types::WanId;
///
/// let event = ToggleEvent::state_changed(WanId::new("2"), false);
/// assert_eq!(event.wan_id().as_str(), "2");
/// assert!(event.is_state_change());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ToggleEvent {
    /// A toggle was created for a newly seen WAN connection.
    ToggleAdded {
        /// The WAN connection id.
        wan_id: WanId,
        /// The initial enable state.
        enabled: bool,
    },

    /// The user-visible state of a toggle changed.
    StateChanged {
        /// The WAN connection id.
        wan_id: WanId,
        /// The new enable state.
        enabled: bool,
    },

    /// The router reports a different state than the toggle shows.
    Drift {
        /// The WAN connection id.
        wan_id: WanId,
        /// The locally displayed state.
        local: bool,
        /// The state in the latest snapshot.
        remote: bool,
    },
}

impl ToggleEvent {
    /// Returns the WAN id associated with this event.
    #[must_use]
    pub fn wan_id(&self) -> &WanId {
        match self {
            Self::ToggleAdded { wan_id, .. }
            | Self::StateChanged { wan_id, .. }
            | Self::Drift { wan_id, .. } => wan_id,
        }
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Creates a toggle added event.
    #[must_use]
    pub fn toggle_added(wan_id: WanId, enabled: bool) -> Self {
        Self::ToggleAdded { wan_id, enabled }
    }

    /// Creates a state changed event.
    #[must_use]
    pub fn state_changed(wan_id: WanId, enabled: bool) -> Self {
        Self::StateChanged { wan_id, enabled }
    }

    /// Creates a drift event.
    #[must_use]
    pub fn drift(wan_id: WanId, local: bool, remote: bool) -> Self {
        Self::Drift {
            wan_id,
            local,
            remote,
        }
    }
}
