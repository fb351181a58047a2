// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-WAN toggle state.

use serde::Serialize;

use crate::types::WanId;

/// State of one WAN toggle.
///
/// `local_enabled` is what every reader sees. It is written only by a
/// successful command. `last_known_remote` mirrors the latest snapshot and is
/// never copied into `local_enabled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleState {
    wan_id: WanId,
    local_enabled: bool,
    last_known_remote: bool,
}

impl ToggleState {
    /// Creates the state for a WAN first seen with the given enable flag.
    #[must_use]
    pub fn new(wan_id: WanId, observed: bool) -> Self {
        Self {
            wan_id,
            local_enabled: observed,
            last_known_remote: observed,
        }
    }

    /// Returns the WAN id.
    #[must_use]
    pub fn wan_id(&self) -> &WanId {
        &self.wan_id
    }

    /// Returns the user-visible enable state.
    #[must_use]
    pub fn local_enabled(&self) -> bool {
        self.local_enabled
    }

    /// Returns the enable flag from the latest snapshot.
    #[must_use]
    pub fn last_known_remote(&self) -> bool {
        self.last_known_remote
    }

    /// Returns `true` if the router reports something other than what is shown.
    #[must_use]
    pub fn is_drifted(&self) -> bool {
        self.local_enabled != self.last_known_remote
    }

    /// Records the result of a successful command.
    pub(crate) fn commit(&mut self, enabled: bool) {
        self.local_enabled = enabled;
    }

    /// Records the enable flag from a snapshot.
    pub(crate) fn observe_remote(&mut self, remote: bool) {
        self.last_known_remote = remote;
    }
}
