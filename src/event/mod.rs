// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Publication of toggle state to the host.
//!
//! Toggles report through the [`StatePublisher`] trait. The bundled
//! [`EventBus`] implements it on top of tokio's broadcast channel so that any
//! number of host components can follow state changes.
//!
//! # Examples
//!
//! ```
//! use peplink_wan::event::{EventBus, StatePublisher, ToggleEvent};
//! use peplink_wan::types::WanId;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish_state(&WanId::new("1"), true);
//!
//! let event = rx.try_recv().unwrap();
//! assert!(matches!(event, ToggleEvent::StateChanged { enabled: true, .. }));
//! ```

mod event_bus;
mod toggle_event;

pub use event_bus::EventBus;
pub use toggle_event::ToggleEvent;

use crate::types::WanId;

/// Receives the user-visible state of toggles.
///
/// Called right after a command succeeds, before any refresh of the router
/// state. Implementations must not block.
pub trait StatePublisher: Send + Sync {
    /// Publishes the new enable state of a WAN toggle.
    fn publish_state(&self, wan_id: &WanId, enabled: bool);

    /// Reports a divergence between local and router state.
    ///
    /// The default implementation does nothing.
    fn report_drift(&self, wan_id: &WanId, local: bool, remote: bool) {
        let _ = (wan_id, local, remote);
    }
}
