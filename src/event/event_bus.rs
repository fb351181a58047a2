// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus for broadcasting toggle events.

use tokio::sync::broadcast;

use super::{StatePublisher, ToggleEvent};
use crate::types::WanId;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcasts toggle events to any number of subscribers.
///
/// A subscriber that falls more than the channel capacity behind loses the
/// oldest events and receives `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ToggleEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new event bus with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to toggle events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ToggleEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event to all subscribers.
    ///
    /// If there are no subscribers, the event is silently discarded.
    pub fn publish(&self, event: ToggleEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatePublisher for EventBus {
    fn publish_state(&self, wan_id: &WanId, enabled: bool) {
        self.publish(ToggleEvent::state_changed(wan_id.clone(), enabled));
    }

    fn report_drift(&self, wan_id: &WanId, local: bool, remote: bool) {
        self.publish(ToggleEvent::drift(wan_id.clone(), local, remote));
    }
}
