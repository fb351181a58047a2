// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delayed refresh after a configuration change.
//!
//! The router needs a few seconds to act on a committed change, so polling
//! immediately would return the old state. [`RefreshScheduler`] waits a fixed
//! delay on a detached task and then asks the poller for a refresh.
//!
//! Scheduled refreshes are fire-and-forget: no handle is returned, they cannot
//! be cancelled, and overlapping refreshes for the same WAN are not merged.
//! They are abandoned when the runtime shuts down.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::coordinator::Poller;
use crate::types::WanId;

/// Schedules one delayed poller refresh per successful command.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    delay: Duration,
    pending: Arc<AtomicUsize>,
}

impl RefreshScheduler {
    /// Default delay between a committed change and the refresh.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

    /// Creates a scheduler with the given delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the refresh delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the number of scheduled refreshes that have not fired yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Spawns a detached task that refreshes `poller` after the delay.
    ///
    /// Returns immediately. A failed refresh is logged and otherwise ignored.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn schedule_refresh<P>(&self, wan_id: WanId, poller: Arc<P>)
    where
        P: Poller + 'static,
    {
        let delay = self.delay;
        let pending = Arc::clone(&self.pending);
        pending.fetch_add(1, Ordering::AcqRel);

        tracing::debug!(%wan_id, ?delay, "Scheduling delayed refresh");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            pending.fetch_sub(1, Ordering::AcqRel);

            tracing::debug!(%wan_id, "Running delayed refresh");
            if let Err(e) = poller.request_refresh().await {
                tracing::warn!(%wan_id, error = %e, "Delayed refresh failed");
            }
        });
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}
