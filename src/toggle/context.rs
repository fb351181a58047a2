// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborators shared by all toggles of one router.

use std::sync::Arc;
use std::time::Duration;

use crate::event::StatePublisher;
use crate::scheduler::RefreshScheduler;

/// Everything a [`WanToggle`](super::WanToggle) needs besides its own state.
///
/// One context is built per router and cloned into each toggle; clones share
/// the client, the poller, the publisher and the scheduler.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use peplink_wan::coordinator::Coordinator;
/// use peplink_wan::event::EventBus;
/// use peplink_wan::protocol::HttpConfig;
/// use peplink_wan::toggle::ToggleContext;
///
/// # fn example() -> peplink_wan::Result<()> {
/// let client = HttpConfig::new("192.168.50.1").into_client()?;
/// let coordinator = Coordinator::new(client.clone(), Duration::from_secs(30));
///
/// let context = ToggleContext::new(Arc::new(client), Arc::new(coordinator), Arc::new(EventBus::new()))
///     .with_device_name("balance-20x")
///     .with_refresh_delay(Duration::from_secs(5));
/// # Ok(())
/// # }
/// ```
pub struct ToggleContext<C, P> {
    pub(crate) client: Arc<C>,
    pub(crate) poller: Arc<P>,
    pub(crate) publisher: Arc<dyn StatePublisher>,
    pub(crate) scheduler: RefreshScheduler,
    pub(crate) device_name: String,
}

impl<C, P> ToggleContext<C, P> {
    /// Default device name used in unique ids.
    pub const DEFAULT_DEVICE_NAME: &'static str = "peplink";

    /// Creates a context with the default refresh delay and device name.
    #[must_use]
    pub fn new(client: Arc<C>, poller: Arc<P>, publisher: Arc<dyn StatePublisher>) -> Self {
        Self {
            client,
            poller,
            publisher,
            scheduler: RefreshScheduler::default(),
            device_name: Self::DEFAULT_DEVICE_NAME.to_string(),
        }
    }

    /// Sets the delay between a committed change and the follow-up refresh.
    #[must_use]
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.scheduler = RefreshScheduler::new(delay);
        self
    }

    /// Sets the device name used to build unique ids.
    #[must_use]
    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Returns the poller.
    #[must_use]
    pub fn poller(&self) -> &Arc<P> {
        &self.poller
    }

    /// Returns the refresh scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Returns the device name.
    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl<C, P> Clone for ToggleContext<C, P> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            poller: Arc::clone(&self.poller),
            publisher: Arc::clone(&self.publisher),
            scheduler: self.scheduler.clone(),
            device_name: self.device_name.clone(),
        }
    }
}

impl<C, P> std::fmt::Debug for ToggleContext<C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToggleContext")
            .field("device_name", &self.device_name)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
