// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WAN enable/disable toggles.
//!
//! A [`WanToggle`] shows the result of the last successful command right
//! away, even though the router takes a few seconds to act on it. Snapshots
//! from the poller are recorded next to that value but never replace it, so
//! a slow router cannot make the toggle flip back and forth.
//!
//! # Command flow
//!
//! 1. `update` writes `{id, enable}` to the WAN configuration.
//! 2. `apply` commits it, only if the update was accepted.
//! 3. On success the local state is set, published, and a delayed refresh of
//!    the poller is scheduled in the background.
//!
//! Any failure leaves the local state untouched and is returned as a
//! [`CommandError`]. Commands on the same toggle run one at a time so that an
//! `apply` always commits the `update` issued just before it.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use peplink_wan::coordinator::Coordinator;
//! use peplink_wan::event::EventBus;
//! use peplink_wan::protocol::HttpConfig;
//! use peplink_wan::toggle::{ToggleContext, WanToggle};
//! use peplink_wan::types::WanId;
//!
//! # async fn example() -> peplink_wan::Result<()> {
//! let client = HttpConfig::new("192.168.50.1").into_client()?;
//! let coordinator = Coordinator::new(client.clone(), Duration::from_secs(30));
//! let context = ToggleContext::new(Arc::new(client), Arc::new(coordinator), Arc::new(EventBus::new()));
//!
//! let toggle = WanToggle::new(context, WanId::new("2"), "LTE", false);
//! toggle.turn_on().await?;
//! assert!(toggle.read());
//! # Ok(())
//! # }
//! ```

mod context;

pub use context::ToggleContext;

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::coordinator::Poller;
use crate::error::{CommandError, CommandPhase, ReconcileError};
use crate::protocol::{ApiResponse, ConfigClient, WAN_CONNECTION_RESOURCE, WanUpdate};
use crate::state::ToggleState;
use crate::types::{DeviceSnapshot, WanConnection, WanDiagnostics, WanId};

/// Enable/disable control for one WAN connection.
pub struct WanToggle<C, P> {
    wan_id: WanId,
    name: String,
    unique_id: String,
    state: RwLock<ToggleState>,
    command_lock: Mutex<()>,
    context: ToggleContext<C, P>,
}

impl<C, P> WanToggle<C, P>
where
    C: ConfigClient,
    P: Poller + 'static,
{
    /// Creates a toggle showing the observed enable state.
    #[must_use]
    pub fn new(
        context: ToggleContext<C, P>,
        wan_id: WanId,
        name: impl Into<String>,
        observed: bool,
    ) -> Self {
        let name = name.into();
        let unique_id = format!("{}_wan{}_enable", context.device_name, wan_id);

        tracing::debug!(%wan_id, %name, observed, %unique_id, "Creating WAN toggle");

        Self {
            state: RwLock::new(ToggleState::new(wan_id.clone(), observed)),
            wan_id,
            name,
            unique_id,
            command_lock: Mutex::new(()),
            context,
        }
    }

    /// Creates a toggle from a snapshot entry.
    #[must_use]
    pub fn from_connection(context: ToggleContext<C, P>, connection: &WanConnection) -> Self {
        Self::new(
            context,
            connection.id.clone(),
            connection.name(),
            connection.enable,
        )
    }

    /// Returns the WAN id.
    #[must_use]
    pub fn wan_id(&self) -> &WanId {
        &self.wan_id
    }

    /// Returns the WAN name captured at creation.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stable unique id, `<device>_wan<id>_enable`.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Returns the user-visible enable state.
    ///
    /// Never waits for an in-flight command and never contacts the router.
    #[must_use]
    pub fn read(&self) -> bool {
        self.state.read().local_enabled()
    }

    /// Returns a copy of the full toggle state.
    #[must_use]
    pub fn state(&self) -> ToggleState {
        self.state.read().clone()
    }

    /// Returns `true` if the last poll succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.context.poller.last_update_success()
    }

    /// Returns the connection details from the latest snapshot.
    #[must_use]
    pub fn extra_diagnostics(&self) -> WanDiagnostics {
        let snapshot = self.context.poller.snapshot();
        WanDiagnostics::new(
            self.wan_id.clone(),
            self.name.clone(),
            snapshot.find(&self.wan_id),
        )
    }

    /// Enables the WAN connection.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if either phase of the change fails.
    pub async fn turn_on(&self) -> Result<(), CommandError> {
        self.command(true).await
    }

    /// Disables the WAN connection.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if either phase of the change fails.
    pub async fn turn_off(&self) -> Result<(), CommandError> {
        self.command(false).await
    }

    /// Sets the WAN enable flag on the router.
    ///
    /// Returns once both phases have completed; the follow-up refresh runs
    /// in the background. On failure the visible state is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if the id is not numeric, the router rejects
    /// either phase, or a request fails.
    pub async fn command(&self, target: bool) -> Result<(), CommandError> {
        let _guard = self.command_lock.lock().await;

        tracing::info!(
            wan_id = %self.wan_id,
            name = %self.name,
            target,
            current = self.read(),
            "Setting WAN state"
        );

        if let Err(e) = self.set_remote_state(target).await {
            tracing::error!(
                wan_id = %self.wan_id,
                target,
                phase = e.phase().map_or("none", |p| p.as_str()),
                error = %e,
                "Failed to set WAN state"
            );
            return Err(e);
        }

        self.state.write().commit(target);
        tracing::info!(wan_id = %self.wan_id, enabled = target, "WAN state committed");

        self.context.publisher.publish_state(&self.wan_id, target);
        self.context
            .scheduler
            .schedule_refresh(self.wan_id.clone(), Arc::clone(&self.context.poller));

        Ok(())
    }

    async fn set_remote_state(&self, enable: bool) -> Result<(), CommandError> {
        let id = self
            .wan_id
            .as_numeric()
            .ok_or_else(|| CommandError::InvalidWanId(self.wan_id.clone()))?;
        let payload = [WanUpdate { id, enable }];

        let response = self
            .context
            .client
            .update(WAN_CONNECTION_RESOURCE, &payload)
            .await
            .map_err(|source| CommandError::Transport {
                phase: CommandPhase::Update,
                source,
            })?;
        check(CommandPhase::Update, &response)?;

        tracing::debug!(wan_id = %self.wan_id, "WAN configuration updated, applying");

        let response = self
            .context
            .client
            .apply()
            .await
            .map_err(|source| CommandError::Transport {
                phase: CommandPhase::Apply,
                source,
            })?;
        check(CommandPhase::Apply, &response)
    }

    /// Records the router's enable flag for this WAN.
    ///
    /// The visible state is left alone; a mismatch is logged and reported
    /// to the publisher as drift.
    pub fn reconcile(&self, snapshot_enabled: bool) {
        let local = {
            let mut state = self.state.write();
            state.observe_remote(snapshot_enabled);
            state.local_enabled()
        };

        if local != snapshot_enabled {
            tracing::debug!(
                wan_id = %self.wan_id,
                local,
                remote = snapshot_enabled,
                "WAN state differs from router"
            );
            self.context
                .publisher
                .report_drift(&self.wan_id, local, snapshot_enabled);
        }
    }

    /// Reconciles against the entry for this WAN in `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError` if the snapshot has no entry for this WAN;
    /// nothing is recorded in that case.
    pub fn handle_snapshot(&self, snapshot: &DeviceSnapshot) -> Result<(), ReconcileError> {
        let enabled = snapshot
            .enabled(&self.wan_id)
            .ok_or_else(|| ReconcileError::WanNotInSnapshot(self.wan_id.clone()))?;
        self.reconcile(enabled);
        Ok(())
    }
}

fn check(phase: CommandPhase, response: &ApiResponse) -> Result<(), CommandError> {
    if response.is_ok() {
        Ok(())
    } else {
        Err(CommandError::RemoteRejected {
            phase,
            code: response.code,
            message: response.message_or_default(),
        })
    }
}

impl<C, P> std::fmt::Debug for WanToggle<C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WanToggle")
            .field("wan_id", &self.wan_id)
            .field("name", &self.name)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}
