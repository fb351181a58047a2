// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WAN manager for one router.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::RouterConfig;
use crate::coordinator::{Coordinator, Poller};
use crate::error::Error;
use crate::event::{EventBus, ToggleEvent};
use crate::protocol::{ConfigClient, SnapshotSource};
use crate::toggle::{ToggleContext, WanToggle};
use crate::types::{DeviceSnapshot, WanId};

type Toggle<C, S> = WanToggle<C, Coordinator<S>>;

/// Owns the toggles of one router.
///
/// Toggles are kept in the order their WAN ids first appeared in a snapshot.
/// A toggle is never removed, even if its WAN disappears from later
/// snapshots.
pub struct WanManager<C, S> {
    context: ToggleContext<C, Coordinator<S>>,
    event_bus: EventBus,
    toggles: RwLock<Vec<Arc<Toggle<C, S>>>>,
}

impl<C, S> WanManager<C, S>
where
    C: ConfigClient + 'static,
    S: SnapshotSource + 'static,
{
    /// Creates a manager with its own event bus.
    #[must_use]
    pub fn new(client: Arc<C>, coordinator: Coordinator<S>) -> Self {
        Self::with_event_bus(client, coordinator, EventBus::new())
    }

    /// Creates a manager publishing to an existing event bus.
    #[must_use]
    pub fn with_event_bus(client: Arc<C>, coordinator: Coordinator<S>, event_bus: EventBus) -> Self {
        let context = ToggleContext::new(
            client,
            Arc::new(coordinator),
            Arc::new(event_bus.clone()),
        );
        Self {
            context,
            event_bus,
            toggles: RwLock::new(Vec::new()),
        }
    }

    /// Applies the device name and refresh delay from `config`.
    ///
    /// Only toggles created afterwards pick up the new settings, so call
    /// this before [`setup`](Self::setup).
    #[must_use]
    pub fn with_config(mut self, config: &RouterConfig) -> Self {
        self.context = self.context.with_refresh_delay(config.refresh_delay());
        if let Some(name) = config.device_name() {
            self.context = self.context.with_device_name(name);
        }
        self
    }

    /// Returns the coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Coordinator<S> {
        self.context.poller()
    }

    /// Returns the shared toggle context.
    #[must_use]
    pub fn context(&self) -> &ToggleContext<C, Coordinator<S>> {
        &self.context
    }

    /// Subscribes to toggle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ToggleEvent> {
        self.event_bus.subscribe()
    }

    /// Creates toggles for the WAN connections in the current snapshot.
    ///
    /// Returns the number of toggles created. Logs a warning if the snapshot
    /// has no WAN connection.
    pub fn setup(&self) -> usize {
        let snapshot = self.context.poller().snapshot();
        if snapshot.is_empty() {
            tracing::warn!("No WAN connections found in router snapshot");
        }

        let added = self.sync_snapshot(&snapshot);
        tracing::debug!(count = added.len(), "WAN toggles set up");
        added.len()
    }

    /// Returns all toggles in creation order.
    #[must_use]
    pub fn toggles(&self) -> Vec<Arc<Toggle<C, S>>> {
        self.toggles.read().clone()
    }

    /// Returns the toggle for a WAN id.
    #[must_use]
    pub fn toggle(&self, wan_id: &WanId) -> Option<Arc<Toggle<C, S>>> {
        self.toggles
            .read()
            .iter()
            .find(|t| t.wan_id() == wan_id)
            .cloned()
    }

    /// Returns all WAN ids with a toggle.
    #[must_use]
    pub fn wan_ids(&self) -> Vec<WanId> {
        self.toggles
            .read()
            .iter()
            .map(|t| t.wan_id().clone())
            .collect()
    }

    /// Returns the number of toggles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.toggles.read().len()
    }

    /// Returns `true` if no toggle has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toggles.read().is_empty()
    }

    /// Sets the enable flag of a WAN connection.
    ///
    /// # Errors
    ///
    /// Returns `Error::WanNotFound` if no toggle exists for `wan_id`, or
    /// `Error::Command` if the change fails.
    pub async fn command(&self, wan_id: &WanId, target: bool) -> Result<(), Error> {
        let toggle = self
            .toggle(wan_id)
            .ok_or_else(|| Error::WanNotFound(wan_id.clone()))?;
        toggle.command(target).await?;
        Ok(())
    }

    /// Enables a WAN connection.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn turn_on(&self, wan_id: &WanId) -> Result<(), Error> {
        self.command(wan_id, true).await
    }

    /// Disables a WAN connection.
    ///
    /// # Errors
    ///
    /// See [`command`](Self::command).
    pub async fn turn_off(&self, wan_id: &WanId) -> Result<(), Error> {
        self.command(wan_id, false).await
    }

    /// Feeds a snapshot to every toggle and creates toggles for new WAN ids.
    ///
    /// Existing toggles only record the router's value. Toggles missing from
    /// the snapshot are left as they are. Returns the ids of the toggles
    /// created.
    pub fn sync_snapshot(&self, snapshot: &DeviceSnapshot) -> Vec<WanId> {
        let mut toggles = self.toggles.write();

        for toggle in toggles.iter() {
            if let Err(e) = toggle.handle_snapshot(snapshot) {
                tracing::debug!(wan_id = %toggle.wan_id(), error = %e, "Keeping stale toggle");
            }
        }

        let mut added = Vec::new();
        for wan_id in snapshot.wan_ids() {
            if toggles.iter().any(|t| t.wan_id() == &wan_id) {
                continue;
            }
            let Some(connection) = snapshot.find(&wan_id) else {
                continue;
            };

            let toggle = WanToggle::from_connection(self.context.clone(), connection);
            tracing::info!(
                %wan_id,
                name = %toggle.name(),
                enabled = connection.enable,
                "Added WAN toggle"
            );

            toggles.push(Arc::new(toggle));
            self.event_bus
                .publish(ToggleEvent::toggle_added(wan_id.clone(), connection.enable));
            added.push(wan_id);
        }

        added
    }

    /// Spawns a task that syncs every new coordinator snapshot.
    ///
    /// Runs until `cancel` fires or the coordinator is dropped.
    pub fn spawn_reconciler(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let mut rx = self.coordinator().subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        tracing::debug!("Reconciler cancelled");
                        break;
                    }
                    changed = rx.changed() => {
                        if changed.is_err() {
                            tracing::debug!("Coordinator gone, reconciler stopping");
                            break;
                        }
                        let snapshot = Arc::clone(&rx.borrow_and_update());
                        manager.sync_snapshot(&snapshot);
                    }
                }
            }
        })
    }
}

impl<C, S> std::fmt::Debug for WanManager<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WanManager")
            .field("context", &self.context)
            .field("toggles", &self.toggles.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::ProtocolError;
    use crate::protocol::{ApiResponse, WanUpdate};
    use crate::types::WanConnection;

    struct AcceptingClient;

    impl ConfigClient for AcceptingClient {
        async fn update(
            &self,
            _resource: &str,
            _payload: &[WanUpdate],
        ) -> Result<ApiResponse, ProtocolError> {
            Ok(ApiResponse::ok())
        }

        async fn apply(&self) -> Result<ApiResponse, ProtocolError> {
            Ok(ApiResponse::ok())
        }
    }

    /// Returns whatever snapshot was last stored.
    #[derive(Default)]
    struct StoredSource {
        snapshot: parking_lot::Mutex<DeviceSnapshot>,
    }

    impl StoredSource {
        fn set(&self, connections: Vec<WanConnection>) {
            *self.snapshot.lock() = DeviceSnapshot::new(connections);
        }
    }

    impl SnapshotSource for Arc<StoredSource> {
        async fn fetch_snapshot(&self) -> Result<DeviceSnapshot, Error> {
            Ok(self.snapshot.lock().clone())
        }
    }

    async fn manager(
        connections: Vec<WanConnection>,
    ) -> (WanManager<AcceptingClient, Arc<StoredSource>>, Arc<StoredSource>) {
        let source = Arc::new(StoredSource::default());
        source.set(connections);
        let coordinator = Coordinator::new(Arc::clone(&source), Duration::from_secs(30));
        coordinator.refresh().await.unwrap();
        (
            WanManager::new(Arc::new(AcceptingClient), coordinator),
            source,
        )
    }

    #[tokio::test]
    async fn setup_follows_snapshot_order() {
        let (manager, _) = manager(vec![
            WanConnection::new(2, false).with_name("LTE"),
            WanConnection::new(1, true).with_name("Fiber"),
            WanConnection::new(2, true),
        ])
        .await;
        let mut events = manager.subscribe();

        assert_eq!(manager.setup(), 2);

        assert_eq!(manager.wan_ids(), vec![WanId::new("2"), WanId::new("1")]);
        let lte = manager.toggle(&WanId::new("2")).unwrap();
        assert!(!lte.read());
        assert_eq!(lte.name(), "LTE");
        assert_eq!(lte.unique_id(), "peplink_wan2_enable");

        assert_eq!(
            events.try_recv().unwrap(),
            ToggleEvent::toggle_added(WanId::new("2"), false)
        );
        assert_eq!(
            events.try_recv().unwrap(),
            ToggleEvent::toggle_added(WanId::new("1"), true)
        );
    }

    #[tokio::test]
    async fn setup_with_no_connections() {
        let (manager, _) = manager(Vec::new()).await;
        assert_eq!(manager.setup(), 0);
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn sync_keeps_local_and_adds_new_ids() {
        let (manager, _) = manager(vec![WanConnection::new(1, true)]).await;
        manager.setup();

        let added = manager.sync_snapshot(&DeviceSnapshot::new(vec![
            WanConnection::new(1, false),
            WanConnection::new(3, true),
        ]));

        assert_eq!(added, vec![WanId::new("3")]);
        let first = manager.toggle(&WanId::new("1")).unwrap();
        assert!(first.read());
        assert!(!first.state().last_known_remote());
        assert_eq!(manager.len(), 2);
    }

    #[tokio::test]
    async fn sync_leaves_missing_toggles_alone() {
        let (manager, _) = manager(vec![WanConnection::new(1, true), WanConnection::new(2, true)]).await;
        manager.setup();

        manager.sync_snapshot(&DeviceSnapshot::new(vec![WanConnection::new(1, true)]));

        let stale = manager.toggle(&WanId::new("2")).unwrap();
        assert!(stale.read());
        assert!(stale.state().last_known_remote());
        assert_eq!(manager.len(), 2);
    }

    #[tokio::test]
    async fn command_on_unknown_wan() {
        let (manager, _) = manager(vec![WanConnection::new(1, true)]).await;
        manager.setup();

        let err = manager.turn_off(&WanId::new("7")).await.unwrap_err();
        assert!(matches!(err, Error::WanNotFound(id) if id == WanId::new("7")));
    }

    #[tokio::test]
    async fn config_sets_device_name_and_delay() {
        let (manager, _) = manager(vec![WanConnection::new(1, true)]).await;
        let config = RouterConfig::new("10.0.0.1")
            .with_device_name("balance")
            .with_refresh_delay(Duration::from_secs(5));
        let manager = manager.with_config(&config);
        manager.setup();

        let toggle = manager.toggle(&WanId::new("1")).unwrap();
        assert_eq!(toggle.unique_id(), "balance_wan1_enable");
        assert_eq!(manager.context().scheduler().delay(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn reconciler_follows_coordinator() {
        let (manager, source) = manager(vec![WanConnection::new(1, true)]).await;
        let manager = Arc::new(manager);
        manager.setup();

        let cancel = CancellationToken::new();
        let handle = manager.spawn_reconciler(cancel.clone());

        source.set(vec![WanConnection::new(1, false), WanConnection::new(4, true)]);
        manager.coordinator().refresh().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let first = manager.toggle(&WanId::new("1")).unwrap();
        assert!(first.read());
        assert!(first.state().is_drifted());
        assert!(manager.toggle(&WanId::new("4")).is_some());

        cancel.cancel();
        handle.await.unwrap();
    }
}
