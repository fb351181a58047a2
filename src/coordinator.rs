// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic router polling.
//!
//! The [`Coordinator`] owns the only writable copy of the router state. It
//! fetches a fresh [`DeviceSnapshot`] on a fixed interval, or when asked to via
//! [`Poller::request_refresh`], and hands out read-only `Arc`s of it to every
//! toggle. Consumers that want to react to new snapshots subscribe to a
//! `watch` channel instead of polling.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use peplink_wan::coordinator::Coordinator;
//! use peplink_wan::protocol::HttpConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> peplink_wan::Result<()> {
//! let client = HttpConfig::new("192.168.50.1").into_client()?;
//! let coordinator = Coordinator::new(client, Duration::from_secs(30));
//!
//! coordinator.refresh().await?;
//!
//! let cancel = CancellationToken::new();
//! let handle = coordinator.spawn(cancel.clone());
//!
//! // ... on shutdown
//! cancel.cancel();
//! let _ = handle.await;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, RefreshSchedulingError};
use crate::protocol::SnapshotSource;
use crate::types::DeviceSnapshot;

/// Read access to the shared router state.
///
/// Toggles only ever read snapshots; the poller alone writes them.
pub trait Poller: Send + Sync {
    /// Returns the most recent snapshot.
    fn snapshot(&self) -> Arc<DeviceSnapshot>;

    /// Returns `true` if the last poll succeeded.
    fn last_update_success(&self) -> bool;

    /// Requests an immediate out-of-band refresh.
    ///
    /// Best effort: the caller is expected to log and drop any error.
    ///
    /// # Errors
    ///
    /// Returns `RefreshSchedulingError` if the refresh could not be run.
    fn request_refresh(&self) -> impl Future<Output = Result<(), RefreshSchedulingError>> + Send;
}

struct Inner<S> {
    source: S,
    interval: Duration,
    snapshot_tx: watch::Sender<Arc<DeviceSnapshot>>,
    last_update_success: AtomicBool,
    last_updated_at: RwLock<Option<DateTime<Utc>>>,
    refresh_guard: Mutex<()>,
    stopped: AtomicBool,
}

/// Polls a [`SnapshotSource`] and shares the result.
///
/// Cloning is cheap; all clones share the same state.
pub struct Coordinator<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Coordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for Coordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("interval", &self.inner.interval)
            .field(
                "last_update_success",
                &self.inner.last_update_success.load(Ordering::Acquire),
            )
            .finish_non_exhaustive()
    }
}

impl<S: SnapshotSource + 'static> Coordinator<S> {
    /// Default poll interval.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    /// Creates a coordinator with an empty initial snapshot.
    ///
    /// `last_update_success` starts as `false` until the first poll succeeds.
    #[must_use]
    pub fn new(source: S, interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(DeviceSnapshot::default()));
        Self {
            inner: Arc::new(Inner {
                source,
                interval,
                snapshot_tx,
                last_update_success: AtomicBool::new(false),
                last_updated_at: RwLock::new(None),
                refresh_guard: Mutex::new(()),
                stopped: AtomicBool::new(false),
            }),
        }
    }

    /// Returns `true` once a poll loop started by [`spawn`](Self::spawn)
    /// has been cancelled.
    ///
    /// A stopped coordinator refuses [`Poller::request_refresh`]; explicit
    /// calls to [`refresh`](Self::refresh) still go through.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Returns the time of the last successful poll.
    #[must_use]
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_updated_at.read()
    }

    /// Subscribes to snapshot updates.
    ///
    /// The receiver sees every snapshot published after it was created.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<DeviceSnapshot>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Fetches and publishes a new snapshot, waiting for any running fetch.
    ///
    /// On failure the previous snapshot stays in place and
    /// `last_update_success` becomes `false`.
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot cannot be fetched.
    pub async fn refresh(&self) -> Result<(), Error> {
        let _guard = self.inner.refresh_guard.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<(), Error> {
        match self.inner.source.fetch_snapshot().await {
            Ok(snapshot) => {
                tracing::debug!(
                    connections = snapshot.connections.len(),
                    "Fetched router snapshot"
                );
                *self.inner.last_updated_at.write() = Some(Utc::now());
                self.inner.last_update_success.store(true, Ordering::Release);
                self.inner.snapshot_tx.send_replace(Arc::new(snapshot));
                Ok(())
            }
            Err(e) => {
                self.inner
                    .last_update_success
                    .store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Spawns the periodic poll loop.
    ///
    /// The first poll happens one interval after spawning; call
    /// [`refresh`](Self::refresh) beforehand for an initial snapshot. The
    /// loop runs until `cancel` fires. Failed polls are logged and retried
    /// at the next tick.
    pub fn spawn(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(coordinator.inner.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await;

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        coordinator.inner.stopped.store(true, Ordering::Release);
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = coordinator.refresh().await {
                            tracing::warn!(error = %e, "Periodic refresh failed");
                        }
                    }
                }
            }

            tracing::debug!("Poll loop stopped");
        })
    }
}

impl<S: SnapshotSource + 'static> Poller for Coordinator<S> {
    fn snapshot(&self) -> Arc<DeviceSnapshot> {
        Arc::clone(&self.inner.snapshot_tx.borrow())
    }

    fn last_update_success(&self) -> bool {
        self.inner.last_update_success.load(Ordering::Acquire)
    }

    async fn request_refresh(&self) -> Result<(), RefreshSchedulingError> {
        if self.is_stopped() {
            return Err(RefreshSchedulingError::Stopped);
        }
        let Ok(_guard) = self.inner.refresh_guard.try_lock() else {
            return Err(RefreshSchedulingError::Busy);
        };

        self.refresh_locked()
            .await
            .map_err(|e| RefreshSchedulingError::Fetch(e.to_string()))
    }
}
