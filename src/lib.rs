// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `peplink_wan` - WAN enable/disable toggles for Peplink routers.
//!
//! This library turns the WAN connections of a Peplink router into toggles
//! that answer immediately, even though the router needs several seconds to
//! act on a configuration change.
//!
//! # How it works
//!
//! - **Commands** write the new `enable` flag through the router's HTTP API
//!   (`update`, then `apply`). Once both succeed the toggle shows the new
//!   value right away and a refresh of the router state is scheduled a few
//!   seconds later.
//! - **Polling** is done by a shared [`Coordinator`] that fetches a
//!   [`DeviceSnapshot`] on a fixed interval.
//! - **Reconciliation** records each snapshot next to the toggle's own value
//!   without overwriting it, so a slow router never makes a toggle flip back.
//!   Mismatches are reported as [`ToggleEvent::Drift`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use peplink_wan::{Coordinator, RouterConfig, WanId, WanManager};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> peplink_wan::Result<()> {
//!     let config = RouterConfig::new("192.168.50.1").with_access_token("token");
//!     let client = config.http_config().into_client()?;
//!
//!     let coordinator = Coordinator::new(client.clone(), config.poll_interval());
//!     coordinator.refresh().await?;
//!
//!     let manager = Arc::new(WanManager::new(Arc::new(client), coordinator.clone()));
//!     manager.setup();
//!
//!     let cancel = CancellationToken::new();
//!     coordinator.spawn(cancel.clone());
//!     manager.spawn_reconciler(cancel.clone());
//!
//!     manager.turn_on(&WanId::new("2")).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod scheduler;
pub mod state;
pub mod toggle;
pub mod types;

pub use config::RouterConfig;
pub use coordinator::{Coordinator, Poller};
pub use error::{
    CommandError, CommandPhase, Error, ParseError, ProtocolError, ReconcileError,
    RefreshSchedulingError, Result,
};
pub use event::{EventBus, StatePublisher, ToggleEvent};
pub use manager::WanManager;
#[cfg(feature = "http")]
pub use protocol::{HttpClient, HttpConfig};
pub use protocol::{ApiResponse, ConfigClient, SnapshotSource, WanUpdate};
pub use scheduler::RefreshScheduler;
pub use state::ToggleState;
pub use toggle::{ToggleContext, WanToggle};
pub use types::{DeviceSnapshot, WanConnection, WanDiagnostics, WanId};
