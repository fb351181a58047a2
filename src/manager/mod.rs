// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Toggle setup and snapshot fan-out for one router.
//!
//! The [`WanManager`] creates one [`WanToggle`](crate::toggle::WanToggle)
//! per WAN connection found in the coordinator snapshot and feeds every new
//! snapshot to all of them.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use peplink_wan::config::RouterConfig;
//! use peplink_wan::coordinator::Coordinator;
//! use peplink_wan::event::ToggleEvent;
//! use peplink_wan::manager::WanManager;
//! use peplink_wan::types::WanId;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> peplink_wan::Result<()> {
//!     let config = RouterConfig::new("192.168.50.1").with_access_token("token");
//!     config.validate()?;
//!
//!     let client = config.http_config().into_client()?;
//!     let coordinator = Coordinator::new(client.clone(), config.poll_interval());
//!     coordinator.refresh().await?;
//!
//!     let manager = Arc::new(WanManager::new(Arc::new(client), coordinator.clone()).with_config(&config));
//!     let mut events = manager.subscribe();
//!     manager.setup();
//!
//!     let cancel = CancellationToken::new();
//!     coordinator.spawn(cancel.clone());
//!     manager.spawn_reconciler(cancel.clone());
//!
//!     manager.turn_off(&WanId::new("2")).await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         if let ToggleEvent::Drift { wan_id, local, remote } = event {
//!             println!("WAN {wan_id}: showing {local}, router reports {remote}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod wan_manager;

pub use wan_manager::WanManager;
