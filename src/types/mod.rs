// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the library.
//!
//! # Types
//!
//! - [`WanId`] - Identifier of a WAN connection
//! - [`WanConnection`] - One WAN connection as reported by the router
//! - [`DeviceSnapshot`] - All WAN connections at one point in time
//! - [`WanDiagnostics`] - Extra attributes exposed next to a toggle

mod snapshot;
mod wan;

pub use snapshot::DeviceSnapshot;
pub use wan::{WanConnection, WanDiagnostics, WanId};
