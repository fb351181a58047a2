// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Toggle state tracking.
//!
//! A WAN toggle keeps two values apart: the state it shows to the user, and
//! the state the router last reported. The first only changes when a command
//! succeeds; the second follows every poller snapshot. Keeping both makes the
//! window between a committed change and the router catching up observable.
//!
//! # Examples
//!
//! ```
//! use peplink_wan::state::ToggleState;
//! use peplink_wan::types::WanId;
//!
//! let state = ToggleState::new(WanId::new("1"), false);
//! assert!(!state.local_enabled());
//! assert!(!state.is_drifted());
//! ```

mod toggle_state;

pub use toggle_state::ToggleState;
