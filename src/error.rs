// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `peplink_wan` library.
//!
//! Errors are split by concern: talking to the router, parsing what it sends
//! back, driving a WAN toggle, reconciling against a poller snapshot, and
//! scheduling a background refresh. Only [`CommandError`] is meant to reach
//! the user of a toggle; the reconciliation and refresh errors are absorbed
//! and logged by the components that produce them.

use std::fmt;

use thiserror::Error;

use crate::types::WanId;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A WAN toggle command failed.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// No toggle is registered for the WAN connection.
    #[error("WAN {0} not found")]
    WanNotFound(WanId),

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Errors related to HTTP communication with the router.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the router failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The router answered with a body that is not an API envelope.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors related to parsing router responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),
}

/// The phase of a two-phase configuration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandPhase {
    /// Writing the new WAN configuration.
    Update,
    /// Committing the pending configuration.
    Apply,
}

impl CommandPhase {
    /// Returns the lowercase phase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Apply => "apply",
        }
    }
}

impl fmt::Display for CommandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a WAN enable/disable command.
///
/// Whatever the variant, the toggle's local state is left exactly as it was
/// before the command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The router answered with a non-`ok` status.
    #[error("router rejected {phase} (code {}): {message}", display_code(.code))]
    RemoteRejected {
        /// The phase that was rejected.
        phase: CommandPhase,
        /// Vendor error code, when the router sent one.
        code: Option<i64>,
        /// Vendor error message, or `"Unknown error"`.
        message: String,
    },

    /// The request could not be completed at all.
    #[error("transport failure during {phase}: {source}")]
    Transport {
        /// The phase in which the fault occurred.
        phase: CommandPhase,
        /// The underlying protocol error.
        #[source]
        source: ProtocolError,
    },

    /// The WAN id cannot be encoded in an update payload.
    #[error("WAN id {0} is not numeric")]
    InvalidWanId(WanId),
}

impl CommandError {
    /// Returns the phase that failed, if the command reached the router.
    #[must_use]
    pub fn phase(&self) -> Option<CommandPhase> {
        match self {
            Self::RemoteRejected { phase, .. } | Self::Transport { phase, .. } => Some(*phase),
            Self::InvalidWanId(_) => None,
        }
    }

    /// Returns `true` if the router explicitly refused the change.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::RemoteRejected { .. })
    }
}

#[allow(clippy::ref_option)]
fn display_code(code: &Option<i64>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// A snapshot did not contain the WAN connection being reconciled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// No connection with this id in the snapshot.
    #[error("WAN {0} is not present in the snapshot")]
    WanNotInSnapshot(WanId),
}

/// A best-effort refresh request could not be carried out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshSchedulingError {
    /// A refresh is already running.
    #[error("a refresh is already in progress")]
    Busy,

    /// Fetching the snapshot failed.
    #[error("snapshot fetch failed: {0}")]
    Fetch(String),

    /// The poller has been shut down.
    #[error("poller is stopped")]
    Stopped,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_rejected_display_with_code() {
        let err = CommandError::RemoteRejected {
            phase: CommandPhase::Update,
            code: Some(42),
            message: "Invalid parameter".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "router rejected update (code 42): Invalid parameter"
        );
    }

    #[test]
    fn remote_rejected_display_without_code() {
        let err = CommandError::RemoteRejected {
            phase: CommandPhase::Apply,
            code: None,
            message: "Unknown error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "router rejected apply (code none): Unknown error"
        );
    }

    #[test]
    fn command_error_phase() {
        let err = CommandError::Transport {
            phase: CommandPhase::Apply,
            source: ProtocolError::Timeout(5000),
        };
        assert_eq!(err.phase(), Some(CommandPhase::Apply));
        assert!(!err.is_rejection());

        let err = CommandError::InvalidWanId(WanId::new("lan"));
        assert_eq!(err.phase(), None);
    }

    #[test]
    fn error_from_command_error() {
        let err: Error = CommandError::InvalidWanId(WanId::new("x")).into();
        assert!(matches!(err, Error::Command(CommandError::InvalidWanId(_))));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingField("connection".to_string());
        assert_eq!(err.to_string(), "missing field in response: connection");
    }

    #[test]
    fn reconcile_error_display() {
        let err = ReconcileError::WanNotInSnapshot(WanId::new("7"));
        assert_eq!(err.to_string(), "WAN 7 is not present in the snapshot");
    }
}
