#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the Polaris danger-zone server.
//!
//! Zone and advice payloads are serialized straight from the cycle's
//! snapshot types; this crate holds the informational and health
//! responses that wrap the control surface.

use serde::{Deserialize, Serialize};

/// Outcome reported by the control and getter endpoints when they have
/// no data payload to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    /// The cycle was started.
    Started,
    /// `start-cycle` was called while the cycle was running.
    AlreadyRunning,
    /// A stop was requested; the in-flight iteration will finish first.
    Stopping,
    /// The cycle is not running (stop misuse, or a getter before start).
    NotRunning,
    /// The cycle is running but has not published yet.
    Pending,
    /// The server could not carry out the request.
    Error,
}

/// Informational response: a status plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Machine-readable status.
    pub status: ApiStatus,
    /// Message suitable for showing to a user.
    pub message: String,
}

impl ApiMessage {
    #[must_use]
    pub fn new(status: ApiStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Orchestrator phase: `idle`, `running`, `stop_requested`, or
    /// `stopped`.
    pub phase: String,
    /// Whether the cycle is running.
    pub running: bool,
    /// Whether the current run has published data.
    pub active: bool,
    /// Number of the last published cycle, 0 if none.
    pub last_cycle: u64,
}
