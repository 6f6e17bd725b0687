#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The repeating danger-zone cycle.
//!
//! Each iteration pulls news, social posts and the government location
//! list, asks the extractor for structured records, resolves every place
//! name to a boundary polygon, gates and merges the results per
//! category, simplifies them, and publishes the outcome as one snapshot
//! in [`state::CycleState`].
//!
//! - [`pipeline`] runs a single iteration.
//! - [`assemble`] applies the per-category population gate.
//! - [`resolve`] turns location records into features, one result per
//!   item.
//! - [`orchestrator`] owns the background loop, start and stop.

pub mod assemble;
pub mod config;
pub mod orchestrator;
pub mod pipeline;
pub mod resolve;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::{CycleConfig, MergePolicy};
pub use orchestrator::Orchestrator;
pub use state::{CyclePhase, CycleSnapshot, CycleState, StateView};

use polaris_ai::AiError;
use thiserror::Error;

/// Errors from the cycle and its control surface.
#[derive(Debug, Error)]
pub enum CycleError {
    /// `start` was called while the loop is running.
    #[error("Cycle is already running")]
    AlreadyRunning,

    /// `stop` was called while the loop is not running.
    #[error("Cycle is not running")]
    NotRunning,

    /// An extraction call failed; the iteration is abandoned.
    #[error("Extraction failed during {operation}: {source}")]
    Extraction {
        /// Which extraction step failed.
        operation: &'static str,
        /// Underlying error.
        #[source]
        source: AiError,
    },

    /// An external call did not answer in time.
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// Which call timed out.
        operation: &'static str,
        /// Timeout that elapsed.
        seconds: u64,
    },

    /// The orchestrator was created outside a Tokio runtime.
    #[error("No Tokio runtime to run the cycle on: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),

    /// The cycle configuration is invalid.
    #[error("Invalid cycle configuration: {message}")]
    Config {
        /// Description of the invalid field.
        message: String,
    },
}
