#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Structured disaster-signal extraction backed by an LLM.
//!
//! Supports `OpenAI` and Anthropic Claude through a common
//! [`providers::LlmProvider`] trait. The danger-zone cycle never sees raw
//! model output: every call goes through the [`extract::Extractor`]
//! trait, which returns typed records from [`records`] and fails fast
//! with [`AiError::Schema`] when the model's JSON does not match the
//! expected shape.

pub mod extract;
pub mod prompts;
pub mod providers;
pub mod records;

use thiserror::Error;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The model answered, but not in the shape that was asked for.
    #[error("Schema error: {message}")]
    Schema {
        /// Description of the mismatch.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

impl AiError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }
}
