//! LLM provider abstraction and implementations.
//!
//! Supports Anthropic Claude and `OpenAI` via a common trait. Providers
//! are asked for a single JSON object per call; parsing and validation
//! happen in [`crate::extract`].

pub mod anthropic;
pub mod openai;

use serde::{Deserialize, Serialize};

use crate::AiError;

/// Sampling temperature for extraction calls. Kept low so repeated
/// cycles over the same inputs stay stable.
pub const EXTRACTION_TEMPERATURE: f32 = 0.2;

/// Model used with `OpenAI` when none is configured.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Model used with Anthropic when none is configured.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
}

impl Message {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a chat completion request and returns the model's text.
    ///
    /// The model is instructed to answer with JSON only; the returned
    /// string is not validated here.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails.
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String, AiError>;
}

/// Creates an LLM provider by name, auto-detecting it from available
/// credentials when `provider` is `None`:
///
/// 1. `OPENAI_API_KEY` set -> `OpenAI` (`gpt-4o-mini` by default)
/// 2. `ANTHROPIC_API_KEY` set -> Anthropic Claude
///
/// `model` overrides the provider's default model. API keys always come
/// from the environment.
///
/// # Errors
///
/// Returns [`AiError::Config`] if the provider is unknown or its API key
/// is not set.
pub fn create_provider(
    provider: Option<&str>,
    model: Option<&str>,
) -> Result<Box<dyn LlmProvider>, AiError> {
    let provider = provider.map_or_else(detect_provider, str::to_string);

    match provider.to_lowercase().as_str() {
        "openai" | "gpt" => {
            let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| AiError::Config {
                message: "OPENAI_API_KEY environment variable not set".to_string(),
            })?;
            let model = model.unwrap_or(DEFAULT_OPENAI_MODEL).to_string();
            log::info!("Using OpenAI model {model}");
            Ok(Box::new(openai::OpenAiProvider::new(api_key, model)))
        }
        "anthropic" | "claude" => {
            let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| AiError::Config {
                message: "ANTHROPIC_API_KEY environment variable not set".to_string(),
            })?;
            let model = model.unwrap_or(DEFAULT_ANTHROPIC_MODEL).to_string();
            log::info!("Using Anthropic model {model}");
            Ok(Box::new(anthropic::AnthropicProvider::new(api_key, model)))
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI provider: {other}. Use 'openai' or 'anthropic'."),
        }),
    }
}

/// Auto-detects which provider to use based on available credentials.
///
/// Returns a provider name string that matches the arms in
/// [`create_provider`].
fn detect_provider() -> String {
    if std::env::var("OPENAI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return "openai".to_string();
    }

    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return "anthropic".to_string();
    }

    log::warn!(
        "No AI credentials detected. Set one of: OPENAI_API_KEY or ANTHROPIC_API_KEY. \
         You can also set AI_PROVIDER explicitly."
    );

    // Fall back to openai, which will produce a clear error about the missing key
    "openai".to_string()
}
