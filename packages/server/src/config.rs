//! Application configuration.
//!
//! Read from a TOML file (`--config` / `POLARIS_CONFIG`), with every
//! section optional. `BIND_ADDR`, `PORT`, `AI_PROVIDER` and `AI_MODEL`
//! override the file. API keys are only ever read from the environment.

use std::path::{Path, PathBuf};

use polaris_cycle::{CycleConfig, CycleError};
use polaris_geocoder::service::NominatimService;
use polaris_source::newsapi::NewsApiConfig;
use serde::Deserialize;

/// Errors loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`AppConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error(transparent)]
    Invalid(#[from] CycleError),
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// `[geocoder]` section: overrides for the embedded Nominatim service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub rate_limit_ms: Option<u64>,
    pub country_codes: Option<String>,
}

impl GeocoderConfig {
    /// The embedded service definition with these overrides applied.
    #[must_use]
    pub fn service(&self) -> NominatimService {
        let mut service = NominatimService::default();
        if let Some(base_url) = &self.base_url {
            service.base_url.clone_from(base_url);
        }
        if let Some(user_agent) = &self.user_agent {
            service.user_agent.clone_from(user_agent);
        }
        if let Some(rate_limit_ms) = self.rate_limit_ms {
            service.rate_limit_ms = rate_limit_ms;
        }
        if self.country_codes.is_some() {
            service.country_codes.clone_from(&self.country_codes);
        }
        service
    }
}

/// `[ai]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// `openai` or `anthropic`; auto-detected from API keys when unset.
    pub provider: Option<String>,
    /// Model name; provider default when unset.
    pub model: Option<String>,
}

/// The whole application config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cycle: CycleConfig,
    pub news: NewsApiConfig,
    pub geocoder: GeocoderConfig,
    pub ai: AiConfig,
}

impl AppConfig {
    /// Loads the config file at `path` (defaults when `None`), applies
    /// environment overrides and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a
    /// value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.apply_env();
        config.cycle.validate()?;
        Ok(config)
    }

    /// Parses a config document without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is invalid.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(text)?)
    }

    fn apply_env(&mut self) {
        if let Ok(bind_addr) = std::env::var("BIND_ADDR") {
            self.server.bind_addr = bind_addr;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(provider) = std::env::var("AI_PROVIDER") {
            self.ai.provider = Some(provider);
        }
        if let Ok(model) = std::env::var("AI_MODEL") {
            self.ai.model = Some(model);
        }
    }
}
