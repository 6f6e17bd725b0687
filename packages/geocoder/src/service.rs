//! Compile-time Nominatim service configuration.
//!
//! The default endpoint, user agent, and rate limit are defined in
//! `services/nominatim.toml` and embedded at compile time. Deployments
//! can override any field through the application config.

use serde::Deserialize;

/// Nominatim service configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NominatimService {
    /// Unique identifier (`"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// `User-Agent` header; the public instance rejects anonymous clients.
    pub user_agent: String,
    /// Minimum delay between requests in milliseconds.
    pub rate_limit_ms: u64,
    /// Comma-separated ISO country codes to restrict results to.
    #[serde(default)]
    pub country_codes: Option<String>,
}

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

impl Default for NominatimService {
    /// Returns the embedded service definition.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (this is a compile-time
    /// guarantee since the config is embedded and covered by tests).
    fn default() -> Self {
        toml::de::from_str(NOMINATIM_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded nominatim service: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_service_parses() {
        let service = NominatimService::default();
        assert_eq!(service.id, "nominatim");
        assert!(service.base_url.starts_with("https://"));
        assert_eq!(service.rate_limit_ms, 1000);
        assert!(!service.user_agent.is_empty());
    }
}
