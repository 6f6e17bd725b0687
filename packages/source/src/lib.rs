#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data acquisition for the danger-zone cycle.
//!
//! Three inputs feed every cycle:
//!
//! - **News** from `NewsAPI` ([`newsapi`]).
//! - **Social-media posts**, currently a sample feed embedded at compile
//!   time ([`feeds`]).
//! - **Government-monitored locations**, a fixed reference list, also
//!   embedded ([`feeds`]).
//!
//! The cycle only sees the [`DataAcquisition`] trait, so any of these can
//! be swapped for a live or fake implementation.

pub mod feeds;
pub mod newsapi;
pub mod retry;

use async_trait::async_trait;
use polaris_source_models::{NewsArticle, SocialPost};

/// Errors that can occur during data acquisition.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The upstream service answered with an error.
    #[error("Upstream error: {message}")]
    Upstream {
        /// Description of what went wrong.
        message: String,
    },

    /// The source is not configured (e.g. a missing API key).
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Produces the raw inputs for one cycle.
#[async_trait]
pub trait DataAcquisition: Send + Sync {
    /// Fetches candidate news articles. An empty list is a valid result.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the news source is unreachable,
    /// unconfigured, or returns a malformed response.
    async fn fetch_news_candidates(&self) -> Result<Vec<NewsArticle>, SourceError>;

    /// Fetches recent social-media posts. An empty list is a valid result.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the feed cannot be read.
    async fn fetch_social_posts(&self) -> Result<Vec<SocialPost>, SourceError>;

    /// Returns the fixed list of government-monitored locations.
    fn government_locations(&self) -> Vec<String>;
}

/// The production acquisition stack: `NewsAPI` plus the embedded social
/// and government feeds.
pub struct StandardAcquisition {
    news: Option<newsapi::NewsApiClient>,
    social_posts: Vec<SocialPost>,
    government: Vec<String>,
}

impl StandardAcquisition {
    /// Builds the stack. Passing `None` for `news` leaves news acquisition
    /// unconfigured; each cycle then proceeds without news.
    #[must_use]
    pub fn new(
        news: Option<newsapi::NewsApiClient>,
        social_posts: Vec<SocialPost>,
        government: Vec<String>,
    ) -> Self {
        Self {
            news,
            social_posts,
            government,
        }
    }

    /// Builds the stack from the embedded feeds.
    #[must_use]
    pub fn with_embedded_feeds(news: Option<newsapi::NewsApiClient>) -> Self {
        Self::new(news, feeds::sample_social_posts(), feeds::monitored_locations())
    }
}

#[async_trait]
impl DataAcquisition for StandardAcquisition {
    async fn fetch_news_candidates(&self) -> Result<Vec<NewsArticle>, SourceError> {
        match &self.news {
            Some(client) => client.fetch_articles().await,
            None => Err(SourceError::Config {
                message: "NEWS_API_KEY environment variable not set".to_string(),
            }),
        }
    }

    async fn fetch_social_posts(&self) -> Result<Vec<SocialPost>, SourceError> {
        Ok(self.social_posts.clone())
    }

    fn government_locations(&self) -> Vec<String> {
        self.government.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_news_is_a_config_error() {
        let sources = StandardAcquisition::with_embedded_feeds(None);
        assert!(matches!(
            sources.fetch_news_candidates().await,
            Err(SourceError::Config { .. })
        ));
    }

    #[tokio::test]
    async fn embedded_feeds_are_served() {
        let sources = StandardAcquisition::with_embedded_feeds(None);
        assert_eq!(sources.fetch_social_posts().await.unwrap().len(), 15);
        assert_eq!(sources.government_locations().len(), 4);
    }
}
