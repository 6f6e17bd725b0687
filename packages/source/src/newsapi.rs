//! `NewsAPI` client.
//!
//! Queries the `/v2/everything` endpoint for recent disaster coverage on a
//! configured set of news domains.
//!
//! See <https://newsapi.org/docs/endpoints/everything>

use polaris_source_models::NewsArticle;
use serde::Deserialize;

use crate::{SourceError, retry};

/// Query settings for `NewsAPI`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    /// Endpoint URL.
    pub base_url: String,
    /// Search expression (`NewsAPI` query syntax).
    pub query: String,
    /// Domains to restrict the search to.
    pub domains: Vec<String>,
    /// Maximum articles requested per cycle.
    pub page_size: u32,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2/everything".to_string(),
            query: "bushfire AND today".to_string(),
            domains: [
                "environment.gov.au",
                "theconversation.com/au",
                "australiangeographic.com.au",
                "climate.gov",
                "skynews.com.au",
                "theaustralian.com.au",
                "9news.com.au",
                "bbc.co.uk/weather",
                "theage.com.au",
                "bom.gov.au",
                "abc.net.au",
                "news.com.au",
                "smh.com.au",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            page_size: 20,
        }
    }
}

/// Authenticated `NewsAPI` client.
pub struct NewsApiClient {
    client: reqwest::Client,
    api_key: String,
    config: NewsApiConfig,
}

impl NewsApiClient {
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: String, config: NewsApiConfig) -> Self {
        Self {
            client,
            api_key,
            config,
        }
    }

    /// Creates a client using the `NEWS_API_KEY` environment variable.
    ///
    /// Returns `None` when the variable is unset.
    #[must_use]
    pub fn from_env(client: reqwest::Client, config: NewsApiConfig) -> Option<Self> {
        match std::env::var("NEWS_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(Self::new(client, key, config)),
            _ => {
                log::warn!("NEWS_API_KEY not set; cycles will run without news coverage");
                None
            }
        }
    }

    /// Fetches the current page of matching articles.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails or `NewsAPI` reports an
    /// error.
    pub async fn fetch_articles(&self) -> Result<Vec<NewsArticle>, SourceError> {
        let domains = self.config.domains.join(",");
        let page_size = self.config.page_size.to_string();

        let body = retry::send_json(|| {
            self.client
                .get(&self.config.base_url)
                .header("X-Api-Key", &self.api_key)
                .query(&[
                    ("q", self.config.query.as_str()),
                    ("domains", domains.as_str()),
                    ("pageSize", page_size.as_str()),
                    ("sortBy", "publishedAt"),
                ])
        })
        .await?;

        let articles = parse_articles(body)?;
        log::info!("NewsAPI returned {} articles", articles.len());
        Ok(articles)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    content: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Parses a `NewsAPI` response body. Articles without a title are dropped;
/// a missing `content` falls back to the description.
fn parse_articles(body: serde_json::Value) -> Result<Vec<NewsArticle>, SourceError> {
    let response: NewsApiResponse = serde_json::from_value(body)?;

    if response.status != "ok" {
        return Err(SourceError::Upstream {
            message: response
                .message
                .unwrap_or_else(|| format!("NewsAPI status '{}'", response.status)),
        });
    }

    Ok(response
        .articles
        .into_iter()
        .filter_map(|a| {
            let title = a.title.filter(|t| !t.trim().is_empty())?;
            Some(NewsArticle {
                title,
                content: a.content.or(a.description).unwrap_or_default(),
                url: a.url,
                published_at: a.published_at,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_articles_and_falls_back_to_description() {
        let body = serde_json::json!({
            "status": "ok",
            "totalResults": 3,
            "articles": [
                {
                    "title": "Emergency warning for Yarra Ranges",
                    "content": "Residents told to leave now...",
                    "url": "https://example.com/a",
                    "publishedAt": "2025-01-22T15:00:00Z"
                },
                { "title": "Fire update", "content": null, "description": "Crews on scene" },
                { "title": null, "content": "orphan" }
            ]
        });

        let articles = parse_articles(body).unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Emergency warning for Yarra Ranges");
        assert!(articles[0].published_at.is_some());
        assert_eq!(articles[1].content, "Crews on scene");
    }

    #[test]
    fn error_status_is_upstream_error() {
        let body = serde_json::json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid"
        });

        match parse_articles(body) {
            Err(SourceError::Upstream { message }) => assert!(message.contains("invalid")),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn default_config_targets_bushfire_coverage() {
        let config = NewsApiConfig::default();
        assert_eq!(config.query, "bushfire AND today");
        assert!(config.domains.contains(&"abc.net.au".to_string()));
    }
}
