//! The extraction boundary used by the danger-zone cycle.
//!
//! [`Extractor`] is the only way the cycle talks to a model. Each method
//! returns a typed record or fails; the cycle abandons the iteration on
//! any failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use polaris_source_models::{NewsArticle, SocialPost, posts_to_markdown};

use crate::AiError;
use crate::prompts;
use crate::providers::{LlmProvider, Message};
use crate::records::{
    Advice, DangerRecord, LocationStatus, Prediction, locations_to_markdown, parse_list,
    parse_record,
};

/// Turns free text into structured disaster records.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Assesses one news article.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the model call fails or its answer does not
    /// match [`DangerRecord`].
    async fn extract_danger_record(&self, article: &NewsArticle) -> Result<DangerRecord, AiError>;

    /// Decides, per monitored location, whether the posts report danger.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the model call fails or its answer is not a
    /// list of [`LocationStatus`].
    async fn extract_location_status(
        &self,
        government: &[String],
        posts: &[SocialPost],
    ) -> Result<Vec<LocationStatus>, AiError>;

    /// Produces safety advice for the disaster type.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the model call fails or its answer does not
    /// match [`Advice`].
    async fn extract_advice(
        &self,
        twitter_insight: &str,
        disaster_type: &str,
    ) -> Result<Advice, AiError>;

    /// Predicts the locations the disaster will reach next.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the model call fails or its answer is not a
    /// list of [`Prediction`].
    async fn extract_prediction(
        &self,
        twitter_insight: &str,
        gov_insight: &str,
        timestamp: DateTime<Utc>,
        disaster_type: &str,
    ) -> Result<Vec<Prediction>, AiError>;
}

/// [`Extractor`] backed by an LLM provider.
pub struct LlmExtractor {
    provider: Box<dyn LlmProvider>,
}

impl LlmExtractor {
    /// Wraps a provider.
    #[must_use]
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    async fn ask(&self, system: &str, user: String) -> Result<String, AiError> {
        self.provider.complete(system, &[Message::user(user)]).await
    }
}

#[async_trait]
impl Extractor for LlmExtractor {
    async fn extract_danger_record(&self, article: &NewsArticle) -> Result<DangerRecord, AiError> {
        log::debug!("Assessing article: {}", article.title);
        let text = self
            .ask(
                &prompts::danger_record_system(),
                prompts::danger_record_user(article),
            )
            .await?;
        parse_record(&text)
    }

    async fn extract_location_status(
        &self,
        government: &[String],
        posts: &[SocialPost],
    ) -> Result<Vec<LocationStatus>, AiError> {
        let text = self
            .ask(
                &prompts::location_status_system(),
                prompts::location_status_user(
                    &locations_to_markdown(government),
                    &posts_to_markdown(posts),
                ),
            )
            .await?;
        parse_list(&text)
    }

    async fn extract_advice(
        &self,
        twitter_insight: &str,
        disaster_type: &str,
    ) -> Result<Advice, AiError> {
        let text = self
            .ask(
                &prompts::advice_system(),
                prompts::advice_user(twitter_insight, disaster_type),
            )
            .await?;
        parse_record(&text)
    }

    async fn extract_prediction(
        &self,
        twitter_insight: &str,
        gov_insight: &str,
        timestamp: DateTime<Utc>,
        disaster_type: &str,
    ) -> Result<Vec<Prediction>, AiError> {
        let text = self
            .ask(
                &prompts::prediction_system(),
                prompts::prediction_user(twitter_insight, gov_insight, timestamp, disaster_type),
            )
            .await?;
        parse_list(&text)
    }
}
