//! In-memory collaborators for driving the cycle without network access.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geo::{Coord, LineString, Polygon};
use polaris_ai::AiError;
use polaris_ai::extract::Extractor;
use polaris_ai::records::{
    Advice, DangerLevel, DangerRecord, DangerStatus, LocationStatus, Prediction,
};
use polaris_geocoder::{GeoResolver, GeocodeError};
use polaris_source::{DataAcquisition, SourceError};
use polaris_source_models::{NewsArticle, SocialPost};
use polaris_zones_models::{GeometricFeature, LocationRecord};
use tokio::sync::Notify;

/// Fixed acquisition data.
pub struct FakeSources {
    pub articles: Vec<NewsArticle>,
    pub news_error: bool,
    pub posts: Vec<SocialPost>,
    pub government: Vec<String>,
}

impl FakeSources {
    /// Two government locations, two posts and one level-5 article.
    pub fn standard() -> Self {
        Self {
            articles: vec![article("Lilydale, VIC, Australia", 5)],
            news_error: false,
            posts: vec![
                SocialPost {
                    author: "FireWatchVIC".to_string(),
                    content: "Fire spreading in Yarra Ranges National Park".to_string(),
                    timestamp: "2025-01-22T15:00:00Z".parse().unwrap(),
                },
                SocialPost {
                    author: "HikerJohn".to_string(),
                    content: "Clear skies at Plenty Gorge".to_string(),
                    timestamp: "2025-01-22T15:10:00Z".parse().unwrap(),
                },
            ],
            government: vec![
                "Yarra Ranges National Park, VIC, Australia".to_string(),
                "Plenty Gorge Park, VIC, Australia".to_string(),
            ],
        }
    }
}

/// An article the fake extractor reads back as a record at `level`
/// located at `place`.
pub fn article(place: &str, level: u8) -> NewsArticle {
    NewsArticle {
        title: place.to_string(),
        content: level.to_string(),
        url: None,
        published_at: None,
    }
}

#[async_trait]
impl DataAcquisition for FakeSources {
    async fn fetch_news_candidates(&self) -> Result<Vec<NewsArticle>, SourceError> {
        if self.news_error {
            return Err(SourceError::Upstream {
                message: "HTTP 503".to_string(),
            });
        }
        Ok(self.articles.clone())
    }

    async fn fetch_social_posts(&self) -> Result<Vec<SocialPost>, SourceError> {
        Ok(self.posts.clone())
    }

    fn government_locations(&self) -> Vec<String> {
        self.government.clone()
    }
}

/// Deterministic extractor.
///
/// - Articles become records located at their title, at the level
///   written in their content.
/// - The first government location is dangerous, the rest are not.
/// - Advice for the n-th call says `call n`.
/// - One prediction per call.
#[derive(Default)]
pub struct FakeExtractor {
    pub record_calls: AtomicUsize,
    pub advice_calls: AtomicUsize,
    /// Fail the n-th advice call.
    pub fail_advice_on: Option<usize>,
    /// Hold the first advice call until notified.
    pub gate: Option<Arc<Notify>>,
    /// Never answer prediction calls.
    pub hang_prediction: bool,
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract_danger_record(&self, article: &NewsArticle) -> Result<DangerRecord, AiError> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        let level = article.content.parse().map_err(|_| AiError::Schema {
            message: format!("bad level {:?}", article.content),
        })?;
        Ok(DangerRecord {
            title: article.title.clone(),
            location: article.title.clone(),
            disaster_type: if level == 5 { "bushfire" } else { "flood" }.to_string(),
            emergency_number: "000".to_string(),
            danger_level: DangerLevel::new(level)?,
            summary: String::new(),
        })
    }

    async fn extract_location_status(
        &self,
        government: &[String],
        _posts: &[SocialPost],
    ) -> Result<Vec<LocationStatus>, AiError> {
        Ok(government
            .iter()
            .enumerate()
            .map(|(i, name)| LocationStatus {
                location_name: name.clone(),
                status: if i == 0 {
                    DangerStatus::Dangerous
                } else {
                    DangerStatus::NotDangerous
                },
            })
            .collect())
    }

    async fn extract_advice(
        &self,
        _twitter_insight: &str,
        disaster_type: &str,
    ) -> Result<Advice, AiError> {
        let call = self.advice_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(gate) = self.gate.as_ref().filter(|_| call == 1) {
            gate.notified().await;
        }
        if self.fail_advice_on == Some(call) {
            return Err(AiError::Provider {
                message: "model unavailable".to_string(),
            });
        }
        Ok(Advice {
            vehicle_advice: "large 4WD".to_string(),
            clothing_advice: format!("{disaster_type} protective clothing"),
            general_advice: format!("call {call}"),
        })
    }

    async fn extract_prediction(
        &self,
        _twitter_insight: &str,
        _gov_insight: &str,
        timestamp: DateTime<Utc>,
        _disaster_type: &str,
    ) -> Result<Vec<Prediction>, AiError> {
        if self.hang_prediction {
            std::future::pending::<()>().await;
        }
        Ok(vec![Prediction {
            location: "Mooroolbark, VIC, Australia".to_string(),
            predicted_time: timestamp.to_rfc3339(),
            time_of_impact: "2025-01-22T18:00:00Z".to_string(),
        }])
    }
}

/// Resolves every name to a 200-vertex circle, except names starting
/// with `Nowhere`.
pub struct FakeResolver;

#[async_trait]
impl GeoResolver for FakeResolver {
    async fn resolve(&self, record: &LocationRecord) -> Result<GeometricFeature, GeocodeError> {
        if record.name().starts_with("Nowhere") {
            return Err(GeocodeError::NotFound {
                query: record.name().to_string(),
            });
        }
        let ring: Vec<Coord<f64>> = (0..200)
            .map(|i| {
                let angle = f64::from(i) / 200.0 * std::f64::consts::TAU;
                Coord {
                    x: 145.0 + angle.cos(),
                    y: -37.8 + angle.sin(),
                }
            })
            .collect();
        Ok(GeometricFeature::new(
            record.clone(),
            Polygon::new(LineString::from(ring), vec![]),
        ))
    }
}

/// Polls `condition` on the (paused) Tokio clock until it holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("condition not reached");
}
