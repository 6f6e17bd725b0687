//! One iteration of the danger-zone cycle.
//!
//! fetch -> extract -> assemble current -> reduce -> predict ->
//! assemble predicted -> reduce. Acquisition failures degrade to empty
//! inputs; any extraction failure or timeout aborts the iteration so
//! nothing partial is published.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use polaris_ai::extract::Extractor;
use polaris_ai::records::{
    DangerRecord, LocationStatus, Prediction, locations_to_markdown, statuses_to_markdown,
};
use polaris_geocoder::GeoResolver;
use polaris_geometry::{ZoneSet, reduce};
use polaris_source::{DataAcquisition, SourceError};
use polaris_zones_models::{Category, LocationRecord};

use crate::assemble::assemble;
use crate::config::CycleConfig;
use crate::resolve::{ResolvedBatch, resolve_all};
use crate::state::CycleOutput;
use crate::CycleError;

/// The external collaborators one iteration talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub acquisition: Arc<dyn DataAcquisition>,
    pub extractor: Arc<dyn Extractor>,
    pub resolver: Arc<dyn GeoResolver>,
}

/// Runs iterations against a fixed set of collaborators.
#[derive(Clone)]
pub struct Pipeline {
    collaborators: Collaborators,
    config: CycleConfig,
}

impl Pipeline {
    #[must_use]
    pub const fn new(collaborators: Collaborators, config: CycleConfig) -> Self {
        Self {
            collaborators,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Runs one full iteration.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Extraction`] if any extraction call fails,
    /// or [`CycleError::Timeout`] if one does not answer in time.
    pub async fn run_once(&self, started_at: DateTime<Utc>) -> Result<CycleOutput, CycleError> {
        let Collaborators {
            acquisition,
            extractor,
            resolver,
        } = &self.collaborators;

        let articles = self
            .acquire("news", acquisition.fetch_news_candidates())
            .await;
        let posts = self
            .acquire("social posts", acquisition.fetch_social_posts())
            .await;
        let government = acquisition.government_locations();
        log::info!(
            "Cycle inputs: {} articles, {} posts, {} government locations",
            articles.len(),
            posts.len(),
            government.len()
        );

        let mut records = Vec::new();
        for article in articles.iter().take(self.config.max_articles) {
            let record = self
                .extract("danger record", extractor.extract_danger_record(article))
                .await?;
            if record.danger_level.value() >= self.config.min_danger_level {
                records.push(record);
            } else {
                log::debug!(
                    "Dropping '{}' at danger level {}",
                    record.title,
                    record.danger_level
                );
            }
        }

        let statuses = self
            .extract(
                "location status",
                extractor.extract_location_status(&government, &posts),
            )
            .await?;

        let disaster_type = most_severe_disaster_type(&records)
            .unwrap_or(self.config.default_disaster_type.as_str())
            .to_string();
        let twitter_insight = statuses_to_markdown(&statuses);
        let gov_insight = locations_to_markdown(&government);

        let advice = self
            .extract(
                "advice",
                extractor.extract_advice(&twitter_insight, &disaster_type),
            )
            .await?;

        let current = current_records(&government, &statuses, &records);
        let polygons = self.zones(resolver.as_ref(), &current, Category::CURRENT).await;

        let predictions = self
            .extract(
                "prediction",
                extractor.extract_prediction(
                    &twitter_insight,
                    &gov_insight,
                    started_at,
                    &disaster_type,
                ),
            )
            .await?;
        let predicted = predicted_records(&predictions);
        let predictions = self
            .zones(resolver.as_ref(), &predicted, Category::PREDICTED)
            .await;

        Ok(CycleOutput {
            polygons,
            predictions,
            advice,
        })
    }

    async fn zones(
        &self,
        resolver: &dyn GeoResolver,
        records: &[LocationRecord],
        order: &[Category],
    ) -> ZoneSet {
        let results = resolve_all(resolver, records, self.config.call_timeout()).await;
        let batch = ResolvedBatch::from_results(results);
        if batch.failures > 0 {
            log::warn!(
                "{} of {} locations could not be resolved",
                batch.failures,
                records.len()
            );
        }
        let outcome = assemble(
            order,
            batch.by_category,
            self.config.gate_ceiling,
            self.config.merge_policy,
        );
        reduce(&outcome.collection, &self.config.simplify_options())
    }

    async fn acquire<T>(
        &self,
        what: &str,
        call: impl Future<Output = Result<Vec<T>, SourceError>>,
    ) -> Vec<T> {
        match tokio::time::timeout(self.config.call_timeout(), call).await {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                log::warn!("Proceeding without {what}: {e}");
                Vec::new()
            }
            Err(_) => {
                log::warn!(
                    "Proceeding without {what}: no answer within {}s",
                    self.config.call_timeout_secs
                );
                Vec::new()
            }
        }
    }

    async fn extract<T>(
        &self,
        what: &'static str,
        call: impl Future<Output = Result<T, polaris_ai::AiError>>,
    ) -> Result<T, CycleError> {
        match tokio::time::timeout(self.config.call_timeout(), call).await {
            Ok(result) => result.map_err(|source| CycleError::Extraction {
                operation: what,
                source,
            }),
            Err(_) => Err(CycleError::Timeout {
                operation: what,
                seconds: self.config.call_timeout_secs,
            }),
        }
    }
}

/// Disaster type of the most severe record; the first record wins ties.
#[must_use]
pub fn most_severe_disaster_type(records: &[DangerRecord]) -> Option<&str> {
    records
        .iter()
        .filter(|r| !r.disaster_type.trim().is_empty())
        .fold(None::<&DangerRecord>, |best, r| match best {
            Some(b) if b.danger_level >= r.danger_level => Some(b),
            _ => Some(r),
        })
        .map(|r| r.disaster_type.trim())
}

/// Location records for the "current" assembly: every government
/// location, every location the posts mark dangerous, and every news
/// location.
#[must_use]
pub fn current_records(
    government: &[String],
    statuses: &[LocationStatus],
    news: &[DangerRecord],
) -> Vec<LocationRecord> {
    let government = government
        .iter()
        .map(|name| LocationRecord::new(name.as_str(), Category::Government));

    let social = statuses
        .iter()
        .filter(|s| s.is_dangerous())
        .map(|s| LocationRecord::new(s.location_name.as_str(), Category::Social));

    let news = news
        .iter()
        .filter(|r| !r.location.trim().is_empty())
        .map(|r| {
            LocationRecord::new(r.location.trim(), Category::News).with_evidence(r.title.as_str())
        });

    government.chain(social).chain(news).collect()
}

/// Location records for the "predicted" assembly.
#[must_use]
pub fn predicted_records(predictions: &[Prediction]) -> Vec<LocationRecord> {
    predictions
        .iter()
        .filter(|p| !p.location.trim().is_empty())
        .map(|p| {
            let record = LocationRecord::new(p.location.trim(), Category::Predicted);
            if p.time_of_impact.is_empty() {
                record
            } else {
                record.with_evidence(format!("expected impact {}", p.time_of_impact))
            }
        })
        .collect()
}
