//! Batch location resolution.
//!
//! Every record is resolved independently with its own timeout. The
//! batch never fails as a whole: each item comes back as a `Result` and
//! the caller decides what to do with the failures.

use std::collections::BTreeMap;
use std::time::Duration;

use polaris_geocoder::{GeoResolver, GeocodeError};
use polaris_zones_models::{Category, GeometricFeature, LocationRecord};

/// Why one record produced no geometry.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionFailure {
    /// The geocoder failed or had no boundary for the place.
    #[error("'{name}': {source}")]
    Geocode {
        /// Location name.
        name: String,
        /// Underlying geocoder error.
        #[source]
        source: GeocodeError,
    },

    /// The geocoder did not answer in time.
    #[error("'{name}': timed out after {seconds}s")]
    TimedOut {
        /// Location name.
        name: String,
        /// Timeout that elapsed.
        seconds: u64,
    },
}

/// Resolves each record in order.
pub async fn resolve_all(
    resolver: &dyn GeoResolver,
    records: &[LocationRecord],
    timeout: Duration,
) -> Vec<Result<GeometricFeature, ResolutionFailure>> {
    let mut results = Vec::with_capacity(records.len());
    for record in records {
        let outcome = match tokio::time::timeout(timeout, resolver.resolve(record)).await {
            Ok(Ok(feature)) => Ok(feature),
            Ok(Err(source)) => Err(ResolutionFailure::Geocode {
                name: record.name().to_string(),
                source,
            }),
            Err(_) => Err(ResolutionFailure::TimedOut {
                name: record.name().to_string(),
                seconds: timeout.as_secs(),
            }),
        };
        results.push(outcome);
    }
    results
}

/// Successful resolutions grouped by category, plus the failure count.
#[derive(Debug, Default)]
pub struct ResolvedBatch {
    /// Features per category, each in input order.
    pub by_category: BTreeMap<Category, Vec<GeometricFeature>>,
    /// Items that produced no geometry.
    pub failures: usize,
}

impl ResolvedBatch {
    /// Groups resolution results, logging each failure.
    #[must_use]
    pub fn from_results(results: Vec<Result<GeometricFeature, ResolutionFailure>>) -> Self {
        let mut batch = Self::default();
        for result in results {
            match result {
                Ok(feature) => batch
                    .by_category
                    .entry(feature.category())
                    .or_default()
                    .push(feature),
                Err(e) => {
                    log::warn!("Skipping unresolved location {e}");
                    batch.failures += 1;
                }
            }
        }
        batch
    }

    /// Number of features resolved for `category`.
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        self.by_category.get(&category).map_or(0, Vec::len)
    }
}
