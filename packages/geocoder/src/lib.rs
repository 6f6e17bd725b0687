#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Resolves free-text place names into boundary polygons.
//!
//! The danger-zone pipeline only needs one capability from a geocoder:
//! given a [`LocationRecord`], return its outline as a
//! [`GeometricFeature`] or fail. [`GeoResolver`] is that seam; the
//! [`nominatim::NominatimResolver`] implementation asks
//! `OpenStreetMap`'s Nominatim for the place's `GeoJSON` boundary.
//!
//! Nominatim has strict rate limits (**1 request per second** on the
//! public instance). The limit is configured in
//! `services/nominatim.toml` and enforced by the resolver itself.

pub mod nominatim;
pub mod service;

use async_trait::async_trait;
use polaris_zones_models::{GeometricFeature, LocationRecord};
use thiserror::Error;

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The geocoder had no polygon boundary for the query.
    #[error("No boundary found for '{query}'")]
    NotFound {
        /// The place name that was looked up.
        query: String,
    },
}

/// Maps a location record to its boundary geometry.
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolves `record` to a polygon or multi-polygon feature.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::NotFound`] when the place has no polygon
    /// boundary, or another [`GeocodeError`] if the lookup itself fails.
    async fn resolve(&self, record: &LocationRecord) -> Result<GeometricFeature, GeocodeError>;
}
