#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location and geometry types shared by the danger-zone pipeline.
//!
//! A [`LocationRecord`] is what the acquisition and extraction stages
//! produce: a free-text place name tagged with the [`Category`] it came
//! from. Resolving a record against a geocoder yields a
//! [`GeometricFeature`], and features are grouped into a
//! [`FeatureCollection`] before simplification.

use geo::{LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Origin classification of a location record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// Government-monitored reference location.
    Government,
    /// Location corroborated by social-media posts.
    Social,
    /// Location extracted from a news article.
    News,
    /// Location the model expects the disaster to spread to.
    Predicted,
}

impl Category {
    /// Categories that make up the "current danger zones" assembly, in
    /// the order they are processed.
    pub const CURRENT: &'static [Self] = &[Self::Government, Self::Social, Self::News];

    /// Categories that make up the "predicted danger zones" assembly.
    pub const PREDICTED: &'static [Self] = &[Self::Predicted];
}

/// A free-text place name with the category it was produced under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    name: String,
    category: Category,
    source_evidence: Option<String>,
}

impl LocationRecord {
    /// Creates a record without supporting evidence.
    #[must_use]
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            source_evidence: None,
        }
    }

    /// Attaches the text that led to this record (article title, post
    /// content, prediction window, ...).
    #[must_use]
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.source_evidence = Some(evidence.into());
        self
    }

    /// The place name as it will be sent to the geocoder.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn source_evidence(&self) -> Option<&str> {
        self.source_evidence.as_deref()
    }
}

/// Boundary geometry of a resolved location.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// A single polygon.
    Polygon(Polygon<f64>),
    /// Several disjoint polygons.
    MultiPolygon(MultiPolygon<f64>),
}

impl FeatureGeometry {
    /// Exterior rings of every constituent polygon, in order.
    ///
    /// Interior rings (holes) are not part of a danger-zone outline and
    /// are ignored.
    #[must_use]
    pub fn exterior_rings(&self) -> Vec<&LineString<f64>> {
        match self {
            Self::Polygon(polygon) => vec![polygon.exterior()],
            Self::MultiPolygon(multi) => multi.iter().map(Polygon::exterior).collect(),
        }
    }

    /// Whether this geometry has more than one part.
    #[must_use]
    pub const fn is_multi_part(&self) -> bool {
        matches!(self, Self::MultiPolygon(_))
    }
}

impl From<Polygon<f64>> for FeatureGeometry {
    fn from(value: Polygon<f64>) -> Self {
        Self::Polygon(value)
    }
}

impl From<MultiPolygon<f64>> for FeatureGeometry {
    fn from(value: MultiPolygon<f64>) -> Self {
        Self::MultiPolygon(value)
    }
}

/// A resolved boundary together with the record it was resolved from.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometricFeature {
    /// The record this geometry belongs to.
    pub record: LocationRecord,
    /// The resolved boundary.
    pub geometry: FeatureGeometry,
}

impl GeometricFeature {
    #[must_use]
    pub fn new(record: LocationRecord, geometry: impl Into<FeatureGeometry>) -> Self {
        Self {
            record,
            geometry: geometry.into(),
        }
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.record.category()
    }
}

/// Ordered sequence of features ready for simplification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    features: Vec<GeometricFeature>,
}

impl FeatureCollection {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    /// Appends features, keeping their order.
    pub fn extend(&mut self, features: impl IntoIterator<Item = GeometricFeature>) {
        self.features.extend(features);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeometricFeature> {
        self.features.iter()
    }

    /// Distinct categories present, in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        let mut seen = Vec::new();
        for feature in &self.features {
            if !seen.contains(&feature.category()) {
                seen.push(feature.category());
            }
        }
        seen
    }
}

impl From<Vec<GeometricFeature>> for FeatureCollection {
    fn from(features: Vec<GeometricFeature>) -> Self {
        Self { features }
    }
}

impl FromIterator<GeometricFeature> for FeatureCollection {
    fn from_iter<T: IntoIterator<Item = GeometricFeature>>(iter: T) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a GeometricFeature;
    type IntoIter = std::slice::Iter<'a, GeometricFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}
