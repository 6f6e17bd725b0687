#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Polygon simplification with a hard output-size bound.
//!
//! Geocoded boundaries can carry thousands of vertices. Before they are
//! handed to a client every exterior ring is run through
//! Ramer–Douglas–Peucker simplification and, if that is not enough,
//! stride-downsampled so that no ring ever exceeds the configured vertex
//! budget. See [`simplify::simplify`] for the ring-level algorithm and
//! [`reduce::reduce`] for the collection-level pass.

pub mod reduce;
pub mod simplify;

use polaris_zones_models::Category;
use serde::Serialize;

pub use reduce::reduce;
pub use simplify::simplify;

/// Default simplification tolerance, in decimal degrees.
pub const DEFAULT_TOLERANCE: f64 = 0.006;

/// Default vertex budget per ring.
pub const DEFAULT_MAX_POINTS: usize = 40;

/// Tuning for [`simplify`] and [`reduce`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifyOptions {
    /// Distance threshold below which vertices are dropped.
    pub tolerance: f64,
    /// Hard ceiling on the number of points in an output ring.
    pub max_points: usize,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

/// A simplified ring of `[lon, lat]` pairs.
///
/// Only [`simplify`] builds these, so the length never exceeds the
/// budget it was produced under.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimplifiedBoundary(Vec<[f64; 2]>);

impl SimplifiedBoundary {
    /// The ring's points as `[x, y]` pairs.
    #[must_use]
    pub fn points(&self) -> &[[f64; 2]] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The simplified rings of one input feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReducedZone {
    /// Name of the location the feature was resolved from.
    #[serde(rename = "id")]
    pub name: String,
    /// Origin category of the feature.
    pub category: Category,
    /// One entry per exterior ring. May be empty when every ring was
    /// degenerate.
    #[serde(rename = "coordinates")]
    pub rings: Vec<SimplifiedBoundary>,
}

/// Output of [`reduce`].
///
/// `NoDanger` is returned for an empty input so callers can tell "nothing
/// to show" apart from a feature list whose rings all collapsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ZoneSet {
    /// No feature survived assembly this cycle.
    NoDanger,
    /// One reduced zone per input feature, in input order.
    Zones {
        /// The reduced zones.
        zones: Vec<ReducedZone>,
    },
}

impl ZoneSet {
    #[must_use]
    pub const fn is_no_danger(&self) -> bool {
        matches!(self, Self::NoDanger)
    }

    /// The reduced zones, or an empty slice for the sentinel.
    #[must_use]
    pub fn zones(&self) -> &[ReducedZone] {
        match self {
            Self::NoDanger => &[],
            Self::Zones { zones } => zones,
        }
    }
}
