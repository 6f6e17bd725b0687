//! Collection-level reduction.
//!
//! Walks a [`FeatureCollection`], pulls the exterior ring of every
//! polygon part and simplifies each one independently. Output order
//! follows input order; nothing is merged or deduplicated across
//! features.

use polaris_zones_models::{FeatureCollection, GeometricFeature};

use crate::{ReducedZone, SimplifyOptions, ZoneSet, simplify};

/// Simplifies every feature in `features`.
///
/// An empty collection yields [`ZoneSet::NoDanger`]. Otherwise there is
/// exactly one [`ReducedZone`] per feature; degenerate rings are dropped
/// from their zone without affecting the rest of the batch.
#[must_use]
pub fn reduce(features: &FeatureCollection, options: &SimplifyOptions) -> ZoneSet {
    if features.is_empty() {
        return ZoneSet::NoDanger;
    }

    let zones = features
        .iter()
        .map(|feature| reduce_feature(feature, options))
        .collect();

    ZoneSet::Zones { zones }
}

fn reduce_feature(feature: &GeometricFeature, options: &SimplifyOptions) -> ReducedZone {
    let rings: Vec<_> = feature
        .geometry
        .exterior_rings()
        .into_iter()
        .filter_map(|ring| simplify(ring, options.tolerance, options.max_points))
        .collect();

    if rings.is_empty() {
        log::warn!(
            "All rings of '{}' were degenerate; emitting an empty zone",
            feature.record.name()
        );
    }

    ReducedZone {
        name: feature.record.name().to_string(),
        category: feature.category(),
        rings,
    }
}
