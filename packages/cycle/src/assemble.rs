//! Per-category population gate and merge.
//!
//! A category's resolved features join the cycle's collection only when
//! `0 < count < ceiling`. An empty category has nothing to show and an
//! oversized one most likely means an upstream anomaly, so both sit out
//! the cycle.

use std::collections::BTreeMap;

use polaris_zones_models::{Category, FeatureCollection, GeometricFeature};

use crate::config::MergePolicy;

/// Whether a category with `count` resolved features passes the gate.
#[must_use]
pub const fn passes_gate(count: usize, ceiling: usize) -> bool {
    count > 0 && count < ceiling
}

/// A category left out of a cycle's merge by the population gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateRejected {
    pub category: Category,
    pub count: usize,
    pub ceiling: usize,
}

/// Result of one assembly pass.
#[derive(Debug, Default)]
pub struct AssemblyOutcome {
    /// Features to reduce.
    pub collection: FeatureCollection,
    /// Categories that passed the gate, in processing order.
    pub accepted: Vec<Category>,
    /// Categories that did not.
    pub rejected: Vec<GateRejected>,
}

/// Merges the gated categories of `by_category`, visiting them in
/// `order`. Categories missing from the map count as empty; categories
/// not listed in `order` are ignored.
#[must_use]
pub fn assemble(
    order: &[Category],
    mut by_category: BTreeMap<Category, Vec<GeometricFeature>>,
    ceiling: usize,
    policy: MergePolicy,
) -> AssemblyOutcome {
    let mut outcome = AssemblyOutcome::default();

    for &category in order {
        let features = by_category.remove(&category).unwrap_or_default();
        let count = features.len();

        if !passes_gate(count, ceiling) {
            let rejected = GateRejected {
                category,
                count,
                ceiling,
            };
            log::info!(
                "Category {category} excluded this cycle: {count} resolved (must be between 1 and {})",
                ceiling.saturating_sub(1)
            );
            outcome.rejected.push(rejected);
            continue;
        }

        match policy {
            MergePolicy::Union => outcome.collection.extend(features),
            MergePolicy::LastWins => outcome.collection = FeatureCollection::from(features),
        }
        outcome.accepted.push(category);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use geo::{Rect, coord};
    use polaris_zones_models::LocationRecord;

    use super::*;

    fn features(category: Category, count: usize) -> Vec<GeometricFeature> {
        (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f64;
                let rect = Rect::new(coord! { x: x, y: 0.0 }, coord! { x: x + 1.0, y: 1.0 });
                GeometricFeature::new(
                    LocationRecord::new(format!("{category}-{i}"), category),
                    rect.to_polygon(),
                )
            })
            .collect()
    }

    #[test]
    fn gate_boundaries_are_exact() {
        assert!(!passes_gate(0, 40));
        assert!(passes_gate(1, 40));
        assert!(passes_gate(39, 40));
        assert!(!passes_gate(40, 40));
        assert!(!passes_gate(41, 40));
    }

    #[test]
    fn gate_boundaries_through_assembly() {
        for (count, included) in [(0, false), (1, true), (39, true), (40, false)] {
            let mut map = BTreeMap::new();
            map.insert(Category::Government, features(Category::Government, count));
            let outcome = assemble(Category::CURRENT, map, 40, MergePolicy::Union);
            assert_eq!(
                outcome.accepted.contains(&Category::Government),
                included,
                "count {count}"
            );
            assert_eq!(outcome.collection.len(), if included { count } else { 0 });
        }
    }

    #[test]
    fn forty_five_government_locations_are_rejected() {
        let mut map = BTreeMap::new();
        map.insert(Category::Government, features(Category::Government, 45));
        map.insert(Category::Social, features(Category::Social, 2));

        let outcome = assemble(Category::CURRENT, map, 40, MergePolicy::Union);
        assert_eq!(
            outcome.rejected,
            vec![
                GateRejected {
                    category: Category::Government,
                    count: 45,
                    ceiling: 40,
                },
                GateRejected {
                    category: Category::News,
                    count: 0,
                    ceiling: 40,
                },
            ]
        );
        assert_eq!(outcome.collection.categories(), vec![Category::Social]);
    }

    #[test]
    fn union_keeps_every_gated_category_in_order() {
        let mut map = BTreeMap::new();
        map.insert(Category::News, features(Category::News, 1));
        map.insert(Category::Government, features(Category::Government, 3));
        map.insert(Category::Social, features(Category::Social, 2));

        let outcome = assemble(Category::CURRENT, map, 40, MergePolicy::Union);
        assert_eq!(outcome.collection.len(), 6);
        assert_eq!(
            outcome.accepted,
            vec![Category::Government, Category::Social, Category::News]
        );
        let names: Vec<_> = outcome
            .collection
            .iter()
            .map(|f| f.record.name().to_string())
            .collect();
        assert_eq!(names[0], "government-0");
        assert_eq!(names[3], "social-0");
        assert_eq!(names[5], "news-0");
    }

    #[test]
    fn last_wins_keeps_only_the_last_gated_category() {
        let mut map = BTreeMap::new();
        map.insert(Category::Government, features(Category::Government, 3));
        map.insert(Category::Social, features(Category::Social, 2));

        let outcome = assemble(Category::CURRENT, map, 40, MergePolicy::LastWins);
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.collection.len(), 2);
        assert_eq!(outcome.collection.categories(), vec![Category::Social]);
    }

    #[test]
    fn categories_outside_the_pass_are_ignored() {
        let mut map = BTreeMap::new();
        map.insert(Category::Predicted, features(Category::Predicted, 3));
        map.insert(Category::Government, features(Category::Government, 3));

        let outcome = assemble(Category::PREDICTED, map, 40, MergePolicy::Union);
        assert_eq!(outcome.collection.categories(), vec![Category::Predicted]);
        assert!(outcome.rejected.is_empty());
    }
}
