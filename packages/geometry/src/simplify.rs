//! Ring-level simplification.
//!
//! Two stages:
//!
//! 1. Ramer–Douglas–Peucker via [`geo::Simplify`] drops vertices whose
//!    deviation from the simplified outline is within `tolerance`.
//! 2. If the ring is still over budget it is downsampled by keeping every
//!    `len / max_points`-th point and truncating to exactly `max_points`.
//!
//! The second stage trades even spacing for a guaranteed ceiling.

use geo::{Coord, LineString, Simplify};

use crate::SimplifiedBoundary;

/// Rings with fewer distinct vertices than this cannot describe an area.
const MIN_RING_POINTS: usize = 3;

/// Simplifies one ring so that it holds at most `max_points` points.
///
/// Returns `None` for degenerate input (fewer than three vertices once a
/// closing duplicate is discounted, or any non-finite coordinate) and
/// when `max_points` is zero. The result is deterministic for identical
/// input.
#[must_use]
pub fn simplify(
    ring: &LineString<f64>,
    tolerance: f64,
    max_points: usize,
) -> Option<SimplifiedBoundary> {
    if max_points == 0 {
        return None;
    }

    let vertices = if ring.is_closed() && !ring.0.is_empty() {
        ring.0.len() - 1
    } else {
        ring.0.len()
    };
    if vertices < MIN_RING_POINTS {
        log::debug!("Skipping degenerate ring with {vertices} vertices");
        return None;
    }

    if ring.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        log::debug!("Skipping ring with non-finite coordinates");
        return None;
    }

    let simplified = ring.simplify(tolerance);
    let points = downsample(simplified.0, max_points)
        .into_iter()
        .map(|c| [c.x, c.y])
        .collect();

    Some(SimplifiedBoundary(points))
}

/// Stride-downsamples `coords` to at most `max_points` entries.
///
/// Input already within budget is returned untouched.
fn downsample(coords: Vec<Coord<f64>>, max_points: usize) -> Vec<Coord<f64>> {
    if coords.len() <= max_points {
        return coords;
    }

    let stride = coords.len() / max_points;
    coords
        .into_iter()
        .step_by(stride)
        .take(max_points)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use geo::coord;

    use super::*;

    /// A closed circle with `n` distinct vertices (`n + 1` points).
    #[allow(clippy::cast_precision_loss)]
    fn circle(n: usize, radius: f64) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = (0..n)
            .map(|i| {
                let theta = TAU * i as f64 / n as f64;
                coord! { x: radius * theta.cos(), y: radius * theta.sin() }
            })
            .collect();
        coords.push(coords[0]);
        LineString::new(coords)
    }

    /// A ring with exactly `len` points that RDP cannot shrink at the
    /// default tolerance.
    fn incompressible(len: usize) -> LineString<f64> {
        let ring = circle(len - 1, 1000.0);
        assert_eq!(ring.0.len(), len);
        ring
    }

    #[test]
    fn ceiling_holds_for_any_ring_size() {
        for len in [4, 39, 40, 41, 1000] {
            let ring = incompressible(len);
            let out = simplify(&ring, 0.006, 40).unwrap();
            assert!(out.len() <= 40, "{len}-point ring produced {}", out.len());
        }

        let triangle = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        assert!(simplify(&triangle, 0.006, 40).unwrap().len() <= 40);
    }

    #[test]
    fn over_budget_ring_is_truncated_to_exactly_max_points() {
        let out = simplify(&incompressible(41), 0.006, 40).unwrap();
        assert_eq!(out.len(), 40);

        let out = simplify(&incompressible(1000), 0.006, 40).unwrap();
        assert_eq!(out.len(), 40);
    }

    #[test]
    fn ring_within_budget_is_not_downsampled() {
        let ring = incompressible(40);
        let out = simplify(&ring, 0.006, 40).unwrap();
        let expected: Vec<[f64; 2]> = ring.coords().map(|c| [c.x, c.y]).collect();
        assert_eq!(out.points(), expected.as_slice());
    }

    #[test]
    fn drops_nearly_collinear_points_and_keeps_the_rectangle() {
        let ring = LineString::from(vec![
            (0.0, 0.0),
            (0.0, 0.001),
            (0.0, 1.0),
            (0.001, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
            (0.0, 0.0),
        ]);

        let out = simplify(&ring, 0.006, 5).unwrap();

        assert!(out.len() <= 5);
        for corner in [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0]] {
            assert!(out.points().contains(&corner), "missing corner {corner:?}");
        }
        assert!(!out.points().contains(&[0.0, 0.001]));
        assert!(!out.points().contains(&[0.001, 1.0]));
    }

    #[test]
    fn degenerate_rings_yield_nothing() {
        assert!(simplify(&LineString::new(vec![]), 0.006, 40).is_none());
        assert!(simplify(&LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]), 0.006, 40).is_none());
        assert!(
            simplify(
                &LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
                0.006,
                40
            )
            .is_none()
        );
        assert!(
            simplify(
                &LineString::from(vec![(0.0, 0.0), (f64::NAN, 1.0), (1.0, 0.0)]),
                0.006,
                40
            )
            .is_none()
        );
    }

    #[test]
    fn zero_budget_yields_nothing() {
        assert!(simplify(&incompressible(10), 0.006, 0).is_none());
    }

    #[test]
    fn simplification_is_deterministic() {
        let ring = circle(500, 0.05);
        assert_eq!(simplify(&ring, 0.006, 40), simplify(&ring, 0.006, 40));
    }

    #[test]
    fn downsample_keeps_every_stride_point() {
        let coords: Vec<Coord<f64>> = (0..10).map(|i| coord! { x: f64::from(i), y: 0.0 }).collect();
        let out = downsample(coords, 3);
        let xs: Vec<f64> = out.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![0.0, 3.0, 6.0]);
    }
}
