// SPDX-License-Identifier: MIT OR Apache-2.0

//! Placement collision avoidance
//!
//! Two tokens closer than [`COLLISION_THRESHOLD`] overlap. A drop onto an
//! occupied spot tries [`CANDIDATE_OFFSETS`] in order and takes the first
//! free candidate. When every candidate collides the desired point is used
//! anyway and the overlap is accepted.

use crate::geometry::NormalizedPoint;

/// Minimum distance between two placements, in normalized units
pub const COLLISION_THRESHOLD: f64 = 0.07;

const NEAR: f64 = 0.07;
const DIAGONAL: f64 = 0.06;
const FAR: f64 = 0.12;

/// Probe order: near axis-aligned, then diagonals, then far axis-aligned
pub const CANDIDATE_OFFSETS: [(f64, f64); 12] = [
    (NEAR, 0.0),
    (-NEAR, 0.0),
    (0.0, NEAR),
    (0.0, -NEAR),
    (DIAGONAL, DIAGONAL),
    (-DIAGONAL, DIAGONAL),
    (DIAGONAL, -DIAGONAL),
    (-DIAGONAL, -DIAGONAL),
    (FAR, 0.0),
    (-FAR, 0.0),
    (0.0, FAR),
    (0.0, -FAR),
];

/// Whether `point` overlaps any of `others`
pub fn collides(point: &NormalizedPoint, others: &[NormalizedPoint]) -> bool {
    others
        .iter()
        .any(|other| point.distance(other) < COLLISION_THRESHOLD)
}

/// Resolve where a token dropped at `desired` should land.
///
/// `others` are the points of every other placement on the board (the
/// dropped player's own placement must not be included).
pub fn resolve_drop_point(desired: NormalizedPoint, others: &[NormalizedPoint]) -> NormalizedPoint {
    if !collides(&desired, others) {
        return desired;
    }

    for &(dx, dy) in CANDIDATE_OFFSETS.iter() {
        let candidate = desired.offset(dx, dy);
        if !collides(&candidate, others) {
            tracing::debug!(
                from = ?desired,
                to = ?candidate,
                "Displaced dropped token to avoid overlap"
            );
            return candidate;
        }
    }

    tracing::debug!(at = ?desired, "No free candidate, accepting overlap");
    desired
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_free_spot_is_kept() {
        let others = [NormalizedPoint::new(0.2, 0.2)];
        let desired = NormalizedPoint::new(0.6, 0.6);
        assert_eq!(resolve_drop_point(desired, &others), desired);
    }

    #[test]
    fn test_first_candidate_is_near_positive_x() {
        let others = [NormalizedPoint::new(0.50, 0.50)];
        let resolved = resolve_drop_point(NormalizedPoint::new(0.52, 0.51), &others);
        assert!(approx(resolved.x(), 0.59));
        assert!(approx(resolved.y(), 0.51));
    }

    #[test]
    fn test_skips_blocked_candidates() {
        // +x lands next to the second token, -x is still too close to the first
        let others = [NormalizedPoint::new(0.50, 0.50), NormalizedPoint::new(0.60, 0.50)];
        let resolved = resolve_drop_point(NormalizedPoint::new(0.52, 0.50), &others);
        assert!(approx(resolved.x(), 0.52));
        assert!(approx(resolved.y(), 0.57));
    }

    #[test]
    fn test_candidates_are_clamped_at_touchline() {
        let others = [NormalizedPoint::new(1.0, 0.5)];
        let resolved = resolve_drop_point(NormalizedPoint::new(0.99, 0.5), &others);
        // +x clamps back onto the blocker, -x is free
        assert!(approx(resolved.x(), 0.92));
        assert!(!collides(&resolved, &others));
    }

    #[test]
    fn test_dense_cluster_accepts_overlap() {
        let desired = NormalizedPoint::new(0.5, 0.5);
        let mut others = vec![desired];
        others.extend(
            CANDIDATE_OFFSETS
                .iter()
                .map(|&(dx, dy)| desired.offset(dx, dy)),
        );
        assert_eq!(resolve_drop_point(desired, &others), desired);
    }

    proptest! {
        #[test]
        fn prop_result_is_free_or_original(
            dx in 0.0f64..=1.0, dy in 0.0f64..=1.0,
            points in proptest::collection::vec((0.0f64..=1.0, 0.0f64..=1.0), 0..12)
        ) {
            let desired = NormalizedPoint::new(dx, dy);
            let others: Vec<_> = points.iter().map(|&(x, y)| NormalizedPoint::new(x, y)).collect();
            let resolved = resolve_drop_point(desired, &others);

            let any_free = !collides(&desired, &others)
                || CANDIDATE_OFFSETS.iter().any(|&(ox, oy)| !collides(&desired.offset(ox, oy), &others));
            if any_free {
                prop_assert!(!collides(&resolved, &others));
            } else {
                prop_assert_eq!(resolved, desired);
            }
        }

        #[test]
        fn prop_deterministic(dx in 0.0f64..=1.0, dy in 0.0f64..=1.0) {
            let others = [NormalizedPoint::new(0.5, 0.5), NormalizedPoint::new(0.45, 0.55)];
            let desired = NormalizedPoint::new(dx, dy);
            prop_assert_eq!(resolve_drop_point(desired, &others), resolve_drop_point(desired, &others));
        }
    }
}
