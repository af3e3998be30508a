//! Geometric primitives shared by the tree builder and walker.
//!
//! Positions are plain `&[f64]` slices of length `dim` rather than a fixed `Point2D`/`Point3D`
//! struct, since the dimensionality of a tree is a runtime parameter (see `tree::NeighborTree`).

/// Squared Euclidean distance between two same-length coordinate slices.
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

/// Axis-aligned box/sphere overlap test (an L-infinity over-approximation of the sphere).
///
/// Returns `true` if the cube centered at `center` with half-side `half_side` could contain a
/// point within `radius` of `query`. May return `true` for a few cubes that do not actually
/// intersect the sphere, but never returns `false` when they do.
pub fn box_overlaps_sphere(center: &[f64], half_side: f64, query: &[f64], radius: f64) -> bool {
    let reach = half_side + radius;
    center
        .iter()
        .zip(query.iter())
        .all(|(c, q)| (q - c).abs() <= reach)
}

/// Minimum-image signed displacement `a - b` along one axis of a periodic box of side `side`.
///
/// Returns a value in `(-side/2, side/2]`.
pub fn periodic_delta(a: f64, b: f64, side: f64) -> f64 {
    let d = a - b;
    if d > 0.5 * side {
        d - side
    } else if d < -0.5 * side {
        d + side
    } else {
        d
    }
}

/// Squared minimum-image distance between two points under a periodic box.
pub fn periodic_squared_distance(a: &[f64], b: &[f64], box_sides: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .zip(box_sides.iter())
        .map(|((x, y), side)| {
            let d = periodic_delta(*x, *y, *side);
            d * d
        })
        .sum()
}

/// Box/sphere overlap test under the periodic minimum-image metric.
pub fn periodic_box_overlaps_sphere(
    center: &[f64],
    half_side: f64,
    query: &[f64],
    radius: f64,
    box_sides: &[f64],
) -> bool {
    let reach = half_side + radius;
    center
        .iter()
        .zip(query.iter())
        .zip(box_sides.iter())
        .all(|((c, q), side)| periodic_delta(*q, *c, *side).abs() <= reach)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_distance_is_symmetric() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, -1.0, 0.5];
        assert_eq!(squared_distance(&a, &b), squared_distance(&b, &a));
    }

    #[test]
    fn squared_distance_of_coincident_points_is_zero() {
        let a = [3.5, -2.0];
        assert_eq!(squared_distance(&a, &a), 0.0);
    }

    #[test]
    fn box_overlap_rejects_far_point() {
        let center = [0.0, 0.0];
        assert!(!box_overlaps_sphere(&center, 1.0, &[10.0, 0.0], 1.0));
    }

    #[test]
    fn box_overlap_accepts_point_within_reach() {
        let center = [0.0, 0.0];
        assert!(box_overlaps_sphere(&center, 1.0, &[1.5, 0.0], 1.0));
    }

    #[test]
    fn periodic_delta_wraps_across_the_boundary() {
        // box side 100: -49 and 49 are 2 apart through the seam, not 98 apart directly.
        assert_eq!(periodic_delta(49.0, -49.0, 100.0), -2.0);
        assert_eq!(periodic_delta(-49.0, 49.0, 100.0), 2.0);
    }

    #[test]
    fn periodic_delta_stays_within_half_box_when_no_wrap_needed() {
        assert_eq!(periodic_delta(10.0, 5.0, 100.0), 5.0);
    }

    #[test]
    fn periodic_distance_matches_plain_distance_far_from_the_seam() {
        let a = [10.0, 10.0];
        let b = [12.0, 13.0];
        let box_sides = [1000.0, 1000.0];
        assert_eq!(
            periodic_squared_distance(&a, &b, &box_sides),
            squared_distance(&a, &b)
        );
    }
}
