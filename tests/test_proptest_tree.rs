//! Property-based tests for NeighborTree

use neighbor_tree::tree::{NeighborTree, SearchMode};
use proptest::prelude::*;

const DIM: usize = 2;
const COORD_SCALE: f64 = 50.0;

prop_compose! {
    fn arb_points(n: usize)(
        coords in prop::collection::vec(
            prop::collection::vec(-COORD_SCALE..COORD_SCALE, DIM),
            n,
        )
    ) -> Vec<Vec<f64>> {
        coords
    }
}

fn build_tree(points: &[Vec<f64>]) -> Option<NeighborTree> {
    let mut tree = NeighborTree::new(DIM, points.len());
    tree.resize(points.len()).unwrap();
    for (id, p) in points.iter().enumerate() {
        for (k, x) in p.iter().enumerate() {
            tree.set_position(id, k, *x).unwrap();
        }
    }
    tree.update_tree().ok().map(|_| tree)
}

proptest! {
    #[test]
    fn every_particle_is_found_by_a_query_centered_on_itself(
        points in arb_points(2..20)
    ) {
        if let Some(tree) = build_tree(&points) {
            for (id, p) in points.iter().enumerate() {
                let mut found = Vec::new();
                tree.find_neighbors(p, 1e-6, SearchMode::Gather, &mut found, true).unwrap();
                prop_assert!(found.contains(&id), "particle {} must find itself", id);
            }
        }
    }

    #[test]
    fn larger_radius_finds_a_superset(
        points in arb_points(2..30),
        qx in -COORD_SCALE..COORD_SCALE,
        qy in -COORD_SCALE..COORD_SCALE,
    ) {
        if let Some(tree) = build_tree(&points) {
            let query = [qx, qy];
            let mut small = Vec::new();
            let mut large = Vec::new();
            tree.find_neighbors(&query, 5.0, SearchMode::Gather, &mut small, true).unwrap();
            tree.find_neighbors(&query, 20.0, SearchMode::Gather, &mut large, true).unwrap();
            let large_set: std::collections::HashSet<_> = large.iter().copied().collect();
            prop_assert!(small.iter().all(|id| large_set.contains(id)));
        }
    }

    #[test]
    fn result_count_never_exceeds_particle_count(
        points in arb_points(1..30),
        qx in -COORD_SCALE..COORD_SCALE,
        qy in -COORD_SCALE..COORD_SCALE,
    ) {
        if let Some(tree) = build_tree(&points) {
            let mut found = Vec::new();
            tree.find_neighbors(&[qx, qy], 1000.0, SearchMode::Gather, &mut found, true).unwrap();
            prop_assert!(found.len() <= points.len());
        }
    }

    #[test]
    fn rebuilding_without_changes_preserves_query_results(
        points in arb_points(2..20),
        qx in -COORD_SCALE..COORD_SCALE,
        qy in -COORD_SCALE..COORD_SCALE,
    ) {
        if let Some(mut tree) = build_tree(&points) {
            let query = [qx, qy];
            let mut before = Vec::new();
            tree.find_neighbors(&query, 10.0, SearchMode::Gather, &mut before, true).unwrap();
            tree.update_tree().unwrap();
            let mut after = Vec::new();
            tree.find_neighbors(&query, 10.0, SearchMode::Gather, &mut after, true).unwrap();
            before.sort_unstable();
            after.sort_unstable();
            prop_assert_eq!(before, after);
        }
    }
}
