#![allow(dead_code)]

//! Shared test utilities for neighbor-tree.
//!
//! This module provides common constants and helper functions used across multiple
//! integration tests: tree construction for the diagonal-line fixture used by the original
//! upstream test suite, and distance helpers for verifying range-search results.

use neighbor_tree::tree::{NeighborTree, SearchMode};

pub const DIM: usize = 3;
pub const LINE_COUNT: usize = 100;
pub const BOX_SIDE: f64 = 100.0;

/// Builds a tree with `LINE_COUNT` particles placed on the diagonal line `(i, i, i)` (or
/// `(-i, -i, -i)` when `negate` is set), matching the fixture used by the upstream C++ test
/// suite this behavior was distilled from.
pub fn diagonal_line_tree(negate: bool) -> NeighborTree {
    let mut tree = NeighborTree::new(DIM, LINE_COUNT);
    tree.resize(LINE_COUNT).unwrap();
    for id in 0..LINE_COUNT {
        let coord = if negate { -(id as f64) } else { id as f64 };
        for k in 0..DIM {
            tree.set_position(id, k, coord).unwrap();
        }
    }
    tree.update_tree().unwrap();
    tree
}

/// As [`diagonal_line_tree`], but every particle additionally carries `search_radius`.
pub fn diagonal_line_tree_with_radius(negate: bool, search_radius: f64) -> NeighborTree {
    let mut tree = NeighborTree::new(DIM, LINE_COUNT);
    tree.resize(LINE_COUNT).unwrap();
    for id in 0..LINE_COUNT {
        let coord = if negate { -(id as f64) } else { id as f64 };
        tree.set_search_radius(id, search_radius).unwrap();
        for k in 0..DIM {
            tree.set_position(id, k, coord).unwrap();
        }
    }
    tree.update_tree().unwrap();
    tree
}

pub fn periodic_box_sides() -> Vec<f64> {
    vec![BOX_SIDE; DIM]
}

pub fn gather(tree: &NeighborTree, query: &[f64], radius: f64) -> Vec<usize> {
    let mut found = Vec::new();
    tree.find_neighbors(query, radius, SearchMode::Gather, &mut found, true)
        .unwrap();
    found.sort_unstable();
    found
}
