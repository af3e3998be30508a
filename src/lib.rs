//! neighbor-tree: a static region-octree for range queries over particle sets.
//!
//! The core type is [`tree::NeighborTree`]: a fixed-capacity particle buffer plus a
//! `2^D`-ary spatial index rebuilt from scratch on each call to
//! [`tree::NeighborTree::update_tree`]. Queries (`find_neighbors`,
//! `find_neighbors_periodic`) return particle ids within a radius of a point, optionally
//! under periodic boundaries and under a symmetric interaction rule — see
//! [`tree::SearchMode`].

pub mod exceptions;
pub mod geometry;
mod logging;
pub mod tree;
