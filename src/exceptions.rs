//! Custom errors for neighbor-tree.
//!
//! This module defines the fatal error taxonomy used internally. The upstream design treats
//! all of these as process-aborting conditions (the tree is a batch kernel fed by a trusted
//! caller); this crate surfaces them as ordinary `Result` values instead, which is equally
//! distinguishable and lets a caller choose to abort, as the original does.

use std::error::Error;
use std::fmt;

/// Fatal conditions raised by [`crate::tree::NeighborTree`].
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    /// `resize(n)` was called with `n` larger than the reserved capacity.
    CapacityExceeded {
        /// The requested active size.
        requested: usize,
        /// The capacity the tree was constructed with.
        reserve: usize,
    },
    /// An accessor was called with an id or axis outside the valid range.
    IndexOutOfRange {
        /// The index that was supplied.
        index: usize,
        /// The exclusive upper bound the index was checked against.
        bound: usize,
    },
    /// Two active bodies occupy the exact same position.
    CoincidentParticles {
        /// One of the two colliding body ids.
        first: usize,
        /// The other colliding body id.
        second: usize,
    },
    /// A cell's side length underflowed to zero before a body found an empty slot.
    TreeTooDeep {
        /// The body that could not be placed.
        body: usize,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::CapacityExceeded { requested, reserve } => write!(
                f,
                "resize to {requested} exceeds reserved capacity {reserve}"
            ),
            TreeError::IndexOutOfRange { index, bound } => {
                write!(f, "index {index} is out of range; must be < {bound}")
            }
            TreeError::CoincidentParticles { first, second } => write!(
                f,
                "particles {first} and {second} occupy the same position"
            ),
            TreeError::TreeTooDeep { body } => write!(
                f,
                "tree is too deep while inserting particle {body}; cell side underflowed to zero"
            ),
        }
    }
}

impl Error for TreeError {}
