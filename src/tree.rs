//! ## Neighbor Tree
//!
//! A static, rebuild-per-snapshot region-octree (a generalized `2^D`-ary tree) over a
//! fixed-capacity particle buffer. Particles carry a position and an optional per-particle
//! search radius; `find_neighbors`/`find_neighbors_periodic` return the ids of all particles
//! within a query radius of a point, optionally under periodic (toroidal) boundary conditions
//! and under a symmetric interaction criterion (see [`SearchMode`]).
//!
//! Cells are reused across rebuilds through a recycle pool, and the tree is threaded (each
//! node carries a `more`/`next` successor link) so that range queries walk it with a single
//! loop instead of an explicit recursion stack per slot.
//!
//! # Example
//!
//! ```
//! use neighbor_tree::tree::{NeighborTree, SearchMode};
//!
//! let mut tree = NeighborTree::new(3, 100);
//! tree.resize(3).unwrap();
//! for (id, p) in [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [10.0, 10.0, 10.0]].iter().enumerate() {
//!     for (k, x) in p.iter().enumerate() {
//!         tree.set_position(id, k, *x).unwrap();
//!     }
//! }
//! tree.update_tree().unwrap();
//!
//! let mut found = Vec::new();
//! tree.find_neighbors(&[0.0, 0.0, 0.0], 2.0, SearchMode::Gather, &mut found, true)
//!     .unwrap();
//! assert_eq!(found, vec![0, 1]);
//! ```

use crate::exceptions::TreeError;
use crate::geometry::{
    box_overlaps_sphere, periodic_box_overlaps_sphere, periodic_squared_distance,
    squared_distance,
};
use tracing::{debug, info};

/// Which inclusion rule a range query applies to candidate bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// A body is a neighbor iff the query ball (center `query`, radius `r`) contains it.
    Gather,
    /// A body is a neighbor iff the query ball contains it, OR the body's own search ball
    /// (center at the body, radius `body.search_radius`) reaches the query point.
    Symmetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeRef {
    Body(usize),
    Cell(usize),
}

#[derive(Debug, Clone)]
struct Body {
    position: Vec<f64>,
    search_radius: f64,
}

#[derive(Debug, Clone)]
struct Cell {
    center: Vec<f64>,
    /// `2^dim` child slots, indexed by the bitfield rule in [`subindex`].
    children: Vec<Option<NodeRef>>,
    /// Max `search_radius` over all Body descendants, used to prune in [`SearchMode::Symmetry`].
    max_search_radius: f64,
    /// First child in traversal order.
    more: Option<NodeRef>,
    /// Successor in the threaded preorder traversal.
    next: Option<NodeRef>,
}

impl Cell {
    fn reset(&mut self, center: Vec<f64>) {
        for slot in self.children.iter_mut() {
            *slot = None;
        }
        self.center = center;
        self.max_search_radius = 0.0;
        self.more = None;
        self.next = None;
    }
}

/// Bitfield child-slot index of `point` within a cell centered at `center`.
///
/// Bit `(dim - 1 - k)` is set iff `center[k] <= point[k]`; ties go to the upper child.
fn subindex(point: &[f64], center: &[f64]) -> usize {
    let dim = point.len();
    let mut index = 0usize;
    for k in 0..dim {
        if center[k] <= point[k] {
            index |= 1 << (dim - 1 - k);
        }
    }
    index
}

/// A fixed-capacity particle buffer plus the spatial index built over its active prefix.
///
/// Construct once with a dimension and a reserved capacity; write positions (and search radii,
/// for [`SearchMode::Symmetry`]) between rebuilds; call [`Self::update_tree`] before querying.
/// All fields are plain owned heap data, so transferring a tree to a new owner is an ordinary
/// Rust move (`let b = a;`) — see the module-level tests for the properties this gives for
/// free (self-assignment is a no-op, a moved-from binding cannot be queried, and so on).
#[derive(Debug)]
pub struct NeighborTree {
    dim: usize,
    reserve: usize,
    size: usize,
    bodies: Vec<Body>,
    cells: Vec<Cell>,
    free_cells: Vec<usize>,
    root: Option<usize>,
    rsize: f64,
    body_next: Vec<Option<NodeRef>>,
    box_sides: Option<Vec<f64>>,
    first_build: bool,
}

impl NeighborTree {
    /// Creates an empty tree with the given dimension and reserved particle capacity.
    ///
    /// `dim` and `reserve` are fixed for the life of the instance; both preconditions
    /// (`dim >= 1`, `reserve >= 1`) are caller contracts rather than recoverable conditions —
    /// see `TreeError`'s doc comment for which conditions *are* surfaced as `Result`.
    pub fn new(dim: usize, reserve: usize) -> Self {
        assert!(dim >= 1, "dim must be at least 1");
        assert!(reserve >= 1, "reserve must be at least 1");
        info!("Creating new NeighborTree with dim: {} and reserve: {}", dim, reserve);
        NeighborTree {
            dim,
            reserve,
            size: 0,
            bodies: (0..reserve)
                .map(|_| Body {
                    position: vec![0.0; dim],
                    search_radius: 0.0,
                })
                .collect(),
            cells: Vec::new(),
            free_cells: Vec::new(),
            root: None,
            rsize: 1.0,
            body_next: vec![None; reserve],
            box_sides: None,
            first_build: true,
        }
    }

    /// The dimensionality this tree was constructed with.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The reserved particle capacity this tree was constructed with.
    pub fn reserve(&self) -> usize {
        self.reserve
    }

    /// The number of active particles set by the most recent [`Self::resize`] call.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sets the number of active particles. Must be called at least once before the first
    /// [`Self::update_tree`].
    pub fn resize(&mut self, n: usize) -> Result<(), TreeError> {
        if n > self.reserve {
            return Err(TreeError::CapacityExceeded {
                requested: n,
                reserve: self.reserve,
            });
        }
        debug!("Resizing active particle count to {}", n);
        self.size = n;
        Ok(())
    }

    fn check_id(&self, id: usize) -> Result<(), TreeError> {
        if id >= self.size {
            return Err(TreeError::IndexOutOfRange {
                index: id,
                bound: self.size,
            });
        }
        Ok(())
    }

    fn check_axis(&self, k: usize) -> Result<(), TreeError> {
        if k >= self.dim {
            return Err(TreeError::IndexOutOfRange {
                index: k,
                bound: self.dim,
            });
        }
        Ok(())
    }

    /// Writes one coordinate of an active particle's position.
    pub fn set_position(&mut self, id: usize, k: usize, x: f64) -> Result<(), TreeError> {
        self.check_id(id)?;
        self.check_axis(k)?;
        self.bodies[id].position[k] = x;
        Ok(())
    }

    /// Reads one coordinate of an active particle's position.
    pub fn get_position(&self, id: usize, k: usize) -> Result<f64, TreeError> {
        self.check_id(id)?;
        self.check_axis(k)?;
        Ok(self.bodies[id].position[k])
    }

    /// Writes an active particle's search radius, used by [`SearchMode::Symmetry`].
    pub fn set_search_radius(&mut self, id: usize, r: f64) -> Result<(), TreeError> {
        self.check_id(id)?;
        self.bodies[id].search_radius = r;
        Ok(())
    }

    /// Rebuilds the index over the current active particles (ids `0..size()`).
    ///
    /// Drains the previous tree into the recycle pool, resizes the root to cover every active
    /// particle, inserts each body in id order, and re-threads the tree for traversal.
    pub fn update_tree(&mut self) -> Result<(), TreeError> {
        info!("Rebuilding tree over {} active particles", self.size);
        self.drain_old_tree();
        let root_idx = self.alloc_cell(vec![0.0; self.dim]);
        self.root = Some(root_idx);
        self.expand_box();
        for id in 0..self.size {
            self.load_body(id)?;
        }
        self.thread_tree(NodeRef::Cell(root_idx), None);
        info!("Finished rebuilding tree");
        Ok(())
    }

    /// Walks the previous tree's threaded links, recycling every Cell it visits. Bodies are
    /// not pooled: they live in the particle buffer and are simply skipped over.
    fn drain_old_tree(&mut self) {
        if self.first_build {
            self.first_build = false;
            return;
        }
        if let Some(root_idx) = self.root {
            self.drain_cell(root_idx);
        }
        self.root = None;
    }

    /// Recycles `idx` and, recursively, every Cell reachable from it — using the same
    /// more/next child enumeration the walker uses, so this needs no structure beyond the
    /// thread already built by the previous [`Self::thread_tree`] pass.
    fn drain_cell(&mut self, idx: usize) {
        let stop = self.cells[idx].next;
        let mut cur = self.cells[idx].more;
        while let Some(node) = cur {
            if Some(node) == stop {
                break;
            }
            if let NodeRef::Cell(child_idx) = node {
                self.drain_cell(child_idx);
            }
            cur = match node {
                NodeRef::Cell(cidx) => self.cells[cidx].next,
                NodeRef::Body(id) => self.body_next[id],
            };
        }
        self.free_cells.push(idx);
    }

    /// Pops a cell off the recycle pool, or allocates a fresh one if the pool is empty.
    fn alloc_cell(&mut self, center: Vec<f64>) -> usize {
        let nsub = 1usize << self.dim;
        match self.free_cells.pop() {
            Some(idx) => {
                self.cells[idx].reset(center);
                idx
            }
            None => {
                self.cells.push(Cell {
                    center,
                    children: vec![None; nsub],
                    max_search_radius: 0.0,
                    more: None,
                    next: None,
                });
                self.cells.len() - 1
            }
        }
    }

    /// Sizes the root so it is the smallest power-of-two-times-one cube containing every
    /// active particle, centered on the origin.
    fn expand_box(&mut self) {
        let mut dmax = 0.0_f64;
        for id in 0..self.size {
            for k in 0..self.dim {
                let d = self.bodies[id].position[k].abs();
                if d > dmax {
                    dmax = d;
                }
            }
        }
        let mut rsize = 1.0_f64;
        while rsize < 2.0 * dmax {
            rsize *= 2.0;
        }
        self.rsize = rsize;
    }

    /// Descends from the root, splitting a leaf slot into a new cell on collision, and
    /// propagating `max_search_radius` up the descent path.
    fn load_body(&mut self, p_id: usize) -> Result<(), TreeError> {
        let root_idx = self
            .root
            .expect("root is allocated before bodies are loaded");
        let p_pos = self.bodies[p_id].position.clone();
        let p_radius = self.bodies[p_id].search_radius;

        let mut q = root_idx;
        let mut qsize = self.rsize;
        let mut qind = subindex(&p_pos, &self.cells[q].center);
        self.cells[q].max_search_radius = self.cells[q].max_search_radius.max(p_radius);

        while let Some(existing) = self.cells[q].children[qind] {
            if let NodeRef::Body(b_id) = existing {
                let b_pos = self.bodies[b_id].position.clone();
                if squared_distance(&b_pos, &p_pos) == 0.0 {
                    return Err(TreeError::CoincidentParticles {
                        first: b_id,
                        second: p_id,
                    });
                }

                let center = self.cells[q].center.clone();
                let mut new_center = vec![0.0; self.dim];
                for k in 0..self.dim {
                    let sign = if p_pos[k] < center[k] { -1.0 } else { 1.0 };
                    new_center[k] = center[k] + sign * qsize / 4.0;
                }
                let new_idx = self.alloc_cell(new_center);

                // The new cell's only known descendant so far is the resident body `b_id`;
                // fold its radius in now so invariant 5 holds even if `p` is the last body
                // ever inserted under this cell's subtree.
                let b_radius = self.bodies[b_id].search_radius;
                self.cells[new_idx].max_search_radius = b_radius.max(p_radius);
                let b_ind = subindex(&b_pos, &self.cells[new_idx].center);
                self.cells[new_idx].children[b_ind] = Some(NodeRef::Body(b_id));
                self.cells[q].children[qind] = Some(NodeRef::Cell(new_idx));
            }

            q = match self.cells[q].children[qind] {
                Some(NodeRef::Cell(idx)) => idx,
                _ => unreachable!("a split always leaves a cell behind"),
            };
            qsize /= 2.0;
            if qsize == 0.0 {
                return Err(TreeError::TreeTooDeep { body: p_id });
            }
            self.cells[q].max_search_radius = self.cells[q].max_search_radius.max(p_radius);
            qind = subindex(&p_pos, &self.cells[q].center);
        }

        self.cells[q].children[qind] = Some(NodeRef::Body(p_id));
        Ok(())
    }

    /// Converts the child-pointer tree rooted at `p` into a linear `more`/`next` thread, with
    /// `n` as `p`'s successor once its own subtree is exhausted.
    fn thread_tree(&mut self, p: NodeRef, n: Option<NodeRef>) {
        match p {
            NodeRef::Body(id) => {
                self.body_next[id] = n;
            }
            NodeRef::Cell(idx) => {
                self.cells[idx].next = n;
                let nsub = 1usize << self.dim;
                let mut children = Vec::with_capacity(nsub);
                for i in 0..nsub {
                    if let Some(child) = self.cells[idx].children[i] {
                        children.push(child);
                    }
                }
                self.cells[idx].more = children.first().copied();
                for i in 0..children.len() {
                    let successor = children.get(i + 1).copied().or(n);
                    self.thread_tree(children[i], successor);
                }
            }
        }
    }

    /// Appends the ids of all active particles within `radius` of `query` to `out`.
    ///
    /// If `clear` is set, `out` is cleared first; matches are appended in the depth-first,
    /// slot-index order the walker encounters them in, which is deterministic but not sorted.
    pub fn find_neighbors(
        &self,
        query: &[f64],
        radius: f64,
        mode: SearchMode,
        out: &mut Vec<usize>,
        clear: bool,
    ) -> Result<(), TreeError> {
        if query.len() != self.dim {
            return Err(TreeError::IndexOutOfRange {
                index: query.len(),
                bound: self.dim,
            });
        }
        if clear {
            out.clear();
        }
        if radius <= 0.0 {
            return Ok(());
        }
        if let Some(root_idx) = self.root {
            self.walk(root_idx, self.rsize, query, radius, mode, None, out);
        }
        Ok(())
    }

    /// As [`Self::find_neighbors`], but under periodic (toroidal) boundary conditions.
    ///
    /// `box_sides` gives the side length of the periodic box along each axis and is stored for
    /// reuse by subsequent periodic queries.
    pub fn find_neighbors_periodic(
        &mut self,
        query: &[f64],
        radius: f64,
        mode: SearchMode,
        box_sides: &[f64],
        out: &mut Vec<usize>,
        clear: bool,
    ) -> Result<(), TreeError> {
        if query.len() != self.dim || box_sides.len() != self.dim {
            return Err(TreeError::IndexOutOfRange {
                index: query.len(),
                bound: self.dim,
            });
        }
        self.box_sides = Some(box_sides.to_vec());
        if clear {
            out.clear();
        }
        if radius <= 0.0 {
            return Ok(());
        }
        if let Some(root_idx) = self.root {
            let sides = self
                .box_sides
                .clone()
                .expect("box sides were just stored above");
            self.walk(root_idx, self.rsize, query, radius, mode, Some(&sides), out);
        }
        Ok(())
    }

    /// Recursive range-query walker, common to both the plain and periodic variants.
    ///
    /// `box_sides` selects which proximity helper is used, for both the direct-hit test and
    /// (in [`SearchMode::Symmetry`]) the max-radius pruning arm; using the same helper in both
    /// arms avoids reading an uninitialized periodic box in the non-periodic case.
    fn walk(
        &self,
        cell_idx: usize,
        side: f64,
        query: &[f64],
        radius: f64,
        mode: SearchMode,
        box_sides: Option<&[f64]>,
        out: &mut Vec<usize>,
    ) {
        let cell = &self.cells[cell_idx];
        let stop = cell.next;
        let mut cur = cell.more;
        while let Some(node) = cur {
            if Some(node) == stop {
                break;
            }
            match node {
                NodeRef::Cell(idx) => {
                    let child = &self.cells[idx];
                    let half = side / 2.0;
                    let gather_reaches = match box_sides {
                        Some(bs) => {
                            periodic_box_overlaps_sphere(&child.center, half, query, radius, bs)
                        }
                        None => box_overlaps_sphere(&child.center, half, query, radius),
                    };
                    let descend = match mode {
                        SearchMode::Gather => gather_reaches,
                        SearchMode::Symmetry => {
                            gather_reaches
                                || match box_sides {
                                    Some(bs) => periodic_box_overlaps_sphere(
                                        &child.center,
                                        half,
                                        query,
                                        child.max_search_radius,
                                        bs,
                                    ),
                                    None => box_overlaps_sphere(
                                        &child.center,
                                        half,
                                        query,
                                        child.max_search_radius,
                                    ),
                                }
                        }
                    };
                    if descend {
                        self.walk(idx, half, query, radius, mode, box_sides, out);
                    }
                }
                NodeRef::Body(id) => {
                    let body = &self.bodies[id];
                    let d2 = match box_sides {
                        Some(bs) => periodic_squared_distance(query, &body.position, bs),
                        None => squared_distance(query, &body.position),
                    };
                    let hit = match mode {
                        SearchMode::Gather => d2 <= radius * radius,
                        SearchMode::Symmetry => {
                            d2 <= radius * radius || d2 <= body.search_radius * body.search_radius
                        }
                    };
                    if hit {
                        out.push(id);
                    }
                }
            }
            cur = match node {
                NodeRef::Cell(idx) => self.cells[idx].next,
                NodeRef::Body(id) => self.body_next[id],
            };
        }
    }
}
