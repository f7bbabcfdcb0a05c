mod dijkstra;
mod incremental;
#[cfg(feature = "parallel")]
mod parallel;

use crate::types::csr::Csr;
use crate::types::edge_set::EdgeSet;
use crate::types::engine_error::EngineError;
use crate::types::tree_index::TreeIndex;
use std::path::Path;

/// Holds the authoritative shortest-path state for one source vertex
/// over an evolving `EdgeSet`, and performs both the full-Dijkstra
/// baseline and the batched incremental update.
///
/// The engine owns its `EdgeSet` and the `Csr` snapshot built from it,
/// plus the `dist`/`parent`/`affected`/`valid` arrays and the
/// `TreeIndex` derived from `parent`. Every per-vertex array is always
/// the same length as `graph.num_vertices()`; `ensure_capacity` keeps
/// that invariant as the edge set introduces new vertex ids.
pub struct Engine {
    edges: EdgeSet,
    graph: Csr,
    dist: Vec<f64>,
    parent: Vec<Option<usize>>,
    affected: Vec<bool>,
    valid: Vec<bool>,
    tree: TreeIndex,
}

impl Engine {
    /// Constructs an engine bound to `edges`. Allocates all per-vertex
    /// arrays from the edge set's current vertex count; does not
    /// compute any distances — call `initialise` for that.
    pub fn new(edges: EdgeSet) -> Self {
        let graph = edges.snapshot();
        let n = graph.num_vertices();
        Self {
            edges,
            graph,
            dist: vec![f64::INFINITY; n],
            parent: vec![None; n],
            affected: vec![false; n],
            valid: vec![true; n],
            tree: TreeIndex::new(),
        }
    }

    /// Convenience constructor: loads an edge list from `path` and
    /// binds a fresh engine to it.
    pub fn from_edgelist_file<P: AsRef<Path>>(
        path: P,
        one_based: bool,
    ) -> Result<Self, EngineError> {
        let edges = EdgeSet::from_edgelist_file(path, one_based)?;
        Ok(Self::new(edges))
    }

    /// Read-only view of the current distance array. `f64::INFINITY`
    /// marks unreachability.
    pub fn dist(&self) -> &[f64] {
        &self.dist
    }

    /// Read-only view of the current parent array.
    pub fn parent(&self) -> &[Option<usize>] {
        &self.parent
    }

    /// Read-only view of the current CSR snapshot.
    pub fn graph(&self) -> &Csr {
        &self.graph
    }

    /// Read-only view of the underlying edge set.
    pub fn edge_set(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn num_vertices(&self) -> usize {
        self.dist.len()
    }

    /// Grows the per-vertex arrays to length `n` if they are currently
    /// shorter, filling new slots with the "unreached" state. A no-op
    /// if `n <= num_vertices()`.
    pub(crate) fn ensure_capacity(&mut self, n: usize) {
        if n <= self.dist.len() {
            return;
        }
        self.dist.resize(n, f64::INFINITY);
        self.parent.resize(n, None);
        self.affected.resize(n, false);
        self.valid.resize(n, true);
    }

    pub(crate) fn build_tree_from_parents(&mut self) {
        self.tree = TreeIndex::build(&self.parent);
    }

    /// Relaxes the arc `from -> to` with weight `w`. Returns `true` iff
    /// the relaxation strictly improved `dist[to]`.
    ///
    /// Gated on `valid[from]`, per spec: a vertex detached by an earlier
    /// subtree invalidation in the same batch must not relax others
    /// until it is itself reattached in Phase C.
    pub(crate) fn relax(&mut self, from: usize, to: usize, w: f64) -> bool {
        if !self.valid[from] {
            return false;
        }
        let candidate = self.dist[from] + w;
        if candidate < self.dist[to] {
            self.dist[to] = candidate;
            self.parent[to] = Some(from);
            self.affected[to] = true;
            true
        } else {
            false
        }
    }

    /// Detaches the subtree rooted at `root` using the *stale*,
    /// pre-batch `TreeIndex`: every descendant is marked invalid,
    /// affected, and pushed to `+inf`/`NONE`. Safe to use stale
    /// topology because any parent mutated earlier in the same batch
    /// is itself `affected` and gets revisited in Phase C regardless.
    pub(crate) fn mark_subtree_invalid(&mut self, root: usize) {
        let mut stack = vec![root];
        while let Some(u) = stack.pop() {
            self.valid[u] = false;
            self.affected[u] = true;
            self.dist[u] = f64::INFINITY;
            self.parent[u] = None;
            stack.extend(self.tree.children(u));
        }
    }
}
