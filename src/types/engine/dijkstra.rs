//! Full-recomputation baseline: classic Dijkstra with a binary heap and
//! lazy deletion. Used by `Engine::initialise` and, in tests, as the
//! ground truth that incremental updates are checked against.

use super::Engine;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

impl Engine {
    /// (Re)computes the SSSP tree from scratch via Dijkstra, rooted at
    /// `source`. Rebuilds the CSR snapshot first, so this always
    /// reflects the edge set's current state. Clears every `affected`
    /// flag and sets every reached vertex `valid`; unreached vertices
    /// stay at `+inf`/`NONE` but are still marked valid, since "valid"
    /// tracks tree membership, not reachability.
    #[tracing::instrument(skip(self))]
    pub fn initialise(&mut self, source: usize) {
        self.graph = self.edges.snapshot();
        let n = self.graph.num_vertices().max(source + 1);
        self.dist = vec![f64::INFINITY; n];
        self.parent = vec![None; n];
        self.affected = vec![false; n];
        self.valid = vec![true; n];

        if source >= self.graph.num_vertices() {
            self.build_tree_from_parents();
            return;
        }

        self.dist[source] = 0.0;

        // Lazy deletion: a vertex may be pushed multiple times as its
        // distance improves; we skip any pop whose key is stale.
        let mut heap: BinaryHeap<Reverse<(OrderedF64, usize)>> = BinaryHeap::new();
        heap.push(Reverse((OrderedF64(0.0), source)));

        while let Some(Reverse((d, u))) = heap.pop() {
            if d.0 > self.dist[u] {
                continue;
            }
            let neighbors: Vec<(usize, f64)> = self
                .graph
                .neighbors(u)
                .expect("u came from the heap, so it is in range")
                .collect();
            for (v, w) in neighbors {
                let candidate = self.dist[u] + w;
                if candidate < self.dist[v] {
                    self.dist[v] = candidate;
                    self.parent[v] = Some(u);
                    heap.push(Reverse((OrderedF64(candidate), v)));
                }
            }
        }

        self.build_tree_from_parents();
    }
}

/// `f64` wrapper giving it a total order for use as a `BinaryHeap` key.
/// Distances here are always finite-or-infinity sums of non-negative
/// weights, so `NaN` never arises; `partial_cmp().unwrap()` is safe.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedF64(f64);

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).expect("distances are never NaN")
    }
}
