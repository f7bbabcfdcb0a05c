//! The serial three-phase batched update: first-order effects, subtree
//! invalidation, and level-synchronous propagation to a fixpoint. A
//! data-parallel variant of the same algorithm lives in
//! `super::parallel` behind the `parallel` feature.

use super::Engine;
use crate::types::change::{Change, Op};

impl Engine {
    /// Applies a batch of edge insertions/deletions and brings the
    /// tree back to a consistent fixpoint rooted at `source`.
    ///
    /// Phase A processes each event against the *stale* (pre-batch)
    /// tree: insertions relax both directions of the new edge;
    /// deletions that cut a tree edge invalidate the affected subtree.
    /// Phase B rebuilds the CSR from the now-updated edge set. Phase C
    /// repeatedly relaxes every `affected` vertex against its current
    /// neighbors until no vertex improves. Phase D rebuilds the
    /// `TreeIndex` from the settled `parent` array.
    ///
    /// `source` must match whatever source `initialise` (or a prior
    /// `apply_changes`) used; the engine does not remember it.
    #[tracing::instrument(skip(self, batch))]
    pub fn apply_changes(&mut self, batch: &[Change], source: usize) {
        self.phase_a_first_order_effects(batch);
        self.phase_b_rebuild_csr();
        self.phase_c_propagate();
        self.phase_d_reindex_tree();

        // A source that was itself invalidated (e.g. by deleting its
        // own incident tree edge) is always distance zero and never
        // detached in practice, but stays defensive against misuse.
        if source < self.dist.len() {
            self.dist[source] = 0.0;
            self.valid[source] = true;
            self.affected[source] = false;
        }
    }

    fn phase_a_first_order_effects(&mut self, batch: &[Change]) {
        for change in batch {
            let needed = change.u.max(change.v) + 1;
            self.ensure_capacity(needed);

            match change.op {
                Op::Insert => {
                    self.edges.add(change.u, change.v, change.w);
                    self.relax(change.u, change.v, change.w);
                    self.relax(change.v, change.u, change.w);
                }
                Op::Delete => {
                    self.edges.remove(change.u, change.v);
                    if self.parent[change.u] == Some(change.v) {
                        self.mark_subtree_invalid(change.u);
                    } else if self.parent[change.v] == Some(change.u) {
                        self.mark_subtree_invalid(change.v);
                    }
                }
            }
        }
    }

    fn phase_b_rebuild_csr(&mut self) {
        self.graph = self.edges.snapshot();
        self.ensure_capacity(self.graph.num_vertices());
    }

    /// Level-synchronous Bellman-Ford relaxation over exactly the
    /// vertices marked `affected`, looping until a full pass produces
    /// no improvement. The number of rounds for a single batch is
    /// bounded by the graph's diameter.
    ///
    /// Each affected vertex `u` relaxes both directions of every
    /// incident edge `(u, v)`: `u -> v` (push: `u`'s own distance, if
    /// still valid, improves `v`) and `v -> u` (pull: a still-valid
    /// neighbor `v` reattaches `u`). The push direction alone only
    /// ever propagates a vertex's distance outward; a subtree just
    /// invalidated by `mark_subtree_invalid` sits at `+inf` with no
    /// finite distance to push, so without the pull direction it could
    /// never discover an alternate path back in through one of its
    /// still-valid neighbors.
    fn phase_c_propagate(&mut self) {
        loop {
            let mut any_change = false;
            for u in 0..self.dist.len() {
                if !self.affected[u] {
                    continue;
                }
                self.affected[u] = false;

                let neighbors: Vec<(usize, f64)> = self
                    .graph
                    .neighbors(u)
                    .expect("u is within range by construction")
                    .collect();
                for (v, w) in neighbors {
                    if self.relax(u, v, w) {
                        any_change = true;
                    }
                    if self.relax(v, u, w) {
                        any_change = true;
                    }
                }
                self.valid[u] = true;
            }
            if !any_change {
                break;
            }
        }
    }

    fn phase_d_reindex_tree(&mut self) {
        self.build_tree_from_parents();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::edge_set::EdgeSet;

    fn path_graph() -> EdgeSet {
        let mut edges = EdgeSet::new();
        edges.add(0, 1, 1.0);
        edges.add(1, 2, 1.0);
        edges.add(2, 3, 1.0);
        edges
    }

    #[test]
    fn scenario_s2_non_tree_edge_deletion_leaves_tree_unchanged() {
        let mut edges = path_graph();
        edges.add(0, 2, 1.0);
        let mut engine = Engine::new(edges);
        engine.initialise(0);
        // 0-2 is a non-tree shortcut; removing it must not perturb dist/parent.
        let before = engine.dist().to_vec();
        engine.apply_changes(&[Change::delete(0, 2)], 0);
        assert_eq!(engine.dist(), before.as_slice());
    }

    #[test]
    fn scenario_s3_tree_edge_deletion_disconnects_subtree() {
        let mut engine = Engine::new(path_graph());
        engine.initialise(0);
        engine.apply_changes(&[Change::delete(1, 2)], 0);
        assert_eq!(engine.dist()[0], 0.0);
        assert_eq!(engine.dist()[1], 1.0);
        assert!(engine.dist()[2].is_infinite());
        assert!(engine.dist()[3].is_infinite());
        assert_eq!(engine.parent()[2], None);
        assert_eq!(engine.parent()[3], None);
    }

    #[test]
    fn scenario_s4_reattachment_via_insertion_after_disconnect() {
        let mut engine = Engine::new(path_graph());
        engine.initialise(0);
        engine.apply_changes(
            &[Change::delete(1, 2), Change::insert(0, 2, 1.0)],
            0,
        );
        assert_eq!(engine.dist(), &[0.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn scenario_s6_large_noop_batch_leaves_state_unchanged() {
        let mut engine = Engine::new(path_graph());
        engine.initialise(0);
        let before_dist = engine.dist().to_vec();
        let before_parent = engine.parent().to_vec();

        let mut batch = Vec::new();
        for _ in 0..5000 {
            batch.push(Change::insert(0, 1, 1.0)); // already present, no-op
            batch.push(Change::delete(10_000, 10_001)); // absent, no-op
        }
        engine.apply_changes(&batch, 0);

        assert_eq!(&engine.dist()[..before_dist.len()], before_dist.as_slice());
        assert_eq!(&engine.parent()[..before_parent.len()], before_parent.as_slice());
    }

    #[test]
    fn apply_changes_matches_full_recompute_after_mixed_batch() {
        let mut edges = path_graph();
        edges.add(3, 4, 1.0);
        edges.add(4, 5, 1.0);

        let mut incremental = Engine::new(edges.clone());
        incremental.initialise(0);
        incremental.apply_changes(
            &[Change::delete(2, 3), Change::insert(1, 5, 10.0)],
            0,
        );

        let mut reference_edges = edges;
        reference_edges.remove(2, 3);
        reference_edges.add(1, 5, 10.0);
        let mut reference = Engine::new(reference_edges);
        reference.initialise(0);

        assert_eq!(incremental.dist(), reference.dist());
    }

    #[test]
    fn idempotence_reapplying_empty_batch_is_stable() {
        let mut engine = Engine::new(path_graph());
        engine.initialise(0);
        engine.apply_changes(&[Change::delete(1, 2)], 0);
        let once = engine.dist().to_vec();
        engine.apply_changes(&[], 0);
        assert_eq!(engine.dist(), once.as_slice());
    }

    #[test]
    fn flags_are_quiescent_after_apply_changes() {
        let mut engine = Engine::new(path_graph());
        engine.initialise(0);
        engine.apply_changes(&[Change::delete(1, 2), Change::insert(0, 3, 1.0)], 0);
        // Quiescence isn't directly observable (affected/valid are
        // private), but a residual affected flag would cause a
        // follow-up no-op batch to still move distances via phase C.
        let settled = engine.dist().to_vec();
        engine.apply_changes(&[], 0);
        assert_eq!(engine.dist(), settled.as_slice());
    }
}
