//! Parallel variant of the three-phase batched update, gated behind
//! the `parallel` feature, using Rayon's work-stealing pool to relax
//! an entire level of the propagation frontier at once.
//!
//! `EdgeSet` mutation in Phase A stays serialized behind a `Mutex`
//! (concurrent inserts/removes on the same `HashSet` are unsound).
//! Phase C relaxes every vertex of the current frontier concurrently:
//! `dist` is exposed as a slice of `AtomicU64` bit patterns so many
//! threads can attempt a relaxation on the same target at once via
//! compare-and-swap, pushing its own distance outward and pulling from
//! still-valid neighbors in the same pass (the same push/pull pair the
//! serial engine performs).
//!
//! The `(from, to)` pairs a round's CAS attempts won are collected in
//! frontier order, which need not match the real-time order the CASes
//! actually landed in — two threads can both win distinct candidates
//! for the same `to` in one round, and the one that landed last in
//! wall-clock time is the one whose value survives in `dist`, not
//! necessarily the one last in the collected list. So `parent` is never
//! set from the `winners` list directly: once a round's CASes are done
//! and `dist` is written back, a sequential reconciliation pass re-scans
//! each touched vertex's neighbors against the now-final `dist` and
//! binds `parent` to whichever neighbor actually explains it.

use super::Engine;
use crate::types::change::{Change, Op};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

impl Engine {
    /// Parallel counterpart to `apply_changes`. Produces the same
    /// distances as a full recomputation; a tied vertex with several
    /// equal-length shortest paths may end up parented under whichever
    /// one `reconcile_parents` happens to enumerate first.
    #[tracing::instrument(skip(self, batch))]
    pub fn apply_changes_par(&mut self, batch: &[Change], source: usize) {
        self.phase_a_first_order_effects_par(batch);
        self.phase_b_rebuild_csr();
        self.phase_c_propagate_par();
        self.build_tree_from_parents();

        if source < self.dist.len() {
            self.dist[source] = 0.0;
            self.valid[source] = true;
            self.affected[source] = false;
        }
    }

    fn phase_a_first_order_effects_par(&mut self, batch: &[Change]) {
        // Growing the per-vertex arrays up front avoids racing on
        // `Vec::resize` from within the parallel section below.
        if let Some(max_endpoint) = batch.iter().map(|c| c.u.max(c.v)).max() {
            self.ensure_capacity(max_endpoint + 1);
        }

        // Deletions decide subtree invalidation from the stale tree and
        // must settle before any insertion-driven relax of the same
        // batch could move a parent pointer out from under them, so
        // insert/delete events run as two passes rather than one
        // arbitrarily-ordered parallel pass.
        let (inserts, deletes): (Vec<&Change>, Vec<&Change>) =
            batch.iter().partition(|c| c.op == Op::Insert);

        for change in deletes {
            self.edges.remove(change.u, change.v);
            if self.parent[change.u] == Some(change.v) {
                self.mark_subtree_invalid(change.u);
            } else if self.parent[change.v] == Some(change.u) {
                self.mark_subtree_invalid(change.v);
            }
        }

        // Each insertion's two directional relaxations are independent
        // of every other insertion's, so the edge-set mutation (behind
        // a mutex) and the CAS relaxations fan out across the pool.
        let edges = Mutex::new(&mut self.edges);
        let touched: Vec<(usize, usize, f64)> = inserts
            .par_iter()
            .map(|change| {
                edges.lock().unwrap().add(change.u, change.v, change.w);
                (change.u, change.v, change.w)
            })
            .collect();

        let dist = AtomicDistView::from_slice(&self.dist);
        let valid = &self.valid;
        let winners: Vec<(usize, usize)> = touched
            .par_iter()
            .flat_map_iter(|&(u, v, w)| {
                let mut won = Vec::new();
                if valid[u] && dist.try_relax(u, v, w) {
                    won.push((u, v));
                }
                if valid[v] && dist.try_relax(v, u, w) {
                    won.push((v, u));
                }
                won.into_iter()
            })
            .collect();
        dist.write_back(&mut self.dist);

        // `self.graph` is still the pre-batch snapshot here (Phase B
        // hasn't rebuilt it yet), so reconciliation uses the inserted
        // edges directly rather than scanning the graph.
        let changed: Vec<usize> = winners.iter().map(|&(_, to)| to).collect();
        let candidates: Vec<(usize, usize, f64)> = touched
            .iter()
            .flat_map(|&(u, v, w)| [(u, v, w), (v, u, w)])
            .collect();
        self.reconcile_parents(&candidates);
        for &to in &changed {
            self.affected[to] = true;
        }
    }

    /// Level-synchronous propagation: every vertex in the current
    /// `affected` frontier is relaxed concurrently against its
    /// neighbors, both pushing its own distance outward and pulling
    /// from each still-valid neighbor — the push-only direction alone
    /// can never recover a subtree that was just invalidated down to
    /// `+inf`, since it has no finite distance of its own left to push.
    /// A round's winning `(from, to)` pairs are only used to decide
    /// which vertices moved; `parent` itself is bound afterwards by
    /// `reconcile_parents` against the round's final `dist`.
    fn phase_c_propagate_par(&mut self) {
        loop {
            let frontier: Vec<usize> =
                (0..self.dist.len()).filter(|&u| self.affected[u]).collect();
            if frontier.is_empty() {
                break;
            }
            for &u in &frontier {
                self.affected[u] = false;
            }

            let dist = AtomicDistView::from_slice(&self.dist);
            let graph = &self.graph;
            let valid = &self.valid;

            let winners: Vec<(usize, usize)> = frontier
                .par_iter()
                .flat_map_iter(|&u| {
                    let mut won = Vec::new();
                    let neighbors: Vec<(usize, f64)> = graph
                        .neighbors(u)
                        .expect("u is within range by construction")
                        .collect();
                    for (v, w) in neighbors {
                        if valid[u] && dist.try_relax(u, v, w) {
                            won.push((u, v));
                        }
                        if valid[v] && dist.try_relax(v, u, w) {
                            won.push((v, u));
                        }
                    }
                    won.into_iter()
                })
                .collect();
            dist.write_back(&mut self.dist);

            // Phase B already rebuilt `self.graph` for this batch, so
            // every vertex's full current neighbor list is a valid
            // candidate source for reconciliation here.
            let changed: Vec<usize> = winners.iter().map(|&(_, to)| to).collect();
            let candidates: Vec<(usize, usize, f64)> = changed
                .iter()
                .flat_map(|&to| {
                    self.graph
                        .neighbors(to)
                        .expect("to is within range by construction")
                        .map(move |(from, w)| (from, to, w))
                })
                .collect();
            self.reconcile_parents(&candidates);
            for &u in &changed {
                self.affected[u] = true;
            }
            for &u in &frontier {
                self.valid[u] = true;
            }
        }
    }

    /// Re-derives `parent` for each vertex touched by `candidates` from
    /// the round's final `dist`, rather than trusting the order winning
    /// CAS pairs happened to be collected in. Concurrent CASes on the
    /// same `to` can leave a `winners` list whose last entry isn't the
    /// candidate that actually produced the stored minimum, so
    /// `parent[to]` is instead picked from every `(from, to, w)`
    /// candidate that exactly explains `to`'s final distance.
    fn reconcile_parents(&mut self, candidates: &[(usize, usize, f64)]) {
        let mut by_to: std::collections::HashMap<usize, Vec<(usize, f64)>> =
            std::collections::HashMap::new();
        for &(from, to, w) in candidates {
            by_to.entry(to).or_default().push((from, w));
        }
        for (to, froms) in by_to {
            let best = froms
                .into_iter()
                .filter(|&(from, w)| {
                    self.dist[from].is_finite() && (self.dist[from] + w - self.dist[to]).abs() < 1e-9
                })
                .min_by(|a, b| self.dist[a.0].partial_cmp(&self.dist[b.0]).unwrap());
            if let Some((from, _)) = best {
                self.parent[to] = Some(from);
            }
        }
    }
}

/// Read-write view over a distance array that lets many threads attempt
/// a compare-and-swap relaxation on the same slot concurrently. Built
/// from a snapshot of `dist`, mutated in place by worker threads, then
/// copied back once the parallel section ends — avoiding the need to
/// hold `&mut [f64]` across a `rayon` scope.
struct AtomicDistView {
    cells: Vec<AtomicU64>,
}

impl AtomicDistView {
    fn from_slice(dist: &[f64]) -> Self {
        let cells = dist.iter().map(|&d| AtomicU64::new(d.to_bits())).collect();
        Self { cells }
    }

    fn get(&self, i: usize) -> f64 {
        f64::from_bits(self.cells[i].load(Ordering::Relaxed))
    }

    /// Attempts `dist[from] + w < dist[to]` via a CAS loop on `to`'s
    /// slot. Returns whether this call's write won.
    fn try_relax(&self, from: usize, to: usize, w: f64) -> bool {
        let base = self.get(from);
        if !base.is_finite() {
            return false;
        }
        let candidate = base + w;
        loop {
            let current_bits = self.cells[to].load(Ordering::Relaxed);
            let current = f64::from_bits(current_bits);
            if candidate >= current {
                return false;
            }
            if self.cells[to]
                .compare_exchange_weak(
                    current_bits,
                    candidate.to_bits(),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                return true;
            }
        }
    }

    fn write_back(&self, dist: &mut [f64]) {
        for (slot, cell) in dist.iter_mut().zip(self.cells.iter()) {
            *slot = f64::from_bits(cell.load(Ordering::Relaxed));
        }
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
    fn parallel_batch_matches_serial_reference() {
        let mut par = Engine::new(path_graph());
        par.initialise(0);
        par.apply_changes_par(&[Change::delete(1, 2), Change::insert(0, 3, 1.0)], 0);

        let mut serial = Engine::new(path_graph());
        serial.initialise(0);
        serial.apply_changes(&[Change::delete(1, 2), Change::insert(0, 3, 1.0)], 0);

        assert_eq!(par.dist(), serial.dist());
    }

    #[test]
    fn parallel_noop_batch_is_stable() {
        let mut engine = Engine::new(path_graph());
        engine.initialise(0);
        let before = engine.dist().to_vec();
        engine.apply_changes_par(&[], 0);
        assert_eq!(engine.dist(), before.as_slice());
    }
}
