use crate::{Change, EdgeSet, Engine};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Builds the five-node, five-edge graph used across unit tests:
/// 0-1 (10), 0-2 (20), 1-3 (30), 2-3 (40), 3-4 (50).
pub fn small_weighted_edge_set() -> EdgeSet {
    let mut edges = EdgeSet::new();
    edges.add(0, 1, 10.0);
    edges.add(0, 2, 20.0);
    edges.add(1, 3, 30.0);
    edges.add(2, 3, 40.0);
    edges.add(3, 4, 50.0);
    edges
}

/// Convenience wrapper: the small weighted graph, already initialised
/// from vertex 0.
pub fn small_weighted_engine() -> Engine {
    let mut engine = Engine::new(small_weighted_edge_set());
    engine.initialise(0);
    engine
}

/// Builds an Erdos-Renyi-style random undirected graph over
/// `num_vertices` vertices, including every edge independently with
/// probability `edge_probability`, weights drawn uniformly from
/// `[1.0, 10.0)`. Deterministic given `seed`, for reproducible
/// property tests.
pub fn random_edge_set(num_vertices: usize, edge_probability: f64, seed: u64) -> EdgeSet {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut edges = EdgeSet::new();
    for u in 0..num_vertices {
        for v in (u + 1)..num_vertices {
            if rng.random_bool(edge_probability) {
                edges.add(u, v, rng.random_range(1.0..10.0));
            }
        }
    }
    edges
}

/// Generates a batch of `count` random insert/delete events over
/// vertex ids in `[0, num_vertices)`, deterministic given `seed`.
/// Deletions target edges drawn from `existing` when available so a
/// meaningful fraction of the batch actually mutates tree structure.
pub fn random_batch(
    num_vertices: usize,
    existing: &EdgeSet,
    count: usize,
    seed: u64,
) -> Vec<Change> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let live: Vec<(usize, usize, f64)> = existing.iter().collect();
    let mut batch = Vec::with_capacity(count);

    for _ in 0..count {
        let is_delete = !live.is_empty() && rng.random_bool(0.5);
        if is_delete {
            let &(u, v, _) = &live[rng.random_range(0..live.len())];
            batch.push(Change::delete(u, v));
        } else {
            let u = rng.random_range(0..num_vertices);
            let v = rng.random_range(0..num_vertices);
            batch.push(Change::insert(u, v, rng.random_range(1.0..10.0)));
        }
    }
    batch
}
