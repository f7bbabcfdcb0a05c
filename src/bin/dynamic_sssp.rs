//! CLI driver for the dynamic SSSP engine: loads an edge-list graph,
//! picks a source by maximum degree, applies a synthetic seeded batch
//! of insertions/deletions, times the update, and appends a row to a
//! results log.

use anyhow::{Context, Result};
use clap::Parser;
use dynamic_sssp::{Change, Engine};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::time::Instant;

/// Maintain an incremental shortest-path tree over a mutating graph.
#[derive(Parser, Debug)]
#[command(name = "dynamic_sssp", version, about)]
struct Args {
    /// Path to an edge-list file (whitespace- or comma-delimited `u v [w]`).
    #[arg(long, default_value = "data/roadNet-CA.edgelist")]
    graph: PathBuf,

    /// Number of insert/delete events in the synthetic update batch.
    #[arg(long, default_value_t = 15_000)]
    batch_size: usize,

    /// Seed for the synthetic batch's pseudo-random stream.
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Minimum tree distance the reported target path must have.
    #[arg(long, default_value_t = 5.0)]
    min_distance: f64,

    /// Whether the edge-list file uses 1-based vertex ids.
    #[arg(long, default_value_t = false)]
    one_based: bool,

    /// Path to the results CSV log.
    #[arg(long, default_value = "results.csv")]
    results: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    let mut engine = Engine::from_edgelist_file(&args.graph, args.one_based)
        .with_context(|| format!("loading graph from {}", args.graph.display()))?;

    let source = max_degree_vertex(&engine).context("graph has no vertices")?;
    tracing::debug!(source, "selected source vertex by maximum degree");

    engine.initialise(source);

    let batch = synthetic_batch(engine.num_vertices(), args.batch_size, args.seed);

    let started = Instant::now();
    #[cfg(feature = "parallel")]
    engine.apply_changes_par(&batch, source);
    #[cfg(not(feature = "parallel"))]
    engine.apply_changes(&batch, source);
    let elapsed = started.elapsed();

    let target = target_at_min_distance(&engine, args.min_distance)
        .context("no reachable vertex at or beyond the configured minimum distance")?;
    let path = extract_path(&engine, source, target);

    println!(
        "source={source} target={target} dist={:.3} path_len={} elapsed_ms={:.3}",
        engine.dist()[target],
        path.len(),
        elapsed.as_secs_f64() * 1000.0,
    );

    append_result_row(
        &args.results,
        &args.graph.display().to_string(),
        args.batch_size,
        elapsed.as_secs_f64() * 1000.0,
    )?;

    Ok(())
}

/// Index of the vertex with the highest degree in the current CSR
/// snapshot, ties broken by lowest index. `None` for an empty graph.
fn max_degree_vertex(engine: &Engine) -> Option<usize> {
    let offsets = engine.graph().offsets();
    (0..engine.graph().num_vertices()).max_by_key(|&v| offsets[v + 1] - offsets[v])
}

/// The reachable vertex of maximum finite distance, subject to
/// `dist >= min_distance`. `None` if no vertex qualifies.
fn target_at_min_distance(engine: &Engine, min_distance: f64) -> Option<usize> {
    engine
        .dist()
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d.is_finite() && d >= min_distance)
        .max_by(|a, b| a.1.partial_cmp(b.1).expect("distances are never NaN"))
        .map(|(v, _)| v)
}

/// Walks `parent` from `target` back to `source`, returning the path
/// in source-to-target order. A free function rather than an `Engine`
/// method: the engine's contract ends at exposing `dist`/`parent` as
/// read-only views.
fn extract_path(engine: &Engine, source: usize, target: usize) -> Vec<usize> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        match engine.parent()[current] {
            Some(p) => {
                path.push(p);
                current = p;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Generates a deterministic batch of `count` insert/delete events over
/// vertex ids in `[0, num_vertices)`, drawn with equal probability.
fn synthetic_batch(num_vertices: usize, count: usize, seed: u64) -> Vec<Change> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut batch = Vec::with_capacity(count);
    for _ in 0..count {
        let u = rng.random_range(0..num_vertices);
        let v = rng.random_range(0..num_vertices);
        if rng.random_bool(0.5) {
            batch.push(Change::insert(u, v, rng.random_range(1.0..10.0)));
        } else {
            batch.push(Change::delete(u, v));
        }
    }
    batch
}

fn append_result_row(
    results_path: &std::path::Path,
    dataset: &str,
    batch_size: usize,
    time_ms: f64,
) -> Result<()> {
    let version = if cfg!(feature = "parallel") {
        "parallel"
    } else {
        "serial"
    };

    let needs_header = !results_path.exists()
        || std::fs::metadata(results_path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(results_path)
        .with_context(|| format!("opening results log at {}", results_path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if needs_header {
        writer.write_record(["dataset", "batch_size", "time_ms", "version"])?;
    }
    writer.write_record(&[
        dataset.to_string(),
        batch_size.to_string(),
        format!("{time_ms:.3}"),
        version.to_string(),
    ])?;
    writer.flush()?;
    Ok(())
}
