use crate::types::csr::Csr;
use crate::types::engine_error::EngineError;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Canonical key for an undirected edge: `(min(u, v), max(u, v))`.
type EdgeKey = (usize, usize);

fn canon(u: usize, v: usize) -> EdgeKey {
    if u <= v { (u, v) } else { (v, u) }
}

/// Mutable set of undirected weighted edges with canonical keying and
/// lazy removal.
///
/// Two structures: an ordered sequence of `(u, v, w)` tuples that is
/// never compacted on `remove`, plus a membership index (`live`) that
/// records which keys are still present. `snapshot()` is the one-time
/// filter that skips stale entries when building a `Csr`; this
/// amortises `remove` to O(1) at the cost of a linear scan per
/// snapshot.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    // Ordered sequence of ever-inserted edges; may contain stale (removed) keys.
    entries: Vec<(EdgeKey, f64)>,
    // Canonical keys currently live. Absence here makes an `entries` row stale.
    live: HashSet<EdgeKey>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            live: HashSet::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Adds an edge with the given weight, defaulting to `1.0`.
    ///
    /// A duplicate key is a no-op: the existing weight is kept.
    pub fn add(&mut self, u: usize, v: usize, w: f64) {
        let key = canon(u, v);
        if self.live.insert(key) {
            self.entries.push((key, w));
        }
    }

    /// Removes an edge. Absent keys are a no-op. The backing sequence
    /// is left untouched; `snapshot()` filters it.
    pub fn remove(&mut self, u: usize, v: usize) {
        self.live.remove(&canon(u, v));
    }

    pub fn contains(&self, u: usize, v: usize) -> bool {
        self.live.contains(&canon(u, v))
    }

    /// Maximum endpoint over currently live keys, or `None` if empty.
    pub fn max_vertex_id(&self) -> Option<usize> {
        self.live.iter().map(|&(a, b)| a.max(b)).max()
    }

    /// Number of vertices implied by the current edge set: `max_vertex_id + 1`, or `0` if empty.
    pub fn num_vertices(&self) -> usize {
        self.max_vertex_id().map_or(0, |m| m + 1)
    }

    /// Builds a fresh, immutable CSR snapshot from the currently live edges.
    pub fn snapshot(&self) -> Csr {
        Csr::from_edge_set(self)
    }

    /// Iterates live `(u, v, w)` triples in canonical `u <= v` order, skipping stale entries.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.entries
            .iter()
            .filter(move |(key, _)| self.live.contains(key))
            .map(|&((u, v), w)| (u, v, w))
    }

    /// Loads an undirected edge list from a text file.
    ///
    /// Delimiters are comma or whitespace, interchangeably. Blank lines
    /// and lines starting with `#` are skipped. The first non-blank,
    /// non-comment line is tolerated as an optional header: if it fails
    /// to parse as `u v [w]` it is skipped once; any later unparseable
    /// line is a hard error. `one_based` decrements both endpoints on
    /// read.
    pub fn from_edgelist_file<P: AsRef<Path>>(
        path: P,
        one_based: bool,
    ) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EngineError::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut edges = Self::new();
        let mut header_pending = true;

        for line in reader.lines() {
            let line = line.map_err(|source| EngineError::InputNotFound {
                path: path.to_path_buf(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match parse_edge_line(trimmed, one_based) {
                Some((u, v, w)) => {
                    header_pending = false;
                    edges.add(u, v, w);
                }
                None if header_pending => {
                    header_pending = false;
                }
                None => return Err(EngineError::MalformedLine { line }),
            }
        }

        Ok(edges)
    }
}

fn parse_edge_line(line: &str, one_based: bool) -> Option<(usize, usize, f64)> {
    let normalized = line.replace(',', " ");
    let mut fields = normalized.split_whitespace();

    let u: i64 = fields.next()?.parse().ok()?;
    let v: i64 = fields.next()?.parse().ok()?;
    let w: f64 = match fields.next() {
        Some(tok) => tok.parse().ok()?,
        None => 1.0,
    };

    let (u, v) = if one_based { (u - 1, v - 1) } else { (u, v) };
    if u < 0 || v < 0 {
        return None;
    }
    Some((u as usize, v as usize, w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_snapshot_yields_one_live_edge() {
        let mut edges = EdgeSet::new();
        edges.add(0, 1, 2.5);
        assert_eq!(edges.len(), 1);
        assert!(edges.contains(0, 1));
        assert!(edges.contains(1, 0));
    }

    #[test]
    fn duplicate_insert_is_noop_and_keeps_original_weight() {
        let mut edges = EdgeSet::new();
        edges.add(0, 1, 2.5);
        edges.add(1, 0, 99.0);
        assert_eq!(edges.len(), 1);
        let (_, _, w) = edges.iter().next().unwrap();
        assert_eq!(w, 2.5);
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let mut edges = EdgeSet::new();
        edges.add(0, 1, 1.0);
        edges.remove(5, 6);
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn remove_then_snapshot_does_not_resurrect_stale_entry() {
        let mut edges = EdgeSet::new();
        edges.add(0, 1, 1.0);
        edges.add(1, 2, 1.0);
        edges.remove(0, 1);
        assert_eq!(edges.len(), 1);
        let remaining: Vec<_> = edges.iter().collect();
        assert_eq!(remaining, vec![(1, 2, 1.0)]);
    }

    #[test]
    fn max_vertex_id_tracks_live_keys_only() {
        let mut edges = EdgeSet::new();
        edges.add(0, 5, 1.0);
        assert_eq!(edges.max_vertex_id(), Some(5));
        edges.remove(0, 5);
        assert_eq!(edges.max_vertex_id(), None);
    }

    #[test]
    fn self_loop_is_accepted_but_carries_no_meaning() {
        let mut edges = EdgeSet::new();
        edges.add(3, 3, 1.0);
        assert!(edges.contains(3, 3));
    }

    #[test]
    fn load_from_file_skips_comments_blank_lines_and_unparseable_header() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "# a comment").unwrap();
        writeln!(file, "FromNode ToNode").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "0 1").unwrap();
        writeln!(file, "1,2,2.5").unwrap();

        let edges = EdgeSet::from_edgelist_file(file.path(), false).unwrap();
        assert_eq!(edges.len(), 2);
        assert!(edges.contains(0, 1));
        assert!(edges.contains(1, 2));
    }

    #[test]
    fn load_from_file_applies_one_based_correction() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "1 2").unwrap();
        let edges = EdgeSet::from_edgelist_file(file.path(), true).unwrap();
        assert!(edges.contains(0, 1));
    }

    #[test]
    fn load_from_file_errors_on_later_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "0 1").unwrap();
        writeln!(file, "not an edge").unwrap();
        let result = EdgeSet::from_edgelist_file(file.path(), false);
        assert!(matches!(result, Err(EngineError::MalformedLine { .. })));
    }

    #[test]
    fn load_from_file_missing_path_is_input_not_found() {
        let result = EdgeSet::from_edgelist_file("/no/such/path.edgelist", false);
        assert!(matches!(result, Err(EngineError::InputNotFound { .. })));
    }
}
