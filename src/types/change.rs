/// A single edit to the edge set, as consumed by `Engine::apply_changes`.
///
/// An op tag plus the two endpoints and a weight that is meaningful
/// only for `Insert`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Insert,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    pub op: Op,
    pub u: usize,
    pub v: usize,
    /// Ignored for `Delete`. Defaults to `1.0` for inserted edges that
    /// omit a weight.
    pub w: f64,
}

impl Change {
    pub fn insert(u: usize, v: usize, w: f64) -> Self {
        Self {
            op: Op::Insert,
            u,
            v,
            w,
        }
    }

    pub fn delete(u: usize, v: usize) -> Self {
        Self {
            op: Op::Delete,
            u,
            v,
            w: 1.0,
        }
    }
}
