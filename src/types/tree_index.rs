/// Child-list view of a `parent` array, rebuilt from scratch whenever
/// invoked.
///
/// Stores, for each vertex, the head of its child list (`child_head`)
/// and a singly-linked sibling chain (`next_sib`) so that children of
/// `u` can be enumerated by walking `child_head[u]` through
/// `next_sib`. The same two-index-array shape `Csr` uses for
/// adjacency, applied here to a forest instead of a flat adjacency
/// list: it avoids any cyclic `Rc`/`RefCell` ownership and stays
/// cache-friendly.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    child_head: Vec<Option<usize>>,
    next_sib: Vec<Option<usize>>,
}

impl TreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the child-list view from a `parent` array of length `n`.
    pub fn build(parent: &[Option<usize>]) -> Self {
        let n = parent.len();
        let mut child_head = vec![None; n];
        let mut next_sib = vec![None; n];

        for (v, p) in parent.iter().enumerate() {
            if let Some(p) = *p {
                next_sib[v] = child_head[p];
                child_head[p] = Some(v);
            }
        }

        Self {
            child_head,
            next_sib,
        }
    }

    /// Non-allocating iterator over the direct children of `u`.
    pub fn children(&self, u: usize) -> ChildIter<'_> {
        ChildIter {
            next: self.child_head.get(u).copied().flatten(),
            next_sib: &self.next_sib,
        }
    }

    pub fn len(&self) -> usize {
        self.child_head.len()
    }

    pub fn is_empty(&self) -> bool {
        self.child_head.is_empty()
    }
}

pub struct ChildIter<'a> {
    next: Option<usize>,
    next_sib: &'a [Option<usize>],
}

impl Iterator for ChildIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.next_sib[current];
        Some(current)
    }
}
