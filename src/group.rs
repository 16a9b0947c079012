use std::sync::Arc;

struct Node {
    name: String,
    parent: Option<Arc<Node>>,
}

/// Append-only list of group names shared between derived handlers.
///
/// Pushing allocates one node and shares every earlier name with the
/// parent list, so long derivation chains stay linear.
#[derive(Clone, Default)]
pub struct GroupPath {
    tail: Option<Arc<Node>>,
    len: usize,
}

impl GroupPath {
    pub fn new() -> Self {
        GroupPath::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// New list with `name` appended; `self` is unchanged.
    pub fn push(&self, name: impl Into<String>) -> GroupPath {
        GroupPath {
            tail: Some(Arc::new(Node {
                name: name.into(),
                parent: self.tail.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Names from the outermost group inward.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.len);
        let mut node = self.tail.as_deref();
        while let Some(n) = node {
            names.push(n.name.as_str());
            node = n.parent.as_deref();
        }
        names.reverse();
        names
    }
}

impl std::fmt::Debug for GroupPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
