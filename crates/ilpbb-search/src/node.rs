//! Search node representation.

use ilpbb_solver::LpProblem;

/// Identifier issued to each node when it is pushed.
pub type NodeId = u64;

/// A node on the search stack.
///
/// Each node owns its model outright; a child's model is a clone of its
/// parent's with exactly one bound tightened.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,

    /// Parent node ID (the root is its own parent).
    pub parent_id: NodeId,

    /// Depth in the tree (0 for root).
    pub depth: usize,

    /// The relaxation solved at this node.
    pub model: LpProblem,
}

impl Node {
    /// Create the root node.
    pub fn root(id: NodeId, model: LpProblem) -> Self {
        Self {
            id,
            parent_id: id,
            depth: 0,
            model,
        }
    }

    /// Create a child of `self` owning `model`.
    pub fn child(&self, id: NodeId, model: LpProblem) -> Self {
        Self {
            id,
            parent_id: self.id,
            depth: self.depth + 1,
            model,
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == self.parent_id
    }
}
