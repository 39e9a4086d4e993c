//! Bound bookkeeping for the open part of the search tree.

use std::collections::HashMap;

use crate::node::NodeId;

/// Relaxation bounds of the nodes that still cover unexplored work.
///
/// A node is on the frontier while at least one of its children sits on the
/// stack. Integral leaves that improved the incumbent are kept separately and
/// never expire. Both are driven by push/pop events, so every update is O(1).
#[derive(Debug, Clone, Default)]
pub struct FrontierTable {
    /// Relaxation objective per node, while it matters.
    bounds: HashMap<NodeId, f64>,

    /// Children of each node still waiting on the stack.
    pending: HashMap<NodeId, usize>,

    /// Objectives of integral leaves that became the incumbent.
    integral: HashMap<NodeId, f64>,
}

impl FrontierTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A child of `parent` was pushed.
    pub fn child_pushed(&mut self, parent: NodeId) {
        *self.pending.entry(parent).or_insert(0) += 1;
    }

    /// A child of `parent` was popped.
    ///
    /// Once the last child leaves the stack the parent's bound is covered by
    /// its descendants and is dropped.
    pub fn child_popped(&mut self, parent: NodeId) {
        if let Some(count) = self.pending.get_mut(&parent) {
            *count -= 1;
            if *count == 0 {
                self.pending.remove(&parent);
                self.bounds.remove(&parent);
            }
        }
    }

    /// Record the relaxation objective of an expanded node.
    pub fn record(&mut self, id: NodeId, objective: f64) {
        self.bounds.insert(id, objective);
    }

    /// Record an integral leaf that became the incumbent.
    pub fn record_integral(&mut self, id: NodeId, objective: f64) {
        self.integral.insert(id, objective);
    }

    /// Drop `id` unless it has children on the stack.
    ///
    /// Called once a popped node has been fully processed.
    pub fn settle(&mut self, id: NodeId) {
        if !self.pending.contains_key(&id) {
            self.bounds.remove(&id);
        }
    }

    /// Smallest recorded bound over the frontier and the integral leaves.
    pub fn best_bound(&self) -> Option<f64> {
        self.bounds
            .values()
            .chain(self.integral.values())
            .copied()
            .reduce(f64::min)
    }

    /// Number of nodes currently on the frontier.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.bounds.contains_key(&id)
    }
}
