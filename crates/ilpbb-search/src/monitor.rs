//! Hooks for observing node decisions.

use crate::node::NodeId;
use crate::oracle::RelaxationStatus;

/// What the search did with a popped node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeAction {
    /// The relaxation was infeasible or ran out of time.
    Discarded(RelaxationStatus),
    /// The relaxation could not beat the incumbent.
    Pruned,
    /// The relaxation was integral and became the incumbent.
    NewIncumbent,
    /// The relaxation was integral but did not improve the incumbent.
    Integral,
    /// Two children were pushed, split on `variable` at `value`.
    Branched { variable: usize, value: f64 },
}

/// One processed node, as seen by a [`SearchMonitor`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEvent {
    pub id: NodeId,
    pub parent_id: NodeId,
    pub depth: usize,
    /// Relaxation objective, when the relaxation was solved to optimality.
    pub relaxation: Option<f64>,
    /// Incumbent objective at the time the node was popped.
    pub incumbent: f64,
    pub action: NodeAction,
}

/// Receives one event per processed node.
pub trait SearchMonitor {
    fn on_node(&mut self, event: &NodeEvent);
}

/// A monitor that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMonitor;

impl SearchMonitor for NoOpMonitor {
    fn on_node(&mut self, _event: &NodeEvent) {}
}

impl SearchMonitor for Vec<NodeEvent> {
    fn on_node(&mut self, event: &NodeEvent) {
        self.push(event.clone());
    }
}
