//! Best integral solution found so far.

use ilpbb_solver::LpProblem;

use crate::node::NodeId;

/// An integral solution together with the node model that produced it.
#[derive(Debug, Clone)]
pub struct Incumbent {
    /// Objective value.
    pub objective: f64,

    /// Variable values, in declaration order.
    pub values: Vec<f64>,

    /// Node that produced it.
    pub node_id: NodeId,

    /// Snapshot of that node's model (bounds included).
    pub model: LpProblem,
}

impl Incumbent {
    /// Whether `objective` strictly improves on `current`.
    pub fn improves(current: Option<&Incumbent>, objective: f64) -> bool {
        current.is_none_or(|inc| objective < inc.objective)
    }

    /// Values rounded to the nearest integer.
    pub fn rounded_values(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.round()).collect()
    }
}
