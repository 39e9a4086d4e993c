//! Search results.

use std::time::Duration;

use crate::incumbent::Incumbent;

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TerminationReason {
    /// Every node was resolved.
    StackExhausted,
    /// The time limit passed with nodes still on the stack.
    TimeLimit,
    /// The stack emptied, but some relaxations ran out of budget and their
    /// subtrees were never searched.
    Incomplete,
}

/// Node counters collected during the search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchStats {
    pub nodes_explored: u64,
    pub nodes_infeasible: u64,
    pub nodes_timed_out: u64,
    pub nodes_pruned: u64,
    pub nodes_branched: u64,
    pub incumbent_updates: u64,
    pub max_depth: usize,
    pub nodes_open: usize,
}

/// Result of a branch-and-bound run.
#[derive(Debug, Clone)]
pub struct BnbOutcome {
    /// Smallest relaxation bound over the open frontier and integral leaves.
    pub best_bound: f64,

    /// Objective of the incumbent, `+inf` if none was found.
    pub best_objective: f64,

    /// Wall-clock time spent searching.
    pub elapsed: Duration,

    /// Relative gap in percent, `+inf` without an incumbent.
    pub gap_percent: f64,

    /// Nodes popped from the stack.
    pub nodes_explored: u64,

    pub termination: TerminationReason,
    pub stats: SearchStats,
    pub incumbent: Option<Incumbent>,
}

impl BnbOutcome {
    /// `(best_bound, best_objective, elapsed_seconds, gap_percent, nodes_explored)`
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, u64) {
        (
            self.best_bound,
            self.best_objective,
            self.elapsed.as_secs_f64(),
            self.gap_percent,
            self.nodes_explored,
        )
    }

    pub fn has_solution(&self) -> bool {
        self.incumbent.is_some()
    }

    /// True when every node was resolved and an incumbent was found.
    pub fn is_optimal(&self) -> bool {
        self.termination == TerminationReason::StackExhausted && self.has_solution()
    }
}

/// MIP gap in percent between an incumbent objective and a lower bound.
///
/// `+inf` without an incumbent, `0` when they coincide. A zero incumbent with
/// a smaller bound also yields `+inf`.
pub fn gap_percent(best_objective: f64, best_bound: f64) -> f64 {
    if best_objective == f64::INFINITY {
        f64::INFINITY
    } else if best_objective == best_bound {
        0.0
    } else if best_objective == 0.0 {
        f64::INFINITY
    } else {
        (best_objective - best_bound) / best_objective.abs() * 100.0
    }
}
