//! Depth-first branch-and-bound driver.

use std::time::{Duration, Instant};

use ilpbb_solver::LpProblem;

use crate::branching::{choose_branching_variable, BranchCandidate};
use crate::error::{BnbError, BnbResult};
use crate::frontier::FrontierTable;
use crate::incumbent::Incumbent;
use crate::monitor::{NodeAction, NodeEvent, NoOpMonitor, SearchMonitor};
use crate::node::{Node, NodeId};
use crate::oracle::{Relaxation, RelaxationOracle, RelaxationStatus, SimplexOracle};
use crate::outcome::{gap_percent, BnbOutcome, SearchStats, TerminationReason};
use crate::settings::BnbSettings;

/// Branch-and-bound driver.
///
/// Explores the tree depth-first from an explicit stack. Each popped node is
/// resolved by the oracle with the remaining global time budget; nodes whose
/// relaxation is not optimal, or is not strictly below the incumbent, are
/// dropped. Integral relaxations may become the incumbent; fractional ones
/// split on the first fractional variable, left child (`x <= floor`) explored
/// first.
#[derive(Debug, Clone, Default)]
pub struct BranchAndBound {
    settings: BnbSettings,
}

impl BranchAndBound {
    pub fn new(settings: BnbSettings) -> Self {
        Self { settings }
    }

    /// Search from `root` using `oracle` for every relaxation.
    pub fn solve<O>(&self, root: LpProblem, oracle: &mut O) -> BnbResult<BnbOutcome>
    where
        O: RelaxationOracle + ?Sized,
    {
        self.solve_with_monitor(root, oracle, &mut NoOpMonitor)
    }

    /// Like [`solve`](Self::solve), reporting every processed node to `monitor`.
    pub fn solve_with_monitor<O, M>(&self, root: LpProblem, oracle: &mut O, monitor: &mut M) -> BnbResult<BnbOutcome>
    where
        O: RelaxationOracle + ?Sized,
        M: SearchMonitor + ?Sized,
    {
        root.validate()?;
        if !root.objective.minimize {
            return Err(BnbError::ModelConstruction(
                "objective must be minimized; negate the coefficients of a maximization".to_string(),
            ));
        }

        let mut search = Search::new(&self.settings, root);
        let termination = search.run(oracle, monitor)?;
        Ok(search.finalize(termination))
    }
}

/// Runs the search on `model` with the bundled simplex oracle.
pub fn branch_and_bound(model: LpProblem, tolerance: f64, time_limit: Duration) -> BnbResult<BnbOutcome> {
    let settings = BnbSettings::new()
        .with_tolerance(tolerance)
        .with_time_limit(time_limit);
    BranchAndBound::new(settings).solve(model, &mut SimplexOracle::new())
}

/// Per-run state.
struct Search<'a> {
    settings: &'a BnbSettings,
    stack: Vec<Node>,
    frontier: FrontierTable,
    incumbent: Option<Incumbent>,
    stats: SearchStats,
    next_node_id: NodeId,
    start: Instant,
}

impl<'a> Search<'a> {
    fn new(settings: &'a BnbSettings, root: LpProblem) -> Self {
        Self {
            settings,
            stack: vec![Node::root(0, root)],
            frontier: FrontierTable::new(),
            incumbent: None,
            stats: SearchStats::default(),
            next_node_id: 1, // 0 is the root
            start: Instant::now(),
        }
    }

    fn best_objective(&self) -> f64 {
        self.incumbent.as_ref().map_or(f64::INFINITY, |inc| inc.objective)
    }

    fn run<O, M>(&mut self, oracle: &mut O, monitor: &mut M) -> BnbResult<TerminationReason>
    where
        O: RelaxationOracle + ?Sized,
        M: SearchMonitor + ?Sized,
    {
        loop {
            if !self.stack.is_empty() && self.start.elapsed() >= self.settings.time_limit {
                log::info!(
                    "Time limit of {:.1}s reached with {} open nodes",
                    self.settings.time_limit.as_secs_f64(),
                    self.stack.len()
                );
                return Ok(TerminationReason::TimeLimit);
            }
            let Some(node) = self.stack.pop() else {
                if self.stats.nodes_timed_out > 0 {
                    log::warn!(
                        "{} relaxations ran out of budget; their subtrees were not searched",
                        self.stats.nodes_timed_out
                    );
                    return Ok(TerminationReason::Incomplete);
                }
                return Ok(TerminationReason::StackExhausted);
            };

            let event = self.expand(node, oracle)?;
            monitor.on_node(&event);
            self.log_progress();
        }
    }

    /// Resolves one node and acts on the result.
    fn expand<O>(&mut self, node: Node, oracle: &mut O) -> BnbResult<NodeEvent>
    where
        O: RelaxationOracle + ?Sized,
    {
        self.stats.nodes_explored += 1;
        self.stats.max_depth = self.stats.max_depth.max(node.depth);
        if !node.is_root() {
            self.frontier.child_popped(node.parent_id);
        }

        let budget = self.settings.time_limit.saturating_sub(self.start.elapsed());
        let relaxation = oracle.resolve(&node.model, budget)?;
        let incumbent = self.best_objective();

        let mut event = NodeEvent {
            id: node.id,
            parent_id: node.parent_id,
            depth: node.depth,
            relaxation: relaxation.is_optimal().then_some(relaxation.objective),
            incumbent,
            action: NodeAction::Pruned,
        };

        event.action = match relaxation.status {
            RelaxationStatus::Infeasible => {
                self.stats.nodes_infeasible += 1;
                NodeAction::Discarded(relaxation.status)
            }
            RelaxationStatus::TimeLimit => {
                self.stats.nodes_timed_out += 1;
                NodeAction::Discarded(relaxation.status)
            }
            RelaxationStatus::Optimal if relaxation.objective >= incumbent => {
                self.stats.nodes_pruned += 1;
                NodeAction::Pruned
            }
            RelaxationStatus::Optimal => {
                self.frontier.record(node.id, relaxation.objective);
                self.branch_or_accept(node, relaxation)?
            }
        };

        self.frontier.settle(event.id);
        log::debug!(
            "node {} (parent {}, depth {}): {:?} relaxation={:?}",
            event.id,
            event.parent_id,
            event.depth,
            event.action,
            event.relaxation
        );

        Ok(event)
    }

    fn branch_or_accept(&mut self, node: Node, relaxation: Relaxation) -> BnbResult<NodeAction> {
        if relaxation.values.len() != node.model.num_variables() {
            return Err(BnbError::ModelConstruction(format!(
                "relaxation returned {} values for {} variables",
                relaxation.values.len(),
                node.model.num_variables()
            )));
        }

        match choose_branching_variable(&relaxation.values, self.settings.tolerance) {
            None => Ok(self.accept(node, relaxation)),
            Some(candidate) => {
                self.branch(&node, candidate)?;
                Ok(NodeAction::Branched {
                    variable: candidate.index,
                    value: candidate.value,
                })
            }
        }
    }

    fn accept(&mut self, node: Node, relaxation: Relaxation) -> NodeAction {
        if !Incumbent::improves(self.incumbent.as_ref(), relaxation.objective) {
            return NodeAction::Integral;
        }

        log::info!(
            "New incumbent: obj={:.6} at node {} (depth {}, {} nodes explored)",
            relaxation.objective,
            node.id,
            node.depth,
            self.stats.nodes_explored
        );

        self.frontier.record_integral(node.id, relaxation.objective);
        self.stats.incumbent_updates += 1;
        self.incumbent = Some(Incumbent {
            objective: relaxation.objective,
            values: relaxation.values,
            node_id: node.id,
            model: node.model,
        });
        NodeAction::NewIncumbent
    }

    /// Pushes the right child, then the left one so it is popped next.
    fn branch(&mut self, node: &Node, candidate: BranchCandidate) -> BnbResult<()> {
        let right = candidate.right(&node.model)?;
        let left = candidate.left(&node.model)?;

        self.push_child(node, right);
        self.push_child(node, left);
        self.stats.nodes_branched += 1;
        Ok(())
    }

    fn push_child(&mut self, parent: &Node, model: LpProblem) {
        let id = self.next_node_id;
        self.next_node_id += 1;
        self.frontier.child_pushed(parent.id);
        self.stack.push(parent.child(id, model));
    }

    fn log_progress(&self) {
        if !self.settings.verbose || self.stats.nodes_explored % self.settings.log_freq.max(1) != 0 {
            return;
        }

        log::info!(
            "Nodes: {} ({} open) | Bound: {:.6} | Incumbent: {:.6} | Time: {:.1}s",
            self.stats.nodes_explored,
            self.stack.len(),
            self.frontier.best_bound().unwrap_or(f64::INFINITY),
            self.best_objective(),
            self.start.elapsed().as_secs_f64(),
        );
    }

    fn finalize(mut self, termination: TerminationReason) -> BnbOutcome {
        let elapsed = self.start.elapsed();
        let best_objective = self.best_objective();
        let best_bound = self.frontier.best_bound().unwrap_or(best_objective);
        let gap_percent = gap_percent(best_objective, best_bound);
        self.stats.nodes_open = self.stack.len();

        log::info!(
            "Search finished ({:?}): bound={:.6} objective={:.6} gap={:.4}% nodes={} time={:.3}s",
            termination,
            best_bound,
            best_objective,
            gap_percent,
            self.stats.nodes_explored,
            elapsed.as_secs_f64()
        );

        BnbOutcome {
            best_bound,
            best_objective,
            elapsed,
            gap_percent,
            nodes_explored: self.stats.nodes_explored,
            termination,
            stats: self.stats,
            incumbent: self.incumbent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilpbb_solver::{ConstraintOp, VarBounds};

    /// Replays scripted relaxations in pop order.
    struct Scripted(Vec<Relaxation>);

    impl RelaxationOracle for Scripted {
        fn resolve(&mut self, _model: &LpProblem, _budget: Duration) -> BnbResult<Relaxation> {
            if self.0.is_empty() {
                return Err(BnbError::SolverInternal("script exhausted".to_string()));
            }
            Ok(self.0.remove(0))
        }
    }

    fn binaries(n: usize) -> LpProblem {
        let mut problem = LpProblem::new((0..n).map(|i| format!("x{}", i)).collect());
        for j in 0..n {
            problem.set_bounds(j, VarBounds::binary()).unwrap();
        }
        problem
    }

    #[test]
    fn test_integral_root_is_optimal() {
        let mut oracle = Scripted(vec![Relaxation::optimal(4.0, vec![1.0, 0.0])]);
        let outcome = BranchAndBound::default().solve(binaries(2), &mut oracle).unwrap();

        assert_eq!(outcome.best_objective, 4.0);
        assert_eq!(outcome.best_bound, 4.0);
        assert_eq!(outcome.gap_percent, 0.0);
        assert_eq!(outcome.nodes_explored, 1);
        assert!(outcome.is_optimal());
    }

    #[test]
    fn test_left_child_explored_first_and_ties_pruned() {
        let mut oracle = Scripted(vec![
            // root: x0 fractional
            Relaxation::optimal(1.0, vec![0.5, 0.0]),
            // left (x0 <= 0): integral incumbent at 3
            Relaxation::optimal(3.0, vec![0.0, 1.0]),
            // right (x0 >= 1): tied with the incumbent, pruned
            Relaxation::optimal(3.0, vec![1.0, 0.0]),
        ]);
        let mut events: Vec<NodeEvent> = Vec::new();
        let outcome = BranchAndBound::default()
            .solve_with_monitor(binaries(2), &mut oracle, &mut events)
            .unwrap();

        assert_eq!(outcome.best_objective, 3.0);
        assert_eq!(outcome.nodes_explored, 3);
        assert_eq!(outcome.stats.nodes_pruned, 1);
        assert_eq!(outcome.incumbent.as_ref().unwrap().node_id, 2);
        assert_eq!(
            events.iter().map(|e| e.action).collect::<Vec<_>>(),
            vec![
                NodeAction::Branched { variable: 0, value: 0.5 },
                NodeAction::NewIncumbent,
                NodeAction::Pruned,
            ]
        );
        // Left child (id 2) was pushed last and popped first
        assert_eq!(events[1].id, 2);
        assert_eq!(events[2].id, 1);
        assert!(events.iter().skip(1).all(|e| e.parent_id == 0));
        assert_eq!(outcome.gap_percent, 0.0);
    }

    #[test]
    fn test_discarded_nodes_and_no_incumbent() {
        let mut oracle = Scripted(vec![
            Relaxation::optimal(1.0, vec![0.5]),
            Relaxation::infeasible(),
            Relaxation::time_limit(),
        ]);
        let outcome = BranchAndBound::default().solve(binaries(1), &mut oracle).unwrap();

        assert_eq!(outcome.best_objective, f64::INFINITY);
        assert_eq!(outcome.gap_percent, f64::INFINITY);
        assert_eq!(outcome.best_bound, f64::INFINITY);
        assert_eq!(outcome.stats.nodes_infeasible, 1);
        assert_eq!(outcome.stats.nodes_timed_out, 1);
        assert!(!outcome.has_solution());
        assert_eq!(outcome.termination, TerminationReason::Incomplete);
    }

    #[test]
    fn test_timed_out_relaxation_blocks_optimality() {
        let mut oracle = Scripted(vec![
            Relaxation::optimal(1.0, vec![0.5]),
            Relaxation::optimal(2.0, vec![0.0]),
            Relaxation::time_limit(),
        ]);
        let outcome = BranchAndBound::default().solve(binaries(1), &mut oracle).unwrap();

        assert_eq!(outcome.best_objective, 2.0);
        assert_eq!(outcome.termination, TerminationReason::Incomplete);
        assert!(outcome.has_solution());
        assert!(!outcome.is_optimal());
    }

    #[test]
    fn test_maximization_is_rejected() {
        // max x0 + 3 x1 s.t. 3 x0 + 2 x1 <= 3
        let mut problem = binaries(2);
        problem.set_objective(vec![1.0, 3.0], false);
        problem.add_constraint("weight", vec![3.0, 2.0], ConstraintOp::Le, 3.0);

        let err = branch_and_bound(problem, 1e-6, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, BnbError::ModelConstruction(_)));
    }

    #[test]
    fn test_zero_time_limit_explores_nothing() {
        let mut oracle = Scripted(Vec::new());
        let settings = BnbSettings::new().with_time_limit(Duration::ZERO);
        let outcome = BranchAndBound::new(settings).solve(binaries(1), &mut oracle).unwrap();

        assert_eq!(outcome.nodes_explored, 0);
        assert_eq!(outcome.best_objective, f64::INFINITY);
        assert_eq!(outcome.gap_percent, f64::INFINITY);
        assert_eq!(outcome.termination, TerminationReason::TimeLimit);
        assert_eq!(outcome.stats.nodes_open, 1);
    }

    #[test]
    fn test_oracle_error_aborts() {
        let mut oracle = Scripted(Vec::new());
        let err = BranchAndBound::default().solve(binaries(1), &mut oracle).unwrap_err();
        assert!(matches!(err, BnbError::SolverInternal(_)));
    }

    #[test]
    fn test_value_count_mismatch_is_model_error() {
        let mut oracle = Scripted(vec![Relaxation::optimal(1.0, vec![0.5])]);
        let err = BranchAndBound::default().solve(binaries(2), &mut oracle).unwrap_err();
        assert!(matches!(err, BnbError::ModelConstruction(_)));
    }

    #[test]
    fn test_invalid_root_is_model_error() {
        let mut problem = binaries(2);
        problem.add_constraint("short", vec![1.0], ConstraintOp::Le, 1.0);
        let err = branch_and_bound(problem, 1e-6, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, BnbError::ModelConstruction(_)));
    }
}
