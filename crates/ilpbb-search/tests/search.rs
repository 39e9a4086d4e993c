//! End-to-end searches over small 0/1 programs with the simplex oracle.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use ilpbb_search::{
    branch_and_bound, BnbResult, BnbSettings, BranchAndBound, NodeAction, NodeEvent, Relaxation,
    RelaxationOracle, SimplexOracle, TerminationReason,
};
use ilpbb_solver::{ConstraintOp, LpProblem, Solver, VarBounds};

fn binary_problem(names: Vec<String>, costs: Vec<f64>) -> LpProblem {
    let n = names.len();
    let mut problem = LpProblem::new(names);
    problem.set_objective(costs, true);
    for j in 0..n {
        problem.set_bounds(j, VarBounds::binary()).unwrap();
    }
    problem
}

/// min sum c_ij x_ij, each row and column assigned exactly once.
fn assignment(cost: &[Vec<f64>]) -> LpProblem {
    let n = cost.len();
    let names = (0..n).flat_map(|i| (0..n).map(move |j| format!("x_{}_{}", i, j))).collect();
    let mut problem = binary_problem(names, cost.iter().flatten().copied().collect());
    for i in 0..n {
        problem
            .add_sparse_constraint(format!("row_{}", i), (0..n).map(|j| (i * n + j, 1.0)), ConstraintOp::Eq, 1.0)
            .unwrap();
        problem
            .add_sparse_constraint(format!("col_{}", i), (0..n).map(|j| (j * n + i, 1.0)), ConstraintOp::Eq, 1.0)
            .unwrap();
    }
    problem
}

/// Generalized assignment: tasks j to agents i, with agent capacities.
fn generalized_assignment(cost: &[Vec<f64>], resource: &[Vec<f64>], capacity: &[f64]) -> LpProblem {
    let m = cost.len();
    let n = cost[0].len();
    let names = (0..m).flat_map(|i| (0..n).map(move |j| format!("x_{}_{}", i, j))).collect();
    let mut problem = binary_problem(names, cost.iter().flatten().copied().collect());
    for j in 0..n {
        problem
            .add_sparse_constraint(format!("task_{}", j), (0..m).map(|i| (i * n + j, 1.0)), ConstraintOp::Eq, 1.0)
            .unwrap();
    }
    for i in 0..m {
        problem
            .add_sparse_constraint(
                format!("capacity_{}", i),
                (0..n).map(|j| (i * n + j, resource[i][j])),
                ConstraintOp::Le,
                capacity[i],
            )
            .unwrap();
    }
    problem
}

fn small_gap() -> LpProblem {
    generalized_assignment(
        &[vec![3.0, 2.0, 5.0, 4.0], vec![4.0, 3.0, 2.0, 6.0]],
        &[vec![2.0, 3.0, 2.0, 3.0], vec![3.0, 2.0, 2.0, 2.0]],
        &[5.0, 4.0],
    )
}

/// max 5a + 4b + 3c + 7d s.t. 2a + 3b + c + 4d <= 6, as a minimization.
fn knapsack() -> LpProblem {
    let mut problem = binary_problem(
        vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()],
        vec![-5.0, -4.0, -3.0, -7.0],
    );
    problem.add_constraint("weight", vec![2.0, 3.0, 1.0, 4.0], ConstraintOp::Le, 6.0);
    problem
}

fn solve_traced(problem: LpProblem) -> (ilpbb_search::BnbOutcome, Vec<NodeEvent>) {
    let mut events: Vec<NodeEvent> = Vec::new();
    let outcome = BranchAndBound::new(BnbSettings::default())
        .solve_with_monitor(problem, &mut SimplexOracle::new(), &mut events)
        .unwrap();
    (outcome, events)
}

#[test]
fn test_three_by_three_assignment_terminates_optimal() {
    let cost = vec![vec![4.0, 1.0, 3.0], vec![2.0, 0.0, 5.0], vec![3.0, 2.0, 2.0]];
    let outcome = branch_and_bound(assignment(&cost), 1e-6, Duration::from_secs(120)).unwrap();

    assert!((outcome.best_objective - 5.0).abs() < 1e-6, "obj = {}", outcome.best_objective);
    assert_eq!(outcome.gap_percent, 0.0);
    assert_eq!(outcome.termination, TerminationReason::StackExhausted);
    assert_eq!(outcome.stats.nodes_open, 0);
}

#[test]
fn test_generalized_assignment_scenario() {
    let outcome = branch_and_bound(small_gap(), 1e-6, Duration::from_secs(120)).unwrap();

    assert!((outcome.best_objective - 12.0).abs() < 1e-6, "obj = {}", outcome.best_objective);
    assert!((outcome.best_bound - 12.0).abs() < 1e-6, "bound = {}", outcome.best_bound);
    assert_eq!(outcome.gap_percent, 0.0);

    let incumbent = outcome.incumbent.unwrap();
    // Tasks 0 and 3 on agent 0, tasks 1 and 2 on agent 1
    assert_eq!(incumbent.rounded_values(), vec![1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
}

#[test]
fn test_knapsack_needs_branching() {
    let (outcome, events) = solve_traced(knapsack());

    assert!((outcome.best_objective + 12.0).abs() < 1e-6, "obj = {}", outcome.best_objective);
    assert_eq!(outcome.gap_percent, 0.0);
    assert!(matches!(events[0].action, NodeAction::Branched { .. }));
    assert!(outcome.nodes_explored > 1);
}

#[test]
fn test_child_relaxation_never_beats_parent() {
    for problem in [small_gap(), knapsack()] {
        let (_, events) = solve_traced(problem);
        let bounds: HashMap<u64, f64> = events.iter().filter_map(|e| e.relaxation.map(|r| (e.id, r))).collect();

        for event in events.iter().filter(|e| e.id != e.parent_id) {
            if let (Some(child), Some(parent)) = (event.relaxation, bounds.get(&event.parent_id)) {
                assert!(child >= parent - 1e-7, "node {}: {} < parent {}", event.id, child, parent);
            }
        }
    }
}

#[test]
fn test_nodes_at_or_above_incumbent_are_never_expanded() {
    for problem in [small_gap(), knapsack()] {
        let (_, events) = solve_traced(problem);

        for event in &events {
            match (event.relaxation, event.action) {
                (Some(r), NodeAction::Branched { .. }) => assert!(r < event.incumbent),
                (Some(r), NodeAction::Pruned) => assert!(r >= event.incumbent),
                (Some(r), _) => assert!(r < event.incumbent),
                (None, action) => assert!(matches!(action, NodeAction::Discarded(_))),
            }
        }
    }
}

#[test]
fn test_bound_never_exceeds_incumbent() {
    for problem in [small_gap(), knapsack()] {
        let outcome = branch_and_bound(problem, 1e-6, Duration::from_secs(120)).unwrap();
        assert!(outcome.best_bound <= outcome.best_objective);
        assert!(outcome.gap_percent >= 0.0);
    }
}

#[test]
fn test_resolve_is_deterministic() {
    let first = branch_and_bound(small_gap(), 1e-6, Duration::from_secs(120)).unwrap();
    let second = branch_and_bound(small_gap(), 1e-6, Duration::from_secs(120)).unwrap();

    assert_eq!(first.best_objective, second.best_objective);
    assert_eq!(first.nodes_explored, second.nodes_explored);
}

#[test]
fn test_zero_time_limit() {
    let outcome = branch_and_bound(small_gap(), 1e-6, Duration::ZERO).unwrap();

    assert!(outcome.nodes_explored <= 1);
    assert_eq!(outcome.best_objective, f64::INFINITY);
    assert_eq!(outcome.gap_percent, f64::INFINITY);
}

#[test]
fn test_infeasible_program_reports_no_solution() {
    // x0 + x1 = 3 over binaries
    let mut problem = binary_problem(vec!["x0".to_string(), "x1".to_string()], vec![1.0, 1.0]);
    problem.add_constraint("three", vec![1.0, 1.0], ConstraintOp::Eq, 3.0);

    let outcome = branch_and_bound(problem, 1e-6, Duration::from_secs(10)).unwrap();

    assert!(!outcome.has_solution());
    assert_eq!(outcome.best_objective, f64::INFINITY);
    assert_eq!(outcome.gap_percent, f64::INFINITY);
    assert_eq!(outcome.stats.nodes_infeasible, 1);
}

/// Records the budget handed to each oracle call.
struct BudgetRecorder {
    inner: SimplexOracle,
    budgets: Vec<Duration>,
}

impl RelaxationOracle for BudgetRecorder {
    fn resolve(&mut self, model: &LpProblem, budget: Duration) -> BnbResult<Relaxation> {
        self.budgets.push(budget);
        self.inner.resolve(model, budget)
    }
}

#[test]
fn test_oracle_receives_remaining_global_budget() {
    let limit = Duration::from_secs(60);
    let mut oracle = BudgetRecorder {
        inner: SimplexOracle::new(),
        budgets: Vec::new(),
    };
    let outcome = BranchAndBound::new(BnbSettings::new().with_time_limit(limit))
        .solve(knapsack(), &mut oracle)
        .unwrap();

    assert_eq!(oracle.budgets.len() as u64, outcome.nodes_explored);
    assert!(oracle.budgets.iter().all(|b| *b <= limit));
    assert!(oracle.budgets.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn test_exhausted_iteration_cap_is_not_infeasibility() {
    let mut oracle = SimplexOracle::with_solver(Solver::new().with_max_iterations(0));
    let outcome = BranchAndBound::default().solve(knapsack(), &mut oracle).unwrap();

    assert_eq!(outcome.nodes_explored, 1);
    assert_eq!(outcome.stats.nodes_timed_out, 1);
    assert_eq!(outcome.stats.nodes_infeasible, 0);
    assert_eq!(outcome.termination, TerminationReason::Incomplete);
    assert!(!outcome.has_solution());
    assert!(!outcome.is_optimal());
}

/// Replays relaxations in pop order, stalling on the call listed in `stall_on`.
struct Stalling {
    script: Vec<Relaxation>,
    calls: usize,
    stall_on: usize,
    stall: Duration,
}

impl RelaxationOracle for Stalling {
    fn resolve(&mut self, _model: &LpProblem, _budget: Duration) -> BnbResult<Relaxation> {
        self.calls += 1;
        if self.calls == self.stall_on {
            thread::sleep(self.stall);
        }
        Ok(self.script.remove(0))
    }
}

#[test]
fn test_time_limit_with_open_frontier_reports_positive_gap() {
    let mut problem = binary_problem(vec!["x0".to_string(), "x1".to_string()], vec![1.0, 1.0]);
    problem.add_constraint("cover", vec![1.0, 1.0], ConstraintOp::Ge, 1.0);

    // Root branches on x0; the left child yields the incumbent and uses up the
    // clock, leaving the right child on the stack.
    let mut oracle = Stalling {
        script: vec![
            Relaxation::optimal(1.0, vec![0.5, 0.5]),
            Relaxation::optimal(3.0, vec![0.0, 1.0]),
        ],
        calls: 0,
        stall_on: 2,
        stall: Duration::from_millis(300),
    };
    let settings = BnbSettings::new().with_time_limit(Duration::from_millis(200));
    let outcome = BranchAndBound::new(settings).solve(problem, &mut oracle).unwrap();

    assert_eq!(outcome.termination, TerminationReason::TimeLimit);
    assert_eq!(outcome.nodes_explored, 2);
    assert_eq!(outcome.stats.nodes_open, 1);
    assert_eq!(outcome.best_objective, 3.0);
    assert_eq!(outcome.best_bound, 1.0);
    assert!(outcome.best_bound < outcome.best_objective);
    assert!((outcome.gap_percent - 200.0 / 3.0).abs() < 1e-9, "gap = {}", outcome.gap_percent);
    assert!(outcome.has_solution());
    assert!(!outcome.is_optimal());
}
