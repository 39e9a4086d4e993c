//! The LP relaxation oracle seam.

use std::time::Duration;

use ilpbb_solver::{LpProblem, SolutionStatus, Solver};

use crate::error::{BnbError, BnbResult};

/// Outcome class of one relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RelaxationStatus {
    /// Solved to optimality; objective and values are usable.
    Optimal,
    /// No point satisfies the node's constraints and bounds.
    Infeasible,
    /// The budget ran out before optimality was certified.
    TimeLimit,
}

/// The answer to one relaxation solve.
#[derive(Debug, Clone)]
pub struct Relaxation {
    pub status: RelaxationStatus,
    pub objective: f64,
    pub values: Vec<f64>,
}

impl Relaxation {
    pub fn optimal(objective: f64, values: Vec<f64>) -> Self {
        Self {
            status: RelaxationStatus::Optimal,
            objective,
            values,
        }
    }

    pub fn infeasible() -> Self {
        Self {
            status: RelaxationStatus::Infeasible,
            objective: f64::INFINITY,
            values: Vec::new(),
        }
    }

    pub fn time_limit() -> Self {
        Self {
            status: RelaxationStatus::TimeLimit,
            objective: f64::INFINITY,
            values: Vec::new(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == RelaxationStatus::Optimal
    }
}

/// Solves the LP relaxation of a node's model.
///
/// `budget` is the wall-clock time the call may use. Infeasibility and
/// running out of budget are ordinary answers; an `Err` aborts the search.
pub trait RelaxationOracle {
    fn resolve(&mut self, model: &LpProblem, budget: Duration) -> BnbResult<Relaxation>;
}

impl<O: RelaxationOracle + ?Sized> RelaxationOracle for &mut O {
    fn resolve(&mut self, model: &LpProblem, budget: Duration) -> BnbResult<Relaxation> {
        (**self).resolve(model, budget)
    }
}

/// Oracle backed by the bundled simplex [`Solver`].
#[derive(Default)]
pub struct SimplexOracle {
    solver: Solver,
}

impl SimplexOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solver(solver: Solver) -> Self {
        Self { solver }
    }
}

impl RelaxationOracle for SimplexOracle {
    fn resolve(&mut self, model: &LpProblem, budget: Duration) -> BnbResult<Relaxation> {
        let solution = self.solver.solve_within(model, budget);

        match solution.status {
            SolutionStatus::Optimal => Ok(Relaxation::optimal(solution.objective_value, solution.values)),
            SolutionStatus::Infeasible => Ok(Relaxation::infeasible()),
            SolutionStatus::TimeLimit | SolutionStatus::IterationLimit => Ok(Relaxation::time_limit()),
            SolutionStatus::Unbounded => Err(BnbError::SolverInternal(
                "relaxation is unbounded".to_string(),
            )),
            SolutionStatus::Error => {
                // The solver only reports Error for models that fail validation
                match model.validate() {
                    Err(e) => Err(e.into()),
                    Ok(()) => Err(BnbError::SolverInternal("simplex solver failed".to_string())),
                }
            }
        }
    }
}
