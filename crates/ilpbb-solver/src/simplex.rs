use std::time::{Duration, Instant};

use crate::problem::{ConstraintOp, LpProblem, VarBounds};
use crate::solution::Solution;

/// Artificial variables above this level after phase 1 mean the problem is infeasible.
const FEASIBILITY_TOLERANCE: f64 = 1e-7;

/// Simplex solver for linear programming problems
pub struct Solver {
    /// Maximum pivots over both phases of one solve before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 50_000,
            tolerance: 1e-9,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        self.solve_with_deadline(problem, None)
    }

    /// Solve, giving up with [`SolutionStatus::TimeLimit`] once `budget` has elapsed.
    ///
    /// [`SolutionStatus::TimeLimit`]: crate::SolutionStatus::TimeLimit
    pub fn solve_within(&self, problem: &LpProblem, budget: Duration) -> Solution {
        // A budget too large to represent is no deadline at all.
        let deadline = Instant::now().checked_add(budget);
        self.solve_with_deadline(problem, deadline)
    }

    /// Solve, checking `deadline` before every pivot.
    pub fn solve_with_deadline(&self, problem: &LpProblem, deadline: Option<Instant>) -> Solution {
        if problem.validate().is_err() {
            return Solution::error();
        }

        if problem.bounds.iter().any(|b| b.lower > b.upper + self.tolerance) {
            return Solution::infeasible();
        }

        if past(deadline) {
            return Solution::time_limit();
        }

        let mut tableau = self.build_tableau(problem);
        let mut iterations = 0;

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, deadline, &mut iterations) {
                SimplexResult::Optimal => {}
                SimplexResult::Infeasible | SimplexResult::Unbounded => {
                    return Solution::infeasible().with_iterations(iterations);
                }
                SimplexResult::TimeLimit => return Solution::time_limit().with_iterations(iterations),
                SimplexResult::IterationLimit => {
                    return Solution::iteration_limit().with_iterations(iterations);
                }
            }
        }

        // Phase 2: Optimize
        match self.phase2(&mut tableau, deadline, &mut iterations) {
            SimplexResult::Optimal => {}
            SimplexResult::Unbounded => return Solution::unbounded().with_iterations(iterations),
            SimplexResult::Infeasible => return Solution::infeasible().with_iterations(iterations),
            SimplexResult::TimeLimit => return Solution::time_limit().with_iterations(iterations),
            SimplexResult::IterationLimit => {
                return Solution::iteration_limit().with_iterations(iterations);
            }
        }

        self.extract_solution(&tableau, problem, iterations)
    }

    /// Rewrites the problem over shifted variables `x' = x - lb >= 0`.
    ///
    /// Finite upper bounds become `x' <= ub - lb` rows and every row is
    /// normalized to a non-negative right-hand side.
    fn standard_rows(&self, problem: &LpProblem) -> Vec<Row> {
        let n_vars = problem.num_variables();
        let mut rows = Vec::with_capacity(problem.num_constraints() + n_vars);

        for c in &problem.constraints {
            let shift: f64 = c
                .coefficients
                .iter()
                .zip(&problem.bounds)
                .map(|(a, b)| a * b.lower)
                .sum();
            rows.push(Row::normalized(c.coefficients.clone(), c.op, c.rhs - shift));
        }

        for (j, VarBounds { lower, upper }) in problem.bounds.iter().enumerate() {
            if upper.is_finite() {
                let mut coefficients = vec![0.0; n_vars];
                coefficients[j] = 1.0;
                rows.push(Row::normalized(coefficients, ConstraintOp::Le, (upper - lower).max(0.0)));
            }
        }

        rows
    }

    fn build_tableau(&self, problem: &LpProblem) -> Tableau {
        let n_vars = problem.num_variables();
        let rows = self.standard_rows(problem);
        let n_constraints = rows.len();

        // Count slack and artificial variables needed
        let mut n_slack = 0;
        let mut n_artificial = 0;

        for r in &rows {
            match r.op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS
        let total_rows = n_constraints + 1; // +1 for objective

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; total_rows],
            basic_vars: vec![0; n_constraints],
            n_vars,
            n_slack,
            n_artificial,
        };

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;

        for (i, r) in rows.iter().enumerate() {
            tableau.data[i][..n_vars].copy_from_slice(&r.coefficients);
            tableau.data[i][total_cols - 1] = r.rhs;

            match r.op {
                ConstraintOp::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    tableau.basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    tableau.data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // Simplex maximizes, so for minimization we negate the coefficients
        let obj_row = n_constraints;
        for (j, &coef) in problem.objective.coefficients.iter().enumerate() {
            tableau.data[obj_row][j] = if problem.objective.minimize { -coef } else { coef };
        }

        tableau
    }

    fn phase1(&self, tableau: &mut Tableau, deadline: Option<Instant>, iterations: &mut usize) -> SimplexResult {
        // Maximize -sum(artificials), i.e. minimize their sum
        let n_constraints = tableau.data.len() - 1;
        let n_cols = tableau.data[0].len();
        let art_start = tableau.n_vars + tableau.n_slack;

        let orig_obj = tableau.data[n_constraints].clone();

        tableau.data[n_constraints].iter_mut().for_each(|v| *v = 0.0);
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[n_constraints][j] = -1.0;
        }

        // Price out the basic artificials
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] += tableau.data[i][j];
                }
            }
        }

        match self.iterate(tableau, n_cols - 1, deadline, iterations) {
            SimplexResult::Optimal => {}
            // Unbounded in phase 1 means infeasible original
            SimplexResult::Unbounded => return SimplexResult::Infeasible,
            other => return other,
        }

        let rhs_col = n_cols - 1;
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start && tableau.data[i][rhs_col].abs() > FEASIBILITY_TOLERANCE {
                return SimplexResult::Infeasible;
            }
        }

        self.drive_out_artificials(tableau);

        // Restore original objective and adjust for basic variables
        tableau.data[n_constraints] = orig_obj;
        for i in 0..n_constraints {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[n_constraints][basic];
            if ratio.abs() > self.tolerance {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        SimplexResult::Optimal
    }

    /// Pivots zero-level artificials out of the basis so phase 2 cannot grow them.
    ///
    /// Rows with no usable structural entry are redundant and keep their artificial.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let n_constraints = tableau.data.len() - 1;
        let art_start = tableau.n_vars + tableau.n_slack;

        for i in 0..n_constraints {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            let entering = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance.max(1e-7));
            if let Some(col) = entering {
                self.pivot(tableau, i, col);
            }
        }
    }

    fn phase2(&self, tableau: &mut Tableau, deadline: Option<Instant>, iterations: &mut usize) -> SimplexResult {
        // Exclude artificial variable columns from pivoting
        let exclude_from = tableau.n_vars + tableau.n_slack;
        self.iterate(tableau, exclude_from, deadline, iterations)
    }

    /// Runs pivots over columns `0..col_limit` until no reduced cost improves.
    ///
    /// Uses Dantzig pricing, falling back to Bland's rule after a degenerate
    /// pivot so that degenerate stalls cannot cycle.
    fn iterate(
        &self,
        tableau: &mut Tableau,
        col_limit: usize,
        deadline: Option<Instant>,
        iterations: &mut usize,
    ) -> SimplexResult {
        let rhs_col = tableau.data[0].len() - 1;
        let mut bland = false;

        loop {
            let Some(pivot_col) = self.find_pivot_column(tableau, col_limit, bland) else {
                return SimplexResult::Optimal;
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col, bland) else {
                return SimplexResult::Unbounded;
            };
            if past(deadline) {
                return SimplexResult::TimeLimit;
            }
            // `iterations` carries over from phase 1, so the cap spans the whole solve
            if *iterations >= self.max_iterations {
                return SimplexResult::IterationLimit;
            }
            bland = tableau.data[pivot_row][rhs_col].abs() <= self.tolerance;
            self.pivot(tableau, pivot_row, pivot_col);
            *iterations += 1;
        }
    }

    fn find_pivot_column(&self, tableau: &Tableau, col_limit: usize, bland: bool) -> Option<usize> {
        let obj_row = &tableau.data[tableau.data.len() - 1];

        if bland {
            return (0..col_limit).find(|&j| obj_row[j] > self.tolerance);
        }

        // Look for the most positive reduced cost (can improve objective)
        let mut max_val = self.tolerance;
        let mut max_col = None;

        for (j, &val) in obj_row.iter().enumerate().take(col_limit) {
            if val > max_val {
                max_val = val;
                max_col = Some(j);
            }
        }

        max_col
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize, bland: bool) -> Option<usize> {
        let n_constraints = tableau.data.len() - 1;
        let rhs_col = tableau.data[0].len() - 1;

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..n_constraints {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col].max(0.0) / val;
            let better = match min_row {
                None => true,
                Some(r) if (ratio - min_ratio).abs() <= self.tolerance => {
                    bland && tableau.basic_vars[i] < tableau.basic_vars[r]
                }
                Some(_) => ratio < min_ratio,
            };
            if better {
                min_ratio = ratio;
                min_row = Some(i);
            }
        }

        min_row
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_rows = tableau.data.len();

        tableau.basic_vars[row] = col;

        let pivot_val = tableau.data[row][col];
        tableau.data[row].iter_mut().for_each(|v| *v /= pivot_val);

        let pivot_row = tableau.data[row].clone();
        for i in 0..n_rows {
            if i == row {
                continue;
            }
            let factor = tableau.data[i][col];
            if factor == 0.0 {
                continue;
            }
            for (v, p) in tableau.data[i].iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
        }
    }

    fn extract_solution(&self, tableau: &Tableau, problem: &LpProblem, iterations: usize) -> Solution {
        let n_vars = problem.num_variables();
        let n_constraints = tableau.basic_vars.len();
        let rhs_col = tableau.data[0].len() - 1;

        let mut values: Vec<f64> = problem.bounds.iter().map(|b| b.lower).collect();
        for i in 0..n_constraints {
            let basic = tableau.basic_vars[i];
            if basic < n_vars {
                values[basic] += tableau.data[i][rhs_col];
            }
        }

        let objective_value = problem.evaluate(&values);
        Solution::optimal(values, objective_value, iterations)
    }
}

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// A constraint row over shifted variables with `rhs >= 0`.
struct Row {
    coefficients: Vec<f64>,
    op: ConstraintOp,
    rhs: f64,
}

impl Row {
    fn normalized(mut coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) -> Self {
        if rhs >= 0.0 {
            return Self { coefficients, op, rhs };
        }
        coefficients.iter_mut().for_each(|c| *c = -*c);
        let op = match op {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        };
        Self { coefficients, op, rhs: -rhs }
    }
}

struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
}

enum SimplexResult {
    Optimal,
    Unbounded,
    Infeasible,
    TimeLimit,
    IterationLimit,
}
