//! Uncapacitated facility location (OR-Library `cap` format, capacities ignored).

use ilpbb_solver::{ConstraintOp, LpProblem, VarBounds};

use crate::reader::{InstanceError, Tokens};

/// How facility opening links to client assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UflFormulation {
    /// One `x_ij <= y_j` row per client/facility pair.
    Strong,
    /// One aggregated `sum_i x_ij <= n y_j` row per facility.
    Weak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UflInstance {
    pub facilities: usize,
    pub clients: usize,
    pub fixed_cost: Vec<f64>,
    /// `assignment_cost[i][j]` of serving client `i` from facility `j`
    pub assignment_cost: Vec<Vec<f64>>,
}

impl UflInstance {
    /// Reads `m n`, then `m` lines of `capacity fixed_cost`, then for each of
    /// the `n` clients a demand followed by `m` assignment costs.
    ///
    /// The capacity column may hold the literal word `capacity`; it is skipped.
    pub fn parse(source: &str) -> Result<Self, InstanceError> {
        let mut tokens = Tokens::new(source);
        let facilities: usize = tokens.parse("number of facilities")?;
        let clients: usize = tokens.parse("number of clients")?;
        if facilities == 0 || clients == 0 {
            return Err(InstanceError::InvalidDimensions(format!(
                "{} facilities, {} clients",
                facilities, clients
            )));
        }

        let mut fixed_cost = Vec::with_capacity(facilities);
        for _ in 0..facilities {
            tokens.next_token("facility capacity")?;
            fixed_cost.push(tokens.parse("fixed cost")?);
        }

        let mut assignment_cost = Vec::with_capacity(clients);
        for _ in 0..clients {
            tokens.next_token("client demand")?;
            assignment_cost.push(tokens.floats(facilities, "assignment cost")?);
        }

        Ok(Self {
            facilities,
            clients,
            fixed_cost,
            assignment_cost,
        })
    }

    /// Variable index of `y[j]`.
    pub fn open_var(&self, facility: usize) -> usize {
        facility
    }

    /// Variable index of `x[i][j]`.
    pub fn assign_var(&self, client: usize, facility: usize) -> usize {
        self.facilities + client * self.facilities + facility
    }

    /// Relaxed model with `y` first, then `x` client-major, all in `[0, 1]`.
    pub fn to_problem(&self, formulation: UflFormulation) -> Result<LpProblem, InstanceError> {
        let (m, n) = (self.facilities, self.clients);
        let names = (0..m)
            .map(|j| format!("y[{}]", j))
            .chain((0..n).flat_map(|i| (0..m).map(move |j| format!("x[{},{}]", i, j))))
            .collect();

        let mut problem = LpProblem::new(names);
        let objective = self
            .fixed_cost
            .iter()
            .chain(self.assignment_cost.iter().flatten())
            .copied()
            .collect();
        problem.set_objective(objective, true);
        for j in 0..problem.num_variables() {
            problem.set_bounds(j, VarBounds::binary())?;
        }

        for i in 0..n {
            problem.add_sparse_constraint(
                format!("assign[{}]", i),
                (0..m).map(|j| (self.assign_var(i, j), 1.0)),
                ConstraintOp::Eq,
                1.0,
            )?;
        }

        match formulation {
            UflFormulation::Strong => {
                for i in 0..n {
                    for j in 0..m {
                        problem.add_sparse_constraint(
                            format!("link[{},{}]", i, j),
                            [(self.assign_var(i, j), 1.0), (self.open_var(j), -1.0)],
                            ConstraintOp::Le,
                            0.0,
                        )?;
                    }
                }
            }
            UflFormulation::Weak => {
                for j in 0..m {
                    let terms = (0..n)
                        .map(|i| (self.assign_var(i, j), 1.0))
                        .chain([(self.open_var(j), -(n as f64))]);
                    problem.add_sparse_constraint(format!("link[{}]", j), terms, ConstraintOp::Le, 0.0)?;
                }
            }
        }

        Ok(problem)
    }
}
