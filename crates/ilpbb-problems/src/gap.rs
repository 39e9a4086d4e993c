//! Generalized assignment problem (OR-Library `gap` format).

use ilpbb_solver::{ConstraintOp, LpProblem, VarBounds};

use crate::reader::{InstanceError, Tokens};

/// `m` agents, `n` tasks; every task goes to exactly one agent whose
/// capacity it consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct GapInstance {
    pub agents: usize,
    pub tasks: usize,
    /// `cost[i][j]` of giving task `j` to agent `i`
    pub cost: Vec<Vec<f64>>,
    /// `resource[i][j]` consumed by agent `i` doing task `j`
    pub resource: Vec<Vec<f64>>,
    pub capacity: Vec<f64>,
}

impl GapInstance {
    /// Reads `m n`, the `m x n` cost matrix, the `m x n` resource matrix and
    /// `m` capacities.
    pub fn parse(source: &str) -> Result<Self, InstanceError> {
        let mut tokens = Tokens::new(source);
        let agents: usize = tokens.parse("number of agents")?;
        let tasks: usize = tokens.parse("number of tasks")?;
        if agents == 0 || tasks == 0 {
            return Err(InstanceError::InvalidDimensions(format!("{} agents, {} tasks", agents, tasks)));
        }

        let cost = tokens.matrix(agents, tasks, "cost")?;
        let resource = tokens.matrix(agents, tasks, "resource")?;
        let capacity = tokens.floats(agents, "capacity")?;

        Ok(Self {
            agents,
            tasks,
            cost,
            resource,
            capacity,
        })
    }

    /// Variable index of `x[i][j]`.
    pub fn var(&self, agent: usize, task: usize) -> usize {
        agent * self.tasks + task
    }

    /// Relaxed model: `x[i][j]` in `[0, 1]`, agent-major order.
    pub fn to_problem(&self) -> Result<LpProblem, InstanceError> {
        let (m, n) = (self.agents, self.tasks);
        let names = (0..m)
            .flat_map(|i| (0..n).map(move |j| format!("x[{},{}]", i, j)))
            .collect();

        let mut problem = LpProblem::new(names);
        problem.set_objective(self.cost.iter().flatten().copied().collect(), true);
        for j in 0..m * n {
            problem.set_bounds(j, VarBounds::binary())?;
        }

        for j in 0..n {
            problem.add_sparse_constraint(
                format!("task[{}]", j),
                (0..m).map(|i| (self.var(i, j), 1.0)),
                ConstraintOp::Eq,
                1.0,
            )?;
        }

        for i in 0..m {
            problem.add_sparse_constraint(
                format!("capacity[{}]", i),
                (0..n).map(|j| (self.var(i, j), self.resource[i][j])),
                ConstraintOp::Le,
                self.capacity[i],
            )?;
        }

        Ok(problem)
    }
}
