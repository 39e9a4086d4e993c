//! Asymmetric travelling salesman (TSPLIB `FULL_MATRIX` format).

use ilpbb_solver::{ConstraintOp, LpProblem, VarBounds};

use crate::reader::{InstanceError, Tokens};

const WEIGHT_SECTION: &str = "EDGE_WEIGHT_SECTION";

#[derive(Debug, Clone, PartialEq)]
pub struct AtspInstance {
    pub name: Option<String>,
    pub cities: usize,
    /// `cost[i][j]` of the arc `i -> j`
    pub cost: Vec<Vec<f64>>,
}

impl AtspInstance {
    /// Reads `KEY: value` header lines up to `EDGE_WEIGHT_SECTION`, then a
    /// `DIMENSION x DIMENSION` matrix.
    pub fn parse(source: &str) -> Result<Self, InstanceError> {
        let section = source
            .find(WEIGHT_SECTION)
            .ok_or_else(|| InstanceError::MissingHeader(WEIGHT_SECTION.to_string()))?;
        let (header, body) = source.split_at(section);

        let mut name = None;
        let mut dimension = None;
        for line in header.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            match key.trim() {
                "NAME" => name = Some(value.trim().to_string()),
                "DIMENSION" => {
                    let value = value.trim();
                    dimension = Some(value.parse::<usize>().map_err(|_| InstanceError::InvalidNumber {
                        expected: "DIMENSION".to_string(),
                        found: value.to_string(),
                        position: 0,
                    })?);
                }
                _ => {}
            }
        }

        let cities = dimension.ok_or_else(|| InstanceError::MissingHeader("DIMENSION".to_string()))?;
        if cities < 2 {
            return Err(InstanceError::InvalidDimensions(format!("{} cities", cities)));
        }

        let mut tokens = Tokens::new(&body[WEIGHT_SECTION.len()..]);
        let cost = tokens.matrix(cities, cities, "edge weight")?;

        Ok(Self { name, cities, cost })
    }

    /// Variable index of the arc `x[i][j]`.
    pub fn arc_var(&self, from: usize, to: usize) -> usize {
        from * self.cities + to
    }

    /// Arc variables `x[i][j]` in `[0, 1]`, self-loops fixed to zero, plus
    /// the two degree constraints per city.
    fn assignment_core(&self, extra: impl IntoIterator<Item = String>) -> Result<LpProblem, InstanceError> {
        let n = self.cities;
        let names = (0..n)
            .flat_map(|i| (0..n).map(move |j| format!("x[{},{}]", i, j)))
            .chain(extra)
            .collect();

        let mut problem = LpProblem::new(names);
        let mut objective = vec![0.0; problem.num_variables()];
        for i in 0..n {
            for j in 0..n {
                let var = self.arc_var(i, j);
                if i != j {
                    objective[var] = self.cost[i][j];
                    problem.set_bounds(var, VarBounds::binary())?;
                } else {
                    problem.set_bounds(var, VarBounds::new(0.0, 0.0))?;
                }
            }
        }
        problem.set_objective(objective, true);

        for i in 0..n {
            problem.add_sparse_constraint(
                format!("out[{}]", i),
                (0..n).filter(|&j| j != i).map(|j| (self.arc_var(i, j), 1.0)),
                ConstraintOp::Eq,
                1.0,
            )?;
            problem.add_sparse_constraint(
                format!("in[{}]", i),
                (0..n).filter(|&j| j != i).map(|j| (self.arc_var(j, i), 1.0)),
                ConstraintOp::Eq,
                1.0,
            )?;
        }

        Ok(problem)
    }

    /// Miller-Tucker-Zemlin model: potentials `u` with `u[0] = 1`,
    /// `2 <= u[i] <= n`, and `u[i] - u[j] + n x[i][j] <= n - 1` for `i, j >= 1`.
    pub fn to_mtz_problem(&self) -> Result<LpProblem, InstanceError> {
        let n = self.cities;
        let mut problem = self.assignment_core((0..n).map(|i| format!("u[{}]", i)))?;
        let u = |i: usize| n * n + i;

        problem.set_bounds(u(0), VarBounds::new(1.0, 1.0))?;
        for i in 1..n {
            problem.set_bounds(u(i), VarBounds::new(2.0, n as f64))?;
        }

        for i in 1..n {
            for j in (1..n).filter(|&j| j != i) {
                problem.add_sparse_constraint(
                    format!("subtour[{},{}]", i, j),
                    [(u(i), 1.0), (u(j), -1.0), (self.arc_var(i, j), n as f64)],
                    ConstraintOp::Le,
                    (n - 1) as f64,
                )?;
            }
        }

        Ok(problem)
    }

    /// Multi-commodity flow model: commodity `k` ships one unit from city 0 to
    /// city `k` along arcs with `f[i][j][k] <= x[i][j]`.
    pub fn to_mcf_problem(&self) -> Result<LpProblem, InstanceError> {
        let n = self.cities;
        let flows = (0..n).flat_map(|i| (0..n).flat_map(move |j| (0..n).map(move |k| format!("f[{},{},{}]", i, j, k))));
        let mut problem = self.assignment_core(flows)?;
        let f = |i: usize, j: usize, k: usize| n * n + (i * n + j) * n + k;

        for i in 0..n {
            for k in 0..n {
                problem.set_bounds(f(i, i, k), VarBounds::new(0.0, 0.0))?;
            }
        }

        for k in 1..n {
            problem.add_sparse_constraint(
                format!("flow_out_source[{}]", k),
                (0..n).map(|j| (f(0, j, k), 1.0)),
                ConstraintOp::Eq,
                1.0,
            )?;
            problem.add_sparse_constraint(
                format!("flow_in_source[{}]", k),
                (0..n).map(|j| (f(j, 0, k), 1.0)),
                ConstraintOp::Eq,
                0.0,
            )?;
            problem.add_sparse_constraint(
                format!("flow_out_sink[{}]", k),
                (0..n).map(|j| (f(k, j, k), 1.0)),
                ConstraintOp::Eq,
                0.0,
            )?;
            problem.add_sparse_constraint(
                format!("flow_in_sink[{}]", k),
                (0..n).map(|j| (f(j, k, k), 1.0)),
                ConstraintOp::Eq,
                1.0,
            )?;

            for i in (1..n).filter(|&i| i != k) {
                let out = (0..n).filter(|&j| j != i).map(|j| (f(i, j, k), 1.0));
                let inflow = (0..n).filter(|&j| j != i).map(|j| (f(j, i, k), -1.0));
                problem.add_sparse_constraint(
                    format!("conservation[{},{}]", i, k),
                    out.chain(inflow),
                    ConstraintOp::Eq,
                    0.0,
                )?;
            }
        }

        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                for k in 0..n {
                    problem.add_sparse_constraint(
                        format!("link[{},{},{}]", i, j, k),
                        [(f(i, j, k), 1.0), (self.arc_var(i, j), -1.0)],
                        ConstraintOp::Le,
                        0.0,
                    )?;
                }
            }
        }

        Ok(problem)
    }
}
