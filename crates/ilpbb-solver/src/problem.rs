use thiserror::Error;

/// Represents a linear programming problem with bounded variables
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Variable names, in declaration order
    pub variables: Vec<String>,
    /// Bound interval for each variable
    pub bounds: Vec<VarBounds>,
    /// Objective function coefficients (costs)
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

/// Closed interval `[lower, upper]` a variable may take.
///
/// `upper` may be `f64::INFINITY`; `lower` must be finite.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VarBounds {
    pub lower: f64,
    pub upper: f64,
}

impl VarBounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// The relaxed domain of a binary variable.
    pub fn binary() -> Self {
        Self::new(0.0, 1.0)
    }

    /// `[0, +inf)`, the default for continuous variables.
    pub fn non_negative() -> Self {
        Self::new(0.0, f64::INFINITY)
    }

    pub fn is_empty(&self) -> bool {
        self.lower > self.upper
    }
}

impl Default for VarBounds {
    fn default() -> Self {
        Self::non_negative()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Unknown variable index {index} (problem has {count} variables)")]
    UnknownVariable { index: usize, count: usize },
    #[error("Objective has {found} coefficients, expected {expected}")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("Constraint {name} has {found} coefficients, expected {expected}")]
    ConstraintLength {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Variable {0} has a non-finite lower bound")]
    UnboundedBelow(String),
    #[error("Variable {0} has a NaN bound")]
    NanBound(String),
}

impl LpProblem {
    /// Creates a problem whose variables all live in `[0, +inf)`.
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            bounds: vec![VarBounds::default(); n],
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    /// Adds a constraint from `(variable index, coefficient)` pairs.
    ///
    /// Repeated indices accumulate.
    pub fn add_sparse_constraint(
        &mut self,
        name: impl Into<String>,
        terms: impl IntoIterator<Item = (usize, f64)>,
        op: ConstraintOp,
        rhs: f64,
    ) -> Result<(), ProblemError> {
        let count = self.num_variables();
        let mut coefficients = vec![0.0; count];
        for (index, coef) in terms {
            let slot = coefficients
                .get_mut(index)
                .ok_or(ProblemError::UnknownVariable { index, count })?;
            *slot += coef;
        }
        self.add_constraint(name, coefficients, op, rhs);
        Ok(())
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn bounds(&self, index: usize) -> Result<VarBounds, ProblemError> {
        self.bounds.get(index).copied().ok_or(ProblemError::UnknownVariable {
            index,
            count: self.num_variables(),
        })
    }

    pub fn set_bounds(&mut self, index: usize, bounds: VarBounds) -> Result<(), ProblemError> {
        let count = self.num_variables();
        let slot = self
            .bounds
            .get_mut(index)
            .ok_or(ProblemError::UnknownVariable { index, count })?;
        *slot = bounds;
        Ok(())
    }

    pub fn set_lower_bound(&mut self, index: usize, lower: f64) -> Result<(), ProblemError> {
        let current = self.bounds(index)?;
        self.set_bounds(index, VarBounds::new(lower, current.upper))
    }

    pub fn set_upper_bound(&mut self, index: usize, upper: f64) -> Result<(), ProblemError> {
        let current = self.bounds(index)?;
        self.set_bounds(index, VarBounds::new(current.lower, upper))
    }

    /// Objective value of `values` under this problem's coefficients.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Checks that every vector has one entry per variable and every lower
    /// bound is finite.
    pub fn validate(&self) -> Result<(), ProblemError> {
        let expected = self.num_variables();

        if self.objective.coefficients.len() != expected {
            return Err(ProblemError::ObjectiveLength {
                expected,
                found: self.objective.coefficients.len(),
            });
        }

        for c in &self.constraints {
            if c.coefficients.len() != expected {
                return Err(ProblemError::ConstraintLength {
                    name: c.name.clone(),
                    expected,
                    found: c.coefficients.len(),
                });
            }
        }

        if self.bounds.len() != expected {
            return Err(ProblemError::UnknownVariable {
                index: self.bounds.len().min(expected),
                count: expected,
            });
        }

        for (name, b) in self.variables.iter().zip(&self.bounds) {
            if b.lower.is_nan() || b.upper.is_nan() {
                return Err(ProblemError::NanBound(name.clone()));
            }
            if !b.lower.is_finite() {
                return Err(ProblemError::UnboundedBelow(name.clone()));
            }
        }

        Ok(())
    }
}
