//! Branching variable selection and the floor/ceil split.

use ilpbb_solver::LpProblem;

use crate::error::BnbResult;

/// A fractional variable picked for branching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchCandidate {
    /// Variable index in declaration order.
    pub index: usize,

    /// Its value in the parent's relaxation.
    pub value: f64,
}

impl BranchCandidate {
    /// The split point `floor(value)`, by truncation toward zero.
    ///
    /// Only meaningful for integer-domain variables, where the relaxation
    /// value is non-negative.
    pub fn split_point(&self) -> f64 {
        self.value.trunc()
    }

    /// Child with `x <= floor(value)`.
    pub fn left(&self, parent: &LpProblem) -> BnbResult<LpProblem> {
        let mut model = parent.clone();
        model.set_upper_bound(self.index, self.split_point())?;
        Ok(model)
    }

    /// Child with `x >= floor(value) + 1`.
    pub fn right(&self, parent: &LpProblem) -> BnbResult<LpProblem> {
        let mut model = parent.clone();
        model.set_lower_bound(self.index, self.split_point() + 1.0)?;
        Ok(model)
    }
}

/// Returns the first variable, in declaration order, whose value lies strictly
/// inside `(tolerance, 1 - tolerance)`.
///
/// `None` means the relaxation is integral up to `tolerance`. This is a
/// first-found rule, not a most-fractional one.
pub fn choose_branching_variable(values: &[f64], tolerance: f64) -> Option<BranchCandidate> {
    values
        .iter()
        .position(|&x| tolerance < x && x < 1.0 - tolerance)
        .map(|index| BranchCandidate {
            index,
            value: values[index],
        })
}
