//! Error types for the branch-and-bound search.

use ilpbb_solver::ProblemError;
use thiserror::Error;

/// Fatal errors that abort a search.
///
/// Infeasible or timed-out relaxations are not errors: the node is dropped
/// and the search goes on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BnbError {
    /// The model handed to the search is malformed
    #[error("Model construction error: {0}")]
    ModelConstruction(String),

    /// The relaxation oracle failed in a way the search cannot recover from
    #[error("Solver internal error: {0}")]
    SolverInternal(String),
}

impl From<ProblemError> for BnbError {
    fn from(err: ProblemError) -> Self {
        BnbError::ModelConstruction(err.to_string())
    }
}

/// Result type for branch-and-bound operations.
pub type BnbResult<T> = Result<T, BnbError>;
