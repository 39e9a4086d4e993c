pub mod atsp;
pub mod gap;
pub mod reader;
pub mod ufl;

pub use atsp::AtspInstance;
pub use gap::GapInstance;
pub use reader::{InstanceError, Tokens};
pub use ufl::{UflFormulation, UflInstance};

use ilpbb_solver::LpProblem;

/// A benchmark family together with the formulation to build for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ProblemKind {
    /// Generalized assignment
    Gap,
    /// Uncapacitated facility location, `x_ij <= y_j`
    UflStrong,
    /// Uncapacitated facility location, `sum_i x_ij <= n y_j`
    UflWeak,
    /// Asymmetric TSP with Miller-Tucker-Zemlin potentials
    AtspMtz,
    /// Asymmetric TSP with multi-commodity flows
    AtspMcf,
}

impl ProblemKind {
    /// Parse an instance file's contents and build the relaxed model.
    pub fn build(self, source: &str) -> Result<LpProblem, InstanceError> {
        match self {
            ProblemKind::Gap => GapInstance::parse(source)?.to_problem(),
            ProblemKind::UflStrong => UflInstance::parse(source)?.to_problem(UflFormulation::Strong),
            ProblemKind::UflWeak => UflInstance::parse(source)?.to_problem(UflFormulation::Weak),
            ProblemKind::AtspMtz => AtspInstance::parse(source)?.to_mtz_problem(),
            ProblemKind::AtspMcf => AtspInstance::parse(source)?.to_mcf_problem(),
        }
    }
}
