//! Branch-and-bound search for 0/1 integer linear programs.
//!
//! The search explores a tree of LP relaxations depth-first with an explicit
//! stack, branching on the first fractional variable and pruning nodes whose
//! relaxation cannot beat the incumbent. LP solving is delegated to a
//! [`RelaxationOracle`]; [`SimplexOracle`] adapts the bundled simplex solver.

mod branching;
mod error;
mod frontier;
mod incumbent;
mod monitor;
mod node;
mod oracle;
mod outcome;
mod settings;
mod tree;

pub use branching::{choose_branching_variable, BranchCandidate};
pub use error::{BnbError, BnbResult};
pub use frontier::FrontierTable;
pub use incumbent::Incumbent;
pub use monitor::{NodeAction, NodeEvent, NoOpMonitor, SearchMonitor};
pub use node::{Node, NodeId};
pub use oracle::{Relaxation, RelaxationOracle, RelaxationStatus, SimplexOracle};
pub use outcome::{gap_percent, BnbOutcome, SearchStats, TerminationReason};
pub use settings::BnbSettings;
pub use tree::{branch_and_bound, BranchAndBound};
