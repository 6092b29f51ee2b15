//! Arbor: a generic branch-and-bound engine for mixed-integer problems.
//!
//! The engine repeatedly pops a subproblem from the frontier, solves its
//! continuous relaxation, lets registered callbacks propose incumbents, and
//! then prunes the node, accepts its solution, or splits it on a fractional
//! branching candidate. It is agnostic to the relaxation solver: anything
//! implementing [`RelaxationSolver`] can drive it. [`SimplexRelaxation`]
//! plugs in the dense simplex from `arbor-core`.
//!
//! - **Search**: node arena with parent ids, frontier ordered by
//!   [`NodeSelection`], deterministic tie-breaking.
//! - **Branching**: [`MostFractional`] (default), [`FirstFractional`],
//!   [`Pseudocost`], or any [`BranchingStrategy`].
//! - **Callbacks**: [`NodeCallback`] heuristics such as
//!   [`RoundingHeuristic`]; proposals are checked before they are accepted.
//! - **Limits**: wall-clock and node limits, relaxation-failure threshold.
//!
//! # Example
//!
//! ```
//! use arbor_bnb::{solve_mip, BnbSettings, BnbStatus, MipProblem};
//! use arbor_core::{ConeSpec, ProblemData, VarType};
//!
//! // minimize -5 x0 - 4 x1  subject to  6 x0 + 4 x1 <= 9,  x binary
//! let prob = ProblemData::from_triplets(
//!     vec![-5.0, -4.0],
//!     &[(0, 0, 6.0), (0, 1, 4.0)],
//!     vec![9.0],
//!     vec![ConeSpec::NonNeg { dim: 1 }],
//! )
//! .with_integrality(vec![VarType::Binary, VarType::Binary]);
//!
//! let mip = MipProblem::new(prob).unwrap();
//! let solution = solve_mip(&mip, vec![0, 1], BnbSettings::default()).unwrap();
//!
//! assert_eq!(solution.status, BnbStatus::Optimal);
//! assert_eq!(solution.obj_val(), Some(-5.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod callbacks;
pub mod error;
pub mod model;
pub mod relax;
pub mod search;
pub mod settings;

pub use callbacks::{
    CallbackRegistry, ContractViolation, NodeCallback, NodeRecord, NodeView, Proposal,
    RoundingHeuristic,
};
pub use error::{BnbError, BnbResult};
pub use model::{BnbSolution, BnbStatus, Incumbent, IncumbentSource, MipProblem, SearchStats};
pub use relax::{RelaxationResult, RelaxationSolver, RelaxationStatus, Restrictions, SimplexRelaxation};
pub use search::{
    solve_mip, BranchAndBound, BranchDecision, BranchingStrategy, FirstFractional, MostFractional,
    NodeComparator, NodeId, NodeKey, NodeStatus, PruneReason, Pseudocost,
};
pub use settings::{BnbSettings, NodeSelection};
