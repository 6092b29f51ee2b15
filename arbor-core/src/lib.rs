//! Arbor core: LP model and relaxation solver.
//!
//! This crate holds the linear-programming side of the arbor
//! branch-and-bound engine:
//!
//! - **Problem data** in canonical form `A x + s = b`, `s ∈ K`, where `K` is a
//!   product of Zero (equality) and NonNeg (`≤`) cones, with variable bounds,
//!   integrality tags and an objective direction.
//! - **A dense two-phase primal simplex** that solves the continuous
//!   relaxation, optionally over caller-supplied bounds so a branch-and-bound
//!   node can be solved without touching the shared problem.
//!
//! # Example
//!
//! ```
//! use arbor_core::{solve, ConeSpec, ProblemData, SolveStatus, SolverSettings};
//!
//! // minimize -x0 - x1  subject to  x0 + 2 x1 <= 4,  3 x0 + x1 <= 6
//! let prob = ProblemData::from_triplets(
//!     vec![-1.0, -1.0],
//!     &[(0, 0, 1.0), (0, 1, 2.0), (1, 0, 3.0), (1, 1, 1.0)],
//!     vec![4.0, 6.0],
//!     vec![ConeSpec::NonNeg { dim: 2 }],
//! );
//!
//! let result = solve(&prob, &SolverSettings::default()).unwrap();
//! assert_eq!(result.status, SolveStatus::Optimal);
//! assert!((result.obj_val + 2.8).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod problem;
pub mod simplex;

pub use error::{ProblemError, ProblemResult};
pub use problem::{
    ConeSpec, ObjectiveSense, ProblemData, SolveInfo, SolveResult, SolveStatus, SolverSettings,
    SparseCsc, VarBound, VarType,
};
pub use simplex::{solve, solve_with_bounds};
