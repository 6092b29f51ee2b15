//! Relaxation solving (continuous LP at each node).

mod backend;
mod simplex_backend;

pub use backend::{RelaxationResult, RelaxationSolver, RelaxationStatus, Restrictions};
pub use simplex_backend::{BoundOverlay, SimplexRelaxation};
