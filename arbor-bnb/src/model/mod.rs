//! Problem and solution types for the B&B engine.

mod problem;
mod solution;

pub use problem::MipProblem;
pub use solution::{
    compute_gap, BnbSolution, BnbStatus, Incumbent, IncumbentSource, IncumbentTracker, SearchStats,
};
