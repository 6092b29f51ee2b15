//! Error types for the branch-and-bound engine.

use thiserror::Error;

use crate::model::Incumbent;

/// Errors that stop a search or prevent it from starting.
///
/// Per-node relaxation failures and rejected heuristic proposals are not
/// errors at this level: they are recorded in the search statistics and the
/// search continues.
#[derive(Error, Debug)]
pub enum BnbError {
    /// Settings or branching candidates are unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Problem validation failed
    #[error("Invalid problem: {0}")]
    InvalidProblem(#[from] arbor_core::ProblemError),

    /// Too many relaxation failures.
    #[error("Engine aborted after {solver_errors} relaxation failures ({nodes_processed} nodes processed)")]
    EngineAborted {
        /// Relaxation failures seen so far.
        solver_errors: u64,
        /// Nodes processed before aborting.
        nodes_processed: u64,
        /// Best solution found before aborting.
        incumbent: Option<Box<Incumbent>>,
    },

    /// Internal invariant violated
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for branch-and-bound operations.
pub type BnbResult<T> = Result<T, BnbError>;
