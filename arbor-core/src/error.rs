//! Error types for problem validation and the LP solver.

use thiserror::Error;

/// Errors that can occur while validating or solving an LP.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Dimensions of `q`, `A`, `b` or the cone partition disagree.
    #[error("Dimension mismatch: {0}")]
    Dimension(String),

    /// A cone block is malformed.
    #[error("Invalid cone: {0}")]
    InvalidCone(String),

    /// A variable bound is out of range or inconsistent.
    #[error("Invalid bound: {0}")]
    InvalidBound(String),

    /// The problem data contains NaN or infinite coefficients.
    #[error("Non-finite data in {0}")]
    NonFinite(&'static str),
}

/// Result type for problem operations.
pub type ProblemResult<T> = Result<T, ProblemError>;
