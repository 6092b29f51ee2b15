//! Relaxation solver trait and types.

use std::collections::BTreeMap;

/// Bound restrictions applied to one relaxation solve.
///
/// Maps a variable index to `(lower, upper)`. Setting a variable twice keeps
/// the last value, which is how a deeper branching decision overrides one
/// made closer to the root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Restrictions {
    bounds: BTreeMap<usize, (f64, f64)>,
}

impl Restrictions {
    /// No restrictions (the root node).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bounds of `var`, replacing any earlier entry.
    pub fn set(&mut self, var: usize, lower: f64, upper: f64) {
        self.bounds.insert(var, (lower, upper));
    }

    /// Bounds of `var`, if restricted.
    pub fn get(&self, var: usize) -> Option<(f64, f64)> {
        self.bounds.get(&var).copied()
    }

    /// Iterate in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, (f64, f64))> + '_ {
        self.bounds.iter().map(|(&var, &b)| (var, b))
    }

    /// Number of restricted variables.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// True if nothing is restricted.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// First variable whose restricted domain is empty.
    pub fn empty_domain(&self, tol: f64) -> Option<usize> {
        self.iter().find(|&(_, (lb, ub))| lb > ub + tol).map(|(v, _)| v)
    }

    /// Intersect these restrictions into `lb`/`ub` in place.
    ///
    /// Restrictions looser than the given bounds never widen them.
    pub fn apply_to(&self, lb: &mut [f64], ub: &mut [f64]) {
        for (var, (l, u)) in self.iter() {
            if var < lb.len() {
                lb[var] = lb[var].max(l);
                ub[var] = ub[var].min(u);
            }
        }
    }
}

/// Status of a relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationStatus {
    /// Optimal solution found.
    Optimal,

    /// Relaxation is infeasible (node can be pruned).
    Infeasible,

    /// Relaxation is unbounded over the restricted region.
    Unbounded,

    /// The solver failed (numerical trouble, iteration or time limit).
    SolverError,
}

/// Result from solving one relaxation.
#[derive(Debug, Clone)]
pub struct RelaxationResult {
    /// Solve status.
    pub status: RelaxationStatus,

    /// Primal solution x (full length when `Optimal`, empty otherwise).
    pub x: Vec<f64>,

    /// Objective value in the problem's direction (NaN unless `Optimal`).
    pub obj_val: f64,

    /// Failure description for `SolverError`.
    pub message: Option<String>,
}

impl RelaxationResult {
    /// Create an optimal result.
    pub fn optimal(x: Vec<f64>, obj_val: f64) -> Self {
        Self {
            status: RelaxationStatus::Optimal,
            x,
            obj_val,
            message: None,
        }
    }

    /// Create an infeasible result.
    pub fn infeasible() -> Self {
        Self::without_point(RelaxationStatus::Infeasible, None)
    }

    /// Create an unbounded result.
    pub fn unbounded() -> Self {
        Self::without_point(RelaxationStatus::Unbounded, None)
    }

    /// Create a failed result.
    pub fn error(message: impl Into<String>) -> Self {
        Self::without_point(RelaxationStatus::SolverError, Some(message.into()))
    }

    fn without_point(status: RelaxationStatus, message: Option<String>) -> Self {
        Self {
            status,
            x: Vec::new(),
            obj_val: f64::NAN,
            message,
        }
    }

    /// True if a usable point is attached.
    pub fn is_optimal(&self) -> bool {
        self.status == RelaxationStatus::Optimal
    }
}

/// Trait for relaxation solvers.
///
/// A relaxation solver answers "what is the best continuous solution once
/// these bounds are imposed?". Implementations must leave the shared problem
/// exactly as they found it after every call, and must report failures
/// through [`RelaxationStatus::SolverError`] rather than panicking.
pub trait RelaxationSolver {
    /// Solve the relaxation under the given restrictions.
    fn solve(&mut self, restrictions: &Restrictions) -> RelaxationResult;

    /// Number of variables in every returned assignment.
    fn num_vars(&self) -> usize;

    /// Name used in log messages.
    fn name(&self) -> &str {
        "relaxation"
    }
}

impl<R: RelaxationSolver + ?Sized> RelaxationSolver for Box<R> {
    fn solve(&mut self, restrictions: &Restrictions) -> RelaxationResult {
        (**self).solve(restrictions)
    }

    fn num_vars(&self) -> usize {
        (**self).num_vars()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
