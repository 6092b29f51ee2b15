//! Problem data structures and validation.
//!
//! This module defines the canonical LP representation consumed by the
//! simplex solver and by the branch-and-bound layer.

use std::fmt;

use sprs::TriMat;

use crate::error::{ProblemError, ProblemResult};

/// Sparse matrix in CSC format.
pub type SparseCsc = sprs::CsMatI<f64, usize>;

/// Linear program in canonical form.
///
/// The solver works with the canonical formulation:
///
/// ```text
/// minimize    q^T x            (or maximize, see `sense`)
/// subject to  A x + s = b
///             s ∈ K
///             lb <= x <= ub
/// ```
///
/// where K is a Cartesian product of Zero cones (equality rows) and
/// NonNeg cones (`a_i^T x <= b_i` rows).
///
/// # Dimensions
///
/// - `n`: number of variables (length of x)
/// - `m`: number of constraints (length of b, number of rows in A)
/// - q: n
/// - A: m × n
/// - b: m
#[derive(Debug, Clone)]
#[allow(non_snake_case)] // A is standard mathematical notation
pub struct ProblemData {
    /// Linear cost vector q (length n)
    pub q: Vec<f64>,

    /// Constraint matrix A (m × n, CSC format)
    pub A: SparseCsc,

    /// Constraint right-hand side b (length m)
    pub b: Vec<f64>,

    /// Cone specifications partitioning the m rows
    pub cones: Vec<ConeSpec>,

    /// Optional variable bounds. Variables without an entry are `>= 0`.
    pub var_bounds: Option<Vec<VarBound>>,

    /// Optional integrality tags for mixed-integer problems
    pub integrality: Option<Vec<VarType>>,

    /// Optimization direction
    pub sense: ObjectiveSense,
}

/// Cone specification.
///
/// Each cone covers a consecutive block of constraint rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)] // Enum variant fields are self-documenting
pub enum ConeSpec {
    /// Zero cone: {0}^dim (equality constraints).
    Zero { dim: usize },

    /// Nonnegative orthant: ℝ₊^dim (`A x <= b` rows).
    NonNeg { dim: usize },
}

/// Variable bound specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarBound {
    /// Variable index
    pub var: usize,
    /// Lower bound (None = -∞)
    pub lower: Option<f64>,
    /// Upper bound (None = +∞)
    pub upper: Option<f64>,
}

/// Variable type for mixed-integer problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// Continuous variable
    Continuous,
    /// Integer variable
    Integer,
    /// Binary variable (0 or 1)
    Binary,
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveSense {
    /// Minimize the objective.
    #[default]
    Minimize,
    /// Maximize the objective.
    Maximize,
}

impl ObjectiveSense {
    /// Map an objective value into minimization space.
    ///
    /// The map is its own inverse, so it also converts back.
    #[inline]
    pub fn normalize(self, value: f64) -> f64 {
        match self {
            ObjectiveSense::Minimize => value,
            ObjectiveSense::Maximize => -value,
        }
    }

    /// Worst possible objective value in this direction.
    #[inline]
    pub fn worst(self) -> f64 {
        self.normalize(f64::INFINITY)
    }

    /// Returns true if `a` is strictly better than `b` by more than `tol`.
    #[inline]
    pub fn is_better(self, a: f64, b: f64, tol: f64) -> bool {
        self.normalize(a) < self.normalize(b) - tol
    }
}

impl fmt::Display for ObjectiveSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveSense::Minimize => write!(f, "min"),
            ObjectiveSense::Maximize => write!(f, "max"),
        }
    }
}

/// Solver settings and parameters.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    /// Maximum number of simplex pivots across both phases
    pub max_iter: usize,

    /// Time limit in milliseconds (None = no limit)
    pub time_limit_ms: Option<u64>,

    /// Enable verbose logging
    pub verbose: bool,

    /// Primal feasibility tolerance (phase 1 objective, constraint residuals)
    pub tol_feas: f64,

    /// Smallest magnitude accepted as a pivot element
    pub tol_pivot: f64,

    /// Reduced-cost tolerance for optimality
    pub tol_opt: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iter: 50_000,
            time_limit_ms: None,
            verbose: false,
            tol_feas: 1e-9,
            tol_pivot: 1e-11,
            tol_opt: 1e-10,
        }
    }
}

/// Solution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Optimal solution found
    Optimal,

    /// No point satisfies the constraints and bounds
    PrimalInfeasible,

    /// Objective is unbounded over the feasible region
    Unbounded,

    /// Maximum iterations reached
    MaxIters,

    /// Time limit reached
    TimeLimit,

    /// Numerical error encountered
    NumericalError,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::PrimalInfeasible => write!(f, "Primal Infeasible"),
            SolveStatus::Unbounded => write!(f, "Unbounded"),
            SolveStatus::MaxIters => write!(f, "MaxIters"),
            SolveStatus::TimeLimit => write!(f, "Time Limit"),
            SolveStatus::NumericalError => write!(f, "Numerical Error"),
        }
    }
}

/// Solve result with solution and diagnostics.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Solution status
    pub status: SolveStatus,

    /// Primal solution x (length n). Empty unless `status` is `Optimal`.
    pub x: Vec<f64>,

    /// Objective value at solution, in the problem's own direction
    pub obj_val: f64,

    /// Solve diagnostics
    pub info: SolveInfo,
}

impl SolveResult {
    /// A result without a primal point.
    pub fn without_solution(status: SolveStatus, info: SolveInfo) -> Self {
        Self {
            status,
            x: Vec::new(),
            obj_val: f64::NAN,
            info,
        }
    }
}

/// Detailed solve information and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct SolveInfo {
    /// Pivots spent in phase 1
    pub phase1_iters: usize,

    /// Pivots spent in phase 2
    pub phase2_iters: usize,

    /// Total solve time (milliseconds)
    pub solve_time_ms: u64,

    /// Largest constraint or bound violation of the returned point
    pub primal_res: f64,
}

impl ProblemData {
    /// Create a minimization problem with default (nonnegative) bounds.
    #[allow(non_snake_case)]
    pub fn new(q: Vec<f64>, A: SparseCsc, b: Vec<f64>, cones: Vec<ConeSpec>) -> Self {
        Self {
            q,
            A,
            b,
            cones,
            var_bounds: None,
            integrality: None,
            sense: ObjectiveSense::Minimize,
        }
    }

    /// Build a problem from a list of `(row, col, value)` triplets.
    pub fn from_triplets(
        q: Vec<f64>,
        triplets: &[(usize, usize, f64)],
        b: Vec<f64>,
        cones: Vec<ConeSpec>,
    ) -> Self {
        let mut tri = TriMat::new((b.len(), q.len()));
        for &(row, col, val) in triplets {
            tri.add_triplet(row, col, val);
        }
        Self::new(q, tri.to_csc(), b, cones)
    }

    /// Set explicit variable bounds.
    pub fn with_bounds(mut self, bounds: Vec<VarBound>) -> Self {
        self.var_bounds = Some(bounds);
        self
    }

    /// Set integrality tags.
    pub fn with_integrality(mut self, integrality: Vec<VarType>) -> Self {
        self.integrality = Some(integrality);
        self
    }

    /// Set the optimization direction.
    pub fn with_sense(mut self, sense: ObjectiveSense) -> Self {
        self.sense = sense;
        self
    }

    /// Get the number of variables (n)
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    /// Get the number of constraints (m)
    pub fn num_constraints(&self) -> usize {
        self.b.len()
    }

    /// Effective lower and upper bounds for every variable.
    ///
    /// Variables without an explicit bound entry default to `[0, +∞)`.
    /// An entry with `lower = None` makes the variable free from below.
    pub fn bounds(&self) -> (Vec<f64>, Vec<f64>) {
        let n = self.num_vars();
        let mut lb = vec![0.0; n];
        let mut ub = vec![f64::INFINITY; n];

        if let Some(ref bounds) = self.var_bounds {
            for bound in bounds.iter().filter(|b| b.var < n) {
                lb[bound.var] = bound.lower.unwrap_or(f64::NEG_INFINITY);
                ub[bound.var] = bound.upper.unwrap_or(f64::INFINITY);
            }
        }

        if let Some(ref integrality) = self.integrality {
            for (i, var_type) in integrality.iter().enumerate() {
                if *var_type == VarType::Binary {
                    lb[i] = lb[i].max(0.0);
                    ub[i] = ub[i].min(1.0);
                }
            }
        }

        (lb, ub)
    }

    /// Row senses in row order: `true` for equality rows.
    pub fn row_is_equality(&self) -> Vec<bool> {
        let mut eq = Vec::with_capacity(self.num_constraints());
        for cone in &self.cones {
            match *cone {
                ConeSpec::Zero { dim } => eq.extend(std::iter::repeat(true).take(dim)),
                ConeSpec::NonNeg { dim } => eq.extend(std::iter::repeat(false).take(dim)),
            }
        }
        eq
    }

    /// Dense copy of A, one `Vec` per row.
    pub fn dense_rows(&self) -> Vec<Vec<f64>> {
        let mut rows = vec![vec![0.0; self.num_vars()]; self.num_constraints()];
        for (col_idx, col) in self.A.outer_iterator().enumerate() {
            for (row_idx, &val) in col.iter() {
                rows[row_idx][col_idx] += val;
            }
        }
        rows
    }

    /// Objective value q^T x.
    pub fn objective(&self, x: &[f64]) -> f64 {
        self.q.iter().zip(x).map(|(q, x)| q * x).sum()
    }

    /// Row activities A x.
    pub fn activities(&self, x: &[f64]) -> Vec<f64> {
        let mut ax = vec![0.0; self.num_constraints()];
        for (col_idx, col) in self.A.outer_iterator().enumerate() {
            let xj = x[col_idx];
            if xj == 0.0 {
                continue;
            }
            for (row_idx, &val) in col.iter() {
                ax[row_idx] += val * xj;
            }
        }
        ax
    }

    /// Largest violation of a constraint row by `x` (0 if feasible).
    pub fn constraint_violation(&self, x: &[f64]) -> f64 {
        let ax = self.activities(x);
        let eq = self.row_is_equality();
        ax.iter()
            .zip(&self.b)
            .zip(&eq)
            .map(|((&ax, &b), &is_eq)| if is_eq { (ax - b).abs() } else { (ax - b).max(0.0) })
            .fold(0.0, f64::max)
    }

    /// Largest violation of the variable bounds by `x` (0 if feasible).
    pub fn bound_violation(&self, x: &[f64]) -> f64 {
        let (lb, ub) = self.bounds();
        x.iter()
            .zip(lb.iter().zip(&ub))
            .map(|(&x, (&l, &u))| (l - x).max(x - u).max(0.0))
            .fold(0.0, f64::max)
    }

    /// Validate problem dimensions, cone partition and bounds.
    pub fn validate(&self) -> ProblemResult<()> {
        let n = self.num_vars();
        let m = self.num_constraints();

        if self.A.rows() != m {
            return Err(ProblemError::Dimension(format!(
                "A has {} rows, expected {}",
                self.A.rows(),
                m
            )));
        }
        if self.A.cols() != n {
            return Err(ProblemError::Dimension(format!(
                "A has {} cols, expected {}",
                self.A.cols(),
                n
            )));
        }

        let cone_total_dim: usize = self.cones.iter().map(|c| c.dim()).sum();
        if cone_total_dim != m {
            return Err(ProblemError::Dimension(format!(
                "Cone dimensions sum to {}, expected {}",
                cone_total_dim, m
            )));
        }
        for cone in &self.cones {
            cone.validate()?;
        }

        if self.q.iter().any(|v| !v.is_finite()) {
            return Err(ProblemError::NonFinite("q"));
        }
        if self.b.iter().any(|v| !v.is_finite()) {
            return Err(ProblemError::NonFinite("b"));
        }
        if self.A.data().iter().any(|v| !v.is_finite()) {
            return Err(ProblemError::NonFinite("A"));
        }

        if let Some(ref bounds) = self.var_bounds {
            for bound in bounds {
                if bound.var >= n {
                    return Err(ProblemError::InvalidBound(format!(
                        "Bound on variable {} out of range (n={})",
                        bound.var, n
                    )));
                }
                if bound.lower.is_some_and(f64::is_nan) || bound.upper.is_some_and(f64::is_nan) {
                    return Err(ProblemError::InvalidBound(format!(
                        "Variable {} has a NaN bound",
                        bound.var
                    )));
                }
                if let (Some(l), Some(u)) = (bound.lower, bound.upper) {
                    if l > u {
                        return Err(ProblemError::InvalidBound(format!(
                            "Variable {} has lower bound {} > upper bound {}",
                            bound.var, l, u
                        )));
                    }
                }
            }
        }

        if let Some(ref int_types) = self.integrality {
            if int_types.len() != n {
                return Err(ProblemError::Dimension(format!(
                    "Integrality vector has length {}, expected {}",
                    int_types.len(),
                    n
                )));
            }
        }

        Ok(())
    }
}

impl ConeSpec {
    /// Get the number of rows covered by this cone
    pub fn dim(&self) -> usize {
        match self {
            ConeSpec::Zero { dim } => *dim,
            ConeSpec::NonNeg { dim } => *dim,
        }
    }

    /// Validate this cone specification
    pub fn validate(&self) -> ProblemResult<()> {
        match self {
            ConeSpec::Zero { dim: 0 } => Err(ProblemError::InvalidCone(
                "Zero cone must have positive dimension".to_string(),
            )),
            ConeSpec::NonNeg { dim: 0 } => Err(ProblemError::InvalidCone(
                "NonNeg cone must have positive dimension".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
