//! Configuration settings for the branch-and-bound engine.

use std::sync::Arc;
use std::time::Duration;

use arbor_core::{ObjectiveSense, SolverSettings};

use crate::error::{BnbError, BnbResult};
use crate::search::NodeComparator;

/// Node selection strategy for the B&B tree.
#[derive(Debug, Clone, Default)]
pub enum NodeSelection {
    /// Always select node with best dual bound.
    ///
    /// Ties go to the shallower node, then to the node pushed first.
    #[default]
    BestBound,

    /// Depth-first search (helps find feasible solutions quickly).
    ///
    /// Ties go to the better bound, then to the node pushed last.
    DepthFirst,

    /// Shallowest node first, then insertion order.
    BreadthFirst,

    /// Caller-supplied ordering. Ties the comparator leaves open are broken
    /// by insertion order.
    Custom(Arc<dyn NodeComparator>),
}

/// Branch-and-bound settings.
#[derive(Debug, Clone)]
pub struct BnbSettings {
    // === Termination criteria ===
    /// Wall-clock limit in seconds (None = unlimited).
    pub time_limit: Option<f64>,

    /// Maximum number of nodes to process (None = unlimited).
    ///
    /// A limit of 0 means no node is popped at all.
    pub node_limit: Option<u64>,

    /// Abort the search once this many relaxation solves have failed
    /// (None = never abort).
    pub max_solver_errors: Option<u64>,

    // === Tolerances ===
    /// Absolute tolerance for bound comparisons and incumbent improvement.
    pub tolerance: f64,

    /// Integer feasibility tolerance.
    /// A variable is considered integer if |x - round(x)| <= int_feas_tol.
    pub int_feas_tol: f64,

    /// Tolerance for checking heuristic proposals against the constraints.
    pub feas_tol: f64,

    // === Search strategy ===
    /// Optimization direction. `None` uses the direction stored on the problem.
    ///
    /// [`solve_mip`](crate::solve_mip) solves a redirected copy when this
    /// differs from the problem; [`BranchAndBound::new`](crate::BranchAndBound::new)
    /// rejects a mismatch, since its relaxation is already built.
    pub sense: Option<ObjectiveSense>,

    /// Node selection strategy.
    pub node_selection: NodeSelection,

    // === Relaxation ===
    /// Settings for the built-in simplex relaxation.
    pub relaxation: SolverSettings,

    // === Output ===
    /// Print progress information.
    pub verbose: bool,

    /// Log frequency (print every N nodes).
    pub log_freq: u64,
}

impl Default for BnbSettings {
    fn default() -> Self {
        Self {
            // Termination
            time_limit: None,
            node_limit: None,
            max_solver_errors: None,

            // Tolerances
            tolerance: 1e-6,
            int_feas_tol: 1e-6,
            feas_tol: 1e-6,

            // Search
            sense: None,
            node_selection: NodeSelection::default(),

            relaxation: SolverSettings::default(),

            // Output
            verbose: false,
            log_freq: 100,
        }
    }
}

impl BnbSettings {
    /// Create settings with verbose output enabled.
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            log_freq: 1,
            ..Self::default()
        }
    }

    /// Set time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set maximum nodes.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Set the node selection strategy.
    pub fn with_node_selection(mut self, selection: NodeSelection) -> Self {
        self.node_selection = selection;
        self
    }

    /// Override the optimization direction.
    pub fn with_sense(mut self, sense: ObjectiveSense) -> Self {
        self.sense = Some(sense);
        self
    }

    /// Set the relaxation failure threshold.
    pub fn with_max_solver_errors(mut self, errors: u64) -> Self {
        self.max_solver_errors = Some(errors);
        self
    }

    /// Time limit as a `Duration`, if any.
    ///
    /// Limits too large for a `Duration` mean no limit.
    pub fn time_limit_duration(&self) -> Option<Duration> {
        self.time_limit
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    }

    /// Check the settings before a search starts.
    pub fn validate(&self) -> BnbResult<()> {
        if let Some(limit) = self.time_limit {
            if !limit.is_finite() || limit < 0.0 {
                return Err(BnbError::InvalidConfiguration(format!(
                    "time limit must be a nonnegative number of seconds, got {}",
                    limit
                )));
            }
        }
        for (name, value) in [
            ("tolerance", self.tolerance),
            ("int_feas_tol", self.int_feas_tol),
            ("feas_tol", self.feas_tol),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BnbError::InvalidConfiguration(format!(
                    "{} must be finite and nonnegative, got {}",
                    name, value
                )));
            }
        }
        if self.int_feas_tol >= 0.5 {
            return Err(BnbError::InvalidConfiguration(format!(
                "int_feas_tol must be below 0.5, got {}",
                self.int_feas_tol
            )));
        }
        if self.log_freq == 0 {
            return Err(BnbError::InvalidConfiguration(
                "log_freq must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
