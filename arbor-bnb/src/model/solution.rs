//! Search results and incumbent tracking.

use std::fmt;
use std::time::Duration;

use arbor_core::ObjectiveSense;

use crate::search::NodeId;

/// Final status of a branch-and-bound search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BnbStatus {
    /// Frontier exhausted with an incumbent: it is optimal within tolerance.
    Optimal,

    /// Frontier exhausted without any feasible solution.
    Infeasible,

    /// Time limit reached, best solution (if any) returned.
    TimeLimitReached,

    /// Node limit reached, best solution (if any) returned.
    NodeLimitReached,

    /// Frontier exhausted, but some subtrees were dropped because their
    /// relaxation failed or was unbounded, so neither optimality nor
    /// infeasibility is proven.
    Unsolved,
}

impl BnbStatus {
    /// Returns true if optimality or infeasibility was proven.
    pub fn is_proven(&self) -> bool {
        matches!(self, BnbStatus::Optimal | BnbStatus::Infeasible)
    }

    /// Returns true if the search stopped on a limit.
    pub fn is_limit(&self) -> bool {
        matches!(self, BnbStatus::TimeLimitReached | BnbStatus::NodeLimitReached)
    }
}

impl fmt::Display for BnbStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BnbStatus::Optimal => write!(f, "Optimal"),
            BnbStatus::Infeasible => write!(f, "Infeasible"),
            BnbStatus::TimeLimitReached => write!(f, "Time Limit Reached"),
            BnbStatus::NodeLimitReached => write!(f, "Node Limit Reached"),
            BnbStatus::Unsolved => write!(f, "Unsolved"),
        }
    }
}

/// Where an incumbent came from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IncumbentSource {
    /// An integer-feasible relaxation solution.
    Relaxation,

    /// A callback proposal; holds the callback name.
    Heuristic(String),
}

impl fmt::Display for IncumbentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncumbentSource::Relaxation => write!(f, "relaxation"),
            IncumbentSource::Heuristic(name) => write!(f, "heuristic:{}", name),
        }
    }
}

/// Best known feasible solution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Incumbent {
    /// Objective value, in the problem's own direction.
    pub obj_val: f64,

    /// Full variable assignment.
    pub x: Vec<f64>,

    /// Who produced it.
    pub source: IncumbentSource,

    /// Node whose processing produced it.
    pub node: NodeId,

    /// Number of nodes processed when it was found.
    pub found_at_node: u64,
}

/// Tracks the best known feasible solution (incumbent).
///
/// The tracker is the only place the incumbent changes. Updates are accepted
/// only if strictly better than the current value by more than the
/// tolerance, so among equally good solutions the earliest one is kept.
#[derive(Debug, Clone)]
pub struct IncumbentTracker {
    /// Current best solution (if any).
    pub best: Option<Incumbent>,

    /// Optimization direction.
    pub sense: ObjectiveSense,

    /// Number of times incumbent was updated.
    pub update_count: u64,
}

impl IncumbentTracker {
    /// Create an empty tracker for the given direction.
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            best: None,
            sense,
            update_count: 0,
        }
    }

    /// Check if we have an incumbent.
    pub fn has_incumbent(&self) -> bool {
        self.best.is_some()
    }

    /// Objective of the incumbent, or the worst value in this direction.
    pub fn obj_val(&self) -> f64 {
        self.best
            .as_ref()
            .map_or_else(|| self.sense.worst(), |inc| inc.obj_val)
    }

    /// Incumbent objective in minimization space (+∞ if none).
    pub fn normalized(&self) -> f64 {
        self.sense.normalize(self.obj_val())
    }

    /// Would `obj` replace the current incumbent?
    pub fn improves(&self, obj: f64, tol: f64) -> bool {
        match self.best {
            None => obj.is_finite(),
            Some(ref inc) => self.sense.is_better(obj, inc.obj_val, tol),
        }
    }

    /// Try to install a new incumbent.
    ///
    /// Returns true if the incumbent was improved.
    pub fn update(&mut self, candidate: Incumbent, tol: f64) -> bool {
        if !self.improves(candidate.obj_val, tol) {
            return false;
        }
        self.best = Some(candidate);
        self.update_count += 1;
        true
    }

    /// Relative gap to a dual bound given in the problem's direction.
    pub fn gap(&self, dual_bound: f64) -> f64 {
        compute_gap(self.obj_val(), dual_bound)
    }
}

/// Relative gap `|primal - dual| / max(|primal|, 1e-10)`.
pub fn compute_gap(primal: f64, dual: f64) -> f64 {
    if primal.is_infinite() || dual.is_infinite() {
        return f64::INFINITY;
    }
    let denom = primal.abs().max(1e-10);
    (primal - dual).abs() / denom
}

/// Statistics from the B&B search.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Nodes popped from the frontier and processed.
    pub nodes_processed: u64,
    /// Nodes created, including the root.
    pub nodes_created: u64,
    /// Nodes pruned by bound (including eager frontier pruning).
    pub nodes_pruned: u64,
    /// Nodes whose relaxation was infeasible.
    pub nodes_infeasible: u64,
    /// Nodes whose relaxation was unbounded.
    pub nodes_unbounded: u64,
    /// Nodes split into children.
    pub nodes_branched: u64,
    /// Nodes still open when the search stopped.
    pub nodes_open: u64,
    /// Relaxation failures.
    pub solver_errors: u64,
    /// Callback proposals rejected by the engine.
    pub callback_rejections: u64,
    /// Incumbent replacements.
    pub incumbent_updates: u64,
    /// Deepest node processed.
    pub max_depth: usize,
    /// Best dual bound over open nodes, in the problem's direction.
    pub best_bound: f64,
    /// Relative gap between incumbent and best bound.
    pub gap: f64,
    /// Wall-clock time spent in the search.
    pub elapsed: Duration,
}

/// Complete B&B result with diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbSolution {
    /// Solve status.
    pub status: BnbStatus,

    /// Best solution found, if any.
    pub incumbent: Option<Incumbent>,

    /// Search statistics.
    pub stats: SearchStats,
}

impl BnbSolution {
    /// Returns true if a feasible solution is available.
    pub fn has_solution(&self) -> bool {
        self.incumbent.is_some()
    }

    /// Objective value of the incumbent, if any.
    pub fn obj_val(&self) -> Option<f64> {
        self.incumbent.as_ref().map(|inc| inc.obj_val)
    }

    /// Assignment of the incumbent, if any.
    pub fn x(&self) -> Option<&[f64]> {
        self.incumbent.as_ref().map(|inc| inc.x.as_slice())
    }
}
