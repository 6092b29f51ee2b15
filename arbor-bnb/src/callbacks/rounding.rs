//! Simple rounding heuristic.

use super::{NodeCallback, NodeView, Proposal};

/// Rounds every branching candidate to the nearest integer and proposes the
/// result when it satisfies the bounds and constraints.
///
/// Non-candidate variables keep their relaxation values, so the heuristic
/// works best when the candidates are the only variables that couple rows.
#[derive(Debug, Clone)]
pub struct RoundingHeuristic {
    /// Feasibility tolerance used before proposing.
    pub feas_tol: f64,

    /// Nodes on which rounding was attempted.
    pub attempts: u64,

    /// Proposals made.
    pub proposals: u64,
}

impl Default for RoundingHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundingHeuristic {
    /// Create the heuristic with a 1e-6 feasibility tolerance.
    pub fn new() -> Self {
        Self {
            feas_tol: 1e-6,
            attempts: 0,
            proposals: 0,
        }
    }

    /// Round `x` on `candidates`.
    pub fn round(x: &[f64], candidates: &[usize]) -> Vec<f64> {
        let mut rounded = x.to_vec();
        for &var in candidates {
            if let Some(v) = rounded.get_mut(var) {
                *v = v.round();
            }
        }
        rounded
    }
}

impl NodeCallback for RoundingHeuristic {
    fn on_node_solved(&mut self, node: &NodeView<'_>, candidates: &[usize]) -> Option<Proposal> {
        if !node.result.is_optimal() {
            return None;
        }
        // Already integral: the engine takes the relaxation point itself.
        let problem = node.problem;
        if problem.is_integral_on(&node.result.x, candidates, self.feas_tol) {
            return None;
        }
        self.attempts += 1;

        let x = Self::round(&node.result.x, candidates);
        if !problem.is_feasible(&x, self.feas_tol) {
            return None;
        }
        let proposal = Proposal::evaluated(problem, x);
        if let Some(inc) = node.incumbent_obj {
            if !node.sense.is_better(proposal.obj_val, inc, 0.0) {
                return None;
            }
        }
        self.proposals += 1;
        Some(proposal)
    }

    fn name(&self) -> &str {
        "rounding"
    }
}
