//! Branching variable selection.

use super::BoundChange;
use crate::model::MipProblem;

/// A branching decision.
#[derive(Debug, Clone)]
pub struct BranchDecision {
    /// Variable to branch on.
    pub var: usize,

    /// Current (fractional) value.
    pub value: f64,

    /// Bound change for "down" branch (x <= floor(value)).
    pub down: BoundChange,

    /// Bound change for "up" branch (x >= ceil(value)).
    pub up: BoundChange,

    /// Score of this decision (for logging/debugging).
    pub score: f64,
}

impl BranchDecision {
    /// Dichotomy on `var` against the node's effective bounds.
    pub fn new(var: usize, value: f64, lb: f64, ub: f64, score: f64) -> Self {
        Self {
            var,
            value,
            down: BoundChange::down_branch(var, lb, ub, value),
            up: BoundChange::up_branch(var, lb, ub, value),
            score,
        }
    }

    /// Bound changes of the children worth creating, down first.
    ///
    /// A child whose domain would be empty is left out.
    pub fn children(&self) -> impl Iterator<Item = BoundChange> + '_ {
        [self.down, self.up].into_iter().filter(|bc| !bc.is_infeasible())
    }
}

/// Chooses the variable to branch on.
///
/// `select` is only called when at least one candidate is fractional. It must
/// return a candidate from `candidates`; `bounds` are the node's effective
/// variable bounds (global bounds intersected with the node's restrictions).
pub trait BranchingStrategy {
    /// Select a branching variable.
    ///
    /// Returns None if no candidate is fractional.
    fn select(
        &mut self,
        x: &[f64],
        candidates: &[usize],
        problem: &MipProblem,
        bounds: (&[f64], &[f64]),
        tol: f64,
    ) -> Option<BranchDecision>;

    /// Feedback after a child created by this strategy was solved.
    ///
    /// `gain` is the increase of the dual bound (minimization space) from
    /// parent to child, or None if the child had no optimal relaxation.
    fn on_child_solved(&mut self, _change: &BoundChange, _gain: Option<f64>) {}

    /// Name used in log messages.
    fn name(&self) -> &str;
}

/// Pick the candidate with the highest score, ties to the earliest position.
fn best_by<F>(
    x: &[f64],
    candidates: &[usize],
    bounds: (&[f64], &[f64]),
    tol: f64,
    mut score: F,
) -> Option<BranchDecision>
where
    F: FnMut(usize, f64) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for &var in candidates {
        let value = x[var];
        if MipProblem::fractionality(value) <= tol {
            continue;
        }
        let s = score(var, value);
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((var, s));
        }
    }
    let (var, score) = best?;
    let (lb, ub) = bounds;
    Some(BranchDecision::new(var, x[var], lb[var], ub[var], score))
}

/// Branch on the candidate whose fractional part is closest to 0.5.
#[derive(Debug, Clone, Default)]
pub struct MostFractional;

impl BranchingStrategy for MostFractional {
    fn select(
        &mut self,
        x: &[f64],
        candidates: &[usize],
        _problem: &MipProblem,
        bounds: (&[f64], &[f64]),
        tol: f64,
    ) -> Option<BranchDecision> {
        best_by(x, candidates, bounds, tol, |_, value| {
            MipProblem::fractionality(value)
        })
    }

    fn name(&self) -> &str {
        "most-fractional"
    }
}

/// Branch on the first fractional candidate in candidate order.
#[derive(Debug, Clone, Default)]
pub struct FirstFractional;

impl BranchingStrategy for FirstFractional {
    fn select(
        &mut self,
        x: &[f64],
        candidates: &[usize],
        _problem: &MipProblem,
        bounds: (&[f64], &[f64]),
        tol: f64,
    ) -> Option<BranchDecision> {
        let var = candidates
            .iter()
            .copied()
            .find(|&v| MipProblem::fractionality(x[v]) > tol)?;
        let (lb, ub) = bounds;
        Some(BranchDecision::new(var, x[var], lb[var], ub[var], 0.0))
    }

    fn name(&self) -> &str {
        "first-fractional"
    }
}

/// Pseudocost branching.
///
/// Learns, per variable and direction, the average bound gain per unit of
/// distance moved, and scores candidates by the product of the estimated
/// down and up gains.
#[derive(Debug, Clone)]
pub struct Pseudocost {
    /// pseudocosts_down[i] = average objective change per unit decrease
    pseudocosts_down: Vec<f64>,
    /// pseudocosts_up[i] = average objective change per unit increase
    pseudocosts_up: Vec<f64>,

    /// Number of observations per variable (down direction).
    count_down: Vec<u64>,

    /// Number of observations per variable (up direction).
    count_up: Vec<u64>,

    /// Value used for variables without observations.
    initial: f64,
}

impl Default for Pseudocost {
    fn default() -> Self {
        Self::new()
    }
}

impl Pseudocost {
    /// Create a selector with neutral (1.0) initial pseudocosts.
    pub fn new() -> Self {
        Self {
            pseudocosts_down: Vec::new(),
            pseudocosts_up: Vec::new(),
            count_down: Vec::new(),
            count_up: Vec::new(),
            initial: 1.0,
        }
    }

    /// Seed the pseudocosts with |q_i| (at least 0.1).
    pub fn init_from_objective(&mut self, q: &[f64]) {
        self.ensure_len(q.len());
        for (i, &qi) in q.iter().enumerate() {
            let init_cost = qi.abs().max(0.1);
            self.pseudocosts_down[i] = init_cost;
            self.pseudocosts_up[i] = init_cost;
        }
    }

    /// Get pseudocost statistics for a variable: (down, up, down count, up count).
    pub fn get_pseudocosts(&self, var: usize) -> (f64, f64, u64, u64) {
        if var >= self.pseudocosts_down.len() {
            return (self.initial, self.initial, 0, 0);
        }
        (
            self.pseudocosts_down[var],
            self.pseudocosts_up[var],
            self.count_down[var],
            self.count_up[var],
        )
    }

    fn ensure_len(&mut self, n: usize) {
        if self.pseudocosts_down.len() < n {
            self.pseudocosts_down.resize(n, self.initial);
            self.pseudocosts_up.resize(n, self.initial);
            self.count_down.resize(n, 0);
            self.count_up.resize(n, 0);
        }
    }

    fn score(&self, var: usize, value: f64) -> f64 {
        let frac = value - value.floor();
        let down_cost = frac * self.pseudocosts_down[var];
        let up_cost = (1.0 - frac) * self.pseudocosts_up[var];
        (down_cost.max(1e-6)) * (up_cost.max(1e-6))
    }
}

impl BranchingStrategy for Pseudocost {
    fn select(
        &mut self,
        x: &[f64],
        candidates: &[usize],
        problem: &MipProblem,
        bounds: (&[f64], &[f64]),
        tol: f64,
    ) -> Option<BranchDecision> {
        self.ensure_len(problem.num_vars());
        let this = &*self;
        best_by(x, candidates, bounds, tol, |var, value| this.score(var, value))
    }

    fn on_child_solved(&mut self, change: &BoundChange, gain: Option<f64>) {
        let Some(gain) = gain else {
            return;
        };
        let dist = change.distance();
        if dist <= 1e-6 || !gain.is_finite() {
            return;
        }
        self.ensure_len(change.var + 1);
        let pc = gain.max(0.0) / dist;
        let var = change.var;
        let (costs, counts) = if change.is_up() {
            (&mut self.pseudocosts_up, &mut self.count_up)
        } else {
            (&mut self.pseudocosts_down, &mut self.count_down)
        };
        // Running average; the initial value is replaced by the first observation
        let count = counts[var] as f64;
        costs[var] = if counts[var] == 0 {
            pc
        } else {
            (costs[var] * count + pc) / (count + 1.0)
        };
        counts[var] += 1;
    }

    fn name(&self) -> &str {
        "pseudocost"
    }
}
