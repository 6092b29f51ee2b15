//! Relaxation backend using the arbor-core simplex.
//!
//! Node restrictions are applied to a working copy of the global bounds
//! through [`BoundOverlay`], which puts the global values back when it goes
//! out of scope, whichever way the solve ends.

use arbor_core::{solve_with_bounds, SolveStatus, SolverSettings};

use super::{RelaxationResult, RelaxationSolver, Restrictions};
use crate::model::MipProblem;

/// Scoped bound overlay.
///
/// Created with the node restrictions applied; dropping it restores the
/// bounds it changed.
pub struct BoundOverlay<'b> {
    lb: &'b mut [f64],
    ub: &'b mut [f64],
    saved: Vec<(usize, f64, f64)>,
}

impl<'b> BoundOverlay<'b> {
    /// Intersect `restrictions` into `lb`/`ub`, remembering what changed.
    pub fn apply(lb: &'b mut [f64], ub: &'b mut [f64], restrictions: &Restrictions) -> Self {
        let mut saved = Vec::with_capacity(restrictions.len());
        for (var, (l, u)) in restrictions.iter() {
            if var >= lb.len() {
                continue;
            }
            saved.push((var, lb[var], ub[var]));
            lb[var] = lb[var].max(l);
            ub[var] = ub[var].min(u);
        }
        Self { lb, ub, saved }
    }

    /// Current lower bounds.
    pub fn lb(&self) -> &[f64] {
        self.lb
    }

    /// Current upper bounds.
    pub fn ub(&self) -> &[f64] {
        self.ub
    }
}

impl Drop for BoundOverlay<'_> {
    fn drop(&mut self) {
        // Reverse order so a variable restricted twice ends at its first saved value.
        for &(var, l, u) in self.saved.iter().rev() {
            self.lb[var] = l;
            self.ub[var] = u;
        }
    }
}

/// Relaxation backend using the dense simplex from arbor-core.
pub struct SimplexRelaxation<'a> {
    /// Problem whose continuous relaxation is solved.
    problem: &'a MipProblem,

    /// Working lower bounds (equal to the global bounds between solves).
    lb: Vec<f64>,

    /// Working upper bounds (equal to the global bounds between solves).
    ub: Vec<f64>,

    /// LP settings.
    settings: SolverSettings,

    /// Number of solves performed.
    solves: u64,
}

impl<'a> SimplexRelaxation<'a> {
    /// Create a simplex backend for `problem`.
    pub fn new(problem: &'a MipProblem, settings: SolverSettings) -> Self {
        Self {
            problem,
            lb: problem.var_lb.clone(),
            ub: problem.var_ub.clone(),
            settings,
            solves: 0,
        }
    }

    /// Number of solves performed.
    pub fn solves(&self) -> u64 {
        self.solves
    }

    /// Working bounds; identical to the global bounds outside `solve`.
    #[cfg(test)]
    fn working_bounds(&self) -> (&[f64], &[f64]) {
        (&self.lb, &self.ub)
    }
}

impl RelaxationSolver for SimplexRelaxation<'_> {
    fn solve(&mut self, restrictions: &Restrictions) -> RelaxationResult {
        self.solves += 1;

        let overlay = BoundOverlay::apply(&mut self.lb, &mut self.ub, restrictions);
        let result = solve_with_bounds(&self.problem.lp, overlay.lb(), overlay.ub(), &self.settings);
        drop(overlay);

        match result {
            Ok(res) => match res.status {
                SolveStatus::Optimal => RelaxationResult::optimal(res.x, res.obj_val),
                SolveStatus::PrimalInfeasible => RelaxationResult::infeasible(),
                SolveStatus::Unbounded => RelaxationResult::unbounded(),
                status @ (SolveStatus::MaxIters
                | SolveStatus::TimeLimit
                | SolveStatus::NumericalError) => RelaxationResult::error(format!(
                    "simplex stopped with status {} after {} pivots",
                    status,
                    res.info.phase1_iters + res.info.phase2_iters
                )),
            },
            Err(e) => RelaxationResult::error(e.to_string()),
        }
    }

    fn num_vars(&self) -> usize {
        self.problem.num_vars()
    }

    fn name(&self) -> &str {
        "simplex"
    }
}
