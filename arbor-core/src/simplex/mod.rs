//! Two-phase dense primal simplex.
//!
//! Phase 1 minimizes the sum of artificial columns to find a feasible
//! basis; phase 2 minimizes the (sense-normalized) objective from there.
//! Bland's rule is used throughout, so pivoting is deterministic and never
//! cycles.

mod standard;
mod tableau;

use std::time::Instant;

use crate::error::ProblemResult;
use crate::problem::{ProblemData, SolveInfo, SolveResult, SolveStatus, SolverSettings};

use standard::{StandardForm, Standardized};
use tableau::{IterOutcome, Tableau};

/// Solve `prob` over its own variable bounds.
pub fn solve(prob: &ProblemData, settings: &SolverSettings) -> ProblemResult<SolveResult> {
    prob.validate()?;
    let (lb, ub) = prob.bounds();
    Ok(solve_unchecked(prob, &lb, &ub, settings))
}

/// Solve `prob` with `lb`/`ub` replacing its variable bounds.
///
/// The problem itself is never modified; this is the entry point used for
/// per-node relaxations.
pub fn solve_with_bounds(
    prob: &ProblemData,
    lb: &[f64],
    ub: &[f64],
    settings: &SolverSettings,
) -> ProblemResult<SolveResult> {
    prob.validate()?;
    if lb.len() != prob.num_vars() || ub.len() != prob.num_vars() {
        return Err(crate::error::ProblemError::Dimension(format!(
            "bound vectors have lengths {}/{}, expected {}",
            lb.len(),
            ub.len(),
            prob.num_vars()
        )));
    }
    Ok(solve_unchecked(prob, lb, ub, settings))
}

fn solve_unchecked(
    prob: &ProblemData,
    lb: &[f64],
    ub: &[f64],
    settings: &SolverSettings,
) -> SolveResult {
    let start = Instant::now();
    let mut info = SolveInfo::default();

    let form = match StandardForm::build(prob, lb, ub, settings.tol_feas) {
        Standardized::Form(form) => form,
        Standardized::EmptyDomain { var } => {
            if settings.verbose {
                log::debug!("variable {} has an empty domain", var);
            }
            info.solve_time_ms = start.elapsed().as_millis() as u64;
            return SolveResult::without_solution(SolveStatus::PrimalInfeasible, info);
        }
    };

    let deadline = settings.time_limit_ms;
    let timed_out = move || deadline.is_some_and(|ms| start.elapsed().as_millis() as u64 >= ms);
    let finish = |status: SolveStatus, mut info: SolveInfo| {
        info.solve_time_ms = start.elapsed().as_millis() as u64;
        SolveResult::without_solution(status, info)
    };

    let width = form.width();
    let rhs_scale = form.rhs.iter().fold(1.0_f64, |acc, b| acc.max(b.abs()));
    let mut tableau = Tableau::new(
        form.rows.clone(),
        form.rhs.clone(),
        form.basis.clone(),
        settings.tol_pivot,
        settings.tol_opt,
    );
    let mut budget = settings.max_iter;

    // Phase 1
    if form.first_artificial < width {
        let mut phase1_cost = vec![0.0; width];
        for c in phase1_cost.iter_mut().skip(form.first_artificial) {
            *c = 1.0;
        }
        tableau.set_cost(&phase1_cost);

        match tableau.run(&mut budget, &mut info.phase1_iters, timed_out) {
            IterOutcome::Optimal => {}
            // Phase 1 is bounded below by zero.
            IterOutcome::Unbounded | IterOutcome::Numerical => {
                return finish(SolveStatus::NumericalError, info)
            }
            IterOutcome::IterationLimit => return finish(SolveStatus::MaxIters, info),
            IterOutcome::Interrupted => return finish(SolveStatus::TimeLimit, info),
        }

        let infeasibility = tableau.objective();
        if infeasibility > settings.tol_feas * rhs_scale {
            if settings.verbose {
                log::debug!("phase 1 ended with infeasibility {:.3e}", infeasibility);
            }
            return finish(SolveStatus::PrimalInfeasible, info);
        }

        for col in form.first_artificial..width {
            tableau.block(col);
        }
        let redundant = tableau.drive_out(form.first_artificial);
        if settings.verbose && !redundant.is_empty() {
            log::debug!("{} redundant rows after phase 1", redundant.len());
        }
    }

    // Phase 2
    tableau.set_cost(&form.cost);
    match tableau.run(&mut budget, &mut info.phase2_iters, timed_out) {
        IterOutcome::Optimal => {}
        IterOutcome::Unbounded => return finish(SolveStatus::Unbounded, info),
        IterOutcome::IterationLimit => return finish(SolveStatus::MaxIters, info),
        IterOutcome::Interrupted => return finish(SolveStatus::TimeLimit, info),
        IterOutcome::Numerical => return finish(SolveStatus::NumericalError, info),
    }

    let y = tableau.primal();
    let mut x = form.recover(&y);

    // Snap values that round-off pushed just outside their bounds.
    for ((xj, &l), &u) in x.iter_mut().zip(lb).zip(ub) {
        if *xj < l && *xj > l - settings.tol_feas * rhs_scale {
            *xj = l;
        }
        if *xj > u && *xj < u + settings.tol_feas * rhs_scale {
            *xj = u;
        }
    }

    let row_res = prob.constraint_violation(&x);
    let bound_res = x
        .iter()
        .zip(lb.iter().zip(ub))
        .map(|(&x, (&l, &u))| (l - x).max(x - u).max(0.0))
        .fold(0.0, f64::max);
    info.primal_res = row_res.max(bound_res);
    info.solve_time_ms = start.elapsed().as_millis() as u64;

    if !info.primal_res.is_finite() || info.primal_res > 1e-6 * rhs_scale {
        log::warn!(
            "simplex point violates constraints by {:.3e}, reporting numerical error",
            info.primal_res
        );
        return SolveResult::without_solution(SolveStatus::NumericalError, info);
    }

    let obj_val = prob.objective(&x);
    if settings.verbose {
        log::debug!(
            "simplex optimal: obj={:.6e} pivots={}+{} rows={}",
            obj_val,
            info.phase1_iters,
            info.phase2_iters,
            tableau.basis().len()
        );
    }
    debug_assert!(
        (prob.sense.normalize(obj_val) - (tableau.objective() + form.offset)).abs()
            <= 1e-6 * (1.0 + obj_val.abs())
    );

    SolveResult {
        status: SolveStatus::Optimal,
        x,
        obj_val,
        info,
    }
}
