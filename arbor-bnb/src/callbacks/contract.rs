//! Checks applied to callback proposals before they may become incumbents.

use thiserror::Error;

use super::Proposal;
use crate::model::{IncumbentTracker, MipProblem};
use crate::settings::BnbSettings;

/// Reason a callback proposal was rejected.
///
/// These are logged and counted; they never stop the search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractViolation {
    /// Assignment has the wrong number of entries.
    #[error("assignment has {got} values, expected {expected}")]
    WrongLength {
        /// Number of variables in the problem.
        expected: usize,
        /// Number of values proposed.
        got: usize,
    },

    /// A value or the reported objective is NaN or infinite.
    #[error("non-finite value for {what}")]
    NonFinite {
        /// What was non-finite.
        what: String,
    },

    /// A branching candidate is not integral.
    #[error("candidate x[{var}] = {value} is not integral")]
    Fractional {
        /// Variable index.
        var: usize,
        /// Proposed value.
        value: f64,
    },

    /// A value is outside its global bounds.
    #[error("x[{var}] = {value} is outside [{lb}, {ub}]")]
    OutOfBounds {
        /// Variable index.
        var: usize,
        /// Proposed value.
        value: f64,
        /// Global lower bound.
        lb: f64,
        /// Global upper bound.
        ub: f64,
    },

    /// The assignment violates the constraints.
    #[error("constraint violation {violation:.3e}")]
    Infeasible {
        /// Largest constraint violation.
        violation: f64,
    },

    /// The reported objective does not match q^T x.
    #[error("reported objective {reported} but q^T x = {actual}")]
    ObjectiveMismatch {
        /// Objective reported by the callback.
        reported: f64,
        /// Objective recomputed by the engine.
        actual: f64,
    },

    /// Not strictly better than the incumbent.
    #[error("objective {obj_val} does not improve on incumbent {incumbent}")]
    NotImproving {
        /// Proposed objective.
        obj_val: f64,
        /// Current incumbent objective.
        incumbent: f64,
    },
}

/// Check a proposal against the problem and the current incumbent.
///
/// Returns the objective value recomputed from the assignment.
pub fn check_proposal(
    problem: &MipProblem,
    candidates: &[usize],
    proposal: &Proposal,
    incumbent: &IncumbentTracker,
    settings: &BnbSettings,
) -> Result<f64, ContractViolation> {
    let x = &proposal.x;
    if x.len() != problem.num_vars() {
        return Err(ContractViolation::WrongLength {
            expected: problem.num_vars(),
            got: x.len(),
        });
    }
    if let Some(j) = x.iter().position(|v| !v.is_finite()) {
        return Err(ContractViolation::NonFinite {
            what: format!("x[{}]", j),
        });
    }
    if !proposal.obj_val.is_finite() {
        return Err(ContractViolation::NonFinite {
            what: "objective".to_string(),
        });
    }

    let tol = settings.feas_tol;
    for (j, &v) in x.iter().enumerate() {
        let (lb, ub) = (problem.var_lb[j], problem.var_ub[j]);
        if v < lb - tol || v > ub + tol {
            return Err(ContractViolation::OutOfBounds {
                var: j,
                value: v,
                lb,
                ub,
            });
        }
    }
    if let Some(&var) = candidates
        .iter()
        .find(|&&var| MipProblem::fractionality(x[var]) > settings.int_feas_tol)
    {
        return Err(ContractViolation::Fractional {
            var,
            value: x[var],
        });
    }
    let violation = problem.lp.constraint_violation(x);
    if violation > tol {
        return Err(ContractViolation::Infeasible { violation });
    }

    let actual = problem.objective(x);
    if (proposal.obj_val - actual).abs() > settings.tolerance * (1.0 + actual.abs()) {
        return Err(ContractViolation::ObjectiveMismatch {
            reported: proposal.obj_val,
            actual,
        });
    }
    if !incumbent.improves(actual, settings.tolerance) {
        return Err(ContractViolation::NotImproving {
            obj_val: actual,
            incumbent: incumbent.obj_val(),
        });
    }
    Ok(actual)
}
