//! MIP problem representation.

use arbor_core::{ObjectiveSense, ProblemData, VarType};

use crate::error::{BnbError, BnbResult};

/// Mixed-integer problem wrapper.
///
/// Holds the validated LP data together with the global variable bounds and
/// integrality information. The engine reads it but never changes it; node
/// restrictions are applied to copies of the bounds.
#[derive(Debug, Clone)]
pub struct MipProblem {
    /// Original LP data.
    pub lp: ProblemData,

    /// Indices of integer variables (includes binary).
    pub integer_vars: Vec<usize>,

    /// Indices of binary variables (subset of integer_vars).
    pub binary_vars: Vec<usize>,

    /// Global lower bounds for all variables.
    pub var_lb: Vec<f64>,

    /// Global upper bounds for all variables.
    pub var_ub: Vec<f64>,
}

impl MipProblem {
    /// Create a MipProblem from ProblemData.
    ///
    /// Validates the data, extracts integer/binary variable indices and
    /// resolves the effective bounds.
    pub fn new(prob: ProblemData) -> BnbResult<Self> {
        prob.validate()?;

        let mut integer_vars = Vec::new();
        let mut binary_vars = Vec::new();

        if let Some(ref integrality) = prob.integrality {
            for (i, var_type) in integrality.iter().enumerate() {
                match var_type {
                    VarType::Integer => {
                        integer_vars.push(i);
                    }
                    VarType::Binary => {
                        integer_vars.push(i);
                        binary_vars.push(i);
                    }
                    VarType::Continuous => {}
                }
            }
        }

        let (var_lb, var_ub) = prob.bounds();
        if let Some(j) = (0..var_lb.len()).find(|&j| var_lb[j] > var_ub[j]) {
            return Err(BnbError::InvalidConfiguration(format!(
                "variable {} has empty domain [{}, {}]",
                j, var_lb[j], var_ub[j]
            )));
        }

        Ok(Self {
            lp: prob,
            integer_vars,
            binary_vars,
            var_lb,
            var_ub,
        })
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.lp.num_vars()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.lp.num_constraints()
    }

    /// Number of integer variables (including binary).
    pub fn num_integers(&self) -> usize {
        self.integer_vars.len()
    }

    /// Optimization direction stored on the LP.
    pub fn sense(&self) -> ObjectiveSense {
        self.lp.sense
    }

    /// Objective value q^T x.
    pub fn objective(&self, x: &[f64]) -> f64 {
        self.lp.objective(x)
    }

    /// Get the fractionality of a value (distance to nearest integer).
    pub fn fractionality(val: f64) -> f64 {
        (val - val.round()).abs()
    }

    /// Check if every listed variable is integral within tolerance.
    pub fn is_integral_on(&self, x: &[f64], vars: &[usize], tol: f64) -> bool {
        vars.iter().all(|&i| Self::fractionality(x[i]) <= tol)
    }

    /// Fractional candidates and their values.
    ///
    /// Returns `(position in candidates, var index, value)` for each
    /// candidate whose value is more than `tol` away from an integer.
    pub fn fractional_candidates(
        &self,
        x: &[f64],
        candidates: &[usize],
        tol: f64,
    ) -> Vec<(usize, usize, f64)> {
        candidates
            .iter()
            .enumerate()
            .filter(|(_, &var)| Self::fractionality(x[var]) > tol)
            .map(|(pos, &var)| (pos, var, x[var]))
            .collect()
    }

    /// Check if a point satisfies the global variable bounds.
    pub fn satisfies_bounds(&self, x: &[f64], tol: f64) -> bool {
        x.iter()
            .zip(self.var_lb.iter().zip(&self.var_ub))
            .all(|(&x, (&lb, &ub))| x >= lb - tol && x <= ub + tol)
    }

    /// Check if a point satisfies every constraint row.
    pub fn satisfies_constraints(&self, x: &[f64], tol: f64) -> bool {
        self.lp.constraint_violation(x) <= tol
    }

    /// Check bounds and constraints together.
    pub fn is_feasible(&self, x: &[f64], tol: f64) -> bool {
        x.len() == self.num_vars() && self.satisfies_bounds(x, tol) && self.satisfies_constraints(x, tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::{ConeSpec, VarBound};

    fn simple_milp() -> ProblemData {
        // min x0 + x1
        // s.t. -x0 - x1 <= -1  (x0 + x1 >= 1)
        // x0 binary, x1 continuous in [0, 4]
        ProblemData::from_triplets(
            vec![1.0, 1.0],
            &[(0, 0, -1.0), (0, 1, -1.0)],
            vec![-1.0],
            vec![ConeSpec::NonNeg { dim: 1 }],
        )
        .with_bounds(vec![VarBound {
            var: 1,
            lower: Some(0.0),
            upper: Some(4.0),
        }])
        .with_integrality(vec![VarType::Binary, VarType::Continuous])
    }

    #[test]
    fn test_mip_problem_creation() {
        let mip = MipProblem::new(simple_milp()).unwrap();

        assert_eq!(mip.num_vars(), 2);
        assert_eq!(mip.num_constraints(), 1);
        assert_eq!(mip.num_integers(), 1);
        assert_eq!(mip.integer_vars, vec![0]);
        assert_eq!(mip.binary_vars, vec![0]);

        assert_eq!(mip.var_lb, vec![0.0, 0.0]);
        assert_eq!(mip.var_ub, vec![1.0, 4.0]);
    }

    #[test]
    fn test_invalid_problem_rejected() {
        let mut prob = simple_milp();
        prob.b.push(1.0);
        assert!(matches!(
            MipProblem::new(prob),
            Err(BnbError::InvalidProblem(_))
        ));
    }

    #[test]
    fn test_fractionality() {
        assert!((MipProblem::fractionality(0.5) - 0.5).abs() < 1e-12);
        assert!((MipProblem::fractionality(0.3) - 0.3).abs() < 1e-12);
        assert!((MipProblem::fractionality(0.7) - 0.3).abs() < 1e-12);
        assert!((MipProblem::fractionality(-1.25) - 0.25).abs() < 1e-12);
        assert!(MipProblem::fractionality(2.0) < 1e-12);
    }

    #[test]
    fn test_fractional_candidates() {
        let mip = MipProblem::new(simple_milp()).unwrap();
        let x = [0.4, 0.6];

        let frac = mip.fractional_candidates(&x, &[0], 1e-6);
        assert_eq!(frac, vec![(0, 0, 0.4)]);

        assert!(mip.is_integral_on(&[1.0, 0.6], &[0], 1e-6));
        assert!(mip.is_integral_on(&[0.9999999, 0.6], &[0], 1e-6));
        assert!(!mip.is_integral_on(&x, &[0], 1e-6));
    }

    #[test]
    fn test_feasibility() {
        let mip = MipProblem::new(simple_milp()).unwrap();
        assert!(mip.is_feasible(&[1.0, 0.0], 1e-9));
        assert!(!mip.is_feasible(&[0.0, 0.0], 1e-9));
        assert!(!mip.is_feasible(&[1.0, 5.0], 1e-9));
        assert!(!mip.is_feasible(&[1.0], 1e-9));
    }
}
