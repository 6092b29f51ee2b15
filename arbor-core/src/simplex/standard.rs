//! Conversion of a bounded LP into standard equality form.
//!
//! Every structural variable is rewritten over nonnegative columns:
//!
//! ```text
//! lb finite:            x = lb + x'        (x' <= ub - lb added as a row if ub finite)
//! lb = -∞, ub finite:   x = ub - x'
//! free:                 x = x⁺ - x⁻
//! ```
//!
//! Inequality rows get a slack column, rows with a negative right-hand side
//! are negated, and any row whose slack cannot start basic gets an
//! artificial column.

use crate::problem::ProblemData;

/// How an original variable is expressed over standard-form columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ColumnMap {
    /// x = offset + col
    Shifted { col: usize, offset: f64 },
    /// x = offset - col
    Reflected { col: usize, offset: f64 },
    /// x = pos - neg
    Split { pos: usize, neg: usize },
}

/// An LP in the form `min c^T y + c0, T y = rhs, y >= 0`.
#[derive(Debug, Clone)]
pub(crate) struct StandardForm {
    /// Dense rows over all columns (structural, slack, artificial).
    pub rows: Vec<Vec<f64>>,
    /// Right-hand side, nonnegative after row negation.
    pub rhs: Vec<f64>,
    /// Phase 2 cost per column (artificial columns cost 0).
    pub cost: Vec<f64>,
    /// Constant objective term from bound shifting.
    pub offset: f64,
    /// Initial basic column for each row.
    pub basis: Vec<usize>,
    /// Index of the first artificial column.
    pub first_artificial: usize,
    /// Mapping of original variables.
    pub columns: Vec<ColumnMap>,
}

/// Outcome of building the standard form.
pub(crate) enum Standardized {
    /// Ready to solve.
    Form(StandardForm),
    /// Some variable has `lb > ub`.
    EmptyDomain { var: usize },
}

impl StandardForm {
    /// Build the standard form for `prob` over the given bounds.
    ///
    /// `lb`/`ub` override the bounds stored on the problem so callers can
    /// solve a restricted copy without touching `prob`.
    pub(crate) fn build(prob: &ProblemData, lb: &[f64], ub: &[f64], tol: f64) -> Standardized {
        let n = prob.num_vars();
        let sense = prob.sense;

        // Assign structural columns.
        let mut columns = Vec::with_capacity(n);
        let mut num_struct = 0;
        let mut upper_rows: Vec<(usize, f64)> = Vec::new();
        for j in 0..n {
            let (l, u) = (lb[j], ub[j]);
            if l > u + tol {
                return Standardized::EmptyDomain { var: j };
            }
            let map = if l.is_finite() {
                if u.is_finite() {
                    upper_rows.push((num_struct, (u - l).max(0.0)));
                }
                let map = ColumnMap::Shifted {
                    col: num_struct,
                    offset: l,
                };
                num_struct += 1;
                map
            } else if u.is_finite() {
                let map = ColumnMap::Reflected {
                    col: num_struct,
                    offset: u,
                };
                num_struct += 1;
                map
            } else {
                let map = ColumnMap::Split {
                    pos: num_struct,
                    neg: num_struct + 1,
                };
                num_struct += 2;
                map
            };
            columns.push(map);
        }

        let dense = prob.dense_rows();
        let is_eq = prob.row_is_equality();
        let m_base = dense.len();
        let m = m_base + upper_rows.len();
        let num_slack = is_eq.iter().filter(|&&e| !e).count() + upper_rows.len();

        // Structural part of every row, plus its slack column (if any).
        let mut struct_rows: Vec<Vec<f64>> = Vec::with_capacity(m);
        let mut rhs: Vec<f64> = Vec::with_capacity(m);
        let mut slack_of_row: Vec<Option<usize>> = Vec::with_capacity(m);
        let mut next_slack = num_struct;

        for (i, row) in dense.iter().enumerate() {
            let mut out = vec![0.0; num_struct];
            let mut b = prob.b[i];
            for (j, &a) in row.iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                match columns[j] {
                    ColumnMap::Shifted { col, offset } => {
                        out[col] += a;
                        b -= a * offset;
                    }
                    ColumnMap::Reflected { col, offset } => {
                        out[col] -= a;
                        b -= a * offset;
                    }
                    ColumnMap::Split { pos, neg } => {
                        out[pos] += a;
                        out[neg] -= a;
                    }
                }
            }
            struct_rows.push(out);
            rhs.push(b);
            if is_eq[i] {
                slack_of_row.push(None);
            } else {
                slack_of_row.push(Some(next_slack));
                next_slack += 1;
            }
        }

        for &(col, width) in &upper_rows {
            let mut out = vec![0.0; num_struct];
            out[col] = 1.0;
            struct_rows.push(out);
            rhs.push(width);
            slack_of_row.push(Some(next_slack));
            next_slack += 1;
        }

        debug_assert_eq!(next_slack, num_struct + num_slack);

        // Negate rows with negative rhs; the slack then enters with -1 and
        // cannot start basic.
        let first_artificial = num_struct + num_slack;
        let mut needs_artificial = vec![false; m];
        let mut slack_sign = vec![1.0; m];
        for i in 0..m {
            if rhs[i] < 0.0 {
                rhs[i] = -rhs[i];
                for v in struct_rows[i].iter_mut() {
                    *v = -*v;
                }
                slack_sign[i] = -1.0;
            }
            needs_artificial[i] = slack_of_row[i].is_none() || slack_sign[i] < 0.0;
        }
        let num_artificial = needs_artificial.iter().filter(|&&a| a).count();
        let width = first_artificial + num_artificial;

        let mut rows = Vec::with_capacity(m);
        let mut basis = Vec::with_capacity(m);
        let mut next_artificial = first_artificial;
        for i in 0..m {
            let mut row = vec![0.0; width];
            row[..num_struct].copy_from_slice(&struct_rows[i]);
            if let Some(s) = slack_of_row[i] {
                row[s] = slack_sign[i];
            }
            if needs_artificial[i] {
                row[next_artificial] = 1.0;
                basis.push(next_artificial);
                next_artificial += 1;
            } else if let Some(s) = slack_of_row[i] {
                basis.push(s);
            }
            rows.push(row);
        }

        // Costs in minimization space.
        let mut cost = vec![0.0; width];
        let mut offset = 0.0;
        for (j, map) in columns.iter().enumerate() {
            let c = sense.normalize(prob.q[j]);
            match *map {
                ColumnMap::Shifted { col, offset: o } => {
                    cost[col] = c;
                    offset += c * o;
                }
                ColumnMap::Reflected { col, offset: o } => {
                    cost[col] = -c;
                    offset += c * o;
                }
                ColumnMap::Split { pos, neg } => {
                    cost[pos] = c;
                    cost[neg] = -c;
                }
            }
        }

        Standardized::Form(StandardForm {
            rows,
            rhs,
            cost,
            offset,
            basis,
            first_artificial,
            columns,
        })
    }

    /// Number of columns including artificials.
    pub(crate) fn width(&self) -> usize {
        self.cost.len()
    }

    /// Recover original variable values from standard-form column values.
    pub(crate) fn recover(&self, y: &[f64]) -> Vec<f64> {
        self.columns
            .iter()
            .map(|map| match *map {
                ColumnMap::Shifted { col, offset } => offset + y[col],
                ColumnMap::Reflected { col, offset } => offset - y[col],
                ColumnMap::Split { pos, neg } => y[pos] - y[neg],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ConeSpec;

    fn form(prob: &ProblemData, lb: &[f64], ub: &[f64]) -> StandardForm {
        match StandardForm::build(prob, lb, ub, 1e-9) {
            Standardized::Form(f) => f,
            Standardized::EmptyDomain { var } => panic!("empty domain for {var}"),
        }
    }

    #[test]
    fn test_column_mapping() {
        // x0 + x1 + x2 <= 5
        let prob = ProblemData::from_triplets(
            vec![1.0, 1.0, 1.0],
            &[(0, 0, 1.0), (0, 1, 1.0), (0, 2, 1.0)],
            vec![5.0],
            vec![ConeSpec::NonNeg { dim: 1 }],
        );
        let f = form(
            &prob,
            &[1.0, f64::NEG_INFINITY, f64::NEG_INFINITY],
            &[3.0, 2.0, f64::INFINITY],
        );

        assert_eq!(f.columns[0], ColumnMap::Shifted { col: 0, offset: 1.0 });
        assert_eq!(f.columns[1], ColumnMap::Reflected { col: 1, offset: 2.0 });
        assert_eq!(f.columns[2], ColumnMap::Split { pos: 2, neg: 3 });

        // One base row plus the upper-bound row for x0.
        assert_eq!(f.rows.len(), 2);
        // rhs = 5 - 1 - 2
        assert_eq!(f.rhs[0], 2.0);
        assert_eq!(f.rhs[1], 2.0);
        assert_eq!(f.first_artificial, 6);
        assert_eq!(f.recover(&[0.5, 1.0, 0.0, 3.0, 0.0, 0.0]), vec![1.5, 1.0, -3.0]);
    }

    #[test]
    fn test_negative_rhs_gets_artificial() {
        // -x0 <= -2  (x0 >= 2)
        let prob = ProblemData::from_triplets(
            vec![1.0],
            &[(0, 0, -1.0)],
            vec![-2.0],
            vec![ConeSpec::NonNeg { dim: 1 }],
        );
        let f = form(&prob, &[0.0], &[f64::INFINITY]);
        assert_eq!(f.rhs, vec![2.0]);
        assert_eq!(f.rows[0], vec![1.0, -1.0, 1.0]);
        assert_eq!(f.basis, vec![2]);
    }

    #[test]
    fn test_empty_domain() {
        let prob = ProblemData::from_triplets(
            vec![1.0],
            &[(0, 0, 1.0)],
            vec![1.0],
            vec![ConeSpec::Zero { dim: 1 }],
        );
        assert!(matches!(
            StandardForm::build(&prob, &[1.0], &[0.0], 1e-9),
            Standardized::EmptyDomain { var: 0 }
        ));
    }
}
