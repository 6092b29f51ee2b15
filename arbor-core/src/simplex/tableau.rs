//! Dense simplex tableau with Bland's pivoting rule.

/// Outcome of running simplex iterations to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IterOutcome {
    /// No improving column remains.
    Optimal,
    /// An improving column has no blocking row.
    Unbounded,
    /// Pivot budget exhausted.
    IterationLimit,
    /// Caller asked to stop (time limit).
    Interrupted,
    /// NaN or infinite values appeared.
    Numerical,
}

/// Dense tableau `[T | rhs]` with an objective row of reduced costs.
pub(crate) struct Tableau {
    /// Constraint rows, each of length `width + 1` (rhs last).
    rows: Vec<Vec<f64>>,
    /// Reduced costs, length `width + 1`; last entry is `-z`.
    obj: Vec<f64>,
    /// Basic column per row.
    basis: Vec<usize>,
    /// Columns allowed to enter the basis.
    enterable: Vec<bool>,
    width: usize,
    tol_pivot: f64,
    tol_opt: f64,
}

impl Tableau {
    /// Build a tableau from rows, rhs and a starting basis whose columns
    /// form an identity.
    pub(crate) fn new(
        rows: Vec<Vec<f64>>,
        rhs: Vec<f64>,
        basis: Vec<usize>,
        tol_pivot: f64,
        tol_opt: f64,
    ) -> Self {
        let width = rows.first().map_or(0, |r| r.len());
        let rows = rows
            .into_iter()
            .zip(rhs)
            .map(|(mut r, b)| {
                r.push(b);
                r
            })
            .collect();
        Self {
            rows,
            obj: vec![0.0; width + 1],
            basis,
            enterable: vec![true; width],
            width,
            tol_pivot,
            tol_opt,
        }
    }

    /// Install a cost vector and price out the current basis.
    pub(crate) fn set_cost(&mut self, cost: &[f64]) {
        self.obj = cost.to_vec();
        self.obj.push(0.0);
        for (r, &b) in self.basis.iter().enumerate() {
            let cb = self.obj[b];
            if cb != 0.0 {
                for (o, &v) in self.obj.iter_mut().zip(&self.rows[r]) {
                    *o -= cb * v;
                }
            }
        }
    }

    /// Forbid a column from entering the basis.
    pub(crate) fn block(&mut self, col: usize) {
        self.enterable[col] = false;
    }

    /// Current objective value of the installed cost.
    pub(crate) fn objective(&self) -> f64 {
        -self.obj[self.width]
    }

    pub(crate) fn basis(&self) -> &[usize] {
        &self.basis
    }

    /// Value of every column at the current basic solution.
    pub(crate) fn primal(&self) -> Vec<f64> {
        let mut y = vec![0.0; self.width];
        for (r, &b) in self.basis.iter().enumerate() {
            y[b] = self.rows[r][self.width];
        }
        y
    }

    /// Run pivots until optimal or a stop condition.
    ///
    /// `budget` is decremented per pivot; `interrupted` is polled between
    /// pivots.
    pub(crate) fn run(
        &mut self,
        budget: &mut usize,
        iters: &mut usize,
        mut interrupted: impl FnMut() -> bool,
    ) -> IterOutcome {
        loop {
            let Some(col) = self.entering() else {
                return IterOutcome::Optimal;
            };
            let Some(row) = self.leaving(col) else {
                return IterOutcome::Unbounded;
            };
            if *budget == 0 {
                return IterOutcome::IterationLimit;
            }
            if interrupted() {
                return IterOutcome::Interrupted;
            }
            *budget -= 1;
            *iters += 1;
            self.pivot(row, col);
            if !self.obj[self.width].is_finite() {
                return IterOutcome::Numerical;
            }
        }
    }

    /// Bland: lowest-index enterable column with negative reduced cost.
    fn entering(&self) -> Option<usize> {
        (0..self.width).find(|&j| self.enterable[j] && self.obj[j] < -self.tol_opt)
    }

    /// Minimum ratio test, ties broken by lowest basic column index.
    fn leaving(&self, col: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (r, row) in self.rows.iter().enumerate() {
            let a = row[col];
            if a <= self.tol_pivot {
                continue;
            }
            let ratio = row[self.width] / a;
            best = match best {
                None => Some((r, ratio)),
                Some((br, bratio)) => {
                    if ratio < bratio - 1e-12
                        || (ratio <= bratio + 1e-12 && self.basis[r] < self.basis[br])
                    {
                        Some((r, ratio))
                    } else {
                        Some((br, bratio))
                    }
                }
            };
        }
        best.map(|(r, _)| r)
    }

    /// Pivot on `(row, col)`.
    pub(crate) fn pivot(&mut self, row: usize, col: usize) {
        let p = self.rows[row][col];
        for v in self.rows[row].iter_mut() {
            *v /= p;
        }
        let pivot_row = self.rows[row].clone();

        for (r, other) in self.rows.iter_mut().enumerate() {
            if r == row {
                continue;
            }
            let factor = other[col];
            if factor != 0.0 {
                for (v, &pv) in other.iter_mut().zip(&pivot_row) {
                    *v -= factor * pv;
                }
                other[col] = 0.0;
            }
        }

        let factor = self.obj[col];
        if factor != 0.0 {
            for (v, &pv) in self.obj.iter_mut().zip(&pivot_row) {
                *v -= factor * pv;
            }
            self.obj[col] = 0.0;
        }

        // Keep rhs nonnegative against round-off.
        for r in self.rows.iter_mut() {
            if r[self.width] < 0.0 && r[self.width] > -1e-12 {
                r[self.width] = 0.0;
            }
        }

        self.basis[row] = col;
    }

    /// Pivot basic columns at index `>= first` out of the basis where a
    /// non-blocked replacement exists. Returns rows that stay artificial
    /// (redundant constraints).
    pub(crate) fn drive_out(&mut self, first: usize) -> Vec<usize> {
        let mut redundant = Vec::new();
        for r in 0..self.rows.len() {
            if self.basis[r] < first {
                continue;
            }
            let replacement = (0..first)
                .find(|&j| self.enterable[j] && self.rows[r][j].abs() > self.tol_pivot);
            match replacement {
                Some(col) => self.pivot(r, col),
                None => redundant.push(r),
            }
        }
        redundant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pivot_optimum() {
        // min -x0 s.t. x0 + s = 3
        let mut t = Tableau::new(vec![vec![1.0, 1.0]], vec![3.0], vec![1], 1e-11, 1e-10);
        t.set_cost(&[-1.0, 0.0]);
        let mut budget = 10;
        let mut iters = 0;
        assert_eq!(t.run(&mut budget, &mut iters, || false), IterOutcome::Optimal);
        assert_eq!(iters, 1);
        assert_eq!(t.objective(), -3.0);
        assert_eq!(t.primal(), vec![3.0, 0.0]);
    }

    #[test]
    fn test_unbounded_column() {
        // min -x0 s.t. -x0 + s = 1
        let mut t = Tableau::new(vec![vec![-1.0, 1.0]], vec![1.0], vec![1], 1e-11, 1e-10);
        t.set_cost(&[-1.0, 0.0]);
        let mut budget = 10;
        let mut iters = 0;
        assert_eq!(t.run(&mut budget, &mut iters, || false), IterOutcome::Unbounded);
    }

    #[test]
    fn test_iteration_budget() {
        let mut t = Tableau::new(vec![vec![1.0, 1.0]], vec![3.0], vec![1], 1e-11, 1e-10);
        t.set_cost(&[-1.0, 0.0]);
        let mut budget = 0;
        let mut iters = 0;
        assert_eq!(
            t.run(&mut budget, &mut iters, || false),
            IterOutcome::IterationLimit
        );
    }
}
