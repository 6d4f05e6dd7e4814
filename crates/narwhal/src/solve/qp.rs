use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Diagonal weight added to every variable so the objective is strictly convex.
const REGULARIZATION: f64 = 1e-6;

/// `minimise ½ xᵀPx + qᵀx` subject to `l <= Ax <= u`.
///
/// `P` is accumulated as its upper triangle, keyed by `(col, row)` with `row <= col`, which is
/// the layout `osqp` expects.
pub(crate) struct QuadraticProgram {
    n: usize,
    p: BTreeMap<(usize, usize), f64>,
    q: Vec<f64>,
    rows: Vec<(Vec<(usize, f64)>, f64, f64)>,
}

impl QuadraticProgram {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            n,
            p: BTreeMap::new(),
            q: vec![0.0; n],
            rows: Vec::new(),
        }
    }

    /// Adds `weight · (Σ coeff·x)²` to the objective.
    pub(crate) fn add_square(&mut self, terms: &[(usize, f64)], weight: f64) {
        if weight == 0.0 {
            return;
        }
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for &(var, coeff) in terms {
            *merged.entry(var).or_default() += coeff;
        }
        let merged: Vec<(usize, f64)> = merged.into_iter().filter(|(_, c)| *c != 0.0).collect();
        for (a, &(i, ci)) in merged.iter().enumerate() {
            for &(j, cj) in &merged[a..] {
                *self.p.entry((j, i)).or_default() += 2.0 * weight * ci * cj;
            }
        }
    }

    pub(crate) fn add_linear(&mut self, var: usize, coeff: f64) {
        self.q[var] += coeff;
    }

    /// Adds `lower <= Σ coeff·x <= upper`; use infinities for open bounds.
    pub(crate) fn add_row(&mut self, terms: &[(usize, f64)], lower: f64, upper: f64) {
        self.rows.push((terms.to_vec(), lower, upper));
    }

    /// `Px + q`, the objective's gradient at `x`.
    pub(crate) fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let (p, q) = self.dense();
        let g = p * DVector::from_column_slice(x) + q;
        g.iter().copied().collect()
    }

    fn dense(&self) -> (DMatrix<f64>, DVector<f64>) {
        let mut p = DMatrix::<f64>::zeros(self.n, self.n);
        for (&(col, row), &v) in &self.p {
            p[(row, col)] = v;
            p[(col, row)] = v;
        }
        (p, DVector::from_column_slice(&self.q))
    }

    pub(crate) fn minimise(&self) -> Result<Vec<f64>> {
        let n = self.n;
        if n == 0 {
            return Ok(Vec::new());
        }
        if self.rows.is_empty() && self.q.iter().all(|v| *v == 0.0) {
            // A sum of squares without constraints or a linear term bottoms out at the origin.
            return Ok(vec![0.0; n]);
        }
        tracing::trace!(
            variables = n,
            rows = self.rows.len(),
            nonzeros = self.p.len(),
            "solving quadratic program"
        );

        let mut p = self.p.clone();
        for i in 0..n {
            *p.entry((i, i)).or_default() += REGULARIZATION;
        }
        let p = csc(n, n, &p);

        let mut by_col: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for (r, (terms, _, _)) in self.rows.iter().enumerate() {
            for &(var, coeff) in terms {
                *by_col.entry((var, r)).or_default() += coeff;
            }
        }
        let a = csc(self.rows.len(), n, &by_col);
        let l: Vec<f64> = self.rows.iter().map(|(_, lo, _)| *lo).collect();
        let u: Vec<f64> = self.rows.iter().map(|(_, _, hi)| *hi).collect();

        let settings = osqp::Settings::default()
            .verbose(false)
            .eps_abs(1e-7)
            .eps_rel(1e-7)
            .max_iter(20_000)
            .polish(true);
        let mut problem = osqp::Problem::new(p, &self.q, a, &l, &u, &settings).map_err(|e| {
            Error::Solver {
                message: format!("could not set up quadratic program: {e:?}"),
            }
        })?;

        match problem.solve() {
            osqp::Status::Solved(solution)
            | osqp::Status::SolvedInaccurate(solution)
            | osqp::Status::MaxIterationsReached(solution)
            | osqp::Status::TimeLimitReached(solution) => Ok(solution.x().to_vec()),
            _ => Err(Error::Solver {
                message: "quadratic program is infeasible".to_string(),
            }),
        }
    }
}

/// Compressed sparse column matrix from entries keyed by `(col, row)`.
fn csc(nrows: usize, ncols: usize, entries: &BTreeMap<(usize, usize), f64>) -> osqp::CscMatrix<'static> {
    let mut indptr: Vec<usize> = Vec::with_capacity(ncols + 1);
    let mut indices: Vec<usize> = Vec::with_capacity(entries.len());
    let mut data: Vec<f64> = Vec::with_capacity(entries.len());
    let mut col = 0;
    indptr.push(0);
    for (&(c, r), &v) in entries {
        while col < c {
            indptr.push(data.len());
            col += 1;
        }
        indices.push(r);
        data.push(v);
    }
    while col < ncols {
        indptr.push(data.len());
        col += 1;
    }
    osqp::CscMatrix {
        nrows,
        ncols,
        indptr: Cow::Owned(indptr),
        indices: Cow::Owned(indices),
        data: Cow::Owned(data),
    }
}
