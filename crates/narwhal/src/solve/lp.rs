use crate::error::{Error, Result};
use good_lp::{
    Constraint, Expression, ProblemVariables, Solution, SolverModel, Variable, variable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VarKind {
    Continuous,
    Integer,
    Binary,
}

/// A minimisation problem with linear rows `lower <= Σ c·x <= upper`.
pub(crate) struct LinearProgram {
    vars: ProblemVariables,
    handles: Vec<Variable>,
    objective: Expression,
    rows: Vec<Constraint>,
}

impl LinearProgram {
    pub(crate) fn new() -> Self {
        Self {
            vars: ProblemVariables::new(),
            handles: Vec::new(),
            objective: 0.into(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn add_var(&mut self, kind: VarKind, min: Option<f64>, max: Option<f64>) -> usize {
        let mut def = match kind {
            VarKind::Continuous => variable(),
            VarKind::Integer => variable().integer(),
            VarKind::Binary => variable().binary(),
        };
        if let Some(min) = min {
            def = def.min(min);
        }
        if let Some(max) = max {
            def = def.max(max);
        }
        self.handles.push(self.vars.add(def));
        self.handles.len() - 1
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    pub(crate) fn add_objective(&mut self, var: usize, coeff: f64) {
        if coeff != 0.0 {
            self.objective.add_mul(coeff, self.handles[var]);
        }
    }

    /// Adds `lower <= Σ coeff·x <= upper`; a missing bound is open.
    pub(crate) fn add_row(&mut self, terms: &[(usize, f64)], lower: Option<f64>, upper: Option<f64>) {
        let mut expr: Expression = 0.into();
        for &(var, coeff) in terms {
            expr.add_mul(coeff, self.handles[var]);
        }
        match (lower, upper) {
            (Some(lo), Some(hi)) if lo == hi => self.rows.push(expr.eq(lo)),
            (lo, hi) => {
                if let Some(lo) = lo {
                    self.rows.push(expr.clone().geq(lo));
                }
                if let Some(hi) = hi {
                    self.rows.push(expr.leq(hi));
                }
            }
        }
    }

    /// Solves the program and returns one value per variable, in creation order.
    pub(crate) fn minimise(self) -> Result<Vec<f64>> {
        let LinearProgram {
            vars,
            handles,
            objective,
            rows,
        } = self;
        if handles.is_empty() {
            return Ok(Vec::new());
        }
        tracing::trace!(
            variables = handles.len(),
            rows = rows.len(),
            "solving linear program"
        );

        let mut model = vars
            .minimise(objective)
            .using(good_lp::solvers::microlp::microlp);
        for row in rows {
            model.add_constraint(row);
        }
        let solution = model.solve().map_err(|e| Error::Solver {
            message: e.to_string(),
        })?;
        Ok(handles.iter().map(|v| solution.value(*v)).collect())
    }
}
