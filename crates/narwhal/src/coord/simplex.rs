use super::gap;
use crate::error::{Error, Result};
use crate::solve::{LinearProgram, VarKind};
use crate::sugi::{SugiGraph, SugiNode};
use serde::{Deserialize, Serialize};

/// Linear program minimising weighted horizontal link length `Σ w·|x_u - x_v|`.
///
/// `weights` apply to links between two real nodes, a real node and a dummy, and two dummies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Simplex {
    pub weights: [f64; 3],
}

impl Default for Simplex {
    fn default() -> Self {
        Self {
            weights: [1.0, 2.0, 8.0],
        }
    }
}

impl Simplex {
    pub fn weights(self, weights: [f64; 3]) -> Self {
        Self { weights }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::invalid(format!(
                "simplex weights must be finite and non-negative, got {:?}",
                self.weights
            )));
        }
        Ok(())
    }

    pub(crate) fn assign<F>(&self, g: &SugiGraph, sep: &F) -> Result<Vec<f64>>
    where
        F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
    {
        let mut lp = LinearProgram::new();
        for _ in 0..g.len() {
            lp.add_var(VarKind::Continuous, Some(0.0), None);
        }
        for (u, v) in g.edges() {
            let dummies = usize::from(g.node(u).is_dummy()) + usize::from(g.node(v).is_dummy());
            let length = lp.add_var(VarKind::Continuous, Some(0.0), None);
            lp.add_objective(length, self.weights[dummies]);
            lp.add_row(&[(length, 1.0), (u, -1.0), (v, 1.0)], Some(0.0), None);
            lp.add_row(&[(length, 1.0), (u, 1.0), (v, -1.0)], Some(0.0), None);
        }
        for layer in g.layers() {
            for pair in layer.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                lp.add_row(&[(b, 1.0), (a, -1.0)], Some(gap(g, sep, a, b)), None);
            }
        }
        let mut xs = lp.minimise()?;
        xs.truncate(g.len());
        Ok(xs)
    }
}
