use super::{separation_rows, sweep};
use crate::error::{Error, Result};
use crate::solve::QuadraticProgram;
use crate::sugi::{SugiGraph, SugiNode};
use serde::{Deserialize, Serialize};

/// Quadratic program balancing vertical links against curvature.
///
/// * `vert_weak`: `(x_u - x_v)²` for links between two real nodes.
/// * `vert_strong`: the same for links touching a dummy.
/// * `link_curve`: `(x_p - 2x_v + x_c)²` through dummies.
/// * `node_curve`: the same through real nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Quad {
    pub vert_weak: f64,
    pub vert_strong: f64,
    pub link_curve: f64,
    pub node_curve: f64,
}

impl Default for Quad {
    fn default() -> Self {
        Self {
            vert_weak: 1.0,
            vert_strong: 0.0,
            link_curve: 1.0,
            node_curve: 0.0,
        }
    }
}

impl Quad {
    pub fn vert() -> Self {
        Self {
            vert_weak: 1.0,
            vert_strong: 1.0,
            link_curve: 0.0,
            node_curve: 0.0,
        }
    }

    pub fn vertical(self, weak: f64, strong: f64) -> Self {
        Self {
            vert_weak: weak,
            vert_strong: strong,
            ..self
        }
    }

    pub fn curve(self, link: f64, node: f64) -> Self {
        Self {
            link_curve: link,
            node_curve: node,
            ..self
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let weights = [self.vert_weak, self.vert_strong, self.link_curve, self.node_curve];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::invalid(format!(
                "quad weights must be finite and non-negative, got {weights:?}"
            )));
        }
        if weights.iter().all(|w| *w == 0.0) {
            return Err(Error::invalid("at least one quad weight must be positive"));
        }
        Ok(())
    }

    pub(crate) fn program<F>(&self, g: &SugiGraph, sep: &F) -> QuadraticProgram
    where
        F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
    {
        let mut qp = QuadraticProgram::new(g.len());
        for (u, v) in g.edges() {
            let weight = if g.node(u).is_dummy() || g.node(v).is_dummy() {
                self.vert_strong
            } else {
                self.vert_weak
            };
            qp.add_square(&[(u, 1.0), (v, -1.0)], weight);
        }
        for v in 0..g.len() {
            let weight = if g.node(v).is_dummy() {
                self.link_curve
            } else {
                self.node_curve
            };
            for &p in g.parents(v) {
                for &c in g.children(v) {
                    qp.add_square(&[(p, 1.0), (v, -2.0), (c, 1.0)], weight);
                }
            }
        }
        separation_rows(g, sep, &mut qp);
        qp
    }

    pub(crate) fn assign<F>(&self, g: &SugiGraph, sep: &F) -> Result<Vec<f64>>
    where
        F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
    {
        self.program(g, sep).minimise()
    }
}

/// Quadratic assignment with `weight` on verticality and `1 - weight` on curvature, followed by
/// a second program that shortens links without leaving the first optimum's level set (to first
/// order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MinCurve {
    pub weight: f64,
}

impl Default for MinCurve {
    fn default() -> Self {
        Self { weight: 0.5 }
    }
}

impl MinCurve {
    pub fn weight(self, weight: f64) -> Self {
        Self { weight }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.weight) {
            return Err(Error::invalid(format!(
                "min-curve weight must be in [0, 1), got {}",
                self.weight
            )));
        }
        Ok(())
    }

    pub(crate) fn assign<F>(&self, g: &SugiGraph, sep: &F) -> Result<Vec<f64>>
    where
        F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
    {
        let (vert, curve) = (self.weight, 1.0 - self.weight);
        let primary = Quad {
            vert_weak: vert,
            vert_strong: vert,
            link_curve: curve,
            node_curve: curve,
        }
        .program(g, sep);
        let mut optimum = primary.minimise()?;
        sweep(g, sep, &mut optimum);
        let gradient = primary.gradient(&optimum);

        let mut secondary = QuadraticProgram::new(g.len());
        for (u, v) in g.edges() {
            secondary.add_square(&[(u, 1.0), (v, -1.0)], 1.0);
        }
        separation_rows(g, sep, &mut secondary);

        let scale: f64 = gradient.iter().map(|c| c.abs()).sum();
        if scale > 1e-9 {
            let level: f64 = gradient.iter().zip(&optimum).map(|(c, x)| c * x).sum();
            let tolerance = 1e-6 * (1.0 + level.abs());
            let terms: Vec<(usize, f64)> = gradient
                .iter()
                .enumerate()
                .filter(|(_, c)| **c != 0.0)
                .map(|(i, c)| (i, *c))
                .collect();
            secondary.add_row(&terms, level - tolerance, level + tolerance);
        }
        tracing::trace!(gradient = scale, "min-curve secondary program");
        secondary.minimise()
    }
}
