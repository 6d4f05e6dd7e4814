//! Horizontal coordinate assignment.
//!
//! Every strategy proposes raw x values; [`Coord::coord`] then sweeps each layer left to right
//! so that `x(next) - x(prev) >= sep(prev, next)` holds exactly, shifts everything so the left
//! boundary sits at 0 and returns the width. Coordinates stay in separation units.

mod center;
mod greedy;
mod quad;
mod simplex;
mod topological;

pub use center::Center;
pub use greedy::Greedy;
pub use quad::{MinCurve, Quad};
pub use simplex::Simplex;
pub use topological::Topological;

use crate::error::Result;
use crate::solve::QuadraticProgram;
use crate::sugi::{SugiGraph, SugiNode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Coord {
    Center(Center),
    Greedy(Greedy),
    Quad(Quad),
    MinCurve(MinCurve),
    Simplex(Simplex),
    Topological(Topological),
}

impl Default for Coord {
    fn default() -> Self {
        Self::Quad(Quad::default())
    }
}

impl From<Center> for Coord {
    fn from(value: Center) -> Self {
        Self::Center(value)
    }
}

impl From<Greedy> for Coord {
    fn from(value: Greedy) -> Self {
        Self::Greedy(value)
    }
}

impl From<Quad> for Coord {
    fn from(value: Quad) -> Self {
        Self::Quad(value)
    }
}

impl From<MinCurve> for Coord {
    fn from(value: MinCurve) -> Self {
        Self::MinCurve(value)
    }
}

impl From<Simplex> for Coord {
    fn from(value: Simplex) -> Self {
        Self::Simplex(value)
    }
}

impl From<Topological> for Coord {
    fn from(value: Topological) -> Self {
        Self::Topological(value)
    }
}

impl Coord {
    /// Quadratic assignment that only cares about keeping links vertical.
    pub fn vert() -> Self {
        Self::Quad(Quad::vert())
    }

    /// Assigns `x` to every node and returns the total width.
    pub fn coord<F>(&self, g: &mut SugiGraph, sep: F) -> Result<f64>
    where
        F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
    {
        let _span = tracing::debug_span!("coord", nodes = g.len()).entered();
        self.validate()?;
        let xs = match self {
            Coord::Center(op) => op.assign(g, &sep),
            Coord::Greedy(op) => op.assign(g, &sep),
            Coord::Quad(op) => op.assign(g, &sep)?,
            Coord::MinCurve(op) => op.assign(g, &sep)?,
            Coord::Simplex(op) => op.assign(g, &sep)?,
            Coord::Topological(op) => op.assign(g, &sep)?,
        };
        let width = repair(g, &sep, xs);
        tracing::debug!(width, "assigned coordinates");
        Ok(width)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Coord::Quad(op) => op.validate(),
            Coord::MinCurve(op) => op.validate(),
            Coord::Simplex(op) => op.validate(),
            Coord::Center(_) | Coord::Greedy(_) | Coord::Topological(_) => Ok(()),
        }
    }
}

fn gap<F>(g: &SugiGraph, sep: &F, a: usize, b: usize) -> f64
where
    F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
{
    sep(Some(g.node(a)), Some(g.node(b)))
}

/// Each layer packed against its left boundary; returns x per node and the width per layer.
fn pack<F>(g: &SugiGraph, sep: &F) -> (Vec<f64>, Vec<f64>)
where
    F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
{
    let mut xs = vec![0.0; g.len()];
    let mut widths = Vec::with_capacity(g.layers().len());
    for layer in g.layers() {
        let mut x = 0.0;
        let mut prev: Option<usize> = None;
        for &v in layer {
            x += match prev {
                Some(p) => gap(g, sep, p, v),
                None => sep(None, Some(g.node(v))),
            };
            xs[v] = x;
            prev = Some(v);
        }
        widths.push(match prev {
            Some(last) => x + sep(Some(g.node(last)), None),
            None => 0.0,
        });
    }
    (xs, widths)
}

/// Pushes nodes right until every in-layer gap meets its separation.
fn sweep<F>(g: &SugiGraph, sep: &F, xs: &mut [f64])
where
    F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
{
    for layer in g.layers() {
        for (i, &v) in layer.iter().enumerate() {
            if !xs[v].is_finite() {
                xs[v] = 0.0;
            }
            if i > 0 {
                let p = layer[i - 1];
                let floor = xs[p] + gap(g, sep, p, v);
                if xs[v] < floor {
                    xs[v] = floor;
                }
            }
        }
    }
}

fn repair<F>(g: &mut SugiGraph, sep: &F, mut xs: Vec<f64>) -> f64
where
    F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
{
    sweep(g, sep, &mut xs);

    let left = g
        .layers()
        .iter()
        .filter_map(|layer| layer.first())
        .map(|&v| xs[v] - sep(None, Some(g.node(v))))
        .fold(f64::INFINITY, f64::min);
    if !left.is_finite() {
        return 0.0;
    }
    let width = g
        .layers()
        .iter()
        .filter_map(|layer| layer.last())
        .map(|&v| xs[v] - left + sep(Some(g.node(v)), None))
        .fold(0.0, f64::max);

    for (v, x) in xs.into_iter().enumerate() {
        g.node_mut(v).x = Some(x - left);
    }
    width
}

/// Adds `x(next) - x(prev) >= sep(prev, next)` for every in-layer neighbour pair.
fn separation_rows<F>(g: &SugiGraph, sep: &F, qp: &mut QuadraticProgram)
where
    F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
{
    for layer in g.layers() {
        for pair in layer.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            qp.add_row(&[(b, 1.0), (a, -1.0)], gap(g, sep, a, b), f64::INFINITY);
        }
    }
}
