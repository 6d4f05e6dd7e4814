use super::separation_rows;
use crate::error::{Error, Result};
use crate::solve::QuadraticProgram;
use crate::sugi::{SugiGraph, SugiNode};
use serde::{Deserialize, Serialize};

/// Pins every real node to one column and routes dummies around it.
///
/// Only valid when each layer holds exactly one real node, as a topological layering produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Topological {
    /// Minimise dummy curvature instead of link length.
    pub curve: bool,
}

impl Default for Topological {
    fn default() -> Self {
        Self { curve: true }
    }
}

impl Topological {
    pub fn curve(self, curve: bool) -> Self {
        Self { curve }
    }

    pub(crate) fn assign<F>(&self, g: &SugiGraph, sep: &F) -> Result<Vec<f64>>
    where
        F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
    {
        for (layer, members) in g.layers().iter().enumerate() {
            let real = members.iter().filter(|&&v| !g.node(v).is_dummy()).count();
            if real != 1 {
                return Err(Error::NotTopological { layer, real });
            }
        }

        let mut qp = QuadraticProgram::new(g.len());
        for v in 0..g.len() {
            if !g.node(v).is_dummy() {
                qp.add_row(&[(v, 1.0)], 0.0, 0.0);
            } else if self.curve {
                for &p in g.parents(v) {
                    for &c in g.children(v) {
                        qp.add_square(&[(p, 1.0), (v, -2.0), (c, 1.0)], 1.0);
                    }
                }
            }
        }
        if !self.curve {
            for (u, v) in g.edges() {
                qp.add_square(&[(u, 1.0), (v, -1.0)], 1.0);
            }
        }
        separation_rows(g, sep, &mut qp);
        qp.minimise()
    }
}
