//! Layer assignment.
//!
//! A layering writes `layer` on every node so that each link points strictly downward. The
//! separation function `sep(a, b)` gives the minimum layer gap between two nodes, with `None`
//! standing for the space above the first layer or below the last one.

mod coffman_graham;
mod longest_path;
mod simplex;
mod topological;

pub use coffman_graham::CoffmanGraham;
pub use longest_path::LongestPath;
pub use simplex::Simplex;
pub use topological::Topological;

use crate::error::Result;
use narwhal_dag::{Dag, NodeIx};
use serde::{Deserialize, Serialize};

/// One layer between linked nodes, none at the edges.
pub fn unit_separation(a: Option<NodeIx>, b: Option<NodeIx>) -> usize {
    usize::from(a.is_some() && b.is_some())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Layering {
    LongestPath(LongestPath),
    Topological(Topological),
    Simplex(Simplex),
    CoffmanGraham(CoffmanGraham),
}

impl Default for Layering {
    fn default() -> Self {
        Self::Simplex(Simplex::default())
    }
}

impl From<LongestPath> for Layering {
    fn from(value: LongestPath) -> Self {
        Self::LongestPath(value)
    }
}

impl From<Topological> for Layering {
    fn from(value: Topological) -> Self {
        Self::Topological(value)
    }
}

impl From<Simplex> for Layering {
    fn from(value: Simplex) -> Self {
        Self::Simplex(value)
    }
}

impl From<CoffmanGraham> for Layering {
    fn from(value: CoffmanGraham) -> Self {
        Self::CoffmanGraham(value)
    }
}

impl Layering {
    /// Assigns a layer to every node and returns the number of layers.
    pub fn layer<N, L, F>(&self, dag: &mut Dag<N, L>, sep: F) -> Result<usize>
    where
        F: Fn(Option<NodeIx>, Option<NodeIx>) -> usize,
    {
        let _span = tracing::debug_span!("layering", nodes = dag.size()).entered();
        match self {
            Layering::LongestPath(op) => op.layer(dag, &sep)?,
            Layering::Topological(op) => op.layer(dag, &sep)?,
            Layering::Simplex(op) => op.layer(dag, &sep)?,
            Layering::CoffmanGraham(op) => op.layer(dag, &sep)?,
        }
        let height = height(dag, &sep);
        tracing::debug!(height, "assigned layers");
        Ok(height)
    }
}

/// `max(layer(v) + sep(v, None)) + 1`, or 0 for an empty dag.
pub fn height<N, L, F>(dag: &Dag<N, L>, sep: &F) -> usize
where
    F: Fn(Option<NodeIx>, Option<NodeIx>) -> usize,
{
    dag.nodes()
        .map(|v| dag.layer(v).unwrap_or(0) + sep(Some(v), None) + 1)
        .max()
        .unwrap_or(0)
}
