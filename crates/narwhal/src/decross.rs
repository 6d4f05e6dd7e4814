//! Crossing minimisation: reorders nodes within their layers, never across them.

mod cross_count;
mod optimal;
mod two_layer;

pub use cross_count::{crossings, two_layer_crossings};
pub use optimal::{OptCheck, Optimal};
pub use two_layer::{BaseOrder, TwoLayer, TwoLayerOrder};

use crate::error::Result;
use crate::sugi::SugiGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Decross {
    Optimal(Optimal),
    TwoLayer(TwoLayer),
}

impl Default for Decross {
    fn default() -> Self {
        Self::TwoLayer(TwoLayer::default())
    }
}

impl From<Optimal> for Decross {
    fn from(value: Optimal) -> Self {
        Self::Optimal(value)
    }
}

impl From<TwoLayer> for Decross {
    fn from(value: TwoLayer) -> Self {
        Self::TwoLayer(value)
    }
}

impl Decross {
    pub fn decross(&self, g: &mut SugiGraph) -> Result<()> {
        let _span = tracing::debug_span!("decross", nodes = g.len()).entered();
        let before = crossings(g);
        match self {
            Decross::Optimal(op) => op.decross(g)?,
            Decross::TwoLayer(op) => op.decross(g)?,
        }
        tracing::debug!(before, after = crossings(g), "reordered layers");
        Ok(())
    }
}
