use super::pack;
use crate::sugi::{SugiGraph, SugiNode};
use serde::{Deserialize, Serialize};

/// Packs every layer tightly and centers it within the widest one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Center {}

impl Center {
    pub(crate) fn assign<F>(&self, g: &SugiGraph, sep: &F) -> Vec<f64>
    where
        F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
    {
        let (mut xs, widths) = pack(g, sep);
        let widest = widths.iter().copied().fold(0.0, f64::max);
        for (layer, width) in g.layers().iter().zip(widths) {
            let offset = (widest - width) / 2.0;
            for &v in layer {
                xs[v] += offset;
            }
        }
        xs
    }
}
