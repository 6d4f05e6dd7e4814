use super::{gap, pack};
use crate::sugi::{SugiGraph, SugiNode};
use serde::{Deserialize, Serialize};

/// Places nodes layer by layer under the mean of their parents.
///
/// Within a layer, nodes are placed in descending priority (degree for real nodes, 0 for
/// dummies). Each one lands as close to its target as the already placed neighbours allow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greedy {}

impl Greedy {
    pub(crate) fn assign<F>(&self, g: &SugiGraph, sep: &F) -> Vec<f64>
    where
        F: Fn(Option<&SugiNode>, Option<&SugiNode>) -> f64,
    {
        let (mut xs, _) = pack(g, sep);

        for layer in g.layers() {
            if layer.is_empty() {
                continue;
            }
            // offset[j]: packed distance from the layer's first node to node j.
            let mut offset = vec![0.0; layer.len()];
            for j in 1..layer.len() {
                offset[j] = offset[j - 1] + gap(g, sep, layer[j - 1], layer[j]);
            }

            let target: Vec<Option<f64>> = layer
                .iter()
                .map(|&v| {
                    let parents = g.parents(v);
                    if parents.is_empty() {
                        None
                    } else {
                        Some(parents.iter().map(|&p| xs[p]).sum::<f64>() / parents.len() as f64)
                    }
                })
                .collect();
            if target.iter().all(Option::is_none) {
                continue;
            }

            let priority = |v: usize| -> usize {
                if g.node(v).is_dummy() {
                    0
                } else {
                    g.parents(v).len() + g.children(v).len()
                }
            };
            let mut queue: Vec<usize> = (0..layer.len()).collect();
            queue.sort_by_key(|&j| (std::cmp::Reverse(priority(layer[j])), j));

            let mut placed: Vec<Option<f64>> = vec![None; layer.len()];
            for j in queue {
                let lo = (0..j)
                    .rev()
                    .find_map(|k| placed[k].map(|x| x + offset[j] - offset[k]))
                    .unwrap_or(f64::NEG_INFINITY);
                let hi = (j + 1..layer.len())
                    .find_map(|k| placed[k].map(|x| x - (offset[k] - offset[j])))
                    .unwrap_or(f64::INFINITY);
                let x = match target[j] {
                    Some(t) => t.max(lo).min(hi),
                    None if lo.is_finite() => lo,
                    None if hi.is_finite() => hi,
                    None => offset[j],
                };
                placed[j] = Some(x);
            }
            for (j, &v) in layer.iter().enumerate() {
                xs[v] = placed[j].unwrap_or(offset[j]);
            }
        }
        xs
    }
}
