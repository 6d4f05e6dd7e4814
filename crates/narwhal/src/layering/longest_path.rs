use crate::error::Result;
use narwhal_dag::{Dag, NodeIx, Traversal};
use serde::{Deserialize, Serialize};

/// Places every node as high (or, bottom-up, as low) as its links allow.
///
/// Minimises the number of layers, not the total link length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LongestPath {
    pub top_down: bool,
}

impl Default for LongestPath {
    fn default() -> Self {
        Self { top_down: true }
    }
}

impl LongestPath {
    pub fn top_down(self, top_down: bool) -> Self {
        Self { top_down }
    }

    pub(crate) fn layer<N, L, F>(&self, dag: &mut Dag<N, L>, sep: &F) -> Result<()>
    where
        F: Fn(Option<NodeIx>, Option<NodeIx>) -> usize,
    {
        if self.top_down {
            for v in dag.descendants(Traversal::Before) {
                let layer = dag
                    .parents(v)
                    .into_iter()
                    .filter_map(|p| Some(dag.layer(p)? + sep(Some(p), Some(v))))
                    .fold(sep(None, Some(v)), usize::max);
                dag.set_layer(v, layer);
            }
            return Ok(());
        }

        // Distance from the bottom, children first.
        let mut depth: Vec<usize> = vec![0; dag.size()];
        for v in dag.descendants(Traversal::After) {
            depth[v.index()] = dag
                .children(v)
                .map(|c| depth[c.index()] + sep(Some(v), Some(c)))
                .fold(sep(Some(v), None), usize::max);
        }
        let max_depth = depth.iter().copied().max().unwrap_or(0);
        let shift = dag
            .nodes()
            .map(|v| sep(None, Some(v)).saturating_sub(max_depth - depth[v.index()]))
            .max()
            .unwrap_or(0);
        for v in dag.nodes().collect::<Vec<_>>() {
            dag.set_layer(v, max_depth - depth[v.index()] + shift);
        }
        Ok(())
    }
}
