use crate::error::Result;
use narwhal_dag::{Dag, NodeIx, Traversal};
use serde::{Deserialize, Serialize};

/// Gives every node a layer of its own, in topological order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topological {}

impl Topological {
    pub(crate) fn layer<N, L, F>(&self, dag: &mut Dag<N, L>, sep: &F) -> Result<()>
    where
        F: Fn(Option<NodeIx>, Option<NodeIx>) -> usize,
    {
        let mut prev: Option<NodeIx> = None;
        for v in dag.descendants(Traversal::Before) {
            let after_prev = match prev {
                Some(p) => dag.layer(p).unwrap_or(0) + sep(Some(p), Some(v)).max(1),
                None => sep(None, Some(v)),
            };
            let layer = dag
                .parents(v)
                .into_iter()
                .filter_map(|p| Some(dag.layer(p)? + sep(Some(p), Some(v))))
                .fold(after_prev, usize::max);
            dag.set_layer(v, layer);
            prev = Some(v);
        }
        Ok(())
    }
}
