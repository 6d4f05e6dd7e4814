use crate::error::Result;
use narwhal_dag::{Dag, NodeIx};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Coffman–Graham layering with a bounded number of nodes per layer.
///
/// `max_width == 0` picks `round(sqrt(n))`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoffmanGraham {
    pub max_width: usize,
}

impl CoffmanGraham {
    pub fn max_width(self, max_width: usize) -> Self {
        Self { max_width }
    }

    pub(crate) fn layer<N, L, F>(&self, dag: &mut Dag<N, L>, sep: &F) -> Result<()>
    where
        F: Fn(Option<NodeIx>, Option<NodeIx>) -> usize,
    {
        let n = dag.size();
        if n == 0 {
            return Ok(());
        }
        let width = match self.max_width {
            0 => ((n as f64).sqrt().round() as usize).max(1),
            w => w,
        };

        let order = label_order(dag);

        let mut current: usize = 0;
        let mut filled: usize = 0;
        let mut placed_any = false;
        for v in order {
            let required = dag
                .parents(v)
                .into_iter()
                .filter_map(|p| Some(dag.layer(p)? + sep(Some(p), Some(v))))
                .fold(sep(None, Some(v)), usize::max);
            if !placed_any {
                current = required;
            } else if filled >= width || required > current {
                current = required.max(current + 1);
                filled = 0;
            }
            dag.set_layer(v, current);
            filled += 1;
            placed_any = true;
        }
        Ok(())
    }
}

/// Nodes in Coffman–Graham label order: each step labels the ready node whose parents' labels,
/// sorted descending, are lexicographically smallest.
fn label_order<N, L>(dag: &Dag<N, L>) -> Vec<NodeIx> {
    let n = dag.size();
    let mut label: Vec<Option<usize>> = vec![None; n];
    let mut waiting: Vec<usize> = dag.nodes().map(|v| dag.parents(v).len()).collect();
    let mut heap: BinaryHeap<Reverse<(Vec<usize>, usize, NodeIx)>> = BinaryHeap::new();
    let mut pushed: usize = 0;

    for v in dag.roots() {
        heap.push(Reverse((Vec::new(), pushed, v)));
        pushed += 1;
    }

    let mut order: Vec<NodeIx> = Vec::with_capacity(n);
    while let Some(Reverse((_, _, v))) = heap.pop() {
        label[v.index()] = Some(order.len());
        order.push(v);
        for child in distinct_children(dag, v) {
            waiting[child.index()] -= 1;
            if waiting[child.index()] > 0 {
                continue;
            }
            let mut key: Vec<usize> = dag
                .parents(child)
                .into_iter()
                .filter_map(|p| label[p.index()])
                .collect();
            key.sort_unstable_by(|a, b| b.cmp(a));
            heap.push(Reverse((key, pushed, child)));
            pushed += 1;
        }
    }
    order
}

fn distinct_children<N, L>(dag: &Dag<N, L>, v: NodeIx) -> Vec<NodeIx> {
    let mut out: Vec<NodeIx> = Vec::new();
    for c in dag.children(v) {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}
