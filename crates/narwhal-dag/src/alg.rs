//! Structural algorithms over a [`Dag`]: components and cycle detection.

use crate::dag::{Dag, NodeIx};
use std::collections::VecDeque;

/// Connected components with links taken undirected, each in breadth-first order from its first
/// node (insertion order).
pub fn components<N, L>(g: &Dag<N, L>) -> Vec<Vec<NodeIx>> {
    let mut seen: Vec<bool> = vec![false; g.size()];
    let mut out: Vec<Vec<NodeIx>> = Vec::new();

    for start in g.nodes() {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut comp: Vec<NodeIx> = Vec::new();
        let mut q: VecDeque<NodeIx> = VecDeque::new();
        q.push_back(start);
        while let Some(v) = q.pop_front() {
            comp.push(v);
            for w in g.children(v).chain(g.parents(v)) {
                if !seen[w.index()] {
                    seen[w.index()] = true;
                    q.push_back(w);
                }
            }
        }
        out.push(comp);
    }

    out
}

/// Returns a cycle as a closed path (`first == last`), or `None` when the graph is acyclic.
///
/// Depth-first search with an explicit recursion stack so deep chains cannot overflow the call
/// stack.
pub fn find_cycle<N, L>(g: &Dag<N, L>) -> Option<Vec<NodeIx>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    let mut mark: Vec<Mark> = vec![Mark::New; g.size()];
    // (node, next child slot to visit)
    let mut stack: Vec<(NodeIx, usize)> = Vec::new();

    for start in g.nodes() {
        if mark[start.index()] != Mark::New {
            continue;
        }
        mark[start.index()] = Mark::Active;
        stack.push((start, 0));

        while let Some(top) = stack.last_mut() {
            let v = top.0;
            let links = g.child_links(v);
            if top.1 >= links.len() {
                mark[v.index()] = Mark::Done;
                stack.pop();
                continue;
            }
            let w = links[top.1].target();
            top.1 += 1;
            match mark[w.index()] {
                Mark::New => {
                    mark[w.index()] = Mark::Active;
                    stack.push((w, 0));
                }
                Mark::Active => {
                    let from = stack
                        .iter()
                        .position(|(n, _)| *n == w)
                        .unwrap_or(0);
                    let mut path: Vec<NodeIx> = stack[from..].iter().map(|(n, _)| *n).collect();
                    path.push(w);
                    return Some(path);
                }
                Mark::Done => {}
            }
        }
    }

    None
}
