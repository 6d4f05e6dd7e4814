//! Node traversal orders.

use crate::dag::{Dag, NodeIx};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Pre-order depth-first from the roots.
    #[default]
    Depth,
    /// Breadth-first from the roots.
    Breadth,
    /// Every node after all of its parents.
    Before,
    /// Every node after all of its children.
    After,
}

impl<N, L> Dag<N, L> {
    /// Every node exactly once, in the requested order.
    pub fn descendants(&self, order: Traversal) -> Vec<NodeIx> {
        match order {
            Traversal::Depth => depth(self),
            Traversal::Breadth => breadth(self),
            Traversal::Before => before(self),
            Traversal::After => after(self),
        }
    }
}

fn depth<N, L>(g: &Dag<N, L>) -> Vec<NodeIx> {
    let mut seen: Vec<bool> = vec![false; g.size()];
    let mut out: Vec<NodeIx> = Vec::with_capacity(g.size());
    let mut stack: Vec<NodeIx> = g.roots();
    stack.reverse();
    while let Some(v) = stack.pop() {
        if seen[v.index()] {
            continue;
        }
        seen[v.index()] = true;
        out.push(v);
        let mut children: Vec<NodeIx> = g.children(v).collect();
        children.reverse();
        stack.extend(children.into_iter().filter(|w| !seen[w.index()]));
    }
    out
}

fn breadth<N, L>(g: &Dag<N, L>) -> Vec<NodeIx> {
    let mut seen: Vec<bool> = vec![false; g.size()];
    let mut out: Vec<NodeIx> = Vec::with_capacity(g.size());
    let mut q: VecDeque<NodeIx> = VecDeque::new();
    for r in g.roots() {
        seen[r.index()] = true;
        q.push_back(r);
    }
    while let Some(v) = q.pop_front() {
        out.push(v);
        for w in g.children(v) {
            if !seen[w.index()] {
                seen[w.index()] = true;
                q.push_back(w);
            }
        }
    }
    out
}

fn before<N, L>(g: &Dag<N, L>) -> Vec<NodeIx> {
    // Kahn's algorithm driven by a stack, so chains are followed before siblings.
    let mut remaining: Vec<usize> = g.nodes().map(|v| g.in_degree(v)).collect();
    let mut out: Vec<NodeIx> = Vec::with_capacity(g.size());
    let mut stack: Vec<NodeIx> = g.roots();
    stack.reverse();
    while let Some(v) = stack.pop() {
        out.push(v);
        let mut ready: Vec<NodeIx> = Vec::new();
        for w in g.children(v) {
            remaining[w.index()] -= 1;
            if remaining[w.index()] == 0 {
                ready.push(w);
            }
        }
        ready.reverse();
        stack.extend(ready);
    }
    out
}

fn after<N, L>(g: &Dag<N, L>) -> Vec<NodeIx> {
    let mut seen: Vec<bool> = vec![false; g.size()];
    let mut out: Vec<NodeIx> = Vec::with_capacity(g.size());
    for root in g.roots() {
        if seen[root.index()] {
            continue;
        }
        seen[root.index()] = true;
        let mut stack: Vec<(NodeIx, usize)> = vec![(root, 0)];
        while let Some(top) = stack.last_mut() {
            let v = top.0;
            let links = g.child_links(v);
            if top.1 >= links.len() {
                out.push(v);
                stack.pop();
                continue;
            }
            let w = links[top.1].target();
            top.1 += 1;
            if !seen[w.index()] {
                seen[w.index()] = true;
                stack.push((w, 0));
            }
        }
    }
    out
}
