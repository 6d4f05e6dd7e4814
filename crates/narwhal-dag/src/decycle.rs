//! Cycle removal by link reversal (Eades–Lin–Smyth greedy ordering).
//!
//! The ordering is built from both ends: sinks are pushed onto the back, sources onto the front,
//! and when neither exists the node with the largest `outdeg - indeg` goes to the front. Links that
//! point backward in the final order are reversed. This is a best-effort heuristic, not a minimum
//! feedback arc set.

use crate::dag::{Dag, LinkIx, NodeIx};
use std::collections::VecDeque;

impl<N, L> Dag<N, L> {
    /// Reverses links until the dag is acyclic. Returns the number of reversed links.
    pub fn decycle(&mut self) -> usize {
        let flip = feedback_links(self);
        let count = self.reverse_links(flip);
        tracing::debug!(nodes = self.size(), reversed = count, "decycled dag");
        count
    }
}

/// Links pointing backward in the greedy ordering.
pub fn feedback_links<N, L>(g: &Dag<N, L>) -> Vec<LinkIx> {
    if g.size() <= 1 {
        return Vec::new();
    }
    let order = greedy_order(g);
    let mut pos: Vec<usize> = vec![0; g.size()];
    for (i, v) in order.iter().enumerate() {
        pos[v.index()] = i;
    }
    g.links()
        .filter(|l| pos[l.source.index()] > pos[l.target.index()])
        .map(|l| l.ix)
        .collect()
}

/// The Eades–Lin–Smyth vertex ordering.
pub fn greedy_order<N, L>(g: &Dag<N, L>) -> Vec<NodeIx> {
    let n = g.size();
    let mut in_deg: Vec<i64> = vec![0; n];
    let mut out_deg: Vec<i64> = vec![0; n];
    let mut in_adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut out_adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut max_in: i64 = 0;
    let mut max_out: i64 = 0;

    for l in g.links() {
        let (v, w) = (l.source.index(), l.target.index());
        out_adj[v].push(w);
        in_adj[w].push(v);
        out_deg[v] += 1;
        in_deg[w] += 1;
        max_out = max_out.max(out_deg[v]);
        max_in = max_in.max(in_deg[w]);
    }

    // bucket 0 holds sinks, the last bucket sources, the rest are keyed by `out - in`.
    let bucket_len: usize = (max_out + max_in + 3).max(3) as usize;
    let zero_idx: i64 = max_in + 1;
    let mut work = Work {
        alive: vec![true; n],
        alive_count: n,
        buckets: (0..bucket_len).map(|_| VecDeque::new()).collect(),
        bucket_of: vec![None; n],
        stamp: vec![0; n],
        zero_idx,
        in_deg,
        out_deg,
        in_adj: &in_adj,
        out_adj: &out_adj,
    };
    for v in 0..n {
        work.assign_bucket(v);
    }

    let mut front: Vec<usize> = Vec::with_capacity(n);
    let mut back: Vec<usize> = Vec::new();

    while work.alive_count > 0 {
        while let Some(v) = work.pop_bucket(0) {
            work.remove(v);
            back.push(v);
        }

        let last = work.buckets.len() - 1;
        while let Some(v) = work.pop_bucket(last) {
            work.remove(v);
            front.push(v);
        }

        if work.alive_count == 0 {
            break;
        }

        let picked = (1..last).rev().find_map(|i| work.pop_bucket(i));
        let Some(v) = picked else {
            // Every live node sits in a bucket, so this only guards against an endless loop.
            let Some(v) = (0..n).find(|&v| work.alive[v]) else {
                break;
            };
            work.remove(v);
            front.push(v);
            continue;
        };
        work.remove(v);
        front.push(v);
    }

    back.reverse();
    front.extend(back);
    front.into_iter().map(NodeIx).collect()
}

struct Work<'a> {
    alive: Vec<bool>,
    alive_count: usize,
    // Entries are `(node, stamp)`; re-bucketing bumps the stamp and leaves the old entry behind.
    buckets: Vec<VecDeque<(usize, u32)>>,
    bucket_of: Vec<Option<usize>>,
    stamp: Vec<u32>,
    zero_idx: i64,
    in_deg: Vec<i64>,
    out_deg: Vec<i64>,
    in_adj: &'a [Vec<usize>],
    out_adj: &'a [Vec<usize>],
}

impl Work<'_> {
    fn pop_bucket(&mut self, idx: usize) -> Option<usize> {
        while let Some((v, stamp)) = self.buckets[idx].pop_back() {
            if self.alive[v] && self.stamp[v] == stamp && self.bucket_of[v] == Some(idx) {
                self.bucket_of[v] = None;
                return Some(v);
            }
        }
        None
    }

    fn assign_bucket(&mut self, v: usize) {
        let last = self.buckets.len() - 1;
        let idx: usize = if self.out_deg[v] == 0 {
            0
        } else if self.in_deg[v] == 0 {
            last
        } else {
            let raw = self.out_deg[v] - self.in_deg[v] + self.zero_idx;
            raw.clamp(1, (last - 1) as i64) as usize
        };
        self.stamp[v] = self.stamp[v].wrapping_add(1);
        self.buckets[idx].push_front((v, self.stamp[v]));
        self.bucket_of[v] = Some(idx);
    }

    fn remove(&mut self, v: usize) {
        if !self.alive[v] {
            return;
        }
        self.alive[v] = false;
        self.alive_count -= 1;
        self.bucket_of[v] = None;

        let (in_adj, out_adj) = (self.in_adj, self.out_adj);
        for &u in &in_adj[v] {
            if self.alive[u] {
                self.out_deg[u] -= 1;
                self.assign_bucket(u);
            }
        }
        for &w in &out_adj[v] {
            if self.alive[w] {
                self.in_deg[w] -= 1;
                self.assign_bucket(w);
            }
        }
    }
}
