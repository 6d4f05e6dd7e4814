//! Thin constructors that turn input records into a [`Dag`].
//!
//! Each builder is an immutable value: setters consume it and return the reconfigured copy.

use crate::dag::{Dag, NodeIx};
use crate::error::{Error, Result};

fn finish<N, L>(mut dag: Dag<N, L>, decycle: bool) -> Result<Dag<N, L>> {
    if decycle {
        dag.decycle();
    } else {
        dag.verify()?;
    }
    Ok(dag)
}

/// Builds a dag from `(source, target, data)` link records; node payloads are `()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Connect {
    decycle: bool,
}

impl Connect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reverse links to break cycles instead of rejecting cyclic input.
    pub fn decycle(self, decycle: bool) -> Self {
        Self { decycle }
    }

    pub fn is_decycle(&self) -> bool {
        self.decycle
    }

    pub fn build<I, S, L>(&self, links: I) -> Result<Dag<(), L>>
    where
        I: IntoIterator<Item = (S, S, L)>,
        S: Into<String>,
    {
        let mut dag: Dag<(), L> = Dag::new();
        for (source, target, data) in links {
            let (source, target) = (source.into(), target.into());
            if source == target {
                return Err(Error::SelfLoop { id: source });
            }
            let v = ensure(&mut dag, source)?;
            let w = ensure(&mut dag, target)?;
            dag.add_link(v, w, data)?;
        }
        if dag.is_empty() {
            return Err(Error::EmptyInput);
        }
        finish(dag, self.decycle)
    }

    pub fn build_pairs<I, S>(&self, links: I) -> Result<Dag<(), ()>>
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.build(links.into_iter().map(|(s, t)| (s, t, ())))
    }
}

fn ensure<L>(dag: &mut Dag<(), L>, id: String) -> Result<NodeIx> {
    match dag.node_ix(&id) {
        Some(ix) => Ok(ix),
        None => dag.add_node(id, ()),
    }
}

/// Builds a dag from `(id, parent ids, data)` records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stratify {
    decycle: bool,
}

impl Stratify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decycle(self, decycle: bool) -> Self {
        Self { decycle }
    }

    pub fn build<I, S, N>(&self, records: I) -> Result<Dag<N, ()>>
    where
        I: IntoIterator<Item = (S, Vec<S>, N)>,
        S: Into<String>,
    {
        let mut dag: Dag<N, ()> = Dag::new();
        let mut parents: Vec<(NodeIx, Vec<String>)> = Vec::new();
        for (id, parent_ids, data) in records {
            let ix = dag.add_node(id, data)?;
            parents.push((ix, parent_ids.into_iter().map(Into::into).collect()));
        }
        if dag.is_empty() {
            return Err(Error::EmptyInput);
        }

        for (child, parent_ids) in parents {
            for parent in parent_ids {
                let Some(p) = dag.node_ix(&parent) else {
                    return Err(Error::MissingParent {
                        id: dag.id(child).to_string(),
                        parent,
                    });
                };
                dag.add_link(p, child, ())?;
            }
        }
        finish(dag, self.decycle)
    }
}

/// Builds a dag by walking a children accessor from a set of declared roots.
///
/// Nodes are identified by `id(&data)`; the first payload seen for an id is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hierarchy {
    decycle: bool,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decycle(self, decycle: bool) -> Self {
        Self { decycle }
    }

    pub fn build<N, I, C>(&self, roots: Vec<N>, id: I, children: C) -> Result<Dag<N, ()>>
    where
        I: Fn(&N) -> String,
        C: Fn(&N) -> Vec<N>,
    {
        if roots.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut dag: Dag<N, ()> = Dag::new();
        let mut declared: Vec<NodeIx> = Vec::new();
        let mut stack: Vec<NodeIx> = Vec::new();

        for root in roots {
            let rid = id(&root);
            let ix = match dag.node_ix(&rid) {
                Some(ix) => ix,
                None => {
                    let ix = dag.add_node(rid, root)?;
                    stack.push(ix);
                    ix
                }
            };
            if !declared.contains(&ix) {
                declared.push(ix);
            }
        }

        stack.reverse();
        while let Some(v) = stack.pop() {
            for child in children(dag.data(v)) {
                let cid = id(&child);
                if cid == dag.id(v) {
                    return Err(Error::SelfLoop { id: cid });
                }
                let w = match dag.node_ix(&cid) {
                    Some(w) => w,
                    None => {
                        let w = dag.add_node(cid, child)?;
                        stack.push(w);
                        w
                    }
                };
                dag.add_link(v, w, ())?;
            }
        }

        for ix in declared {
            if dag.in_degree(ix) > 0 {
                return Err(Error::RootIsChild {
                    id: dag.id(ix).to_string(),
                });
            }
        }
        finish(dag, self.decycle)
    }
}
