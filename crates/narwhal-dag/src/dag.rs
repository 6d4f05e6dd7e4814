//! The arena-backed [`Dag`] container.
//!
//! Nodes live in a `Vec` and are addressed by [`NodeIx`]. Links are owned by their source node's
//! child list, so a [`LinkIx`] is a `(source, slot)` pair. Parents are never stored on the nodes:
//! they are derived from a reverse-adjacency cache that is rebuilt lazily whenever the link
//! structure changes.

use crate::error::{Error, Result};
use rustc_hash::FxBuildHasher;
use std::cell::{Ref, RefCell};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// Node ids must not contain this character.
pub const RESERVED_SEPARATOR: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIx(pub(crate) usize);

impl NodeIx {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkIx {
    pub source: NodeIx,
    pub slot: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone)]
pub struct Link<L> {
    target: NodeIx,
    reversed: bool,
    pub data: L,
    /// Polyline from the link's source to its target, filled in by layout.
    pub points: Vec<Point>,
}

impl<L> Link<L> {
    pub fn target(&self) -> NodeIx {
        self.target
    }

    /// `true` when cycle removal flipped the link against its input direction.
    pub fn reversed(&self) -> bool {
        self.reversed
    }
}

/// A borrowed view of one link together with its endpoints.
#[derive(Debug, Clone, Copy)]
pub struct LinkRef<'a, L> {
    pub ix: LinkIx,
    pub source: NodeIx,
    pub target: NodeIx,
    pub link: &'a Link<L>,
}

#[derive(Debug, Clone)]
struct NodeEntry<N, L> {
    id: String,
    data: N,
    layer: Option<usize>,
    x: Option<f64>,
    y: Option<f64>,
    children: Vec<Link<L>>,
}

#[derive(Debug, Clone, Default)]
struct ParentCache {
    // `None` until the first build and after every mutation.
    generation: Option<u64>,
    in_links: Vec<Vec<LinkIx>>,
}

#[derive(Debug, Clone)]
pub struct Dag<N, L = ()> {
    nodes: Vec<NodeEntry<N, L>>,
    node_index: HashMap<String, usize>,
    link_count: usize,

    // `parents` is queried repeatedly by every layout stage; rebuild the reverse adjacency only
    // when `generation` moves.
    generation: u64,
    parent_cache: RefCell<ParentCache>,
}

impl<N, L> Default for Dag<N, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, L> Dag<N, L> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_index: HashMap::default(),
            link_count: 0,
            generation: 0,
            parent_cache: RefCell::new(ParentCache::default()),
        }
    }

    fn invalidate_parents(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.parent_cache.get_mut().generation = None;
    }

    fn ensure_parents(&self) -> Ref<'_, ParentCache> {
        {
            let mut cache = self.parent_cache.borrow_mut();
            if cache.generation != Some(self.generation) {
                let mut in_links: Vec<Vec<LinkIx>> = vec![Vec::new(); self.nodes.len()];
                for (source, entry) in self.nodes.iter().enumerate() {
                    for (slot, link) in entry.children.iter().enumerate() {
                        in_links[link.target.0].push(LinkIx {
                            source: NodeIx(source),
                            slot,
                        });
                    }
                }
                *cache = ParentCache {
                    generation: Some(self.generation),
                    in_links,
                };
            }
        }
        self.parent_cache.borrow()
    }

    fn check(&self, ix: NodeIx) -> Result<()> {
        if ix.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::UnknownNode { index: ix.0 })
        }
    }

    pub fn add_node(&mut self, id: impl Into<String>, data: N) -> Result<NodeIx> {
        let id = id.into();
        if id.contains(RESERVED_SEPARATOR) {
            return Err(Error::ReservedSeparator { id });
        }
        if self.node_index.contains_key(&id) {
            return Err(Error::DuplicateId { id });
        }
        self.invalidate_parents();
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            data,
            layer: None,
            x: None,
            y: None,
            children: Vec::new(),
        });
        self.node_index.insert(id, idx);
        Ok(NodeIx(idx))
    }

    pub fn add_link(&mut self, source: NodeIx, target: NodeIx, data: L) -> Result<LinkIx> {
        self.check(source)?;
        self.check(target)?;
        if source == target {
            return Err(Error::SelfLoop {
                id: self.nodes[source.0].id.clone(),
            });
        }
        self.invalidate_parents();
        let children = &mut self.nodes[source.0].children;
        children.push(Link {
            target,
            reversed: false,
            data,
            points: Vec::new(),
        });
        self.link_count += 1;
        Ok(LinkIx {
            source,
            slot: children.len() - 1,
        })
    }

    /// Flips every given link in one pass and toggles its `reversed` flag.
    ///
    /// Slots shift as links move, so all links must be named up front. Returns the number of
    /// links that were flipped.
    pub fn reverse_links(&mut self, links: impl IntoIterator<Item = LinkIx>) -> usize {
        let flip: HashSet<LinkIx> = links.into_iter().collect();
        if flip.is_empty() {
            return 0;
        }
        self.invalidate_parents();

        let mut moved: Vec<(usize, Link<L>)> = Vec::new();
        for source in 0..self.nodes.len() {
            let children = std::mem::take(&mut self.nodes[source].children);
            let mut kept: Vec<Link<L>> = Vec::with_capacity(children.len());
            for (slot, mut link) in children.into_iter().enumerate() {
                let ix = LinkIx {
                    source: NodeIx(source),
                    slot,
                };
                if flip.contains(&ix) {
                    let new_source = link.target.0;
                    link.target = NodeIx(source);
                    link.reversed = !link.reversed;
                    link.points.reverse();
                    moved.push((new_source, link));
                } else {
                    kept.push(link);
                }
            }
            self.nodes[source].children = kept;
        }

        let count = moved.len();
        for (source, link) in moved {
            self.nodes[source].children.push(link);
        }
        count
    }

    /// Flips a single link; see [`Dag::reverse_links`].
    pub fn reverse_link(&mut self, ix: LinkIx) -> bool {
        self.reverse_links([ix]) == 1
    }

    pub fn node_ix(&self, id: &str) -> Option<NodeIx> {
        self.node_index.get(id).map(|&idx| NodeIx(idx))
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn id(&self, ix: NodeIx) -> &str {
        &self.nodes[ix.0].id
    }

    pub fn data(&self, ix: NodeIx) -> &N {
        &self.nodes[ix.0].data
    }

    pub fn data_mut(&mut self, ix: NodeIx) -> &mut N {
        &mut self.nodes[ix.0].data
    }

    pub fn layer(&self, ix: NodeIx) -> Option<usize> {
        self.nodes[ix.0].layer
    }

    pub fn set_layer(&mut self, ix: NodeIx, layer: usize) {
        self.nodes[ix.0].layer = Some(layer);
    }

    pub fn x(&self, ix: NodeIx) -> Option<f64> {
        self.nodes[ix.0].x
    }

    pub fn y(&self, ix: NodeIx) -> Option<f64> {
        self.nodes[ix.0].y
    }

    pub fn set_position(&mut self, ix: NodeIx, x: f64, y: f64) {
        let node = &mut self.nodes[ix.0];
        node.x = Some(x);
        node.y = Some(y);
    }

    /// Forgets every layer, coordinate and link polyline from a previous layout.
    pub fn clear_layout(&mut self) {
        for node in &mut self.nodes {
            node.layer = None;
            node.x = None;
            node.y = None;
            for link in &mut node.children {
                link.points.clear();
            }
        }
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn link_count(&self) -> usize {
        self.link_count
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIx> + '_ {
        (0..self.nodes.len()).map(NodeIx)
    }

    pub fn children(&self, ix: NodeIx) -> impl Iterator<Item = NodeIx> + '_ {
        self.nodes[ix.0].children.iter().map(|l| l.target)
    }

    pub fn child_links(&self, ix: NodeIx) -> &[Link<L>] {
        &self.nodes[ix.0].children
    }

    pub fn out_degree(&self, ix: NodeIx) -> usize {
        self.nodes[ix.0].children.len()
    }

    pub fn in_degree(&self, ix: NodeIx) -> usize {
        self.ensure_parents().in_links[ix.0].len()
    }

    pub fn link(&self, ix: LinkIx) -> Option<&Link<L>> {
        self.nodes.get(ix.source.0)?.children.get(ix.slot)
    }

    pub fn link_mut(&mut self, ix: LinkIx) -> Option<&mut Link<L>> {
        self.nodes.get_mut(ix.source.0)?.children.get_mut(ix.slot)
    }

    /// Incoming links of `ix`, one entry per link (multi-links repeat the parent).
    pub fn parent_links(&self, ix: NodeIx) -> Vec<LinkIx> {
        self.ensure_parents().in_links[ix.0].clone()
    }

    /// Distinct parents of `ix` in link order.
    pub fn parents(&self, ix: NodeIx) -> Vec<NodeIx> {
        let cache = self.ensure_parents();
        let mut out: Vec<NodeIx> = Vec::new();
        for l in &cache.in_links[ix.0] {
            if !out.contains(&l.source) {
                out.push(l.source);
            }
        }
        out
    }

    /// Nodes without parents, in insertion order.
    pub fn roots(&self) -> Vec<NodeIx> {
        let cache = self.ensure_parents();
        self.nodes()
            .filter(|ix| cache.in_links[ix.0].is_empty())
            .collect()
    }

    /// Nodes without children, in insertion order.
    pub fn leaves(&self) -> Vec<NodeIx> {
        self.nodes()
            .filter(|ix| self.nodes[ix.0].children.is_empty())
            .collect()
    }

    pub fn links(&self) -> impl Iterator<Item = LinkRef<'_, L>> + '_ {
        self.nodes.iter().enumerate().flat_map(|(source, entry)| {
            entry
                .children
                .iter()
                .enumerate()
                .map(move |(slot, link)| LinkRef {
                    ix: LinkIx {
                        source: NodeIx(source),
                        slot,
                    },
                    source: NodeIx(source),
                    target: link.target,
                    link,
                })
        })
    }

    pub fn for_each_link_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(LinkIx, &mut Link<L>),
    {
        for (source, entry) in self.nodes.iter_mut().enumerate() {
            for (slot, link) in entry.children.iter_mut().enumerate() {
                f(
                    LinkIx {
                        source: NodeIx(source),
                        slot,
                    },
                    link,
                );
            }
        }
    }

    /// Fails on self-loops and cycles; the cycle error renders the offending path.
    pub fn verify(&self) -> Result<()> {
        for link in self.links() {
            if link.source == link.target {
                return Err(Error::SelfLoop {
                    id: self.id(link.source).to_string(),
                });
            }
        }
        if let Some(cycle) = crate::alg::find_cycle(self) {
            let path = cycle
                .iter()
                .map(|ix| self.id(*ix))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(Error::Cycle { path });
        }
        Ok(())
    }

    /// A cycle as a closed path of node ids, if one exists.
    pub fn find_cycle(&self) -> Option<Vec<NodeIx>> {
        crate::alg::find_cycle(self)
    }

    pub fn components(&self) -> Vec<Vec<NodeIx>> {
        crate::alg::components(self)
    }

    /// `true` when the dag forms a single component (links taken undirected).
    pub fn connected(&self) -> bool {
        crate::alg::components(self).len() <= 1
    }

    /// One dag per connected component, in order of each component's first node.
    pub fn split(&self) -> Vec<Dag<N, L>>
    where
        N: Clone,
        L: Clone,
    {
        let mut out: Vec<Dag<N, L>> = Vec::new();
        for comp in crate::alg::components(self) {
            let mut sub: Dag<N, L> = Dag::new();
            let mut remap: HashMap<usize, usize> = HashMap::default();
            let mut members = comp;
            members.sort();
            for ix in &members {
                let entry = &self.nodes[ix.0];
                remap.insert(ix.0, sub.nodes.len());
                sub.node_index.insert(entry.id.clone(), sub.nodes.len());
                sub.nodes.push(NodeEntry {
                    id: entry.id.clone(),
                    data: entry.data.clone(),
                    layer: entry.layer,
                    x: entry.x,
                    y: entry.y,
                    children: Vec::new(),
                });
            }
            for ix in &members {
                let new_source = remap[&ix.0];
                for link in &self.nodes[ix.0].children {
                    let mut link = link.clone();
                    link.target = NodeIx(remap[&link.target.0]);
                    sub.nodes[new_source].children.push(link);
                    sub.link_count += 1;
                }
            }
            out.push(sub);
        }
        out
    }
}
