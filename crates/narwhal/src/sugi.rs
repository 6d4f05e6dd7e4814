//! The layered graph the decrossing and coordinate stages work on.
//!
//! Every link spanning more than one layer is replaced by a chain of dummy nodes, one per
//! intervening layer, so that all edges of a [`SugiGraph`] connect adjacent layers. Real nodes
//! keep the index of their [`NodeIx`]; dummies are appended after them.

use crate::error::{Error, Result};
use narwhal_dag::{Dag, LinkIx, NodeIx, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SugiKind {
    Real(NodeIx),
    /// One segment of a long link.
    Dummy(LinkIx),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SugiNode {
    pub kind: SugiKind,
    pub layer: usize,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl SugiNode {
    pub fn is_dummy(&self) -> bool {
        matches!(self.kind, SugiKind::Dummy(_))
    }

    pub fn real(&self) -> Option<NodeIx> {
        match self.kind {
            SugiKind::Real(v) => Some(v),
            SugiKind::Dummy(_) => None,
        }
    }
}

/// How layer indices map onto rows of the layered graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Materialize {
    /// One row per layer index, including rows that only hold dummies or nothing.
    #[default]
    Layered,
    /// Drops layer indices without real nodes before measuring link spans.
    Compact,
}

#[derive(Debug, Clone)]
pub struct SugiGraph {
    nodes: Vec<SugiNode>,
    children: Vec<Vec<usize>>,
    parents: Vec<Vec<usize>>,
    layers: Vec<Vec<usize>>,
    // Every link of the source dag with its node path, source and target included.
    chains: Vec<(LinkIx, Vec<usize>)>,
}

impl SugiGraph {
    pub fn build<N, L>(dag: &Dag<N, L>, height: usize, materialize: Materialize) -> Result<Self> {
        let _span = tracing::debug_span!("materialize", nodes = dag.size()).entered();

        let mut layer_of: Vec<usize> = Vec::with_capacity(dag.size());
        for v in dag.nodes() {
            let Some(layer) = dag.layer(v) else {
                return Err(Error::MissingLayer {
                    id: dag.id(v).to_string(),
                });
            };
            layer_of.push(layer);
        }
        for link in dag.links() {
            let (from_layer, to_layer) = (layer_of[link.source.index()], layer_of[link.target.index()]);
            if to_layer <= from_layer {
                return Err(Error::LayeringViolation {
                    from: dag.id(link.source).to_string(),
                    to: dag.id(link.target).to_string(),
                    from_layer,
                    to_layer,
                });
            }
        }

        let rows = match materialize {
            Materialize::Layered => layer_of
                .iter()
                .map(|l| l + 1)
                .max()
                .unwrap_or(0)
                .max(height),
            Materialize::Compact => {
                let mut used = layer_of.clone();
                used.sort_unstable();
                used.dedup();
                for layer in &mut layer_of {
                    *layer = used.partition_point(|&u| u < *layer);
                }
                used.len()
            }
        };

        let mut graph = SugiGraph {
            nodes: Vec::with_capacity(dag.size()),
            children: vec![Vec::new(); dag.size()],
            parents: vec![Vec::new(); dag.size()],
            layers: vec![Vec::new(); rows],
            chains: Vec::with_capacity(dag.link_count()),
        };
        for v in dag.nodes() {
            graph.nodes.push(SugiNode {
                kind: SugiKind::Real(v),
                layer: layer_of[v.index()],
                x: None,
                y: None,
            });
        }

        for link in dag.links() {
            let (s, t) = (link.source.index(), link.target.index());
            let mut path: Vec<usize> = vec![s];
            let mut prev = s;
            for layer in layer_of[s] + 1..layer_of[t] {
                let d = graph.push_node(SugiNode {
                    kind: SugiKind::Dummy(link.ix),
                    layer,
                    x: None,
                    y: None,
                });
                graph.connect(prev, d);
                path.push(d);
                prev = d;
            }
            graph.connect(prev, t);
            path.push(t);
            graph.chains.push((link.ix, path));
        }

        graph.init_order();
        tracing::debug!(
            layers = graph.layers.len(),
            dummies = graph.dummy_count(),
            "materialized layers"
        );
        Ok(graph)
    }

    fn push_node(&mut self, node: SugiNode) -> usize {
        self.nodes.push(node);
        self.children.push(Vec::new());
        self.parents.push(Vec::new());
        self.nodes.len() - 1
    }

    fn connect(&mut self, from: usize, to: usize) {
        self.children[from].push(to);
        self.parents[to].push(from);
    }

    /// Depth-first initial order: nodes are visited by layer then index, and each unvisited
    /// node pulls its descendants into their layers right after it.
    fn init_order(&mut self) {
        let mut start: Vec<usize> = (0..self.nodes.len()).collect();
        start.sort_by_key(|&i| (self.nodes[i].layer, i));

        let mut visited: Vec<bool> = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = Vec::new();
        for root in start {
            stack.push(root);
            while let Some(v) = stack.pop() {
                if visited[v] {
                    continue;
                }
                visited[v] = true;
                self.layers[self.nodes[v].layer].push(v);
                stack.extend(self.children[v].iter().rev().filter(|&&c| !visited[c]));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dummy_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_dummy()).count()
    }

    pub fn nodes(&self) -> &[SugiNode] {
        &self.nodes
    }

    pub fn node(&self, i: usize) -> &SugiNode {
        &self.nodes[i]
    }

    pub fn node_mut(&mut self, i: usize) -> &mut SugiNode {
        &mut self.nodes[i]
    }

    pub fn children(&self, i: usize) -> &[usize] {
        &self.children[i]
    }

    pub fn parents(&self, i: usize) -> &[usize] {
        &self.parents[i]
    }

    /// `(from, to)` for every edge, `to` always on the next layer.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.children
            .iter()
            .enumerate()
            .flat_map(|(from, cs)| cs.iter().map(move |&to| (from, to)))
    }

    /// Node indices per layer, in order.
    pub fn layers(&self) -> &[Vec<usize>] {
        &self.layers
    }

    /// Replaces the order of one layer; `order` must be a permutation of its members.
    pub fn reorder(&mut self, layer: usize, order: Vec<usize>) -> Result<()> {
        let Some(current) = self.layers.get(layer) else {
            return Err(Error::invalid(format!("layer {layer} does not exist")));
        };
        let mut a = current.clone();
        let mut b = order.clone();
        a.sort_unstable();
        b.sort_unstable();
        if a != b {
            return Err(Error::invalid(format!(
                "new order of layer {layer} is not a permutation of its nodes"
            )));
        }
        self.layers[layer] = order;
        Ok(())
    }

    pub(crate) fn set_layer_order(&mut self, layer: usize, order: Vec<usize>) {
        debug_assert_eq!(order.len(), self.layers[layer].len());
        self.layers[layer] = order;
    }

    pub(crate) fn set_layers(&mut self, layers: Vec<Vec<usize>>) {
        debug_assert_eq!(layers.len(), self.layers.len());
        self.layers = layers;
    }

    /// Position of every node within its layer.
    pub fn positions(&self) -> Vec<usize> {
        let mut pos = vec![0; self.nodes.len()];
        for layer in &self.layers {
            for (i, &v) in layer.iter().enumerate() {
                pos[v] = i;
            }
        }
        pos
    }

    /// Node path of every source link, from its current source to its target.
    pub fn chains(&self) -> &[(LinkIx, Vec<usize>)] {
        &self.chains
    }

    /// Writes real node coordinates and link polylines back onto `dag`.
    pub fn unsugify<N, L>(&self, dag: &mut Dag<N, L>) {
        for node in &self.nodes {
            if let SugiKind::Real(v) = node.kind {
                dag.set_position(v, node.x.unwrap_or(0.0), node.y.unwrap_or(0.0));
            }
        }
        for (ix, path) in &self.chains {
            let points: Vec<Point> = path
                .iter()
                .map(|&i| {
                    let n = &self.nodes[i];
                    Point::new(n.x.unwrap_or(0.0), n.y.unwrap_or(0.0))
                })
                .collect();
            if let Some(link) = dag.link_mut(*ix) {
                link.points = points;
            }
        }
    }
}
