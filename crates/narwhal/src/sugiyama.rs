//! The layered layout pipeline.

use crate::coord::Coord;
use crate::decross::Decross;
use crate::error::{Error, Result};
use crate::layering::Layering;
use crate::sugi::{Materialize, SugiGraph, SugiKind, SugiNode};
use narwhal_dag::{Dag, NodeIx};
use serde::{Deserialize, Serialize};

/// Extent of a finished layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub width: f64,
    pub height: f64,
}

/// Sugiyama layout: layering, dummy insertion, decrossing, coordinates and edge points.
///
/// Sizes and gaps are `(width, height)`. When `size` is set the result is rescaled to exactly
/// that box; otherwise coordinates are in node-size units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Sugiyama {
    pub layering: Layering,
    pub materialize: Materialize,
    pub decross: Decross,
    pub coord: Coord,
    pub node_size: (f64, f64),
    pub dummy_size: (f64, f64),
    pub gap: (f64, f64),
    pub size: Option<(f64, f64)>,
}

impl Default for Sugiyama {
    fn default() -> Self {
        Self {
            layering: Layering::default(),
            materialize: Materialize::default(),
            decross: Decross::default(),
            coord: Coord::default(),
            node_size: (1.0, 1.0),
            dummy_size: (0.0, 0.0),
            gap: (1.0, 1.0),
            size: None,
        }
    }
}

impl Sugiyama {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a configuration; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let layout: Sugiyama = serde_json::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn layering(self, layering: impl Into<Layering>) -> Self {
        Self {
            layering: layering.into(),
            ..self
        }
    }

    pub fn materialize(self, materialize: Materialize) -> Self {
        Self {
            materialize,
            ..self
        }
    }

    pub fn decross(self, decross: impl Into<Decross>) -> Self {
        Self {
            decross: decross.into(),
            ..self
        }
    }

    pub fn coord(self, coord: impl Into<Coord>) -> Self {
        Self {
            coord: coord.into(),
            ..self
        }
    }

    pub fn node_size(self, width: f64, height: f64) -> Self {
        Self {
            node_size: (width, height),
            ..self
        }
    }

    pub fn dummy_size(self, width: f64, height: f64) -> Self {
        Self {
            dummy_size: (width, height),
            ..self
        }
    }

    pub fn gap(self, x: f64, y: f64) -> Self {
        Self {
            gap: (x, y),
            ..self
        }
    }

    pub fn size(self, size: Option<(f64, f64)>) -> Self {
        Self { size, ..self }
    }

    pub fn validate(&self) -> Result<()> {
        let pairs = [
            ("nodeSize", self.node_size),
            ("dummySize", self.dummy_size),
            ("gap", self.gap),
        ];
        for (name, (a, b)) in pairs {
            if !a.is_finite() || !b.is_finite() || a < 0.0 || b < 0.0 {
                return Err(Error::invalid(format!(
                    "{name} must be finite and non-negative, got ({a}, {b})"
                )));
            }
        }
        if let Some((w, h)) = self.size {
            if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
                return Err(Error::invalid(format!(
                    "size must be finite and positive, got ({w}, {h})"
                )));
            }
        }
        self.coord.validate()
    }

    /// Lays out `dag` with every node at `node_size`.
    pub fn layout<N, L>(&self, dag: &mut Dag<N, L>) -> Result<LayoutInfo> {
        let size = self.node_size;
        self.layout_with_sizes(dag, |_, _| size)
    }

    /// Lays out `dag` with a `(width, height)` per real node; dummies use `dummy_size`.
    pub fn layout_with_sizes<N, L, S>(&self, dag: &mut Dag<N, L>, node_size: S) -> Result<LayoutInfo>
    where
        S: Fn(NodeIx, &N) -> (f64, f64),
    {
        let _span = tracing::debug_span!("sugiyama", nodes = dag.size(), links = dag.link_count())
            .entered();
        self.validate()?;
        dag.clear_layout();
        if dag.is_empty() {
            return Ok(self.size.map_or_else(LayoutInfo::default, |(width, height)| {
                LayoutInfo { width, height }
            }));
        }

        let sizes: Vec<(f64, f64)> = dag.nodes().map(|v| node_size(v, dag.data(v))).collect();
        if let Some(&(w, h)) = sizes
            .iter()
            .find(|(w, h)| !w.is_finite() || !h.is_finite() || *w < 0.0 || *h < 0.0)
        {
            return Err(Error::invalid(format!(
                "node sizes must be finite and non-negative, got ({w}, {h})"
            )));
        }

        let height = self
            .layering
            .layer(dag, layer_separation(&sizes, self.gap.1))?;
        let mut sugi = SugiGraph::build(dag, height, self.materialize)?;
        self.decross.decross(&mut sugi)?;

        let dummy = self.dummy_size;
        let size_of = |node: &SugiNode| match node.kind {
            SugiKind::Real(v) => sizes[v.index()],
            SugiKind::Dummy(_) => dummy,
        };
        let gap_x = self.gap.0;
        let width = self.coord.coord(&mut sugi, |a, b| match (a, b) {
            (Some(a), Some(b)) => size_of(a).0 / 2.0 + size_of(b).0 / 2.0 + gap_x,
            (Some(n), None) | (None, Some(n)) => size_of(n).0 / 2.0,
            (None, None) => 0.0,
        })?;

        let row_heights: Vec<f64> = sugi
            .layers()
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|&v| size_of(sugi.node(v)).1)
                    .fold(0.0, f64::max)
            })
            .collect();
        let mut row_y: Vec<f64> = Vec::with_capacity(row_heights.len());
        let mut top = 0.0;
        for (i, h) in row_heights.iter().enumerate() {
            if i > 0 {
                top += self.gap.1;
            }
            row_y.push(top + h / 2.0);
            top += h;
        }
        let total_height = top;

        let (scale_x, shift_x, out_width) = fit(width, self.size.map(|s| s.0));
        let (scale_y, shift_y, out_height) = fit(total_height, self.size.map(|s| s.1));
        for v in 0..sugi.len() {
            let layer = sugi.node(v).layer;
            let node = sugi.node_mut(v);
            node.x = Some(node.x.unwrap_or(0.0) * scale_x + shift_x);
            node.y = Some(row_y[layer] * scale_y + shift_y);
        }
        sugi.unsugify(dag);

        tracing::debug!(width = out_width, height = out_height, "finished layout");
        Ok(LayoutInfo {
            width: out_width,
            height: out_height,
        })
    }
}

/// Layer gap between linked nodes: their half heights plus `gap_y`, counted in units of the
/// shortest `height + gap_y` slot and never less than one layer.
///
/// Uniform sizes reduce to one layer per link. Taller nodes push their neighbours further down,
/// leaving rows that only dummies cross; [`Materialize::Compact`] squeezes those out again.
fn layer_separation(
    sizes: &[(f64, f64)],
    gap_y: f64,
) -> impl Fn(Option<NodeIx>, Option<NodeIx>) -> usize + '_ {
    let slot = sizes
        .iter()
        .map(|(_, h)| h + gap_y)
        .filter(|s| *s > 0.0)
        .fold(f64::INFINITY, f64::min);
    move |a, b| match (a, b) {
        (Some(a), Some(b)) if slot.is_finite() => {
            let span = sizes[a.index()].1 / 2.0 + sizes[b.index()].1 / 2.0 + gap_y;
            // Tolerance keeps exact multiples of the slot from rounding up.
            ((span / slot - 1e-9).ceil() as usize).max(1)
        }
        (Some(_), Some(_)) => 1,
        _ => 0,
    }
}

/// Scale and shift mapping `[0, extent]` onto `[0, target]`; a degenerate extent is centered.
fn fit(extent: f64, target: Option<f64>) -> (f64, f64, f64) {
    match target {
        None => (1.0, 0.0, extent),
        Some(target) if extent > 0.0 => (target / extent, 0.0, target),
        Some(target) => (1.0, target / 2.0, target),
    }
}
