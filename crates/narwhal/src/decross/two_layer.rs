use super::crossings;
use super::optimal::order_from_pairs;
use crate::error::Result;
use crate::solve::{LinearProgram, VarKind};
use crate::sugi::SugiGraph;
use serde::{Deserialize, Serialize};

/// Order used to seed [`TwoLayerOrder::Greedy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseOrder {
    #[default]
    Median,
    Mean,
}

/// How a layer is reordered against its fixed neighbour layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TwoLayerOrder {
    /// Median position of the fixed neighbours.
    #[default]
    Median,
    /// Mean position of the fixed neighbours.
    Mean,
    /// Adjacent swaps while a swap removes crossings, after an optional base order.
    Greedy {
        #[serde(default)]
        base: Option<BaseOrder>,
    },
    /// Exact two-layer crossing minimisation as an integer program.
    Optimal,
}

/// Layer-by-layer sweep heuristic.
///
/// One pass walks the layers top to bottom, reordering each against the one above. With
/// `passes > 1` the sweeps alternate direction and the ordering with the fewest crossings wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TwoLayer {
    pub order: TwoLayerOrder,
    pub passes: usize,
}

impl Default for TwoLayer {
    fn default() -> Self {
        Self {
            order: TwoLayerOrder::Median,
            passes: 1,
        }
    }
}

impl TwoLayer {
    pub fn order(self, order: TwoLayerOrder) -> Self {
        Self { order, ..self }
    }

    pub fn passes(self, passes: usize) -> Self {
        Self { passes, ..self }
    }

    pub(crate) fn decross(&self, g: &mut SugiGraph) -> Result<()> {
        if g.layers().len() < 2 {
            return Ok(());
        }
        let passes = self.passes.max(1);
        if passes == 1 {
            return self.sweep(g, true);
        }

        let mut best = g.layers().to_vec();
        let mut best_count = crossings(g);
        for pass in 0..passes {
            if best_count == 0 {
                break;
            }
            self.sweep(g, pass % 2 == 0)?;
            let count = crossings(g);
            tracing::trace!(pass, crossings = count, "two-layer sweep");
            if count < best_count {
                best_count = count;
                best = g.layers().to_vec();
            }
        }
        g.set_layers(best);
        Ok(())
    }

    fn sweep(&self, g: &mut SugiGraph, down: bool) -> Result<()> {
        let n = g.layers().len();
        let steps: Vec<(usize, usize)> = if down {
            (1..n).map(|i| (i, i - 1)).collect()
        } else {
            (0..n - 1).rev().map(|i| (i, i + 1)).collect()
        };
        for (movable, fixed) in steps {
            let ordered = self.order_layer(g, movable, fixed, down)?;
            g.set_layer_order(movable, ordered);
        }
        Ok(())
    }

    fn order_layer(&self, g: &SugiGraph, movable: usize, fixed: usize, down: bool) -> Result<Vec<usize>> {
        let layer = &g.layers()[movable];
        let mut fixed_pos: Vec<Option<f64>> = vec![None; g.len()];
        for (i, &v) in g.layers()[fixed].iter().enumerate() {
            fixed_pos[v] = Some(i as f64);
        }
        let neighbours: Vec<Vec<f64>> = layer
            .iter()
            .map(|&v| {
                let adjacent = if down { g.parents(v) } else { g.children(v) };
                let mut pos: Vec<f64> = adjacent.iter().filter_map(|&u| fixed_pos[u]).collect();
                pos.sort_by(f64::total_cmp);
                pos
            })
            .collect();

        let positions: Vec<usize> = (0..layer.len()).collect();
        let order: Vec<usize> = match self.order {
            TwoLayerOrder::Median => by_value(&positions, &neighbours, median),
            TwoLayerOrder::Mean => by_value(&positions, &neighbours, mean),
            TwoLayerOrder::Greedy { base } => {
                let start = match base {
                    Some(BaseOrder::Median) => by_value(&positions, &neighbours, median),
                    Some(BaseOrder::Mean) => by_value(&positions, &neighbours, mean),
                    None => positions,
                };
                greedy_swaps(start, &neighbours)
            }
            TwoLayerOrder::Optimal => optimal(&positions, &neighbours)?,
        };
        Ok(order.into_iter().map(|i| layer[i]).collect())
    }
}

fn median(pos: &[f64]) -> Option<f64> {
    let n = pos.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(pos[n / 2]),
        _ => Some((pos[n / 2 - 1] + pos[n / 2]) / 2.0),
    }
}

fn mean(pos: &[f64]) -> Option<f64> {
    if pos.is_empty() {
        None
    } else {
        Some(pos.iter().sum::<f64>() / pos.len() as f64)
    }
}

/// Stable sort by an aggregate of neighbour positions. Nodes without neighbours take a value
/// between their nearest valued neighbours in the current order.
fn by_value(order: &[usize], neighbours: &[Vec<f64>], agg: fn(&[f64]) -> Option<f64>) -> Vec<usize> {
    let raw: Vec<Option<f64>> = order.iter().map(|&i| agg(&neighbours[i])).collect();
    let values: Vec<f64> = (0..raw.len())
        .map(|i| {
            if let Some(v) = raw[i] {
                return v;
            }
            let left = raw[..i].iter().rev().find_map(|v| *v);
            let right = raw[i + 1..].iter().find_map(|v| *v);
            match (left, right) {
                (Some(l), Some(r)) => (l + r) / 2.0,
                (Some(l), None) => l,
                (None, Some(r)) => r,
                (None, None) => i as f64,
            }
        })
        .collect();

    let mut idx: Vec<usize> = (0..order.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    idx.into_iter().map(|i| order[i]).collect()
}

/// Crossings between the edges of `left` and `right` when `left` is placed first.
fn pair_crossings(left: &[f64], right: &[f64]) -> usize {
    left.iter()
        .map(|a| right.iter().filter(|b| a > b).count())
        .sum()
}

fn greedy_swaps(mut order: Vec<usize>, neighbours: &[Vec<f64>]) -> Vec<usize> {
    loop {
        let mut improved = false;
        for j in 1..order.len() {
            let (u, w) = (order[j - 1], order[j]);
            if pair_crossings(&neighbours[w], &neighbours[u])
                < pair_crossings(&neighbours[u], &neighbours[w])
            {
                order.swap(j - 1, j);
                improved = true;
            }
        }
        if !improved {
            return order;
        }
    }
}

fn optimal(order: &[usize], neighbours: &[Vec<f64>]) -> Result<Vec<usize>> {
    let m = order.len();
    if m < 2 {
        return Ok(order.to_vec());
    }

    let mut lp = LinearProgram::new();
    let mut var = vec![vec![usize::MAX; m]; m];
    for i in 0..m {
        for j in i + 1..m {
            var[i][j] = lp.add_var(VarKind::Binary, None, None);
        }
    }
    // Ties keep the current order; the bonus sums to less than one crossing.
    let bonus = 1.0 / (lp.len() as f64 + 1.0);
    for i in 0..m {
        for j in i + 1..m {
            let keep = pair_crossings(&neighbours[order[i]], &neighbours[order[j]]) as f64;
            let flip = pair_crossings(&neighbours[order[j]], &neighbours[order[i]]) as f64;
            lp.add_objective(var[i][j], keep - flip - bonus);
        }
    }
    for i in 0..m {
        for j in i + 1..m {
            for k in j + 1..m {
                lp.add_row(
                    &[(var[i][j], 1.0), (var[j][k], 1.0), (var[i][k], -1.0)],
                    Some(0.0),
                    Some(1.0),
                );
            }
        }
    }

    let values = lp.minimise()?;
    Ok(order_from_pairs(order, |a, b| {
        if a < b {
            values[var[a][b]] > 0.5
        } else {
            values[var[b][a]] <= 0.5
        }
    }))
}
