use crate::error::{Error, Result};
use crate::solve::{LinearProgram, VarKind};
use crate::sugi::SugiGraph;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// Size guard for [`Optimal`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptCheck {
    /// At most 1200 variables.
    #[default]
    Fast,
    /// At most 5000 variables.
    Slow,
    Unbounded,
}

impl OptCheck {
    pub fn limit(self) -> Option<usize> {
        match self {
            OptCheck::Fast => Some(1200),
            OptCheck::Slow => Some(5000),
            OptCheck::Unbounded => None,
        }
    }
}

/// Minimum-crossing ordering of every layer at once, as a 0/1 integer program.
///
/// One binary per unordered pair of nodes in a layer says which comes first; transitivity
/// rows keep those pairs a total order. One slack per pair of edges between the same two layers
/// is forced to 1 when the edges cross, and the slacks are minimised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Optimal {
    pub check: OptCheck,
    /// Log every variable as it is created.
    pub debug: bool,
}

/// A pair variable seen from one side: `coeff * var + constant` is 1 when `a` precedes `b`.
#[derive(Debug, Clone, Copy)]
struct Before {
    var: usize,
    coeff: f64,
    constant: f64,
}

impl Optimal {
    pub fn check(self, check: OptCheck) -> Self {
        Self { check, ..self }
    }

    pub fn debug(self, debug: bool) -> Self {
        Self { debug, ..self }
    }

    pub(crate) fn decross(&self, g: &mut SugiGraph) -> Result<()> {
        let layers = g.layers().to_vec();
        let pos = g.positions();

        // Edge pairs between each layer and the next that share no endpoint.
        let mut crossing_pairs: Vec<((usize, usize), (usize, usize))> = Vec::new();
        for layer in &layers {
            let edges: Vec<(usize, usize)> = layer
                .iter()
                .flat_map(|&u| g.children(u).iter().map(move |&v| (u, v)))
                .collect();
            for (i, &e1) in edges.iter().enumerate() {
                for &e2 in &edges[i + 1..] {
                    if e1.0 != e2.0 && e1.1 != e2.1 {
                        crossing_pairs.push((e1, e2));
                    }
                }
            }
        }
        let pair_vars: usize = layers.iter().map(|l| l.len() * l.len().saturating_sub(1) / 2).sum();
        let variables = pair_vars + crossing_pairs.len();
        if let Some(limit) = self.check.limit() {
            if variables > limit {
                return Err(Error::TooLarge { variables, limit });
            }
        }
        if pair_vars == 0 {
            return Ok(());
        }
        tracing::debug!(variables, "building optimal decrossing program");

        // Ties keep the current order, upper layers first; the bonuses sum to less than one
        // crossing.
        let bonus = 1.0 / (pair_vars as f64 + 1.0);
        let depth = layers.len() as f64;

        let mut lp = LinearProgram::new();
        let mut pair: HashMap<(usize, usize), usize> = HashMap::default();
        for (li, layer) in layers.iter().enumerate() {
            for (i, &a) in layer.iter().enumerate() {
                for &b in &layer[i + 1..] {
                    let var = lp.add_var(VarKind::Binary, None, None);
                    if self.debug {
                        tracing::debug!(var, name = %format!("before:{a}:{b}"), "pair variable");
                    }
                    lp.add_objective(var, -bonus * (depth - li as f64) / depth);
                    pair.insert((a, b), var);
                }
            }
        }
        let before = |a: usize, b: usize| -> Before {
            if pos[a] < pos[b] {
                Before {
                    var: pair[&(a, b)],
                    coeff: 1.0,
                    constant: 0.0,
                }
            } else {
                Before {
                    var: pair[&(b, a)],
                    coeff: -1.0,
                    constant: 1.0,
                }
            }
        };

        for layer in &layers {
            for (i, &a) in layer.iter().enumerate() {
                for (j, &b) in layer.iter().enumerate().skip(i + 1) {
                    for &c in &layer[j + 1..] {
                        let (ab, bc, ac) = (pair[&(a, b)], pair[&(b, c)], pair[&(a, c)]);
                        lp.add_row(&[(ab, 1.0), (bc, 1.0), (ac, -1.0)], Some(0.0), Some(1.0));
                    }
                }
            }
        }

        for ((u1, v1), (u2, v2)) in crossing_pairs {
            let slack = lp.add_var(VarKind::Continuous, Some(0.0), Some(1.0));
            if self.debug {
                tracing::debug!(var = slack, name = %format!("cross:{u1}:{v1}:{u2}:{v2}"), "slack variable");
            }
            lp.add_objective(slack, 1.0);
            let p = before(u1, u2);
            let q = before(v1, v2);
            // slack >= p - q and slack >= q - p
            lp.add_row(
                &[(slack, 1.0), (p.var, -p.coeff), (q.var, q.coeff)],
                Some(p.constant - q.constant),
                None,
            );
            lp.add_row(
                &[(slack, 1.0), (p.var, p.coeff), (q.var, -q.coeff)],
                Some(q.constant - p.constant),
                None,
            );
        }

        let values = lp.minimise()?;
        let precedes = |a: usize, b: usize| {
            let Before {
                var,
                coeff,
                constant,
            } = before(a, b);
            coeff * values[var] + constant > 0.5
        };
        let ordered: Vec<Vec<usize>> = layers
            .iter()
            .map(|layer| order_from_pairs(layer, |i, j| precedes(layer[i], layer[j])))
            .collect();
        g.set_layers(ordered);
        Ok(())
    }
}

/// Sorts `items` by how many other items precede each, given a pairwise `before(i, j)` over
/// positions in `items`.
pub(super) fn order_from_pairs<F>(items: &[usize], before: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> bool,
{
    let mut ranked: Vec<(usize, usize)> = (0..items.len())
        .map(|i| {
            let ahead = (0..items.len()).filter(|&j| j != i && before(j, i)).count();
            (ahead, i)
        })
        .collect();
    ranked.sort_unstable();
    ranked.into_iter().map(|(_, i)| items[i]).collect()
}
