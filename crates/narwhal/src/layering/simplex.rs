use crate::error::{Error, Result};
use crate::solve::{LinearProgram, VarKind};
use indexmap::IndexMap;
use narwhal_dag::{Dag, NodeIx};
use serde::{Deserialize, Serialize};

/// Minimises the total layer span of all links with an integer program.
///
/// `ranks` forces nodes with a lower rank strictly above nodes with a higher rank and nodes of
/// equal rank onto the same layer. `groups` puts every node of a group on one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Simplex {
    pub ranks: IndexMap<String, i64>,
    pub groups: IndexMap<String, String>,
}

impl Simplex {
    pub fn rank(mut self, id: impl Into<String>, rank: i64) -> Self {
        self.ranks.insert(id.into(), rank);
        self
    }

    pub fn group(mut self, id: impl Into<String>, group: impl Into<String>) -> Self {
        self.groups.insert(id.into(), group.into());
        self
    }

    fn lookup<N, L>(dag: &Dag<N, L>, id: &str, what: &str) -> Result<NodeIx> {
        dag.node_ix(id)
            .ok_or_else(|| Error::invalid(format!("{what} refers to unknown node {id}")))
    }

    pub(crate) fn layer<N, L, F>(&self, dag: &mut Dag<N, L>, sep: &F) -> Result<()>
    where
        F: Fn(Option<NodeIx>, Option<NodeIx>) -> usize,
    {
        if dag.is_empty() {
            return Ok(());
        }
        if !dag.connected() {
            return Err(Error::Disconnected);
        }

        let mut lp = LinearProgram::new();
        for v in dag.nodes() {
            lp.add_var(VarKind::Integer, Some(sep(None, Some(v)) as f64), None);
        }
        for link in dag.links() {
            let (s, t) = (link.source.index(), link.target.index());
            lp.add_objective(t, 1.0);
            lp.add_objective(s, -1.0);
            let gap = sep(Some(link.source), Some(link.target)) as f64;
            lp.add_row(&[(t, 1.0), (s, -1.0)], Some(gap), None);
        }

        let mut ranked: Vec<(i64, usize)> = Vec::with_capacity(self.ranks.len());
        for (id, rank) in &self.ranks {
            ranked.push((*rank, Self::lookup(dag, id, "rank")?.index()));
        }
        ranked.sort();
        for pair in ranked.windows(2) {
            let ((ra, a), (rb, b)) = (pair[0], pair[1]);
            if ra == rb {
                lp.add_row(&[(a, 1.0), (b, -1.0)], Some(0.0), Some(0.0));
            } else {
                lp.add_row(&[(b, 1.0), (a, -1.0)], Some(1.0), None);
            }
        }

        let mut first_of_group: IndexMap<&str, usize> = IndexMap::new();
        for (id, group) in &self.groups {
            let v = Self::lookup(dag, id, "group")?.index();
            match first_of_group.get(group.as_str()) {
                Some(&head) => lp.add_row(&[(v, 1.0), (head, -1.0)], Some(0.0), Some(0.0)),
                None => {
                    first_of_group.insert(group.as_str(), v);
                }
            }
        }

        tracing::debug!(variables = lp.len(), "solving simplex layering");
        let values = lp.minimise()?;

        let layers: Vec<i64> = values.iter().map(|v| v.round() as i64).collect();
        // Translation is free in the objective; settle the top at its boundary.
        let slack = dag
            .nodes()
            .map(|v| layers[v.index()] - sep(None, Some(v)) as i64)
            .min()
            .unwrap_or(0);
        for v in dag.nodes().collect::<Vec<_>>() {
            dag.set_layer(v, (layers[v.index()] - slack).max(0) as usize);
        }
        Ok(())
    }
}
