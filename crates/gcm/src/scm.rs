//! Structural causal models: a causal graph plus fitted per-node mechanisms.

use std::collections::{BTreeMap, HashMap};

use ndarray::{Array1, Array2};
use rand::Rng;
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::GcmError;
use crate::graph::CausalGraph;
use crate::mechanism::{EmpiricalDistribution, LinearAnm, NodeMechanism};

/// A graph whose every node carries a mechanism fitted to observations.
///
/// Mechanism assignment is fixed: root nodes get an empirical distribution
/// of their observed values, non-root nodes get a linear additive-noise
/// model over their parents. Parent order everywhere is the graph's sorted
/// parent order, so fitted coefficients and sampling designs always align.
#[derive(Debug, Clone)]
pub struct StructuralCausalModel {
    graph: CausalGraph,
    mechanisms: BTreeMap<String, NodeMechanism>,
}

impl StructuralCausalModel {
    /// Fit mechanisms for every graph node against `data`.
    ///
    /// Every node must have a column in `data` and that column must be
    /// finite; a missing column is an error, never a fabricated result.
    pub fn fit(graph: CausalGraph, data: &Dataset) -> Result<Self, GcmError> {
        let mut mechanisms = BTreeMap::new();
        for node in graph.topological_order() {
            let column = data.require_finite(node)?;
            let mechanism = if graph.is_root(node)? {
                debug!(node = %node, "Fitted empirical root mechanism");
                NodeMechanism::Root(EmpiricalDistribution::fit(column.view()))
            } else {
                let parents = graph.parents(node)?;
                let design = stack_columns(data.n_rows(), &parents, |p| {
                    data.require_finite(p).map(|c| c.to_owned())
                })?;
                let anm = LinearAnm::fit(node, design.view(), column.view())?;
                debug!(
                    node = %node,
                    parents = parents.len(),
                    noise_variance = anm.noise_variance(),
                    "Fitted linear additive-noise mechanism"
                );
                NodeMechanism::Additive(anm)
            };
            mechanisms.insert(node.to_string(), mechanism);
        }
        Ok(Self { graph, mechanisms })
    }

    pub fn graph(&self) -> &CausalGraph {
        &self.graph
    }

    pub fn mechanism(&self, node: &str) -> Result<&NodeMechanism, GcmError> {
        self.mechanisms
            .get(node)
            .ok_or_else(|| GcmError::UnknownNode(node.to_string()))
    }

    /// Draw `n` joint samples by ancestral sampling in topological order.
    pub fn draw_samples(&self, n: usize, rng: &mut impl Rng) -> Result<Dataset, GcmError> {
        self.sample_with_overrides(n, rng, &BTreeMap::new())
    }

    /// Ancestral sampling under do-interventions: each intervened node is
    /// pinned to its given constant and its mechanism is bypassed.
    pub fn draw_interventional_samples(
        &self,
        n: usize,
        rng: &mut impl Rng,
        interventions: &BTreeMap<String, f64>,
    ) -> Result<Dataset, GcmError> {
        for node in interventions.keys() {
            if !self.graph.contains(node) {
                return Err(GcmError::UnknownNode(node.clone()));
            }
        }
        self.sample_with_overrides(n, rng, interventions)
    }

    /// The nodes whose noise terms can influence `target`: its ancestors
    /// plus the target itself, in topological order (target last).
    pub fn ancestral_players(&self, target: &str) -> Result<Vec<String>, GcmError> {
        Ok(self
            .graph
            .ancestral_order(target)?
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Draw an `n x players.len()` matrix of independent noise values, one
    /// column per player. For a root player the noise is the node value
    /// itself; for a non-root player it is a bootstrap of fit residuals.
    pub fn draw_noise(
        &self,
        players: &[String],
        n: usize,
        rng: &mut impl Rng,
    ) -> Result<Array2<f64>, GcmError> {
        let mut noise = Array2::zeros((n, players.len()));
        for (j, player) in players.iter().enumerate() {
            let column = match self.mechanism(player)? {
                NodeMechanism::Root(dist) => dist.sample(n, rng),
                NodeMechanism::Additive(anm) => anm.sample_noise(n, rng),
            };
            noise.column_mut(j).assign(&column);
        }
        Ok(noise)
    }

    /// Deterministically propagate a noise matrix through the mechanisms
    /// and return the resulting column for the last player.
    ///
    /// `players` must be an ancestral order as returned by
    /// [`ancestral_players`](Self::ancestral_players): every non-root
    /// player's parents must appear earlier in the slice.
    pub fn propagate_noise(
        &self,
        players: &[String],
        noise: &Array2<f64>,
    ) -> Result<Array1<f64>, GcmError> {
        let n = noise.nrows();
        let mut values: HashMap<&str, Array1<f64>> = HashMap::with_capacity(players.len());
        let mut last = None;
        for (j, player) in players.iter().enumerate() {
            let noise_column = noise.column(j).to_owned();
            let value = match self.mechanism(player)? {
                NodeMechanism::Root(_) => noise_column,
                NodeMechanism::Additive(anm) => {
                    let parents = self.graph.parents(player)?;
                    let design = stack_columns(n, &parents, |p| {
                        values
                            .get(p)
                            .cloned()
                            .ok_or_else(|| GcmError::MissingColumn(p.to_string()))
                    })?;
                    anm.predict(design.view()) + noise_column
                }
            };
            values.insert(player.as_str(), value);
            last = Some(player.as_str());
        }
        let last = last.ok_or(GcmError::EmptyDataset)?;
        Ok(values.remove(last).unwrap_or_else(|| Array1::zeros(n)))
    }

    fn sample_with_overrides(
        &self,
        n: usize,
        rng: &mut impl Rng,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<Dataset, GcmError> {
        let order: Vec<String> = self
            .graph
            .topological_order()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut values: HashMap<&str, Array1<f64>> = HashMap::with_capacity(order.len());
        for node in &order {
            let column = if let Some(&pinned) = overrides.get(node) {
                Array1::from_elem(n, pinned)
            } else {
                match self.mechanism(node)? {
                    NodeMechanism::Root(dist) => dist.sample(n, rng),
                    NodeMechanism::Additive(anm) => {
                        let parents = self.graph.parents(node)?;
                        let design = stack_columns(n, &parents, |p| {
                            values
                                .get(p)
                                .cloned()
                                .ok_or_else(|| GcmError::MissingColumn(p.to_string()))
                        })?;
                        anm.predict(design.view()) + anm.sample_noise(n, rng)
                    }
                }
            };
            values.insert(node.as_str(), column);
        }
        Dataset::from_columns(order.iter().map(|node| {
            (
                node.clone(),
                values
                    .get(node.as_str())
                    .map(|c| c.to_vec())
                    .unwrap_or_default(),
            )
        }))
    }
}

/// Stack named columns into an `n x k` design matrix.
fn stack_columns<F>(n: usize, names: &[&str], mut lookup: F) -> Result<Array2<f64>, GcmError>
where
    F: FnMut(&str) -> Result<Array1<f64>, GcmError>,
{
    let mut design = Array2::zeros((n, names.len()));
    for (j, name) in names.iter().enumerate() {
        let column = lookup(name)?;
        if column.len() != n {
            return Err(GcmError::RaggedColumn {
                column: name.to_string(),
                expected: n,
                actual: column.len(),
            });
        }
        design.column_mut(j).assign(&column);
    }
    Ok(design)
}
