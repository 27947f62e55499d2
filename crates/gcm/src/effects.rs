//! Average causal effects under do-interventions.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GcmError;
use crate::influence::InfluenceConfig;
use crate::scm::StructuralCausalModel;
use crate::stats;

/// A (treatment, outcome) pair for effect estimation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectPair {
    pub treatment: String,
    pub outcome: String,
}

impl EffectPair {
    pub fn new(treatment: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            treatment: treatment.into(),
            outcome: outcome.into(),
        }
    }
}

impl fmt::Display for EffectPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.treatment, self.outcome)
    }
}

/// Average causal effect of bumping `treatment` by one standard deviation:
/// `E[outcome | do(T = mean + sd)] - E[outcome | do(T = mean)]`.
///
/// Mean and standard deviation are taken from the model's own samples, so
/// the bump is scaled to the fitted treatment distribution. Unknown
/// treatment or outcome nodes are errors; results are never fabricated for
/// columns the model does not know.
pub fn average_causal_effect(
    scm: &StructuralCausalModel,
    treatment: &str,
    outcome: &str,
    config: &InfluenceConfig,
    rng: &mut impl Rng,
) -> Result<f64, GcmError> {
    config.validate()?;
    if !scm.graph().contains(treatment) {
        return Err(GcmError::UnknownNode(treatment.to_string()));
    }
    if !scm.graph().contains(outcome) {
        return Err(GcmError::UnknownNode(outcome.to_string()));
    }
    let base = scm.draw_samples(config.num_samples, rng)?;
    let treatment_column = base.column(treatment)?;
    let mean = stats::mean(treatment_column.view());
    let sd = stats::std_dev(treatment_column.view());

    let reference_level = BTreeMap::from([(treatment.to_string(), mean)]);
    let alternative_level = BTreeMap::from([(treatment.to_string(), mean + sd)]);
    let reference = scm.draw_interventional_samples(config.num_samples, rng, &reference_level)?;
    let alternative =
        scm.draw_interventional_samples(config.num_samples, rng, &alternative_level)?;

    let effect = stats::mean(alternative.column(outcome)?.view())
        - stats::mean(reference.column(outcome)?.view());
    debug!(
        treatment = %treatment,
        outcome = %outcome,
        bump = sd,
        effect,
        "Estimated average causal effect"
    );
    Ok(effect)
}
