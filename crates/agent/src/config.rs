//! Agent configuration, parsed from the host's initialization payload.
//!
//! Everything the three lifecycle calls need travels through this struct;
//! the agent keeps no other state between calls than what `on_create`
//! builds from it.

use std::path::PathBuf;

use causeway_gcm::{EffectPair, InfluenceConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentError;
use crate::topology;

fn default_target() -> String {
    topology::EGT_TURBO_INLET.to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_min_samples() -> usize {
    120
}

fn default_max_window() -> usize {
    2048
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_render_plots() -> bool {
    true
}

fn default_suppress_effect_errors() -> bool {
    true
}

fn default_effect_pairs() -> Vec<EffectPair> {
    vec![
        EffectPair::new(topology::ENGINE_LOAD, topology::EGT_TURBO_INLET),
        EffectPair::new(topology::ALTITUDE, topology::EGT_TURBO_INLET),
        EffectPair::new(topology::FUEL_RATE, topology::EGT_TURBO_INLET),
    ]
}

/// Runtime configuration of the attribution agent.
///
/// Unknown keys in the host payload are ignored; every field has a default
/// so an empty object is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Attribution target column.
    #[serde(default = "default_target")]
    pub target: String,
    /// Seed for every random draw of a run; fixed seed, identical output.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Buffered rows required before the first analysis.
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Upper bound on buffered rows; older rows are evicted.
    #[serde(default = "default_max_window")]
    pub max_window: usize,
    /// Directory the two diagnostic plots are written into.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Disable to skip plot rendering entirely.
    #[serde(default = "default_render_plots")]
    pub render_plots: bool,
    /// (treatment, outcome) pairs to estimate average effects for.
    #[serde(default = "default_effect_pairs")]
    pub effect_pairs: Vec<EffectPair>,
    /// Record a failed pair as null instead of failing the run.
    #[serde(default = "default_suppress_effect_errors")]
    pub suppress_effect_errors: bool,
    /// Sample counts for the attribution estimators.
    #[serde(default)]
    pub influence: InfluenceConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            seed: default_seed(),
            min_samples: default_min_samples(),
            max_window: default_max_window(),
            out_dir: default_out_dir(),
            render_plots: default_render_plots(),
            effect_pairs: default_effect_pairs(),
            suppress_effect_errors: default_suppress_effect_errors(),
            influence: InfluenceConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Parse a configuration from the host's initialization payload.
    pub fn from_value(value: &Value) -> Result<Self, AgentError> {
        serde_json::from_value(value.clone()).map_err(|e| AgentError::Config(e.to_string()))
    }

    /// Cross-field checks that serde cannot express.
    pub fn validate(&self) -> Result<(), AgentError> {
        if !topology::NODES.contains(&self.target.as_str()) {
            return Err(AgentError::Config(format!(
                "target '{}' is not a graph node",
                self.target
            )));
        }
        if self.min_samples == 0 {
            return Err(AgentError::Config("min_samples must be positive".into()));
        }
        if self.max_window < self.min_samples {
            return Err(AgentError::Config(format!(
                "max_window {} is smaller than min_samples {}",
                self.max_window, self.min_samples
            )));
        }
        Ok(())
    }
}
