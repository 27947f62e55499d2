//! Result payload assembly.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AgentError;

/// Outcome of one analysis run over the buffered window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub samples_used: usize,
    /// Percent of total arrow strength, keyed `"source -> target"`.
    pub arrow_strength_pct: BTreeMap<String, f64>,
    /// Percent of total intrinsic influence, keyed by node name.
    pub intrinsic_influence_pct: BTreeMap<String, f64>,
    /// Average causal effects keyed `"treatment -> outcome"`. `None` marks a
    /// pair whose estimation failed under the lenient mode.
    pub average_effects: BTreeMap<String, Option<f64>>,
    pub summary: String,
    pub plot_paths: Vec<PathBuf>,
}

impl AnalysisReport {
    /// Encode the report as the host's dictionary shape.
    ///
    /// Percentage and effect mappings are embedded as JSON strings, the
    /// timestamp as RFC 3339. Suppressed effects serialize as `null` entries
    /// inside the embedded string.
    pub fn to_payload(&self) -> Result<Value, AgentError> {
        Ok(json!({
            "status": "report",
            "run_id": self.run_id.to_string(),
            "timestamp": self.generated_at.to_rfc3339(),
            "samples_used": self.samples_used,
            "arrow_strength": serde_json::to_string(&self.arrow_strength_pct)?,
            "intrinsic_influence": serde_json::to_string(&self.intrinsic_influence_pct)?,
            "average_effects": serde_json::to_string(&self.average_effects)?,
            "summary": self.summary,
            "plots": self.plot_paths,
        }))
    }
}
