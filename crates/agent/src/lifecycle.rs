//! Lifecycle entry points the host runtime drives.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::driver::run_analysis;
use crate::error::AgentError;
use crate::topology;
use crate::window::SampleWindow;

/// The three entry points a hosted analysis agent exposes.
///
/// The host calls `on_create` once with a configuration payload, `on_receive`
/// for every telemetry event, and `on_destroy` at teardown. Handlers return
/// JSON values for the host to route; errors are surfaced to the host as-is.
pub trait AgentLifecycle {
    fn on_create(&mut self, data: &Value) -> Result<Option<Value>, AgentError>;
    fn on_receive(&mut self, data: &Value) -> Result<Value, AgentError>;
    fn on_destroy(&mut self) -> Result<Option<Value>, AgentError>;
}

#[derive(Debug)]
struct AgentState {
    config: AgentConfig,
    window: SampleWindow,
    created_at: DateTime<Utc>,
    events_received: u64,
    records_accepted: u64,
    reports_emitted: u64,
    last_run_id: Option<Uuid>,
}

/// Causal attribution agent for haul-truck engine telemetry.
///
/// Accumulates records into a rolling window and, once the window holds
/// enough samples, answers each event with a full attribution report. All
/// state lives here; nothing is global.
#[derive(Debug, Default)]
pub struct CausalAgent {
    state: Option<AgentState>,
}

impl CausalAgent {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Interpret an event payload as one record or a batch of records.
fn records_from(data: &Value) -> Result<Vec<&Map<String, Value>>, AgentError> {
    match data {
        Value::Object(record) => Ok(vec![record]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_object().ok_or(AgentError::MalformedEvent))
            .collect(),
        _ => Err(AgentError::MalformedEvent),
    }
}

impl AgentLifecycle for CausalAgent {
    fn on_create(&mut self, data: &Value) -> Result<Option<Value>, AgentError> {
        let config = AgentConfig::from_value(data)?;
        config.validate()?;
        let columns = topology::NODES.iter().map(|name| name.to_string()).collect();
        let window = SampleWindow::new(columns, config.min_samples, config.max_window);
        info!(
            target_node = %config.target,
            min_samples = config.min_samples,
            seed = config.seed,
            "Causal agent created"
        );
        let ack = json!({
            "status": "created",
            "target": config.target,
            "min_samples": config.min_samples,
        });
        self.state = Some(AgentState {
            config,
            window,
            created_at: Utc::now(),
            events_received: 0,
            records_accepted: 0,
            reports_emitted: 0,
            last_run_id: None,
        });
        Ok(Some(ack))
    }

    fn on_receive(&mut self, data: &Value) -> Result<Value, AgentError> {
        let state = self.state.as_mut().ok_or(AgentError::NotInitialized)?;
        state.events_received += 1;
        let records = records_from(data)?;
        let accepted = state.window.push_batch(&records)?;
        state.records_accepted += accepted as u64;

        if !state.window.is_ready() {
            return Ok(json!({
                "status": "accumulating",
                "buffered": state.window.len(),
                "required": state.config.min_samples,
            }));
        }

        let dataset = state.window.to_dataset()?;
        let report = run_analysis(&state.config, &dataset)?;
        state.reports_emitted += 1;
        state.last_run_id = Some(report.run_id);
        report.to_payload()
    }

    fn on_destroy(&mut self) -> Result<Option<Value>, AgentError> {
        match self.state.take() {
            None => Ok(None),
            Some(state) => {
                info!(
                    events = state.events_received,
                    records = state.records_accepted,
                    reports = state.reports_emitted,
                    "Causal agent destroyed"
                );
                Ok(Some(json!({
                    "status": "destroyed",
                    "created_at": state.created_at.to_rfc3339(),
                    "events_received": state.events_received,
                    "records_accepted": state.records_accepted,
                    "reports_emitted": state.reports_emitted,
                    "last_run_id": state.last_run_id.map(|id| id.to_string()),
                })))
            }
        }
    }
}
