#![deny(unsafe_code)]
//! # causeway-agent
//!
//! Event-driven causal attribution agent for haul-truck engine telemetry.
//!
//! The agent implements the host lifecycle contract ([`AgentLifecycle`]):
//! `on_create` parses an explicit [`AgentConfig`] from the initialization
//! payload, `on_receive` accumulates telemetry records into a rolling
//! [`window::SampleWindow`] and answers with attribution reports once enough
//! samples are buffered, `on_destroy` returns lifetime statistics.
//!
//! Analysis itself is delegated to the fixed engine topology in
//! [`topology`] and the [`causeway_gcm`] model crate; [`driver::run_analysis`]
//! wires the two together and [`report::AnalysisReport`] carries the result.

pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod normalize;
pub mod report;
pub mod topology;
pub mod window;

pub use config::AgentConfig;
pub use driver::run_analysis;
pub use error::AgentError;
pub use format::{
    build_summary, format_arrow_percentages, format_effect_lines, format_node_percentages,
};
pub use lifecycle::{AgentLifecycle, CausalAgent};
pub use normalize::to_percentages;
pub use report::AnalysisReport;
pub use window::SampleWindow;
