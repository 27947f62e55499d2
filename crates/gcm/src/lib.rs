#![deny(unsafe_code)]
//! # causeway-gcm
//!
//! Graphical causal models over tabular telemetry.
//!
//! The crate covers the full model lifecycle:
//! - **Graphs**: hand-authored DAGs of named variables, cycle-checked at
//!   construction ([`CausalGraph`]).
//! - **Fitting**: empirical distributions for roots, linear additive-noise
//!   models for everything else ([`StructuralCausalModel::fit`]).
//! - **Attribution**: per-edge arrow strength and Shapley-based intrinsic
//!   causal influence over a target's variance.
//! - **Effects**: average causal effects of do-interventions for
//!   (treatment, outcome) pairs.
//! - **Rendering**: PNG diagrams of the graph and of attribution shares.
//!
//! All sampling goes through caller-provided random generators, so a fixed
//! seed reproduces every number exactly.

pub mod dataset;
pub mod effects;
pub mod error;
pub mod graph;
pub mod influence;
pub mod mechanism;
pub mod plot;
pub mod scm;
pub mod stats;

pub use dataset::Dataset;
pub use effects::{average_causal_effect, EffectPair};
pub use error::GcmError;
pub use graph::{Arrow, CausalGraph};
pub use influence::{arrow_strength, intrinsic_causal_influence, InfluenceConfig};
pub use mechanism::{EmpiricalDistribution, LinearAnm, NodeMechanism};
pub use plot::{render_graph, render_influence_bars};
pub use scm::StructuralCausalModel;
