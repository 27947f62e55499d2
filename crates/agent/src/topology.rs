//! The fixed causal graph of the haul-truck engine domain.
//!
//! The structure is hand-authored and static per crate version; it is never
//! learned from data or mutated at runtime.

use causeway_gcm::{CausalGraph, GcmError};

pub const ALTITUDE: &str = "altitude";
pub const AMBIENT_TEMP: &str = "ambient_temp";
pub const ENGINE_LOAD: &str = "engine_load";
pub const FUEL_RATE: &str = "fuel_rate";
pub const BOOST_PRESSURE: &str = "boost_pressure";
pub const EGT_TURBO_INLET: &str = "egt_turbo_inlet";

/// Every telemetry column the agent expects, in declaration order.
pub const NODES: [&str; 6] = [
    ALTITUDE,
    AMBIENT_TEMP,
    ENGINE_LOAD,
    FUEL_RATE,
    BOOST_PRESSURE,
    EGT_TURBO_INLET,
];

/// Assumed causal structure of exhaust gas temperature at the turbo inlet.
pub const EDGES: [(&str, &str); 7] = [
    (ALTITUDE, BOOST_PRESSURE),
    (ALTITUDE, ENGINE_LOAD),
    (AMBIENT_TEMP, EGT_TURBO_INLET),
    (ENGINE_LOAD, FUEL_RATE),
    (ENGINE_LOAD, EGT_TURBO_INLET),
    (FUEL_RATE, EGT_TURBO_INLET),
    (BOOST_PRESSURE, EGT_TURBO_INLET),
];

/// Build the engine graph from the static node and edge lists.
pub fn engine_graph() -> Result<CausalGraph, GcmError> {
    CausalGraph::from_edges(NODES, EDGES)
}
