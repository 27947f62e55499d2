//! End-to-end: the paths where the agent must refuse instead of fabricate.
//!
//! Missing data raises, unknown nodes raise, bad configuration is rejected
//! at creation, and the lenient effect mode records `null` entries rather
//! than inventing numbers.

use std::collections::BTreeMap;

use causeway_agent::{run_analysis, AgentConfig, AgentError, AgentLifecycle, CausalAgent};
use causeway_gcm::{Dataset, GcmError, InfluenceConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

fn telemetry_batch(rows: usize, seed: u64) -> Value {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let records: Vec<Value> = (0..rows)
        .map(|_| {
            let alt = rng.gen_range(900.0..1800.0);
            let amb = rng.gen_range(10.0..35.0);
            let load = 0.2 + 0.00025 * alt + rng.gen_range(-0.02..0.02);
            let boost = 250.0 - 0.04 * alt + rng.gen_range(-2.0..2.0);
            let fuel = 40.0 + 210.0 * load + rng.gen_range(-3.0..3.0);
            let egt = 180.0
                + 2.2 * amb
                + 240.0 * load
                + 1.1 * fuel
                + 0.35 * boost
                + rng.gen_range(-4.0..4.0);
            json!({
                "altitude": alt,
                "ambient_temp": amb,
                "engine_load": load,
                "boost_pressure": boost,
                "fuel_rate": fuel,
                "egt_turbo_inlet": egt,
            })
        })
        .collect();
    Value::Array(records)
}

fn fast_config() -> AgentConfig {
    AgentConfig {
        render_plots: false,
        influence: InfluenceConfig {
            num_samples: 200,
            outer_samples: 40,
            inner_samples: 8,
        },
        ..AgentConfig::default()
    }
}

#[test]
fn fitting_without_the_outcome_column_raises() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let altitudes: Vec<f64> = (0..150).map(|_| rng.gen_range(900.0..1800.0)).collect();
    let ambients: Vec<f64> = (0..150).map(|_| rng.gen_range(10.0..35.0)).collect();
    let partial = Dataset::from_columns([("altitude", altitudes), ("ambient_temp", ambients)])
        .unwrap();

    let err = run_analysis(&fast_config(), &partial).unwrap_err();
    match err {
        AgentError::Model(GcmError::MissingColumn(column)) => {
            assert_ne!(column, "altitude");
            assert_ne!(column, "ambient_temp");
        }
        other => panic!("expected missing column, got {other}"),
    }
}

#[test]
fn unknown_treatment_raises_in_strict_mode() {
    let config = json!({
        "min_samples": 60,
        "render_plots": false,
        "suppress_effect_errors": false,
        "effect_pairs": [
            { "treatment": "cabin_pressure", "outcome": "egt_turbo_inlet" },
        ],
        "influence": { "num_samples": 200, "outer_samples": 40, "inner_samples": 8 },
    });
    let mut agent = CausalAgent::new();
    agent.on_create(&config).unwrap();

    let err = agent.on_receive(&telemetry_batch(60, 3)).unwrap_err();
    assert!(matches!(
        err,
        AgentError::Model(GcmError::UnknownNode(node)) if node == "cabin_pressure"
    ));
}

#[test]
fn lenient_mode_embeds_null_for_the_failed_pair() {
    let config = json!({
        "min_samples": 60,
        "render_plots": false,
        "effect_pairs": [
            { "treatment": "engine_load", "outcome": "egt_turbo_inlet" },
            { "treatment": "cabin_pressure", "outcome": "egt_turbo_inlet" },
        ],
        "influence": { "num_samples": 200, "outer_samples": 40, "inner_samples": 8 },
    });
    let mut agent = CausalAgent::new();
    agent.on_create(&config).unwrap();

    let report = agent.on_receive(&telemetry_batch(60, 4)).unwrap();
    assert_eq!(report["status"], "report");

    let embedded = report["average_effects"].as_str().unwrap();
    assert!(embedded.contains("null"), "no null entry in {embedded}");
    let effects: BTreeMap<String, Option<f64>> = serde_json::from_str(embedded).unwrap();
    assert_eq!(effects["cabin_pressure -> egt_turbo_inlet"], None);
    assert!(effects["engine_load -> egt_turbo_inlet"].is_some());

    // The summary spells the failure out instead of hiding it.
    let summary = report["summary"].as_str().unwrap();
    assert!(summary.contains("cabin_pressure -> egt_turbo_inlet: unavailable"));
}

#[test]
fn incomplete_records_fail_the_event_and_leave_no_trace() {
    let mut agent = CausalAgent::new();
    agent
        .on_create(&json!({ "min_samples": 60, "render_plots": false }))
        .unwrap();

    let mut batch = telemetry_batch(10, 5);
    if let Value::Array(records) = &mut batch {
        if let Value::Object(record) = &mut records[7] {
            record.remove("fuel_rate");
        }
    }
    let err = agent.on_receive(&batch).unwrap_err();
    assert!(matches!(err, AgentError::MissingField(field) if field == "fuel_rate"));

    // Nothing from the failed batch was kept.
    let response = agent.on_receive(&telemetry_batch(5, 6)).unwrap();
    assert_eq!(response["buffered"], 5);
}

#[test]
fn non_record_payloads_are_malformed() {
    let mut agent = CausalAgent::new();
    agent.on_create(&json!({})).unwrap();

    for payload in [json!("telemetry"), json!(3.5), json!([[1.0, 2.0]])] {
        let err = agent.on_receive(&payload).unwrap_err();
        assert!(matches!(err, AgentError::MalformedEvent), "{payload}");
    }
}

#[test]
fn bad_configuration_is_rejected_at_creation() {
    let mut agent = CausalAgent::new();

    // Unknown target node.
    let err = agent
        .on_create(&json!({ "target": "oil_temp" }))
        .unwrap_err();
    assert!(matches!(err, AgentError::Config(_)));

    // Window smaller than the fitting threshold.
    let err = agent
        .on_create(&json!({ "min_samples": 500, "max_window": 100 }))
        .unwrap_err();
    assert!(matches!(err, AgentError::Config(_)));

    // Wrongly typed field.
    let err = agent.on_create(&json!({ "seed": "forty-two" })).unwrap_err();
    assert!(matches!(err, AgentError::Config(_)));

    // A failed creation leaves the agent uninitialized.
    let err = agent.on_receive(&telemetry_batch(1, 1)).unwrap_err();
    assert!(matches!(err, AgentError::NotInitialized));
}

#[test]
fn unwritable_plot_directory_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let config = AgentConfig {
        out_dir: blocker.join("plots"),
        influence: InfluenceConfig {
            num_samples: 200,
            outer_samples: 40,
            inner_samples: 8,
        },
        ..AgentConfig::default()
    };

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let rows = 150;
    let mut columns: [Vec<f64>; 6] = Default::default();
    for _ in 0..rows {
        let alt = rng.gen_range(900.0..1800.0);
        let amb = rng.gen_range(10.0..35.0);
        let load = 0.2 + 0.00025 * alt + rng.gen_range(-0.02..0.02);
        let boost = 250.0 - 0.04 * alt + rng.gen_range(-2.0..2.0);
        let fuel = 40.0 + 210.0 * load + rng.gen_range(-3.0..3.0);
        let egt = 180.0 + 2.2 * amb + 240.0 * load + 1.1 * fuel + 0.35 * boost
            + rng.gen_range(-4.0..4.0);
        for (column, value) in columns.iter_mut().zip([alt, amb, load, boost, fuel, egt]) {
            column.push(value);
        }
    }
    let [alt, amb, load, boost, fuel, egt] = columns;
    let data = Dataset::from_columns([
        ("altitude", alt),
        ("ambient_temp", amb),
        ("engine_load", load),
        ("boost_pressure", boost),
        ("fuel_rate", fuel),
        ("egt_turbo_inlet", egt),
    ])
    .unwrap();

    let err = run_analysis(&config, &data).unwrap_err();
    assert!(matches!(err, AgentError::OutputDir { .. }));
}
