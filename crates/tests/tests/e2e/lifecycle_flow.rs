//! End-to-end: full lifecycle from creation to teardown.
//!
//! Drives the agent exactly as a host runtime would: configure it through
//! `on_create`, stream telemetry batches through `on_receive`, check the
//! report payload shape (embedded JSON mappings, RFC 3339 timestamp, plot
//! files on disk), and collect teardown statistics from `on_destroy`.

use std::collections::BTreeMap;

use causeway_agent::{AgentLifecycle, CausalAgent};
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

fn fast_influence() -> Value {
    json!({ "num_samples": 200, "outer_samples": 40, "inner_samples": 8 })
}

#[test]
fn full_lifecycle_emits_a_complete_report() {
    let out_dir = tempfile::tempdir().unwrap();
    let mut agent = CausalAgent::new();

    let ack = agent
        .on_create(&json!({
            "seed": 11,
            "min_samples": 90,
            "out_dir": out_dir.path(),
            "influence": fast_influence(),
        }))
        .unwrap()
        .unwrap();
    assert_eq!(ack["status"], "created");
    assert_eq!(ack["target"], "egt_turbo_inlet");

    // Two batches accumulate, the third crosses the threshold.
    let first = agent.on_receive(&telemetry_batch(30, 1)).unwrap();
    assert_eq!(first["status"], "accumulating");
    assert_eq!(first["buffered"], 30);
    let second = agent.on_receive(&telemetry_batch(30, 2)).unwrap();
    assert_eq!(second["buffered"], 60);

    let report = agent.on_receive(&telemetry_batch(30, 3)).unwrap();
    assert_eq!(report["status"], "report");
    assert_eq!(report["samples_used"], 90);

    // Identifiers and timestamp are well formed.
    uuid::Uuid::parse_str(report["run_id"].as_str().unwrap()).unwrap();
    chrono::DateTime::parse_from_rfc3339(report["timestamp"].as_str().unwrap()).unwrap();

    // Percentage mappings ride inside JSON strings and sum to 100.
    let arrows: BTreeMap<String, f64> =
        serde_json::from_str(report["arrow_strength"].as_str().unwrap()).unwrap();
    let influence: BTreeMap<String, f64> =
        serde_json::from_str(report["intrinsic_influence"].as_str().unwrap()).unwrap();
    assert_eq!(arrows.len(), 4);
    assert_eq!(influence.len(), 6);
    assert!((arrows.values().sum::<f64>() - 100.0).abs() < 1e-6);
    assert!((influence.values().sum::<f64>() - 100.0).abs() < 1e-6);
    for key in arrows.keys() {
        assert!(key.ends_with("-> egt_turbo_inlet"), "odd arrow key {key}");
    }

    // The text summary mirrors the mappings, one line per entry.
    let summary = report["summary"].as_str().unwrap();
    assert!(summary.contains("Causal attribution for egt_turbo_inlet"));
    for key in arrows.keys() {
        assert!(summary.contains(key.as_str()));
    }

    // Both plots were written.
    let plots: Vec<String> = serde_json::from_value(report["plots"].clone()).unwrap();
    assert_eq!(plots.len(), 2);
    for plot in &plots {
        let meta = std::fs::metadata(plot).unwrap();
        assert!(meta.len() > 0, "empty plot file {plot}");
    }

    let stats = agent.on_destroy().unwrap().unwrap();
    assert_eq!(stats["status"], "destroyed");
    assert_eq!(stats["events_received"], 3);
    assert_eq!(stats["records_accepted"], 90);
    assert_eq!(stats["reports_emitted"], 1);
    assert_eq!(
        stats["last_run_id"].as_str().unwrap(),
        report["run_id"].as_str().unwrap()
    );
}

#[test]
fn reports_keep_flowing_once_the_window_is_full() {
    let mut agent = CausalAgent::new();
    agent
        .on_create(&json!({
            "min_samples": 60,
            "render_plots": false,
            "influence": fast_influence(),
        }))
        .unwrap();

    let first = agent.on_receive(&telemetry_batch(60, 5)).unwrap();
    assert_eq!(first["status"], "report");

    // Every further event answers with a fresh report over the rolling window.
    let second = agent.on_receive(&telemetry_batch(10, 6)).unwrap();
    assert_eq!(second["status"], "report");
    assert_eq!(second["samples_used"], 70);
    assert_ne!(first["run_id"], second["run_id"]);
}

#[test]
fn window_eviction_caps_the_sample_count() {
    let mut agent = CausalAgent::new();
    agent
        .on_create(&json!({
            "min_samples": 50,
            "max_window": 80,
            "render_plots": false,
            "influence": fast_influence(),
        }))
        .unwrap();

    let report = agent.on_receive(&telemetry_batch(120, 8)).unwrap();
    assert_eq!(report["status"], "report");
    assert_eq!(report["samples_used"], 80);
}

#[test]
fn two_agents_with_the_same_seed_agree_exactly() {
    let config = json!({
        "seed": 99,
        "min_samples": 60,
        "render_plots": false,
        "influence": fast_influence(),
    });
    let batch = telemetry_batch(60, 14);

    let mut left = CausalAgent::new();
    left.on_create(&config).unwrap();
    let mut right = CausalAgent::new();
    right.on_create(&config).unwrap();

    let a = left.on_receive(&batch).unwrap();
    let b = right.on_receive(&batch).unwrap();
    assert_eq!(a["arrow_strength"], b["arrow_strength"]);
    assert_eq!(a["intrinsic_influence"], b["intrinsic_influence"]);
    assert_eq!(a["average_effects"], b["average_effects"]);
    assert_eq!(a["summary"], b["summary"]);
}
