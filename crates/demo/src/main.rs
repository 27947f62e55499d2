#![deny(unsafe_code)]
//! Causeway demo binary.
//!
//! Runs the full agent lifecycle against synthetic haul-truck telemetry:
//! 1. `on_create` with an explicit configuration payload
//! 2. `on_receive` batches until the sample window fills
//! 3. the attribution report (arrow strength, intrinsic influence, effects)
//! 4. `on_destroy` teardown statistics
//!
//! No external services required; telemetry is generated in-process.

mod telemetry;

use std::collections::BTreeMap;

use causeway_agent::{AgentLifecycle, CausalAgent};
use serde_json::{json, Value};

use telemetry::DriveCycle;

// ── Formatting Helpers ──────────────────────────────────────────────────

const BANNER: &str = r#"
 ╔═══════════════════════════════════════════════════════════════╗
 ║             Causeway  --  Causal Attribution Demo             ║
 ║                                                               ║
 ║   Haul-truck exhaust temperature attributed to its causes     ║
 ║   over a fixed engine DAG, from windowed telemetry.           ║
 ╚═══════════════════════════════════════════════════════════════╝
"#;

fn section(title: &str) {
    let width: usize = 60;
    let pad = width.saturating_sub(title.len() + 4);
    let left = pad / 2;
    let right = pad - left;
    println!();
    println!(" ┌{}┐", "─".repeat(width));
    println!(" │{}  {}  {}│", " ".repeat(left), title, " ".repeat(right));
    println!(" └{}┘", "─".repeat(width));
}

fn ok(msg: &str) {
    println!("   [OK]  {}", msg);
}

fn info(msg: &str) {
    println!("   [--]  {}", msg);
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("{}", BANNER);

    if let Err(e) = run_demo() {
        eprintln!();
        eprintln!("   [FATAL]  Demo failed: {}", e);
        std::process::exit(1);
    }

    println!();
    println!(" ════════════════════════════════════════════════════════════════");
    println!("  Demo complete.  Plots written to demo-out/.");
    println!(" ════════════════════════════════════════════════════════════════");
    println!();
}

fn run_demo() -> Result<(), Box<dyn std::error::Error>> {
    // ── Phase A: Agent Creation ─────────────────────────────────────
    section("Phase A: Agent Creation");

    let config = json!({
        "seed": 42,
        "min_samples": 240,
        "out_dir": "demo-out",
    });
    info(&format!("Configuration: {}", config));

    let mut agent = CausalAgent::new();
    let ack = agent
        .on_create(&config)?
        .unwrap_or_else(|| json!({"status": "created"}));
    ok(&format!(
        "Agent created  target={}  min_samples={}",
        ack["target"], ack["min_samples"]
    ));

    // ── Phase B: Telemetry Stream ───────────────────────────────────
    section("Phase B: Telemetry Stream");

    let mut cycle = DriveCycle::new(7);
    let batch_size = 60;
    let mut report = None;

    for event in 1..=5 {
        let payload = cycle.batch(batch_size);
        let response = agent.on_receive(&payload)?;
        match response["status"].as_str() {
            Some("accumulating") => info(&format!(
                "Event {}  accumulating  buffered={}  required={}",
                event, response["buffered"], response["required"]
            )),
            Some("report") => {
                ok(&format!(
                    "Event {}  report emitted  samples_used={}",
                    event, response["samples_used"]
                ));
                report = Some(response);
                break;
            }
            other => info(&format!("Event {}  unexpected status {:?}", event, other)),
        }
    }

    // ── Phase C: Attribution Report ─────────────────────────────────
    section("Phase C: Attribution Report");

    let report = report.ok_or("window never filled")?;
    print_report(&report)?;

    // ── Phase D: Teardown ───────────────────────────────────────────
    section("Phase D: Teardown");

    if let Some(stats) = agent.on_destroy()? {
        info(&format!("Events received : {}", stats["events_received"]));
        info(&format!("Records accepted: {}", stats["records_accepted"]));
        info(&format!("Reports emitted : {}", stats["reports_emitted"]));
        info(&format!("Last run id     : {}", stats["last_run_id"]));
    }
    ok("Agent destroyed");

    Ok(())
}

// ── Report helpers ──────────────────────────────────────────────────────

fn print_report(report: &Value) -> Result<(), Box<dyn std::error::Error>> {
    info(&format!("Run id   : {}", report["run_id"]));
    info(&format!("Timestamp: {}", report["timestamp"]));

    println!();
    println!("   Arrow strength (% of total):");
    print_percentages(report["arrow_strength"].as_str().ok_or("missing mapping")?)?;

    println!();
    println!("   Intrinsic influence (% of total):");
    print_percentages(
        report["intrinsic_influence"]
            .as_str()
            .ok_or("missing mapping")?,
    )?;

    println!();
    println!("   Average causal effects:");
    let effects: BTreeMap<String, Option<f64>> =
        serde_json::from_str(report["average_effects"].as_str().ok_or("missing mapping")?)?;
    for (pair, effect) in &effects {
        match effect {
            Some(value) => info(&format!("{pair}: {value:.2}")),
            None => info(&format!("{pair}: unavailable")),
        }
    }

    if let Some(plots) = report["plots"].as_array() {
        println!();
        for plot in plots {
            ok(&format!("Plot written: {}", plot.as_str().unwrap_or("?")));
        }
    }
    Ok(())
}

fn print_percentages(embedded: &str) -> Result<(), Box<dyn std::error::Error>> {
    let decoded: BTreeMap<String, f64> = serde_json::from_str(embedded)?;
    for (key, pct) in &decoded {
        info(&format!("{key}: {pct:.2}%"));
    }
    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────────
