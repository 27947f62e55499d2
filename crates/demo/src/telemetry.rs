//! Synthetic haul-truck telemetry for the demo.
//!
//! Simulates a loaded truck working a pit ramp: altitude sweeps up and down
//! the haul cycle, ambient temperature drifts through the shift, and the
//! engine channels respond through the same causal structure the agent
//! assumes (load follows grade, boost falls with altitude, fuel follows
//! load, exhaust temperature integrates all of them).

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use serde_json::{json, Value};

/// Samples per full haul cycle (pit floor to dump and back).
const CYCLE_LEN: f64 = 600.0;

/// Deterministic drive-cycle generator.
///
/// Every record carries the six engine channels the agent's topology
/// expects. A fixed seed reproduces the exact stream.
pub struct DriveCycle {
    rng: ChaCha8Rng,
    step: u64,
    sensor_noise: Normal<f64>,
}

impl DriveCycle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            step: 0,
            // Unit sigma, scaled per channel below.
            sensor_noise: Normal::new(0.0, 1.0).expect("finite sigma"),
        }
    }

    fn noise(&mut self, scale: f64) -> f64 {
        self.rng.sample(self.sensor_noise) * scale
    }

    /// Produce the next telemetry record.
    pub fn next_record(&mut self) -> Value {
        let phase = self.step as f64 / CYCLE_LEN * TAU;
        self.step += 1;

        let altitude = 1350.0 + 420.0 * phase.sin() + self.noise(15.0);
        let ambient_temp = 21.0 + 7.0 * (phase / 3.0 + 1.0).sin() + self.noise(0.6);
        let engine_load = 0.18 + 0.00030 * altitude + self.noise(0.015);
        let boost_pressure = 248.0 - 0.038 * altitude + self.noise(1.8);
        let fuel_rate = 35.0 + 220.0 * engine_load + self.noise(2.5);
        let egt_turbo_inlet = 170.0
            + 2.1 * ambient_temp
            + 230.0 * engine_load
            + 1.15 * fuel_rate
            + 0.32 * boost_pressure
            + self.noise(3.5);

        json!({
            "altitude": altitude,
            "ambient_temp": ambient_temp,
            "engine_load": engine_load,
            "boost_pressure": boost_pressure,
            "fuel_rate": fuel_rate,
            "egt_turbo_inlet": egt_turbo_inlet,
        })
    }

    /// Produce a batch of records as one event payload.
    pub fn batch(&mut self, n: usize) -> Value {
        Value::Array((0..n).map(|_| self.next_record()).collect())
    }
}
