//! Shot-to-shot dispersion of one loadout across consecutive match seeds.
//!
//! Every seed gets its own armament, context and engine, so shots run in
//! parallel without shared state and results come back in seed order.

use rayon::prelude::*;
use serde::Serialize;

use crate::ballistics::TraceMode;
use crate::data::Scenario;
use crate::parallel::pool::WorkerPool;
use crate::turn::TurnError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DispersionSample {
    pub seed: u64,
    pub impact_xyz: [f64; 3],
    pub flight_time: f64,
    pub turn_order_delay: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispersionReport {
    pub base_seed: u64,
    pub samples: usize,
    pub mean_impact: [f64; 3],
    pub mean_flight_time: f64,
    /// Median horizontal miss distance about the mean impact.
    pub cep50: f64,
    pub max_radial_miss: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shots: Vec<DispersionSample>,
}

impl DispersionReport {
    pub fn from_samples(base_seed: u64, shots: Vec<DispersionSample>) -> Self {
        let n = shots.len();
        if n == 0 {
            return Self {
                base_seed,
                samples: 0,
                mean_impact: [0.0; 3],
                mean_flight_time: 0.0,
                cep50: 0.0,
                max_radial_miss: 0.0,
                shots,
            };
        }

        let count = n as f64;
        let mut mean_impact = [0.0; 3];
        for shot in &shots {
            for (axis, value) in mean_impact.iter_mut().zip(shot.impact_xyz) {
                *axis += value / count;
            }
        }
        let mean_flight_time = shots.iter().map(|s| s.flight_time).sum::<f64>() / count;

        let mut misses: Vec<f64> = shots
            .iter()
            .map(|s| (s.impact_xyz[0] - mean_impact[0]).hypot(s.impact_xyz[1] - mean_impact[1]))
            .collect();
        misses.sort_by(f64::total_cmp);
        let cep50 = if n % 2 == 1 {
            misses[n / 2]
        } else {
            (misses[n / 2 - 1] + misses[n / 2]) / 2.0
        };
        let max_radial_miss = misses[n - 1];

        Self {
            base_seed,
            samples: n,
            mean_impact,
            mean_flight_time,
            cep50,
            max_radial_miss,
            shots,
        }
    }

    pub fn without_shots(mut self) -> Self {
        self.shots.clear();
        self
    }
}

fn fire_one(scenario: &Scenario, seed: u64) -> Result<DispersionSample, TurnError> {
    let seeded = scenario.with_seed(seed);
    let armament = crate::turn::Armament::from_definitions(&seeded.mechanisms, seed)?;
    let mut config = seeded.engine.clone();
    config.trace_mode = TraceMode::Off;
    let (resolution, outcome) = armament.fire(&seeded.input, &config)?;
    Ok(DispersionSample {
        seed,
        impact_xyz: outcome.impact_xyz,
        flight_time: outcome.flight_time,
        turn_order_delay: resolution.turn_order_delay,
    })
}

/// Resolves and fires `samples` shots with seeds `scenario.seed ..` on `pool`.
/// The first failing seed aborts the analysis.
pub fn analyze_dispersion(
    scenario: &Scenario,
    samples: usize,
    pool: &WorkerPool,
) -> Result<DispersionReport, TurnError> {
    tracing::debug!(samples, workers = pool.effective_workers(), "dispersion analysis started");
    let shots = pool.install(|| {
        (0..samples)
            .into_par_iter()
            .map(|offset| fire_one(scenario, scenario.seed.wrapping_add(offset as u64)))
            .collect::<Result<Vec<_>, _>>()
    })?;

    let report = DispersionReport::from_samples(scenario.seed, shots);
    tracing::info!(
        samples = report.samples,
        cep50 = report.cep50,
        max_radial_miss = report.max_radial_miss,
        "dispersion analysis complete"
    );
    Ok(report)
}
