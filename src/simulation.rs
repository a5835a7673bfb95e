// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synthetic supervised run: learn to reproduce a sine input
//!
//! ```text
//! x(t)      = sin(2π f t)
//! pre[i]    = max(0, e_i x - c_i)               e_i = ±1, c_i spread in [-0.5, 0.5)
//! y(t)      = Σ_j e_j out_j / (outputs · gain)  out = array.invoke(t, ...)
//! error[j]  = e_j (y_prev - x)
//! flag      = 1 while t < learning_time
//! ```
//!
//! The error fed in at tick `k` is the one measured at tick `k - 1`, the
//! same one-step delay a recurrent harness would have.

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::Serialize;
use tracing::{debug, info};

use memristor_array::{
    magnitude, sparsity, ArrayController, ErrorModulatedRule, HistorySelect, Stats,
};
use memristor_config::{Encoding, MemristorConfig};
use memristor_device::ResistanceLaw;

/// Summary printed at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub law: String,
    pub encoding: Encoding,
    pub inputs: usize,
    pub outputs: usize,
    pub seed: u64,
    pub ticks: usize,
    pub simulation_time: f64,
    pub learning_time: f64,
    /// Mean squared error of the decoded output after learning stops
    pub mse: Option<f64>,
    pub initial_sparsity: f64,
    pub end_sparsity: f64,
    pub end_magnitude: f64,
    /// Raw conductances over `[0, learning_time)`
    pub conductance_stats: Option<Stats>,
    pub weight_stats: Option<Stats>,
}

fn encoder(index: usize) -> f64 {
    if index % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

fn intercept(index: usize, count: usize) -> f64 {
    index as f64 / count as f64 - 0.5
}

/// Rectified-linear pre activities for input `x`
pub fn pre_activities(x: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| (encoder(i) * x - intercept(i, count)).max(0.0))
        .collect()
}

/// Run the whole simulation described by `config`
pub fn run_simulation(config: &MemristorConfig) -> Result<SimulationReport> {
    let rule = ErrorModulatedRule::from_config(&config.rule);
    let mut array =
        ArrayController::from_config(config, rule).context("Failed to build memristor array")?;

    let (outputs, inputs) = array.shape();
    let dt = array.dt();
    let gain = config.device.gain;
    let simulation_time = config.simulation.simulation_time;
    let learning_time = config.simulation.effective_learning_time();
    let frequency = config.simulation.input_frequency;
    let ticks = (simulation_time / dt).round() as usize;

    info!(
        "[SIM] {} ticks of {}s, learning until t={}s, input {} Hz",
        ticks, dt, learning_time, frequency
    );

    let initial_weights: Array2<f64> = array.weights().to_owned();
    let mut error = vec![0.0; outputs];
    let mut input = Vec::with_capacity(inputs + outputs + 1);
    let mut squared_error = 0.0;
    let mut tested = 0usize;

    for k in 0..ticks {
        let t = k as f64 * dt;
        let x = (2.0 * std::f64::consts::PI * frequency * t).sin();
        let learning = t < learning_time;

        input.clear();
        input.extend(pre_activities(x, inputs));
        input.extend_from_slice(&error);
        input.push(if learning { 1.0 } else { 0.0 });

        let out = array
            .invoke(t, &input)
            .with_context(|| format!("Array invocation failed at t={}", t))?;

        let y = out
            .iter()
            .enumerate()
            .map(|(j, o)| encoder(j) * o)
            .sum::<f64>()
            / (outputs as f64 * gain);
        let e = y - x;
        for (j, slot) in error.iter_mut().enumerate() {
            *slot = encoder(j) * e;
        }

        if !learning {
            squared_error += e * e;
            tested += 1;
        }

        if k % 1000 == 0 {
            debug!("[SIM] t={:.3} x={:+.3} y={:+.3}", t, x, y);
        }
    }

    let end_weights = array.weights();
    let report = SimulationReport {
        law: array
            .components()
            .first()
            .and_then(|e| e.devices().first().map(|d| d.law().law_name().to_string()))
            .unwrap_or_default(),
        encoding: config.array.encoding,
        inputs,
        outputs,
        seed: array.seed(),
        ticks: array.ticks(),
        simulation_time,
        learning_time,
        mse: (tested > 0).then(|| squared_error / tested as f64),
        initial_sparsity: sparsity(initial_weights.view()),
        end_sparsity: sparsity(end_weights),
        end_magnitude: magnitude(end_weights),
        conductance_stats: array
            .get_stats((0.0, learning_time), HistorySelect::Conductances)
            .ok(),
        weight_stats: array
            .get_stats((0.0, simulation_time), HistorySelect::Weights)
            .ok(),
    };

    info!(
        "[SIM] done: mse={:?} sparsity {:.3} -> {:.3}, end magnitude {:.4e}",
        report.mse, report.initial_sparsity, report.end_sparsity, report.end_magnitude
    );

    Ok(report)
}
