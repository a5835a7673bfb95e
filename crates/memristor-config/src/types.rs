// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `memristor_configuration.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MemristorConfig {
    pub device: DeviceConfig,
    pub quantizer: QuantizerConfig,
    pub array: ArrayConfig,
    pub rule: RuleConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

/// Device law and drive settings shared by every element
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub law: LawConfig,
    /// Magnitude of one update pulse (volts)
    pub base_voltage: f64,
    /// Multiplier applied to scaled read-outs
    pub gain: f64,
    pub initial_resistance_min: f64,
    pub initial_resistance_max: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            law: LawConfig::default(),
            base_voltage: 1e-1,
            gain: 1e5,
            initial_resistance_min: 1e8,
            initial_resistance_max: 1.1e8,
        }
    }
}

/// Resistance law, selected by the `model` key
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum LawConfig {
    OneDirectionalPowerLaw(PowerLawConfig),
    BidirectionalPowerLaw(BidirectionalPowerLawConfig),
    UnidirectionalEmpirical(EmpiricalConfig),
    BidirectionalEmpirical(BidirectionalEmpiricalConfig),
}

impl Default for LawConfig {
    fn default() -> Self {
        LawConfig::UnidirectionalEmpirical(EmpiricalConfig::default())
    }
}

impl LawConfig {
    /// `(r_0, r_1)` of the selected law
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            LawConfig::OneDirectionalPowerLaw(p) => (p.r_0, p.r_1),
            LawConfig::BidirectionalPowerLaw(p) => (p.r_0, p.r_1),
            LawConfig::UnidirectionalEmpirical(p) => (p.r_0, p.r_1),
            LawConfig::BidirectionalEmpirical(p) => (p.r_0, p.r_1),
        }
    }

    /// Exponent of every branch the law applies when driven at `±base_voltage`
    pub fn branch_exponents(&self, base_voltage: f64) -> Vec<(&'static str, f64)> {
        match self {
            LawConfig::OneDirectionalPowerLaw(p) => vec![("a", p.a)],
            LawConfig::BidirectionalPowerLaw(p) => vec![("a", p.a), ("c", p.c)],
            LawConfig::UnidirectionalEmpirical(p) => vec![
                ("a + b·V", p.a + p.b * base_voltage),
                ("a - b·V", p.a - p.b * base_voltage),
            ],
            LawConfig::BidirectionalEmpirical(p) => vec![
                ("a + b·V", p.a + p.b * base_voltage),
                ("c + d·V", p.c + p.d * base_voltage),
            ],
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            LawConfig::OneDirectionalPowerLaw(_) => "one_directional_power_law",
            LawConfig::BidirectionalPowerLaw(_) => "bidirectional_power_law",
            LawConfig::UnidirectionalEmpirical(_) => "unidirectional_empirical",
            LawConfig::BidirectionalEmpirical(_) => "bidirectional_empirical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PowerLawConfig {
    pub a: f64,
    pub r_0: f64,
    pub r_1: f64,
}

impl Default for PowerLawConfig {
    fn default() -> Self {
        Self {
            a: -0.128,
            r_0: 100.0,
            r_1: 2.5e8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BidirectionalPowerLawConfig {
    pub a: f64,
    pub c: f64,
    pub r_0: f64,
    pub r_1: f64,
    pub r_3: f64,
}

impl Default for BidirectionalPowerLawConfig {
    fn default() -> Self {
        Self {
            a: -0.128,
            c: -0.128,
            r_0: 100.0,
            r_1: 2.5e8,
            r_3: 1e9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmpiricalConfig {
    pub r_0: f64,
    pub r_1: f64,
    pub a: f64,
    pub b: f64,
}

impl Default for EmpiricalConfig {
    fn default() -> Self {
        Self {
            r_0: 100.0,
            r_1: 2.5e8,
            a: -0.128,
            b: -0.522,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BidirectionalEmpiricalConfig {
    pub r_0: f64,
    pub r_1: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub r_3: f64,
}

impl Default for BidirectionalEmpiricalConfig {
    fn default() -> Self {
        Self {
            r_0: 100.0,
            r_1: 2.5e8,
            a: -0.128,
            b: -0.522,
            c: -0.128,
            d: -0.522,
            r_3: 1e9,
        }
    }
}

/// Signal-to-pulse-count policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizerMode {
    /// One pulse per nonzero update
    #[default]
    Single,
    /// Rank within the running observed signal range
    Levels,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuantizerConfig {
    pub mode: QuantizerMode,
    /// Number of bins (levels mode only)
    pub levels: usize,
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            mode: QuantizerMode::Single,
            levels: 10,
        }
    }
}

/// How a weight is stored in devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// One device per weight (unsigned)
    Single,
    /// Differential pair, only the device on the update's side is pulsed
    #[default]
    PlusMinus,
    /// Differential pair, both devices pulsed in opposite directions
    Complementary,
}

/// Array shape and bookkeeping
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArrayConfig {
    pub inputs: usize,
    pub outputs: usize,
    pub encoding: Encoding,
    /// Base seed for per-element derivation; random when absent
    pub seed: Option<u64>,
    /// Simulation step (seconds) used to index history by time
    pub dt: f64,
    /// Record weight/conductance/error history every call
    pub logging: bool,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            inputs: 4,
            outputs: 4,
            encoding: Encoding::PlusMinus,
            seed: None,
            dt: 0.001,
            logging: true,
        }
    }
}

/// Reference error-modulated learning rule
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleConfig {
    pub learning_rate: f64,
    /// Drives with magnitude at or below this are not applied
    pub drive_threshold: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            drive_threshold: 0.0,
        }
    }
}

/// Synthetic run driven by the `simulate_array` tool
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Total simulated time (seconds)
    pub simulation_time: f64,
    /// Learning stops after this time; defaults to 3/4 of the run
    pub learning_time: Option<f64>,
    /// Frequency of the sine input (Hz)
    pub input_frequency: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulation_time: 30.0,
            learning_time: None,
            input_frequency: 0.25,
        }
    }
}

impl SimulationConfig {
    pub fn effective_learning_time(&self) -> f64 {
        self.learning_time
            .unwrap_or_else(|| (self.simulation_time * 3.0 / 4.0).trunc())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
