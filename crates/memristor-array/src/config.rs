// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Conversion from [`MemristorConfig`] sections to runtime types

use memristor_config::{Encoding, LawConfig, MemristorConfig, QuantizerConfig, QuantizerMode};
use memristor_device::{
    BidirectionalEmpiricalParameters, BidirectionalPowerLawParameters, DeviceLaw, DeviceSettings,
    EmpiricalParameters, PowerLawParameters, PulseQuantizer,
};

use crate::error::Result;

/// Everything needed to build an array, apart from the quantizer and rule
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySettings {
    pub inputs: usize,
    pub outputs: usize,
    pub encoding: Encoding,
    pub law: DeviceLaw,
    pub device: DeviceSettings,
    /// Base seed; a random one is drawn when absent
    pub seed: Option<u64>,
    pub dt: f64,
    pub logging: bool,
}

impl Default for ArraySettings {
    fn default() -> Self {
        Self {
            inputs: 4,
            outputs: 4,
            encoding: Encoding::PlusMinus,
            law: DeviceLaw::default(),
            device: DeviceSettings::default(),
            seed: None,
            dt: 0.001,
            logging: true,
        }
    }
}

impl ArraySettings {
    pub fn new(inputs: usize, outputs: usize, encoding: Encoding, law: DeviceLaw) -> Self {
        Self {
            inputs,
            outputs,
            encoding,
            law,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_config(config: &MemristorConfig) -> Self {
        Self {
            inputs: config.array.inputs,
            outputs: config.array.outputs,
            encoding: config.array.encoding,
            law: law_from_config(&config.device.law),
            device: DeviceSettings {
                base_voltage: config.device.base_voltage,
                gain: config.device.gain,
                initial_resistance_min: config.device.initial_resistance_min,
                initial_resistance_max: config.device.initial_resistance_max,
            },
            seed: config.array.seed,
            dt: config.array.dt,
            logging: config.array.logging,
        }
    }
}

pub fn law_from_config(law: &LawConfig) -> DeviceLaw {
    match *law {
        LawConfig::OneDirectionalPowerLaw(p) => {
            DeviceLaw::OneDirectionalPowerLaw(PowerLawParameters::new(p.a, p.r_0, p.r_1))
        }
        LawConfig::BidirectionalPowerLaw(p) => DeviceLaw::BidirectionalPowerLaw(
            BidirectionalPowerLawParameters::new(p.a, p.c, p.r_0, p.r_1).with_upper_anchor(p.r_3),
        ),
        LawConfig::UnidirectionalEmpirical(p) => {
            DeviceLaw::UnidirectionalEmpirical(EmpiricalParameters::new(p.r_0, p.r_1, p.a, p.b))
        }
        LawConfig::BidirectionalEmpirical(p) => DeviceLaw::BidirectionalEmpirical(
            BidirectionalEmpiricalParameters::new(p.r_0, p.r_1, p.a, p.b, p.c, p.d)
                .with_upper_anchor(p.r_3),
        ),
    }
}

pub fn quantizer_from_config(config: &QuantizerConfig) -> Result<PulseQuantizer> {
    Ok(match config.mode {
        QuantizerMode::Single => PulseQuantizer::single(),
        QuantizerMode::Levels => PulseQuantizer::levels(config.levels)?,
    })
}
