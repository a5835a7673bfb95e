// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! One synapse of the array: a single device or a differential pair

use memristor_config::Encoding;
use memristor_device::{
    Device, DeviceLaw, DeviceSettings, DifferentialPair, PairPolicy, PulseQuantizer, Result,
    StateKind,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    /// Unsigned weight held by one device
    Single(Device),
    /// Signed weight held by the difference of two devices
    Pair(DifferentialPair),
}

impl ArrayElement {
    /// Build the element `encoding` calls for, seeded with `seed`
    pub fn build(
        encoding: Encoding,
        law: DeviceLaw,
        seed: u64,
        settings: &DeviceSettings,
    ) -> Result<Self> {
        Ok(match encoding {
            Encoding::Single => ArrayElement::Single(Device::new(law, seed, settings)?),
            Encoding::PlusMinus => ArrayElement::Pair(DifferentialPair::new(
                law,
                seed,
                settings,
                PairPolicy::PlusMinus,
            )?),
            Encoding::Complementary => ArrayElement::Pair(DifferentialPair::new(
                law,
                seed,
                settings,
                PairPolicy::Complementary,
            )?),
        })
    }

    /// Apply a drive and return the new weight
    pub fn pulse(&mut self, signal: f64, quantizer: &mut PulseQuantizer) -> f64 {
        match self {
            ArrayElement::Single(device) => device.pulse(signal, quantizer),
            ArrayElement::Pair(pair) => pair.pulse(signal, quantizer),
        }
    }

    /// Weight as stored in the weight matrix
    #[inline]
    pub fn state(&self) -> f64 {
        match self {
            ArrayElement::Single(device) => device.state(),
            ArrayElement::Pair(pair) => pair.state(),
        }
    }

    pub fn get_state(&self, kind: StateKind, scaled: bool, gain: f64) -> f64 {
        match self {
            ArrayElement::Single(device) => device.get_state(kind, scaled, gain),
            ArrayElement::Pair(pair) => pair.get_state(kind, scaled, gain),
        }
    }

    /// Raw conductance in siemens (difference for pairs)
    #[inline]
    pub fn conductance(&self) -> f64 {
        self.get_state(StateKind::Conductance, false, 1.0)
    }

    pub fn save_state(&mut self) {
        match self {
            ArrayElement::Single(device) => device.save_state(),
            ArrayElement::Pair(pair) => pair.save_state(),
        }
    }

    /// Devices backing this element, excitatory first
    pub fn devices(&self) -> Vec<&Device> {
        match self {
            ArrayElement::Single(device) => vec![device],
            ArrayElement::Pair(pair) => vec![pair.mem_one(), pair.mem_two()],
        }
    }
}
