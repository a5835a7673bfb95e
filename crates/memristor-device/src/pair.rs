// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Differential Pair
//!
//! One signed weight stored as the difference of two unsigned devices:
//!
//! ```text
//! w = state(mem_one) - state(mem_two)
//!
//! PlusMinus:       s > 0  ->  mem_one.pulse(s)
//!                  s < 0  ->  mem_two.pulse(-s)
//!
//! Complementary:   s != 0 ->  mem_one.pulse(s), mem_two.pulse(-s)
//! ```

use core::fmt;
use core::str::FromStr;

use crate::device::{Device, DeviceSettings};
use crate::error::{DeviceError, Result};
use crate::laws::DeviceLaw;
use crate::quantizer::PulseQuantizer;
use crate::state::StateKind;

/// Which device(s) of a pair receive pulses for a signed update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PairPolicy {
    /// Only the device on the update's side is pulsed
    #[default]
    PlusMinus,

    /// Both devices are pulsed every call, in opposite directions
    Complementary,
}

impl fmt::Display for PairPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairPolicy::PlusMinus => f.write_str("plus_minus"),
            PairPolicy::Complementary => f.write_str("complementary"),
        }
    }
}

impl FromStr for PairPolicy {
    type Err = DeviceError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "plus_minus" => Ok(PairPolicy::PlusMinus),
            "complementary" => Ok(PairPolicy::Complementary),
            other => Err(DeviceError::UnknownSelector(other.to_string())),
        }
    }
}

/// Excitatory/inhibitory device pair encoding one signed weight
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialPair {
    mem_one: Device,
    mem_two: Device,
    policy: PairPolicy,
}

impl DifferentialPair {
    /// Create a pair whose devices are both seeded with `seed`
    ///
    /// Identical seeds give identical initial resistances, so a fresh pair
    /// encodes a weight of zero.
    pub fn new(
        law: DeviceLaw,
        seed: u64,
        settings: &DeviceSettings,
        policy: PairPolicy,
    ) -> Result<Self> {
        Ok(Self {
            mem_one: Device::new(law, seed, settings)?,
            mem_two: Device::new(law, seed, settings)?,
            policy,
        })
    }

    pub fn from_devices(mem_one: Device, mem_two: Device, policy: PairPolicy) -> Self {
        Self {
            mem_one,
            mem_two,
            policy,
        }
    }

    /// Apply a signed update and return the resulting weight
    pub fn pulse(&mut self, signal: f64, quantizer: &mut PulseQuantizer) -> f64 {
        match self.policy {
            PairPolicy::PlusMinus => {
                if signal > 0.0 {
                    self.mem_one.pulse(signal, quantizer);
                } else if signal < 0.0 {
                    self.mem_two.pulse(-signal, quantizer);
                }
            }
            PairPolicy::Complementary => {
                if signal != 0.0 && !signal.is_nan() {
                    self.mem_one.pulse(signal, quantizer);
                    self.mem_two.pulse(-signal, quantizer);
                }
            }
        }
        self.state()
    }

    /// Difference of the two devices' read-outs
    pub fn get_state(&self, kind: StateKind, scaled: bool, gain: f64) -> f64 {
        self.mem_one.get_state(kind, scaled, gain) - self.mem_two.get_state(kind, scaled, gain)
    }

    /// Signed weight at the devices' own gain
    #[inline]
    pub fn state(&self) -> f64 {
        self.mem_one.state() - self.mem_two.state()
    }

    pub fn save_state(&mut self) {
        self.mem_one.save_state();
        self.mem_two.save_state();
    }

    pub fn policy(&self) -> PairPolicy {
        self.policy
    }

    /// Excitatory device
    pub fn mem_one(&self) -> &Device {
        &self.mem_one
    }

    /// Inhibitory device
    pub fn mem_two(&self) -> &Device {
        &self.mem_two
    }
}
