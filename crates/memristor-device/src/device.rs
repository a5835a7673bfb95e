// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Device
//!
//! A single resistive element following one [`DeviceLaw`].
//!
//! ```text
//! pulse(signal):
//!     V = sign(signal) × base_voltage
//!     repeat quantizer.convert(signal) times:
//!         n = compute_pulse_number(R, V)
//!         R = compute_resistance(n + 1, V)
//!
//! get_state(conductance, scaled):
//!     g = 1/R,  g_min = 1/r_1,  g_max = 1/r_0
//!     gain × ((g - g_min) / (g_max - g_min) + ε)
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::error::{DeviceError, Result};
use crate::laws::{DeviceLaw, ResistanceLaw};
use crate::quantizer::PulseQuantizer;
use crate::state::{StateKind, READOUT_EPSILON};

/// Drive and read-out settings shared by every device of an array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSettings {
    /// Magnitude of one update pulse (volts)
    pub base_voltage: f64,

    /// Multiplier applied to scaled read-outs
    pub gain: f64,

    /// Lower bound (inclusive) of the initial resistance draw
    pub initial_resistance_min: f64,

    /// Upper bound (exclusive) of the initial resistance draw
    pub initial_resistance_max: f64,
}

impl DeviceSettings {
    pub fn with_values(base_voltage: f64, gain: f64) -> Self {
        Self {
            base_voltage,
            gain,
            ..Self::default()
        }
    }

    fn validate_range(&self) -> Result<()> {
        let (low, high) = (self.initial_resistance_min, self.initial_resistance_max);
        if !(low.is_finite() && high.is_finite() && low > 0.0 && low < high) {
            return Err(DeviceError::InvalidResistanceRange { low, high });
        }
        Ok(())
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            base_voltage: 1e-1,
            gain: 1e5,
            initial_resistance_min: 1e8,
            initial_resistance_max: 1.1e8,
        }
    }
}

/// One memristive element
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    law: DeviceLaw,
    r_curr: f64,
    base_voltage: f64,
    gain: f64,
    history: Vec<f64>,
}

impl Device {
    /// Create a device with a seeded random initial resistance
    pub fn new(law: DeviceLaw, seed: u64, settings: &DeviceSettings) -> Result<Self> {
        settings.validate_range()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let resistance =
            rng.gen_range(settings.initial_resistance_min..settings.initial_resistance_max);
        Self::with_resistance(law, resistance, settings)
    }

    /// Create a device at a known resistance
    ///
    /// Fails when a branch exponent of `law` is not negative at
    /// `settings.base_voltage`.
    pub fn with_resistance(law: DeviceLaw, resistance: f64, settings: &DeviceSettings) -> Result<Self> {
        if !(settings.base_voltage.is_finite() && settings.base_voltage > 0.0) {
            return Err(DeviceError::InvalidParameter(format!(
                "base voltage must be finite and positive, got {}",
                settings.base_voltage
            )));
        }
        law.validate_drive(settings.base_voltage)?;
        let (low, high) = law.feasible_range();
        if !(resistance.is_finite() && resistance > low && resistance < high) {
            return Err(DeviceError::InvalidParameter(format!(
                "{}: initial resistance {} outside feasible range ({}, {})",
                law.law_name(),
                resistance,
                low,
                high
            )));
        }
        Ok(Self {
            law,
            r_curr: resistance,
            base_voltage: settings.base_voltage,
            gain: settings.gain,
            history: Vec::new(),
        })
    }

    /// Apply a pulse train for `signal` and return the scaled conductance
    ///
    /// A zero signal applies nothing and still reports the current state.
    pub fn pulse(&mut self, signal: f64, quantizer: &mut PulseQuantizer) -> f64 {
        if signal == 0.0 || signal.is_nan() {
            return self.state();
        }

        let voltage = signal.signum() * self.base_voltage;
        let pulses = quantizer.convert(signal);
        let before = self.r_curr;

        for _ in 0..pulses {
            let next = self.law.advance(self.r_curr, voltage);
            debug_assert!(
                self.is_feasible(next),
                "{} left its feasible range: {} -> {} at V={}",
                self.law.law_name(),
                self.r_curr,
                next,
                voltage
            );
            self.r_curr = next;
        }

        trace!(
            "[DEVICE] signal={:.3e} V={:+.3} pulses={} R {:.4e} -> {:.4e}",
            signal,
            voltage,
            pulses,
            before,
            self.r_curr
        );

        self.state()
    }

    /// Read-out of `kind`, optionally normalized to the law's bounds, times `gain`
    pub fn get_state(&self, kind: StateKind, scaled: bool, gain: f64) -> f64 {
        let (r_0, r_1) = self.law.scaling_bounds();
        let value = match (kind, scaled) {
            (StateKind::Conductance, true) => {
                let g_curr = 1.0 / self.r_curr;
                let g_min = 1.0 / r_1;
                let g_max = 1.0 / r_0;
                (g_curr - g_min) / (g_max - g_min)
            }
            (StateKind::Conductance, false) => 1.0 / self.r_curr,
            (StateKind::Resistance, true) => (self.r_curr - r_0) / (r_1 - r_0),
            (StateKind::Resistance, false) => self.r_curr,
        };
        gain * (value + READOUT_EPSILON)
    }

    /// Scaled conductance at the device's own gain
    #[inline]
    pub fn state(&self) -> f64 {
        self.get_state(StateKind::Conductance, true, self.gain)
    }

    /// Append the current resistance to the history
    pub fn save_state(&mut self) {
        self.history.push(self.r_curr);
    }

    pub fn resistance(&self) -> f64 {
        self.r_curr
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn law(&self) -> &DeviceLaw {
        &self.law
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn base_voltage(&self) -> f64 {
        self.base_voltage
    }

    #[inline]
    fn is_feasible(&self, resistance: f64) -> bool {
        let (low, high) = self.law.feasible_range();
        !resistance.is_nan() && resistance > low && resistance < high
    }
}
