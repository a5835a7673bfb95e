// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Resistance Law Architecture
//!
//! Every device follows a closed-form, monotone resistance law fitted to
//! measured device data. A law is described by two pure functions:
//!
//! ```text
//! compute_pulse_number(R, V) -> n     (inverse: where on the curve is R?)
//! compute_resistance(n, V)   -> R     (forward: resistance after n pulses)
//! ```
//!
//! A pulse inverts the current resistance to its pulse number `n` and then
//! evaluates the forward law at `n + 1`. No pulse counter is stored, so pulses
//! of either polarity can be interleaved and each one resumes the correct
//! branch from wherever the resistance currently sits.
//!
//! Either function returns `None` when the law has no branch for the applied
//! voltage; the pulse is then a no-op.
//!
//! ## Adding a New Law
//!
//! 1. Add a parameter struct in `power_law.rs` or `empirical.rs`
//! 2. Implement `ResistanceLaw` and `LawParameters` for it
//! 3. Add a `DeviceLaw` variant and extend the dispatch below
//! 4. Add tests

pub mod empirical;
pub mod power_law;

pub use empirical::{BidirectionalEmpiricalParameters, EmpiricalParameters};
pub use power_law::{BidirectionalPowerLawParameters, PowerLawParameters};

use crate::error::{DeviceError, Result};

/// Upper resistance anchor of the decreasing-conductance branch of the
/// bidirectional laws.
pub const DEFAULT_UPPER_ANCHOR: f64 = 1e9;

/// Pure resistance-update law of a device
pub trait ResistanceLaw {
    /// Human-readable law name
    fn law_name(&self) -> &'static str;

    /// Pulse number at which the law reaches `resistance` under `voltage`
    fn compute_pulse_number(&self, resistance: f64, voltage: f64) -> Option<f64>;

    /// Resistance reached after `pulse_number` pulses under `voltage`
    fn compute_resistance(&self, pulse_number: f64, voltage: f64) -> Option<f64>;

    /// `(r_0, r_1)` used to normalize resistance and conductance read-outs
    fn scaling_bounds(&self) -> (f64, f64);

    /// Open interval of resistances the law can produce
    fn feasible_range(&self) -> (f64, f64);

    /// Resistance after one more pulse from `resistance`
    ///
    /// Unchanged when either branch is missing for `voltage`.
    #[inline]
    fn advance(&self, resistance: f64, voltage: f64) -> f64 {
        match self.compute_pulse_number(resistance, voltage) {
            Some(n) => self
                .compute_resistance(n + 1.0, voltage)
                .unwrap_or(resistance),
            None => resistance,
        }
    }
}

/// Validation of law-specific parameters
pub trait LawParameters: ResistanceLaw {
    fn validate(&self) -> Result<()>;

    /// Exponent of every branch the law applies when driven at `±base_voltage`
    fn branch_exponents(&self, base_voltage: f64) -> Vec<(&'static str, f64)>;

    /// [`validate`](LawParameters::validate), then require every branch
    /// exponent to be negative at `base_voltage`
    ///
    /// A non-negative exponent moves resistance away from its anchor and out
    /// of the feasible range within a few pulses.
    fn validate_drive(&self, base_voltage: f64) -> Result<()> {
        self.validate()?;
        for (branch, exponent) in self.branch_exponents(base_voltage) {
            if exponent.is_nan() || exponent >= 0.0 {
                return Err(DeviceError::InvalidParameter(format!(
                    "{}: exponent {} must be negative at V={}, got {}",
                    self.law_name(),
                    branch,
                    base_voltage,
                    exponent
                )));
            }
        }
        Ok(())
    }
}

/// Closed set of supported device laws
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceLaw {
    /// `R = r_0 + r_1 n^a` under positive voltage, no-op otherwise
    OneDirectionalPowerLaw(PowerLawParameters),

    /// Power law with an independent branch anchored at `r_3` for negative voltage
    BidirectionalPowerLaw(BidirectionalPowerLawParameters),

    /// `R = r_0 + r_1 n^(a + bV)` for either polarity
    UnidirectionalEmpirical(EmpiricalParameters),

    /// Voltage-dependent exponents per polarity, each anchored at its own bound
    BidirectionalEmpirical(BidirectionalEmpiricalParameters),
}

impl DeviceLaw {
    /// Validate the parameters of the wrapped law
    pub fn validate(&self) -> Result<()> {
        match self {
            DeviceLaw::OneDirectionalPowerLaw(p) => p.validate(),
            DeviceLaw::BidirectionalPowerLaw(p) => p.validate(),
            DeviceLaw::UnidirectionalEmpirical(p) => p.validate(),
            DeviceLaw::BidirectionalEmpirical(p) => p.validate(),
        }
    }

    /// Validate the parameters and the branch exponents at `base_voltage`
    pub fn validate_drive(&self, base_voltage: f64) -> Result<()> {
        match self {
            DeviceLaw::OneDirectionalPowerLaw(p) => p.validate_drive(base_voltage),
            DeviceLaw::BidirectionalPowerLaw(p) => p.validate_drive(base_voltage),
            DeviceLaw::UnidirectionalEmpirical(p) => p.validate_drive(base_voltage),
            DeviceLaw::BidirectionalEmpirical(p) => p.validate_drive(base_voltage),
        }
    }
}

impl Default for DeviceLaw {
    fn default() -> Self {
        DeviceLaw::UnidirectionalEmpirical(EmpiricalParameters::default())
    }
}

impl ResistanceLaw for DeviceLaw {
    fn law_name(&self) -> &'static str {
        match self {
            DeviceLaw::OneDirectionalPowerLaw(p) => p.law_name(),
            DeviceLaw::BidirectionalPowerLaw(p) => p.law_name(),
            DeviceLaw::UnidirectionalEmpirical(p) => p.law_name(),
            DeviceLaw::BidirectionalEmpirical(p) => p.law_name(),
        }
    }

    #[inline]
    fn compute_pulse_number(&self, resistance: f64, voltage: f64) -> Option<f64> {
        match self {
            DeviceLaw::OneDirectionalPowerLaw(p) => p.compute_pulse_number(resistance, voltage),
            DeviceLaw::BidirectionalPowerLaw(p) => p.compute_pulse_number(resistance, voltage),
            DeviceLaw::UnidirectionalEmpirical(p) => p.compute_pulse_number(resistance, voltage),
            DeviceLaw::BidirectionalEmpirical(p) => p.compute_pulse_number(resistance, voltage),
        }
    }

    #[inline]
    fn compute_resistance(&self, pulse_number: f64, voltage: f64) -> Option<f64> {
        match self {
            DeviceLaw::OneDirectionalPowerLaw(p) => p.compute_resistance(pulse_number, voltage),
            DeviceLaw::BidirectionalPowerLaw(p) => p.compute_resistance(pulse_number, voltage),
            DeviceLaw::UnidirectionalEmpirical(p) => p.compute_resistance(pulse_number, voltage),
            DeviceLaw::BidirectionalEmpirical(p) => p.compute_resistance(pulse_number, voltage),
        }
    }

    fn scaling_bounds(&self) -> (f64, f64) {
        match self {
            DeviceLaw::OneDirectionalPowerLaw(p) => p.scaling_bounds(),
            DeviceLaw::BidirectionalPowerLaw(p) => p.scaling_bounds(),
            DeviceLaw::UnidirectionalEmpirical(p) => p.scaling_bounds(),
            DeviceLaw::BidirectionalEmpirical(p) => p.scaling_bounds(),
        }
    }

    fn feasible_range(&self) -> (f64, f64) {
        match self {
            DeviceLaw::OneDirectionalPowerLaw(p) => p.feasible_range(),
            DeviceLaw::BidirectionalPowerLaw(p) => p.feasible_range(),
            DeviceLaw::UnidirectionalEmpirical(p) => p.feasible_range(),
            DeviceLaw::BidirectionalEmpirical(p) => p.feasible_range(),
        }
    }
}

/// Shared checks for the `(r_0, r_1)` pair every law carries
pub(crate) fn validate_bounds(law: &str, r_0: f64, r_1: f64) -> Result<()> {
    if !(r_0.is_finite() && r_0 > 0.0) {
        return Err(DeviceError::InvalidParameter(format!(
            "{law}: r_0 must be finite and positive, got {r_0}"
        )));
    }
    if !(r_1.is_finite() && r_1 > r_0) {
        return Err(DeviceError::InvalidParameter(format!(
            "{law}: r_1 must be finite and greater than r_0, got {r_1}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_exponent(law: &str, name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value == 0.0 {
        return Err(DeviceError::InvalidParameter(format!(
            "{law}: exponent {name} must be finite and nonzero, got {value}"
        )));
    }
    Ok(())
}
