// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Power-Law Devices
//!
//! ```text
//! Positive branch (V > 0):
//!     R(n) = r_0 + r_1 · n^a
//!     n(R) = ((R - r_0) / r_1)^(1/a)
//!
//! Negative branch (V < 0, bidirectional only):
//!     R(n) = r_3 - r_3 · n^c
//!     n(R) = ((r_3 - R) / r_3)^(1/c)
//! ```
//!
//! With negative exponents the positive branch drives resistance down towards
//! `r_0` and the negative branch drives it up towards `r_3`; neither bound is
//! reached after any finite number of pulses.

use super::{validate_bounds, validate_exponent, LawParameters, ResistanceLaw, DEFAULT_UPPER_ANCHOR};
use crate::error::{DeviceError, Result};

/// Power law that only moves resistance under positive voltage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawParameters {
    /// Exponent of the positive branch
    pub a: f64,

    /// Asymptotic low resistance
    pub r_0: f64,

    /// Resistance scale (and upper normalization bound)
    pub r_1: f64,
}

impl PowerLawParameters {
    pub fn new(a: f64, r_0: f64, r_1: f64) -> Self {
        Self { a, r_0, r_1 }
    }
}

impl Default for PowerLawParameters {
    fn default() -> Self {
        Self {
            a: -0.128,
            r_0: 100.0,
            r_1: 2.5e8,
        }
    }
}

impl ResistanceLaw for PowerLawParameters {
    fn law_name(&self) -> &'static str {
        "One-directional power law"
    }

    #[inline]
    fn compute_pulse_number(&self, resistance: f64, voltage: f64) -> Option<f64> {
        (voltage >= 0.0).then(|| ((resistance - self.r_0) / self.r_1).powf(1.0 / self.a))
    }

    #[inline]
    fn compute_resistance(&self, pulse_number: f64, voltage: f64) -> Option<f64> {
        (voltage > 0.0).then(|| self.r_0 + self.r_1 * pulse_number.powf(self.a))
    }

    fn scaling_bounds(&self) -> (f64, f64) {
        (self.r_0, self.r_1)
    }

    fn feasible_range(&self) -> (f64, f64) {
        (self.r_0, f64::INFINITY)
    }
}

impl LawParameters for PowerLawParameters {
    fn validate(&self) -> Result<()> {
        let law = self.law_name();
        validate_bounds(law, self.r_0, self.r_1)?;
        validate_exponent(law, "a", self.a)
    }

    fn branch_exponents(&self, _base_voltage: f64) -> Vec<(&'static str, f64)> {
        vec![("a", self.a)]
    }
}

/// Power law with independent increasing and decreasing branches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidirectionalPowerLawParameters {
    /// Exponent of the positive branch
    pub a: f64,

    /// Exponent of the negative branch
    pub c: f64,

    pub r_0: f64,
    pub r_1: f64,

    /// Upper anchor of the negative branch
    pub r_3: f64,
}

impl BidirectionalPowerLawParameters {
    pub fn new(a: f64, c: f64, r_0: f64, r_1: f64) -> Self {
        Self {
            a,
            c,
            r_0,
            r_1,
            r_3: DEFAULT_UPPER_ANCHOR,
        }
    }

    pub fn with_upper_anchor(mut self, r_3: f64) -> Self {
        self.r_3 = r_3;
        self
    }
}

impl Default for BidirectionalPowerLawParameters {
    fn default() -> Self {
        Self::new(-0.128, -0.128, 100.0, 2.5e8)
    }
}

impl ResistanceLaw for BidirectionalPowerLawParameters {
    fn law_name(&self) -> &'static str {
        "Bidirectional power law"
    }

    #[inline]
    fn compute_pulse_number(&self, resistance: f64, voltage: f64) -> Option<f64> {
        if voltage >= 0.0 {
            Some(((resistance - self.r_0) / self.r_1).powf(1.0 / self.a))
        } else {
            Some(((self.r_3 - resistance) / self.r_3).powf(1.0 / self.c))
        }
    }

    #[inline]
    fn compute_resistance(&self, pulse_number: f64, voltage: f64) -> Option<f64> {
        if voltage > 0.0 {
            Some(self.r_0 + self.r_1 * pulse_number.powf(self.a))
        } else if voltage < 0.0 {
            Some(self.r_3 - self.r_3 * pulse_number.powf(self.c))
        } else {
            None
        }
    }

    fn scaling_bounds(&self) -> (f64, f64) {
        (self.r_0, self.r_1)
    }

    fn feasible_range(&self) -> (f64, f64) {
        (self.r_0, self.r_3)
    }
}

impl LawParameters for BidirectionalPowerLawParameters {
    fn validate(&self) -> Result<()> {
        let law = self.law_name();
        validate_bounds(law, self.r_0, self.r_1)?;
        validate_exponent(law, "a", self.a)?;
        validate_exponent(law, "c", self.c)?;
        if !(self.r_3.is_finite() && self.r_3 > self.r_0) {
            return Err(DeviceError::InvalidParameter(format!(
                "{law}: r_3 must be finite and greater than r_0, got {}",
                self.r_3
            )));
        }
        Ok(())
    }

    fn branch_exponents(&self, _base_voltage: f64) -> Vec<(&'static str, f64)> {
        vec![("a", self.a), ("c", self.c)]
    }
}
