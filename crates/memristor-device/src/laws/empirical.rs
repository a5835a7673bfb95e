// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Empirical Voltage-Dependent Laws
//!
//! Fits where the exponent itself depends on the applied voltage:
//!
//! ```text
//! Unidirectional (either polarity):
//!     R(n) = r_0 + r_1 · n^(a + b·V)
//!
//! Bidirectional:
//!     V > 0:  R(n) = r_0 + r_1 · n^(a + b·V)
//!     V < 0:  R(n) = r_3 - r_3 · n^(c + d·|V|)
//! ```
//!
//! Default constants come from measurements on a single device family
//! (`r_0 = 100 Ω`, `r_1 = 2.5e8 Ω`, `a = -0.128`, `b = -0.522`).

use super::{validate_bounds, validate_exponent, LawParameters, ResistanceLaw, DEFAULT_UPPER_ANCHOR};
use crate::error::{DeviceError, Result};

/// Single voltage-dependent exponent shared by both polarities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmpiricalParameters {
    pub r_0: f64,
    pub r_1: f64,
    pub a: f64,
    pub b: f64,
}

impl EmpiricalParameters {
    pub fn new(r_0: f64, r_1: f64, a: f64, b: f64) -> Self {
        Self { r_0, r_1, a, b }
    }

    #[inline]
    fn exponent(&self, voltage: f64) -> f64 {
        self.a + self.b * voltage
    }
}

impl Default for EmpiricalParameters {
    fn default() -> Self {
        Self {
            r_0: 100.0,
            r_1: 2.5e8,
            a: -0.128,
            b: -0.522,
        }
    }
}

impl ResistanceLaw for EmpiricalParameters {
    fn law_name(&self) -> &'static str {
        "Unidirectional empirical law"
    }

    #[inline]
    fn compute_pulse_number(&self, resistance: f64, voltage: f64) -> Option<f64> {
        Some(((resistance - self.r_0) / self.r_1).powf(1.0 / self.exponent(voltage)))
    }

    #[inline]
    fn compute_resistance(&self, pulse_number: f64, voltage: f64) -> Option<f64> {
        Some(self.r_0 + self.r_1 * pulse_number.powf(self.exponent(voltage)))
    }

    fn scaling_bounds(&self) -> (f64, f64) {
        (self.r_0, self.r_1)
    }

    fn feasible_range(&self) -> (f64, f64) {
        (self.r_0, f64::INFINITY)
    }
}

impl LawParameters for EmpiricalParameters {
    fn validate(&self) -> Result<()> {
        let law = self.law_name();
        validate_bounds(law, self.r_0, self.r_1)?;
        validate_exponent(law, "a", self.a)?;
        if !self.b.is_finite() {
            return Err(DeviceError::InvalidParameter(format!(
                "{law}: b must be finite, got {}",
                self.b
            )));
        }
        Ok(())
    }

    fn branch_exponents(&self, base_voltage: f64) -> Vec<(&'static str, f64)> {
        vec![
            ("a + b·V", self.exponent(base_voltage)),
            ("a - b·V", self.exponent(-base_voltage)),
        ]
    }
}

/// Independent voltage-dependent exponents per polarity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidirectionalEmpiricalParameters {
    pub r_0: f64,
    pub r_1: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,

    /// Upper anchor of the negative branch
    pub r_3: f64,
}

impl BidirectionalEmpiricalParameters {
    pub fn new(r_0: f64, r_1: f64, a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            r_0,
            r_1,
            a,
            b,
            c,
            d,
            r_3: DEFAULT_UPPER_ANCHOR,
        }
    }

    pub fn with_upper_anchor(mut self, r_3: f64) -> Self {
        self.r_3 = r_3;
        self
    }
}

impl Default for BidirectionalEmpiricalParameters {
    fn default() -> Self {
        Self::new(100.0, 2.5e8, -0.128, -0.522, -0.128, -0.522)
    }
}

impl ResistanceLaw for BidirectionalEmpiricalParameters {
    fn law_name(&self) -> &'static str {
        "Bidirectional empirical law"
    }

    #[inline]
    fn compute_pulse_number(&self, resistance: f64, voltage: f64) -> Option<f64> {
        if voltage >= 0.0 {
            let exponent = self.a + self.b * voltage;
            Some(((resistance - self.r_0) / self.r_1).powf(1.0 / exponent))
        } else {
            let exponent = self.c + self.d * -voltage;
            Some(((self.r_3 - resistance) / self.r_3).powf(1.0 / exponent))
        }
    }

    #[inline]
    fn compute_resistance(&self, pulse_number: f64, voltage: f64) -> Option<f64> {
        if voltage > 0.0 {
            Some(self.r_0 + self.r_1 * pulse_number.powf(self.a + self.b * voltage))
        } else if voltage < 0.0 {
            Some(self.r_3 - self.r_3 * pulse_number.powf(self.c + self.d * -voltage))
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

impl LawParameters for BidirectionalEmpiricalParameters {
    fn validate(&self) -> Result<()> {
        let law = self.law_name();
        validate_bounds(law, self.r_0, self.r_1)?;
        validate_exponent(law, "a", self.a)?;
        validate_exponent(law, "c", self.c)?;
        if !(self.b.is_finite() && self.d.is_finite()) {
            return Err(DeviceError::InvalidParameter(format!(
                "{law}: b and d must be finite, got b={} d={}",
                self.b, self.d
            )));
        }
        if !(self.r_3.is_finite() && self.r_3 > self.r_0) {
            return Err(DeviceError::InvalidParameter(format!(
                "{law}: r_3 must be finite and greater than r_0, got {}",
                self.r_3
            )));
        }
        Ok(())
    }

    fn branch_exponents(&self, base_voltage: f64) -> Vec<(&'static str, f64)> {
        vec![
            ("a + b·V", self.a + self.b * base_voltage),
            ("c + d·V", self.c + self.d * base_voltage),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponent_depends_on_voltage() {
        let law = EmpiricalParameters::default();
        let weak = law.compute_resistance(10.0, 0.05).unwrap();
        let strong = law.compute_resistance(10.0, 0.2).unwrap();
        // Larger drive -> more negative exponent -> lower resistance at the same n
        assert!(strong < weak);
    }

    #[test]
    fn test_unidirectional_moves_same_way_for_both_polarities() {
        let law = EmpiricalParameters::default();
        let start = 1.05e8;
        assert!(law.advance(start, 0.1) < start);
        assert!(law.advance(start, -0.1) < start);
    }

    #[test]
    fn test_roundtrip() {
        let law = EmpiricalParameters::default();
        let r = law.compute_resistance(3.5, 0.1).unwrap();
        let n = law.compute_pulse_number(r, 0.1).unwrap();
        assert!((n - 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_bidirectional_branches() {
        let law = BidirectionalEmpiricalParameters::default();
        let start = 1.05e8;

        let down = law.advance(start, 0.1);
        assert!(down < start);

        let up = law.advance(start, -0.1);
        assert!(up > start);
        assert!(up < law.r_3);

        assert!(law.compute_resistance(4.0, 0.0).is_none());
    }

    #[test]
    fn test_validation() {
        assert!(EmpiricalParameters::default().validate().is_ok());
        assert!(BidirectionalEmpiricalParameters::default().validate().is_ok());
        assert!(EmpiricalParameters::new(100.0, 2.5e8, -0.1, f64::NAN)
            .validate()
            .is_err());
        assert!(BidirectionalEmpiricalParameters::default()
            .with_upper_anchor(f64::INFINITY)
            .validate()
            .is_err());
    }
}
