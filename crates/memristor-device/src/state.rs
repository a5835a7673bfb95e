// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Read-out selectors

use core::fmt;
use core::str::FromStr;

use crate::error::DeviceError;

/// Machine epsilon added to every read-out so scaled values stay strictly
/// positive at saturation.
pub const READOUT_EPSILON: f64 = f64::EPSILON;

/// Physical quantity reported by `get_state`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Resistance,
    Conductance,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Resistance => "resistance",
            StateKind::Conductance => "conductance",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateKind {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resistance" => Ok(StateKind::Resistance),
            "conductance" => Ok(StateKind::Conductance),
            other => Err(DeviceError::UnknownSelector(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_selectors() {
        assert_eq!("resistance".parse::<StateKind>(), Ok(StateKind::Resistance));
        assert_eq!("conductance".parse::<StateKind>(), Ok(StateKind::Conductance));
    }

    #[test]
    fn test_unknown_selector_is_an_error() {
        assert_eq!(
            "Conductance".parse::<StateKind>(),
            Err(DeviceError::UnknownSelector("Conductance".to_string()))
        );
    }
}
