// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for device operations

/// Error types for device construction and read-out
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeviceError {
    #[error("Unknown state selector: {0} (expected \"resistance\" or \"conductance\")")]
    UnknownSelector(String),

    #[error("Invalid law parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid initial resistance range: [{low}, {high})")]
    InvalidResistanceRange { low: f64, high: f64 },

    #[error("Pulse quantizer needs between 1 and 4294967295 levels, got {0}")]
    InvalidLevels(usize),
}

pub type Result<T> = core::result::Result<T, DeviceError>;
pub type Error = DeviceError;
