// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for array operations

use memristor_device::DeviceError;

/// Error types for array construction, invocation and reporting
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArrayError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Element ({row}, {col}) out of bounds for a {rows}x{cols} array")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Unknown history selector: {0} (expected \"weights\", \"conductances\" or \"error\")")]
    UnknownSelector(String),

    #[error("No {select} history between t={start} and t={end}")]
    EmptyHistory {
        select: &'static str,
        start: f64,
        end: f64,
    },

    #[error("Invalid array configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = core::result::Result<T, ArrayError>;
