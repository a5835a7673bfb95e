// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Memristive Device Models
//!
//! Everything below the array level:
//! - **Quantizer**: drive signal -> number of physical pulses
//! - **Laws**: closed-form resistance-update laws (power law, empirical fits)
//! - **Device**: one element that pulses along its law and reports its state
//! - **Pair**: two devices encoding one signed weight
//!
//! All models are pure, single-threaded and deterministic given a seed.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod device;
pub mod error;
pub mod laws;
pub mod pair;
pub mod quantizer;
pub mod state;

pub use device::{Device, DeviceSettings};
pub use error::{DeviceError, Error, Result};
pub use laws::{
    BidirectionalEmpiricalParameters, BidirectionalPowerLawParameters, DeviceLaw,
    EmpiricalParameters, LawParameters, PowerLawParameters, ResistanceLaw, DEFAULT_UPPER_ANCHOR,
};
pub use pair::{DifferentialPair, PairPolicy};
pub use quantizer::{LevelsQuantizer, PulseQuantizer};
pub use state::{StateKind, READOUT_EPSILON};
