// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Memristor Array
//!
//! A synapse layer whose weights live in memristive devices.
//!
//! - **Element**: one device (unsigned weight) or a differential pair (signed)
//! - **Controller**: owns the elements and the weight matrix, gates each tick
//!   into Learn or Infer, records history
//! - **Rule**: the learning-rule contract and the handle through which a rule
//!   pulses elements
//! - **History**: per-tick snapshots, statistics and sparsity summaries
//!
//! ## Usage
//!
//! ```rust
//! use memristor_array::{ArrayController, ArraySettings, ErrorModulatedRule};
//! use memristor_config::Encoding;
//! use memristor_device::{DeviceLaw, PulseQuantizer};
//!
//! let settings = ArraySettings::new(3, 2, Encoding::PlusMinus, DeviceLaw::default()).with_seed(1);
//! let mut array =
//!     ArrayController::new(settings, PulseQuantizer::single(), ErrorModulatedRule::default()).unwrap();
//!
//! // [pre x3, error x2, learning flag]
//! let out = array.invoke(0.0, &[1.0, 0.0, 0.5, 0.1, -0.2, 1.0]).unwrap();
//! assert_eq!(out.len(), 2);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod controller;
pub mod element;
pub mod error;
pub mod error_modulated;
pub mod history;
pub mod rule;

pub use config::{law_from_config, quantizer_from_config, ArraySettings};
pub use controller::{derive_seed, read_out, ArrayController, Phase};
pub use element::ArrayElement;
pub use error::{ArrayError, Result};
pub use error_modulated::ErrorModulatedRule;
pub use history::{magnitude, sparsity, History, HistorySelect, HistoryView, Stats};
pub use rule::{ArrayHandle, ErrorSignal, LearningRule, ReadOnlyRule};
