// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # memristor-learning
//!
//! Synapse layers whose weights are stored in simulated memristive devices
//! and updated by discrete voltage pulses along measured, nonlinear
//! resistance laws.
//!
//! ## Quick Start
//!
//! ```rust
//! use memristor_learning::prelude::*;
//!
//! let settings = ArraySettings::new(4, 2, Encoding::PlusMinus, DeviceLaw::default()).with_seed(7);
//! let mut array = ArrayController::new(
//!     settings,
//!     PulseQuantizer::levels(10)?,
//!     ErrorModulatedRule::new(1e-3, 0.0),
//! )?;
//!
//! // [pre activities x4, error x2, learning flag]
//! let output = array.invoke(0.0, &[0.2, 0.0, 0.7, 0.1, 0.3, -0.3, 1.0])?;
//! assert_eq!(output.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  memristor-config / memristor-observability             │
//! │  (TOML + overrides, logging setup)                      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  memristor-device                                       │
//! │  (PulseQuantizer, resistance laws, Device, pairs)       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  memristor-array                                        │
//! │  (ArrayController, LearningRule, history)               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Feature Flags
//!
//! - **`file-logging`**: JSON log files per run (see `memristor-observability`)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use memristor_array as array;
pub use memristor_config as config;
pub use memristor_device as device;
pub use memristor_observability as observability;

pub mod simulation;

/// Prelude with the types most runs need
pub mod prelude {
    pub use memristor_array::{
        ArrayController, ArrayElement, ArrayError, ArrayHandle, ArraySettings, ErrorModulatedRule,
        ErrorSignal, HistorySelect, LearningRule, Phase, ReadOnlyRule, Stats,
    };
    pub use memristor_config::{Encoding, MemristorConfig};
    pub use memristor_device::{
        Device, DeviceLaw, DeviceSettings, DifferentialPair, PairPolicy, PulseQuantizer,
        ResistanceLaw, StateKind,
    };

    pub use crate::simulation::{run_simulation, SimulationReport};
}
