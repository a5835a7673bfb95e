// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # memristor-observability
//!
//! Logging setup shared by the memristor crates and tools.
//!
//! Library crates only emit `tracing` events; binaries call [`init_logging`]
//! once, with per-crate debug flags parsed from the command line and the
//! `MEMRISTOR_DEBUG` environment variable.
//!
//! ## Features
//! - `file-logging`: JSON log files in a timestamped run folder with retention

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Crate names accepted by `--debug-<crate>`
pub const KNOWN_CRATES: &[&str] = &[
    "memristor-device",
    "memristor-array",
    "memristor-config",
    "memristor-learning",
];

/// Tracing target for a crate name (`memristor-array` -> `memristor_array`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
