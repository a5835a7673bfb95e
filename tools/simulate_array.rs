// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Run a sine-driven learning simulation on a memristor array.
//!
//! Loads `memristor_configuration.toml` (or defaults when none is found),
//! applies environment and command-line overrides, runs the simulation and
//! prints a JSON summary on stdout. Logs go to stderr.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use tracing::{info, warn};

use memristor_learning::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config, ConfigError,
    MemristorConfig,
};
use memristor_learning::observability::{debug_flags_help, init_logging, parse_debug_flags, LogSettings};
use memristor_learning::simulation::run_simulation;

/// `--flag value` pairs accepted on the command line, and their config keys
const VALUE_FLAGS: &[(&str, &str)] = &[
    ("--seed", "seed"),
    ("--inputs", "inputs"),
    ("--outputs", "outputs"),
    ("--encoding", "encoding"),
    ("--base-voltage", "base_voltage"),
    ("--gain", "gain"),
    ("--quantizer", "quantizer"),
    ("--levels", "levels"),
    ("--simulation-time", "simulation_time"),
    ("--learning-time", "learning_time"),
    ("--log-level", "log_level"),
];

fn usage_and_exit() -> ! {
    let flags = VALUE_FLAGS
        .iter()
        .map(|(flag, _)| format!("  {flag} <value>"))
        .collect::<Vec<_>>()
        .join("\n");
    eprintln!(
        "Usage: simulate_array [--config <path>] [options]\n\n\
         Options:\n{flags}\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> (Option<PathBuf>, HashMap<String, String>) {
    let mut config_path = None;
    let mut overrides = HashMap::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config_path = Some(PathBuf::from(v));
            }
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => match VALUE_FLAGS.iter().find(|(flag, _)| *flag == other) {
                Some((_, key)) => {
                    let v = args.next().unwrap_or_else(|| usage_and_exit());
                    overrides.insert(key.to_string(), v);
                }
                None => {
                    eprintln!("Unknown argument: {other}");
                    usage_and_exit();
                }
            },
        }
    }

    (config_path, overrides)
}

/// Explicit path must exist; otherwise fall back to defaults when no file is found
fn resolve_config(
    config_path: Option<PathBuf>,
    overrides: &HashMap<String, String>,
) -> Result<(MemristorConfig, bool)> {
    match load_config(config_path.as_deref(), Some(overrides)) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound(_)) if config_path.is_none() => {
            let mut config = MemristorConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, overrides)?;
            Ok((config, false))
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn main() -> Result<()> {
    let (config_path, overrides) = parse_args();
    let (config, from_file) = resolve_config(config_path, &overrides)?;
    validate_config(&config)?;

    let debug_flags = parse_debug_flags();
    let logging = init_logging(&debug_flags, &LogSettings::with_level(config.logging.level.clone()))?;
    if let Some(dir) = logging.log_dir() {
        info!("[SIM] Writing logs to {}", dir.display());
    }

    if !from_file {
        warn!("[SIM] No configuration file found, using defaults");
    }
    info!(
        "[SIM] {}x{} array, law={}, encoding={:?}, quantizer={:?}",
        config.array.outputs,
        config.array.inputs,
        config.device.law.model_name(),
        config.array.encoding,
        config.quantizer.mode
    );

    let report = run_simulation(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
