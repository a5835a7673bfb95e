// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, Encoding, MemristorConfig, QuantizerMode};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "memristor_configuration.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `MEMRISTOR_CONFIG_PATH` environment variable
/// 2. Current working directory: `./memristor_configuration.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("MEMRISTOR_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by MEMRISTOR_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet MEMRISTOR_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<MemristorConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: MemristorConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `MEMRISTOR_SEED` -> `array.seed`
/// - `MEMRISTOR_INPUTS` -> `array.inputs`
/// - `MEMRISTOR_OUTPUTS` -> `array.outputs`
/// - `MEMRISTOR_BASE_VOLTAGE` -> `device.base_voltage`
/// - `MEMRISTOR_GAIN` -> `device.gain`
/// - `MEMRISTOR_LEVELS` -> `quantizer.levels` (and switches to levels mode)
/// - `MEMRISTOR_LOG_LEVEL` -> `logging.level`
///
/// Unparseable values are ignored.
pub fn apply_environment_overrides(config: &mut MemristorConfig) {
    if let Ok(value) = env::var("MEMRISTOR_SEED") {
        if let Ok(seed) = value.parse::<u64>() {
            config.array.seed = Some(seed);
        }
    }
    if let Ok(value) = env::var("MEMRISTOR_INPUTS") {
        if let Ok(inputs) = value.parse::<usize>() {
            config.array.inputs = inputs;
        }
    }
    if let Ok(value) = env::var("MEMRISTOR_OUTPUTS") {
        if let Ok(outputs) = value.parse::<usize>() {
            config.array.outputs = outputs;
        }
    }

    if let Ok(value) = env::var("MEMRISTOR_BASE_VOLTAGE") {
        if let Ok(voltage) = value.parse::<f64>() {
            config.device.base_voltage = voltage;
        }
    }
    if let Ok(value) = env::var("MEMRISTOR_GAIN") {
        if let Ok(gain) = value.parse::<f64>() {
            config.device.gain = gain;
        }
    }

    if let Ok(value) = env::var("MEMRISTOR_LEVELS") {
        if let Ok(levels) = value.parse::<usize>() {
            config.quantizer.mode = QuantizerMode::Levels;
            config.quantizer.levels = levels;
        }
    }

    if let Ok(value) = env::var("MEMRISTOR_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"seed": "42", "encoding": "complementary"}`)
///
/// # Errors
///
/// Unlike environment overrides, an explicit CLI value that does not parse is
/// reported as `ConfigError::InvalidValue`.
pub fn apply_cli_overrides(
    config: &mut MemristorConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("seed") {
        config.array.seed = Some(parse_cli("seed", value)?);
    }
    if let Some(value) = cli_args.get("inputs") {
        config.array.inputs = parse_cli("inputs", value)?;
    }
    if let Some(value) = cli_args.get("outputs") {
        config.array.outputs = parse_cli("outputs", value)?;
    }
    if let Some(value) = cli_args.get("encoding") {
        config.array.encoding = match value.as_str() {
            "single" => Encoding::Single,
            "plus_minus" => Encoding::PlusMinus,
            "complementary" => Encoding::Complementary,
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "encoding: expected single, plus_minus or complementary, got {}",
                    other
                )))
            }
        };
    }

    if let Some(value) = cli_args.get("base_voltage") {
        config.device.base_voltage = parse_cli("base_voltage", value)?;
    }
    if let Some(value) = cli_args.get("gain") {
        config.device.gain = parse_cli("gain", value)?;
    }

    if let Some(value) = cli_args.get("quantizer") {
        config.quantizer.mode = match value.as_str() {
            "single" => QuantizerMode::Single,
            "levels" => QuantizerMode::Levels,
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "quantizer: expected single or levels, got {}",
                    other
                )))
            }
        };
    }
    if let Some(value) = cli_args.get("levels") {
        config.quantizer.levels = parse_cli("levels", value)?;
    }

    if let Some(value) = cli_args.get("simulation_time") {
        config.simulation.simulation_time = parse_cli("simulation_time", value)?;
    }
    if let Some(value) = cli_args.get("learning_time") {
        config.simulation.learning_time = Some(parse_cli("learning_time", value)?);
    }

    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }

    Ok(())
}

fn parse_cli<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{}: cannot parse '{}'", key, value)))
}
