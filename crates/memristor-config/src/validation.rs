// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent and within physically meaningful ranges.

use crate::{ConfigError, ConfigResult, LawConfig, MemristorConfig, QuantizerMode};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    NonPositive { field: String, value: f64 },
    EmptyDimension { field: String },
    InvalidRange { field: String, low: f64, high: f64 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "{} = {} must be finite and positive", field, value)
            }
            Self::EmptyDimension { field } => {
                write!(f, "{} must be at least 1", field)
            }
            Self::InvalidRange { field, low, high } => {
                write!(f, "{} range [{}, {}) is empty or not positive", field, low, high)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Array dimensions and time step
/// - Drive settings (voltage, gain, initial resistance range)
/// - Law bounds and exponents
/// - Quantizer level count
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &MemristorConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_array(config, &mut errors);
    validate_device(config, &mut errors);
    validate_law(&config.device.law, config.device.base_voltage, &mut errors);
    validate_quantizer(config, &mut errors);
    validate_simulation(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn require_positive(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(ConfigValidationError::NonPositive {
            field: field.to_string(),
            value,
        });
    }
}

fn require_finite(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be finite, got {}", value),
        });
    }
}

fn validate_array(config: &MemristorConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.array.inputs == 0 {
        errors.push(ConfigValidationError::EmptyDimension {
            field: "array.inputs".to_string(),
        });
    }
    if config.array.outputs == 0 {
        errors.push(ConfigValidationError::EmptyDimension {
            field: "array.outputs".to_string(),
        });
    }
    require_positive("array.dt", config.array.dt, errors);
}

fn validate_device(config: &MemristorConfig, errors: &mut Vec<ConfigValidationError>) {
    let device = &config.device;
    require_positive("device.base_voltage", device.base_voltage, errors);
    require_positive("device.gain", device.gain, errors);

    let (low, high) = (device.initial_resistance_min, device.initial_resistance_max);
    if !(low.is_finite() && high.is_finite() && low > 0.0 && low < high) {
        errors.push(ConfigValidationError::InvalidRange {
            field: "device.initial_resistance".to_string(),
            low,
            high,
        });
    }
}

fn validate_law(law: &LawConfig, base_voltage: f64, errors: &mut Vec<ConfigValidationError>) {
    let (r_0, r_1) = law.bounds();
    require_positive("device.law.r_0", r_0, errors);
    if !(r_1.is_finite() && r_1 > r_0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "device.law.r_1".to_string(),
            reason: format!("must be greater than r_0 ({}), got {}", r_0, r_1),
        });
    }

    let upper_anchor = match law {
        LawConfig::OneDirectionalPowerLaw(_) => None,
        LawConfig::BidirectionalPowerLaw(p) => Some(p.r_3),
        LawConfig::UnidirectionalEmpirical(p) => {
            require_finite("device.law.b", p.b, errors);
            None
        }
        LawConfig::BidirectionalEmpirical(p) => {
            require_finite("device.law.b", p.b, errors);
            require_finite("device.law.d", p.d, errors);
            Some(p.r_3)
        }
    };

    if let Some(r_3) = upper_anchor {
        if !(r_3.is_finite() && r_3 > r_0) {
            errors.push(ConfigValidationError::InvalidValue {
                field: "device.law.r_3".to_string(),
                reason: format!("must be greater than r_0 ({}), got {}", r_0, r_3),
            });
        }
    }

    // A non-negative exponent drives resistance out of range within a few pulses
    for (branch, exponent) in law.branch_exponents(base_voltage) {
        if exponent.is_nan() || exponent >= 0.0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("device.law ({})", branch),
                reason: format!(
                    "exponent must be negative at base_voltage {}, got {}",
                    base_voltage, exponent
                ),
            });
        }
    }
}

fn validate_quantizer(config: &MemristorConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.quantizer.mode != QuantizerMode::Levels {
        return;
    }
    if config.quantizer.levels == 0 {
        errors.push(ConfigValidationError::EmptyDimension {
            field: "quantizer.levels".to_string(),
        });
    } else if u32::try_from(config.quantizer.levels).is_err() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "quantizer.levels".to_string(),
            reason: format!("at most {} levels, got {}", u32::MAX, config.quantizer.levels),
        });
    }
}

fn validate_simulation(config: &MemristorConfig, errors: &mut Vec<ConfigValidationError>) {
    let simulation = &config.simulation;
    require_positive("simulation.simulation_time", simulation.simulation_time, errors);
    require_positive("simulation.input_frequency", simulation.input_frequency, errors);
    if let Some(learning_time) = simulation.learning_time {
        if !(learning_time.is_finite() && learning_time >= 0.0) {
            errors.push(ConfigValidationError::InvalidValue {
                field: "simulation.learning_time".to_string(),
                reason: format!("must be finite and non-negative, got {}", learning_time),
            });
        }
    }
    if !config.rule.learning_rate.is_finite() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "rule.learning_rate".to_string(),
            reason: "must be finite".to_string(),
        });
    }
    if !(config.rule.drive_threshold.is_finite() && config.rule.drive_threshold >= 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "rule.drive_threshold".to_string(),
            reason: format!("must be non-negative, got {}", config.rule.drive_threshold),
        });
    }
}
