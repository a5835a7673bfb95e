// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The configuration file shipped at the workspace root must load and
//! validate, and must agree with the built-in defaults.

use std::path::PathBuf;

use memristor_config::{validate_config, MemristorConfig};

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join("memristor_configuration.toml")
}

#[test]
fn test_sample_config_matches_defaults() {
    let content = std::fs::read_to_string(sample_path()).unwrap();
    let config: MemristorConfig = toml::from_str(&content).unwrap();

    validate_config(&config).unwrap();
    assert_eq!(config, MemristorConfig::default());
}
