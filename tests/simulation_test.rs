// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end runs of the sine simulation across encodings and laws

use memristor_learning::config::{
    BidirectionalEmpiricalConfig, Encoding, LawConfig, MemristorConfig, QuantizerMode,
};
use memristor_learning::simulation::run_simulation;

fn short_config(encoding: Encoding) -> MemristorConfig {
    let mut config = MemristorConfig::default();
    config.array.inputs = 4;
    config.array.outputs = 3;
    config.array.encoding = encoding;
    config.array.seed = Some(5);
    config.simulation.simulation_time = 0.4;
    config.simulation.learning_time = Some(0.3);
    config.simulation.input_frequency = 2.0;
    config
}

#[test]
fn test_report_shape_for_every_encoding() {
    for encoding in [Encoding::Single, Encoding::PlusMinus, Encoding::Complementary] {
        let report = run_simulation(&short_config(encoding)).unwrap();

        assert_eq!(report.ticks, 400);
        assert_eq!(report.inputs, 4);
        assert_eq!(report.outputs, 3);
        assert_eq!(report.seed, 5);
        assert_eq!(report.encoding, encoding);
        assert!(report.mse.is_some_and(|m| m.is_finite()));
        assert!(report.conductance_stats.is_some());
        assert!(report.weight_stats.is_some());
    }
}

#[test]
fn test_same_seed_same_report() {
    let a = run_simulation(&short_config(Encoding::PlusMinus)).unwrap();
    let b = run_simulation(&short_config(Encoding::PlusMinus)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_levels_quantizer_and_bidirectional_law() {
    let mut config = short_config(Encoding::Complementary);
    config.quantizer.mode = QuantizerMode::Levels;
    config.quantizer.levels = 8;
    config.device.law = LawConfig::BidirectionalEmpirical(BidirectionalEmpiricalConfig::default());

    let report = run_simulation(&config).unwrap();

    assert_eq!(report.law, "Bidirectional empirical law");
    assert!(report.end_sparsity.is_finite());
}

#[test]
fn test_no_learning_leaves_weights_alone() {
    let mut config = short_config(Encoding::Single);
    config.simulation.learning_time = Some(0.0);

    let report = run_simulation(&config).unwrap();

    assert_eq!(report.initial_sparsity, report.end_sparsity);
    let stats = report.weight_stats.unwrap();
    assert!(stats.min > 0.0);
}

#[test]
fn test_report_serializes() {
    let report = run_simulation(&short_config(Encoding::PlusMinus)).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["encoding"], "plus_minus");
    assert_eq!(json["ticks"], 400);
    assert!(json["weight_stats"]["mean"].is_number());
}
