// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the array controller
//!
//! Drive full arrays through Learn, Infer and delegated ticks and check the
//! weight/device synchronization and history guarantees.

use memristor_array::*;
use memristor_config::{BidirectionalEmpiricalConfig, Encoding, LawConfig, MemristorConfig, QuantizerMode};
use memristor_device::{
    BidirectionalEmpiricalParameters, DeviceError, DeviceLaw, PulseQuantizer, StateKind,
};
use ndarray::{s, Array1, ArrayView1};

/// Rule that pulses every element with a fixed drive and reports an error
/// only on even ticks
struct ScriptedRule {
    drive: f64,
    flag: bool,
    error: bool,
    inputs: usize,
    calls: usize,
}

impl ScriptedRule {
    fn new(drive: f64, flag: bool, error: bool) -> Self {
        Self {
            drive,
            flag,
            error,
            inputs: 0,
            calls: 0,
        }
    }
}

impl LearningRule for ScriptedRule {
    fn name(&self) -> &str {
        "scripted"
    }

    fn bind(&mut self, input_size: usize, _output_size: usize) {
        self.inputs = input_size;
    }

    fn has_learning_signal(&self) -> bool {
        self.flag
    }

    fn has_error_signal(&self) -> bool {
        self.error
    }

    fn step(
        &mut self,
        _time: f64,
        activity: ArrayView1<'_, f64>,
        array: &mut ArrayHandle<'_>,
    ) -> Result<Array1<f64>> {
        self.calls += 1;
        let (rows, cols) = array.shape();
        for j in 0..rows {
            for i in 0..cols {
                array.pulse(j, i, self.drive)?;
            }
        }
        array.forward(activity.slice(s![..self.inputs]))
    }

    fn error_signal(&self) -> Option<ErrorSignal> {
        if self.error && self.calls % 2 == 1 {
            Some(ErrorSignal::Scalar(self.calls as f64))
        } else {
            None
        }
    }
}

fn bidirectional() -> DeviceLaw {
    DeviceLaw::BidirectionalEmpirical(BidirectionalEmpiricalParameters::default())
}

fn array<R: LearningRule>(encoding: Encoding, rule: R) -> ArrayController<R> {
    let settings = ArraySettings::new(3, 2, encoding, bidirectional()).with_seed(2024);
    ArrayController::new(settings, PulseQuantizer::levels(10).unwrap(), rule).unwrap()
}

fn assert_in_sync<R: LearningRule>(controller: &ArrayController<R>) {
    for ((j, i), w) in controller.weights().indexed_iter() {
        let live = controller.elements()[[j, i]].state();
        assert!(
            (w - live).abs() <= f64::EPSILON * live.abs().max(1.0),
            "weights[{}, {}] = {} but element reads {}",
            j,
            i,
            w,
            live
        );
    }
}

#[test]
fn test_weights_track_devices_after_every_tick() {
    for encoding in [Encoding::Single, Encoding::PlusMinus, Encoding::Complementary] {
        let mut controller = array(encoding, ScriptedRule::new(0.3, true, false));
        for tick in 0..40 {
            let flag = if tick % 3 == 0 { 0.0 } else { 1.0 };
            let drive_sign = if tick < 20 { 1.0 } else { -1.0 };
            controller.rule_mut().drive = 0.3 * drive_sign;
            controller
                .invoke(tick as f64 * 0.001, &[0.2, 0.4, 0.6, flag])
                .unwrap();
            assert_in_sync(&controller);
        }
    }
}

#[test]
fn test_infer_is_read_only_dot_product() {
    let mut controller = array(Encoding::PlusMinus, ScriptedRule::new(1.0, true, false));
    // Learn once so the weights are not all zero
    controller.invoke(0.0, &[1.0, 1.0, 1.0, 1.0]).unwrap();
    let weights = controller.weights().to_owned();
    let devices: Vec<f64> = controller
        .components()
        .iter()
        .flat_map(|e| e.devices())
        .map(|d| d.resistance())
        .collect();

    let out = controller.invoke(0.001, &[1.0, -2.0, 0.5, 0.0]).unwrap();

    assert_eq!(controller.last_phase(), Some(Phase::Infer));
    assert_eq!(out, weights.dot(&ndarray::array![1.0, -2.0, 0.5]));
    assert_eq!(controller.weights(), weights.view());
    let after: Vec<f64> = controller
        .components()
        .iter()
        .flat_map(|e| e.devices())
        .map(|d| d.resistance())
        .collect();
    assert_eq!(devices, after);
    assert_eq!(controller.rule().calls, 1);
}

#[test]
fn test_infer_strips_error_components() {
    let mut controller = array(Encoding::PlusMinus, ScriptedRule::new(1.0, true, true));
    controller.invoke(0.0, &[1.0, 1.0, 1.0, 9.0, 9.0, 1.0]).unwrap();
    let weights = controller.weights().to_owned();

    let out = controller
        .invoke(0.001, &[0.5, 0.5, 0.5, 100.0, -100.0, 0.0])
        .unwrap();

    assert_eq!(out, weights.dot(&ndarray::array![0.5, 0.5, 0.5]));
}

#[test]
fn test_rule_without_flag_runs_every_tick() {
    let mut controller = array(Encoding::Single, ScriptedRule::new(0.2, false, false));
    for tick in 0..5 {
        controller.invoke(tick as f64, &[0.0, 0.0, 0.0]).unwrap();
    }
    assert_eq!(controller.rule().calls, 5);
    assert_eq!(controller.last_phase(), Some(Phase::Delegated));
}

#[test]
fn test_history_lengths_match_tick_count() {
    let mut controller = array(Encoding::Complementary, ScriptedRule::new(0.1, true, false));
    for tick in 0..25 {
        let flag = (tick % 2) as f64;
        controller.invoke(tick as f64 * 0.001, &[0.1, 0.2, 0.3, flag]).unwrap();
    }

    assert_eq!(controller.get_history(HistorySelect::Weights).len(), 25);
    assert_eq!(controller.get_history(HistorySelect::Conductances).len(), 25);
    for element in controller.components() {
        for device in element.devices() {
            assert_eq!(device.history().len(), 25);
        }
    }
}

#[test]
fn test_missing_error_signal_is_skipped() {
    let mut controller = array(Encoding::PlusMinus, ScriptedRule::new(0.1, true, true));
    for tick in 0..6 {
        controller
            .invoke(tick as f64 * 0.001, &[0.1, 0.1, 0.1, 0.0, 1.0])
            .unwrap();
    }

    // Errors only exist after the 1st, 3rd and 5th call
    match controller.get_history(HistorySelect::Error) {
        HistoryView::Errors(errors) => {
            assert_eq!(
                errors,
                &[
                    ErrorSignal::Scalar(1.0),
                    ErrorSignal::Scalar(3.0),
                    ErrorSignal::Scalar(5.0)
                ]
            );
        }
        HistoryView::Matrices(_) => panic!("expected error history"),
    }
    assert_eq!(controller.history().len(), 6);
}

#[test]
fn test_conductance_history_holds_raw_siemens() {
    let mut controller = array(Encoding::Single, ScriptedRule::new(0.0, false, false));
    controller.invoke(0.0, &[0.0, 0.0, 0.0]).unwrap();

    let conductances = controller.conductances_at(0.0).unwrap();
    for ((j, i), g) in conductances.indexed_iter() {
        let expected = controller.elements()[[j, i]].get_state(StateKind::Conductance, false, 1.0);
        assert!((g - expected).abs() < 1e-24);
        // initial resistance in [1e8, 1.1e8)
        assert!(*g > 1.0 / 1.1e8 && *g < 1.0001e-8);
    }
}

#[test]
fn test_stats_and_snapshots_by_time() {
    let mut controller = array(Encoding::PlusMinus, ScriptedRule::new(0.5, true, false));
    for tick in 0..10 {
        controller
            .invoke(tick as f64 * 0.001, &[1.0, 1.0, 1.0, 1.0])
            .unwrap();
    }

    let first = controller.weights_at(0.0).unwrap().to_owned();
    let last = controller.weights_at(0.0095).unwrap().to_owned();
    assert!(last.iter().zip(first.iter()).all(|(l, f)| l > f));
    assert!(controller.weights_at(0.5).is_none());

    let stats = controller
        .get_stats((0.0, 1.0), "weight".parse().unwrap())
        .unwrap();
    assert_eq!(stats.max, last.iter().cloned().fold(f64::MIN, f64::max));
    assert!(stats.min <= stats.mean && stats.mean <= stats.max);

    assert!(matches!(
        controller.get_stats((0.5, 1.0), HistorySelect::Weights),
        Err(ArrayError::EmptyHistory { .. })
    ));
}

#[test]
fn test_unknown_selector_is_rejected() {
    assert!(matches!(
        "voltage".parse::<HistorySelect>(),
        Err(ArrayError::UnknownSelector(_))
    ));
}

#[test]
fn test_shape_errors() {
    let mut controller = array(Encoding::Single, ScriptedRule::new(0.1, true, false));
    assert!(matches!(
        controller.invoke(0.0, &[1.0, 1.0, 1.0]),
        Err(ArrayError::ShapeMismatch { what: "input vector", expected: 4, actual: 3 })
    ));

    let mut with_error = array(Encoding::Single, ScriptedRule::new(0.1, true, true));
    assert!(with_error.invoke(0.0, &[1.0, 1.0, 1.0]).is_err());
    assert!(with_error.invoke(0.0, &[1.0, 1.0, 1.0, 0.0]).is_ok());
}

#[test]
fn test_logging_disabled_keeps_history_empty() {
    let mut settings = ArraySettings::new(2, 2, Encoding::Single, bidirectional()).with_seed(1);
    settings.logging = false;
    let mut controller =
        ArrayController::new(settings, PulseQuantizer::single(), ScriptedRule::new(0.1, false, true))
            .unwrap();

    controller.invoke(0.0, &[1.0, 1.0]).unwrap();

    assert!(controller.history().is_empty());
    assert!(controller.history().errors().is_empty());
    assert_eq!(controller.ticks(), 1);
}

#[test]
fn test_from_config_with_error_modulated_rule() {
    let mut config = MemristorConfig::default();
    config.array.inputs = 2;
    config.array.outputs = 1;
    config.array.seed = Some(11);
    config.quantizer.mode = QuantizerMode::Levels;
    config.quantizer.levels = 4;

    let rule = ErrorModulatedRule::from_config(&config.rule);
    let mut controller = ArrayController::from_config(&config, rule).unwrap();
    assert_eq!(controller.shape(), (1, 2));
    assert_eq!(controller.seed(), 11);

    let before = controller.weights()[[0, 0]];
    controller.invoke(0.0, &[1.0, 0.0, -50.0, 1.0]).unwrap();
    assert!(controller.weights()[[0, 0]] > before);
    assert_in_sync(&controller);

    match controller.quantizer() {
        PulseQuantizer::Levels(levels) => assert_eq!(levels.level_count(), 4),
        PulseQuantizer::Single => panic!("expected a levels quantizer"),
    }
}

#[test]
fn test_programmed_weights_drive_inference() {
    let mut controller = array(Encoding::PlusMinus, ScriptedRule::new(0.0, true, false));
    {
        let mut handle = controller.handle();
        handle.pulse(0, 0, 1.0).unwrap();
        handle.pulse(1, 2, -1.0).unwrap();
        assert_eq!(handle.pulse_count(), 2);
    }
    assert!(controller.weights()[[0, 0]] > 0.0);
    assert!(controller.weights()[[1, 2]] < 0.0);
    assert_in_sync(&controller);

    let x = [0.5, -1.0, 2.0];
    let expected = controller.weights().dot(&ArrayView1::from(&x[..]));
    let out = controller.invoke(0.0, &[x[0], x[1], x[2], 0.0]).unwrap();

    assert_eq!(out, expected);
    assert_eq!(controller.last_phase(), Some(Phase::Infer));
}

#[test]
fn test_rising_branch_exponent_refused_before_any_pulse() {
    let mut config = MemristorConfig::default();
    config.array.inputs = 1;
    config.array.outputs = 1;
    config.array.encoding = Encoding::Single;
    config.array.seed = Some(3);
    config.device.law = LawConfig::BidirectionalEmpirical(BidirectionalEmpiricalConfig {
        c: 0.128,
        ..Default::default()
    });

    assert!(memristor_config::validate_config(&config).is_err());
    let result = ArrayController::from_config(&config, ReadOnlyRule::default());
    assert!(matches!(
        result,
        Err(ArrayError::Device(DeviceError::InvalidParameter(_)))
    ));
}
