// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error-modulated learning rule
//!
//! Expects `[pre activities (inputs), error (outputs), learning flag]` and,
//! on Learn ticks, drives every element with
//!
//! ```text
//! d[j, i] = -learning_rate × error[j] × pre[i]
//! ```
//!
//! Elements with `|d| <= drive_threshold` are left alone. The output is the
//! forward pass through the updated weights.

use ndarray::{s, Array1, ArrayView1};

use memristor_config::RuleConfig;

use crate::error::{ArrayError, Result};
use crate::rule::{ArrayHandle, ErrorSignal, LearningRule};

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorModulatedRule {
    learning_rate: f64,
    drive_threshold: f64,
    input_size: usize,
    output_size: usize,
    last_error: Option<Array1<f64>>,
}

impl ErrorModulatedRule {
    pub fn new(learning_rate: f64, drive_threshold: f64) -> Self {
        Self {
            learning_rate,
            drive_threshold,
            input_size: 0,
            output_size: 0,
            last_error: None,
        }
    }

    pub fn from_config(config: &RuleConfig) -> Self {
        Self::new(config.learning_rate, config.drive_threshold)
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn drive_threshold(&self) -> f64 {
        self.drive_threshold
    }

    /// Error seen on the most recent Learn tick
    pub fn last_error(&self) -> Option<ArrayView1<'_, f64>> {
        self.last_error.as_ref().map(|e| e.view())
    }
}

impl Default for ErrorModulatedRule {
    fn default() -> Self {
        Self::from_config(&RuleConfig::default())
    }
}

impl LearningRule for ErrorModulatedRule {
    fn name(&self) -> &str {
        "error_modulated"
    }

    fn bind(&mut self, input_size: usize, output_size: usize) {
        self.input_size = input_size;
        self.output_size = output_size;
        self.last_error = None;
    }

    fn has_learning_signal(&self) -> bool {
        true
    }

    fn has_error_signal(&self) -> bool {
        true
    }

    fn expected_input_len(&self) -> Option<usize> {
        Some(self.input_size + self.output_size + 1)
    }

    fn step(
        &mut self,
        _time: f64,
        activity: ArrayView1<'_, f64>,
        array: &mut ArrayHandle<'_>,
    ) -> Result<Array1<f64>> {
        let (outputs, inputs) = array.shape();
        if activity.len() != inputs + outputs {
            return Err(ArrayError::ShapeMismatch {
                what: "activities and error",
                expected: inputs + outputs,
                actual: activity.len(),
            });
        }

        let pre = activity.slice(s![..inputs]);
        let error = activity.slice(s![inputs..]);

        for (j, &e) in error.iter().enumerate() {
            if e == 0.0 {
                continue;
            }
            for (i, &a) in pre.iter().enumerate() {
                let drive = -self.learning_rate * e * a;
                if drive.abs() > self.drive_threshold {
                    array.pulse(j, i, drive)?;
                }
            }
        }

        self.last_error = Some(error.to_owned());
        array.forward(pre)
    }

    fn error_signal(&self) -> Option<ErrorSignal> {
        self.last_error.clone().map(ErrorSignal::Vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArraySettings;
    use crate::controller::ArrayController;
    use memristor_config::Encoding;
    use memristor_device::{DeviceLaw, PulseQuantizer};

    fn controller(threshold: f64) -> ArrayController<ErrorModulatedRule> {
        let settings =
            ArraySettings::new(2, 2, Encoding::PlusMinus, DeviceLaw::default()).with_seed(3);
        ArrayController::new(
            settings,
            PulseQuantizer::single(),
            ErrorModulatedRule::new(1.0, threshold),
        )
        .unwrap()
    }

    #[test]
    fn test_bind_sets_layout() {
        let c = controller(0.0);
        assert_eq!(c.rule().expected_input_len(), Some(5));
        assert!(c.rule().error_signal().is_none());
    }

    #[test]
    fn test_negative_error_raises_active_weights_only() {
        let mut c = controller(0.0);
        let before = c.weights().to_owned();

        // pre = [1, 0], error = [-1, 0], learning
        c.invoke(0.0, &[1.0, 0.0, -1.0, 0.0, 1.0]).unwrap();

        let after = c.weights();
        assert!(after[[0, 0]] > before[[0, 0]]);
        assert_eq!(after[[0, 1]], before[[0, 1]]);
        assert_eq!(after[[1, 0]], before[[1, 0]]);
        assert_eq!(after[[1, 1]], before[[1, 1]]);
    }

    #[test]
    fn test_positive_error_lowers_weight() {
        let mut c = controller(0.0);
        let before = c.weights()[[1, 1]];

        c.invoke(0.0, &[0.0, 1.0, 0.0, 2.0, 1.0]).unwrap();

        assert!(c.weights()[[1, 1]] < before);
    }

    #[test]
    fn test_threshold_suppresses_small_drives() {
        let mut c = controller(0.5);
        let before = c.weights().to_owned();

        c.invoke(0.0, &[0.1, 0.1, 1.0, 1.0, 1.0]).unwrap();

        assert_eq!(c.weights(), before.view());
    }

    #[test]
    fn test_error_exposed_after_learn_tick() {
        let mut c = controller(0.0);
        c.invoke(0.0, &[0.0, 0.0, 0.25, -0.5, 1.0]).unwrap();

        match c.rule().error_signal() {
            Some(ErrorSignal::Vector(e)) => assert_eq!(e.to_vec(), vec![0.25, -0.5]),
            other => panic!("unexpected error signal {:?}", other),
        }
    }
}
