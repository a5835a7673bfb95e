// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Array Controller
//!
//! Owns an `outputs × inputs` matrix of elements, the weight matrix mirroring
//! their states, the shared pulse quantizer and the bound learning rule.
//!
//! ```text
//! invoke(t, x):
//!     rule has flag:   flag = x[-1] rounded to {0, 1}
//!                      1 -> Learn:  y = rule.step(t, x[..-1])
//!                      0 -> Infer:  y = W · x[..inputs]
//!     rule has none:   Delegated:   y = rule.step(t, x)
//!
//!     if logging:      append error (if any), W, conductances
//! ```
//!
//! Only the rule, through an [`ArrayHandle`], ever pulses elements, and the
//! handle writes the new state into `W` on every pulse.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use tracing::{debug, info, warn};

use memristor_config::MemristorConfig;
use memristor_device::{PulseQuantizer, ResistanceLaw};

use crate::config::{quantizer_from_config, ArraySettings};
use crate::element::ArrayElement;
use crate::error::{ArrayError, Result};
use crate::history::{History, HistorySelect, HistoryView, Stats};
use crate::rule::{ArrayHandle, LearningRule};

/// What the controller did on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Flag was 1: the rule ran and may have pulsed elements
    Learn,
    /// Flag was 0: read-only forward pass
    Infer,
    /// Rule has no flag: the rule ran unconditionally
    Delegated,
}

impl Phase {
    /// Learning flag rounded half-to-even and clamped to `{0, 1}`
    #[inline]
    pub fn from_flag(flag: f64) -> Self {
        if flag > 0.5 {
            Phase::Learn
        } else {
            Phase::Infer
        }
    }
}

/// Per-element seed derived from the array's base seed (splitmix64)
pub fn derive_seed(base: u64, index: usize) -> u64 {
    let mut z = base.wrapping_add((index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// `weights · activity`
#[inline]
pub fn read_out(weights: ArrayView2<'_, f64>, activity: ArrayView1<'_, f64>) -> Array1<f64> {
    weights.dot(&activity)
}

pub struct ArrayController<R: LearningRule> {
    weights: Array2<f64>,
    elements: Array2<ArrayElement>,
    quantizer: PulseQuantizer,
    rule: R,
    history: History,
    dt: f64,
    logging: bool,
    seed: u64,
    ticks: usize,
    last_phase: Option<Phase>,
}

impl<R: LearningRule> ArrayController<R> {
    /// Build the element matrix, mirror its states into the weights and bind `rule`
    pub fn new(settings: ArraySettings, quantizer: PulseQuantizer, mut rule: R) -> Result<Self> {
        let ArraySettings {
            inputs,
            outputs,
            encoding,
            law,
            device,
            seed,
            dt,
            logging,
        } = settings;

        if inputs == 0 || outputs == 0 {
            return Err(ArrayError::InvalidConfig(format!(
                "array must have at least one input and one output, got {}x{}",
                outputs, inputs
            )));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ArrayError::InvalidConfig(format!(
                "dt must be finite and positive, got {}",
                dt
            )));
        }

        let seed = seed.unwrap_or_else(rand::random);

        let mut cells = Vec::with_capacity(outputs * inputs);
        for index in 0..outputs * inputs {
            cells.push(ArrayElement::build(encoding, law, derive_seed(seed, index), &device)?);
        }
        let elements = Array2::from_shape_vec((outputs, inputs), cells)
            .map_err(|e| ArrayError::InvalidConfig(e.to_string()))?;
        let weights = elements.map(ArrayElement::state);

        rule.bind(inputs, outputs);

        info!(
            "[ARRAY] {}x{} array ready: law={}, encoding={:?}, rule={}, seed={}",
            outputs,
            inputs,
            law.law_name(),
            encoding,
            rule.name(),
            seed
        );

        Ok(Self {
            weights,
            elements,
            quantizer,
            rule,
            history: History::default(),
            dt,
            logging,
            seed,
            ticks: 0,
            last_phase: None,
        })
    }

    pub fn from_config(config: &MemristorConfig, rule: R) -> Result<Self> {
        let quantizer = quantizer_from_config(&config.quantizer)?;
        Self::new(ArraySettings::from_config(config), quantizer, rule)
    }

    /// Process one simulation tick
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `input` or the rule's output has the wrong length,
    /// or whatever the rule itself reports.
    pub fn invoke(&mut self, time: f64, input: &[f64]) -> Result<Array1<f64>> {
        let (outputs, inputs) = self.weights.dim();
        let has_flag = self.rule.has_learning_signal();
        let has_error = self.rule.has_error_signal();
        self.check_input_len(input.len(), has_flag, has_error)?;

        let input = ArrayView1::from(input);
        let (phase, output) = if has_flag {
            let last = input.len() - 1;
            let activity = input.slice(s![..last]);
            match Phase::from_flag(input[last]) {
                Phase::Learn => (Phase::Learn, self.run_rule(time, activity)?),
                _ => {
                    if activity.len() < inputs {
                        return Err(ArrayError::ShapeMismatch {
                            what: "input activity",
                            expected: inputs,
                            actual: activity.len(),
                        });
                    }
                    // Error components after the activities are ignored
                    let pre = activity.slice(s![..inputs]);
                    (Phase::Infer, read_out(self.weights.view(), pre))
                }
            }
        } else {
            (Phase::Delegated, self.run_rule(time, input)?)
        };

        if output.len() != outputs {
            return Err(ArrayError::ShapeMismatch {
                what: "rule output",
                expected: outputs,
                actual: output.len(),
            });
        }
        if output.iter().any(|v| !v.is_finite()) {
            warn!("[ARRAY] t={:.4}: non-finite output from {}", time, self.rule.name());
        }

        if self.last_phase != Some(phase) {
            debug!("[ARRAY] t={:.4}: entering {:?}", time, phase);
        }
        self.last_phase = Some(phase);
        self.ticks += 1;

        if self.logging {
            self.record(time);
        }

        Ok(output)
    }

    fn check_input_len(&self, actual: usize, has_flag: bool, has_error: bool) -> Result<()> {
        let inputs = self.input_size();
        let flag = usize::from(has_flag);

        let (expected, exact) = match self.rule.expected_input_len() {
            Some(len) => (len.max(flag), true),
            // Error components have no known width: only a lower bound applies
            None => (inputs + flag, !has_error),
        };

        let ok = if exact {
            actual == expected
        } else {
            actual >= expected
        };
        if !ok {
            return Err(ArrayError::ShapeMismatch {
                what: "input vector",
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn run_rule(&mut self, time: f64, activity: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        let mut handle = ArrayHandle::new(&mut self.weights, &mut self.elements, &mut self.quantizer);
        let output = self.rule.step(time, activity, &mut handle)?;
        debug!(
            "[ARRAY] t={:.4}: {} applied {} drives",
            time,
            self.rule.name(),
            handle.pulse_count()
        );
        Ok(output)
    }

    fn record(&mut self, time: f64) {
        match self.rule.error_signal() {
            Some(error) => self.history.record_error(error),
            None if self.rule.has_error_signal() => {
                debug!("[ARRAY] t={:.4}: no error signal to log", time);
            }
            None => {}
        }
        self.save_state();
        let conductances = self.elements.map(ArrayElement::conductance);
        self.history.record(self.weights.clone(), conductances);
    }

    /// Append every device's resistance to its own history
    pub fn save_state(&mut self) {
        self.elements.iter_mut().for_each(ArrayElement::save_state);
    }

    /// Lend the array out directly, e.g. to program weights before a run
    pub fn handle(&mut self) -> ArrayHandle<'_> {
        ArrayHandle::new(&mut self.weights, &mut self.elements, &mut self.quantizer)
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    pub fn elements(&self) -> ArrayView2<'_, ArrayElement> {
        self.elements.view()
    }

    /// All elements, row-major
    pub fn components(&self) -> Vec<&ArrayElement> {
        self.elements.iter().collect()
    }

    /// `(outputs, inputs)`
    pub fn shape(&self) -> (usize, usize) {
        self.weights.dim()
    }

    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Base seed the element seeds were derived from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn last_phase(&self) -> Option<Phase> {
        self.last_phase
    }

    pub fn quantizer(&self) -> &PulseQuantizer {
        &self.quantizer
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    pub fn rule_mut(&mut self) -> &mut R {
        &mut self.rule
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn get_history(&self, select: HistorySelect) -> HistoryView<'_> {
        self.history.view(select)
    }

    /// `{max, min, mean}` of `select` over `[t0, t1)`
    pub fn get_stats(&self, time_range: (f64, f64), select: HistorySelect) -> Result<Stats> {
        self.history.stats(select, time_range, self.dt)
    }

    pub fn weights_at(&self, time: f64) -> Option<ArrayView2<'_, f64>> {
        self.history.matrix_at(HistorySelect::Weights, time, self.dt)
    }

    pub fn conductances_at(&self, time: f64) -> Option<ArrayView2<'_, f64>> {
        self.history.matrix_at(HistorySelect::Conductances, time, self.dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::ReadOnlyRule;
    use memristor_config::Encoding;
    use memristor_device::DeviceLaw;
    use ndarray::array;

    fn settings(inputs: usize, outputs: usize) -> ArraySettings {
        ArraySettings::new(inputs, outputs, Encoding::Single, DeviceLaw::default()).with_seed(42)
    }

    #[test]
    fn test_read_out_hand_computed() {
        let weights = array![[1.0, 2.0], [3.0, 4.0]];
        let out = read_out(weights.view(), array![1.0, 1.0].view());
        assert_eq!(out, array![3.0, 7.0]);
    }

    #[test]
    fn test_flag_rounding() {
        assert_eq!(Phase::from_flag(1.0), Phase::Learn);
        assert_eq!(Phase::from_flag(0.7), Phase::Learn);
        assert_eq!(Phase::from_flag(0.5), Phase::Infer);
        assert_eq!(Phase::from_flag(0.0), Phase::Infer);
        assert_eq!(Phase::from_flag(-3.0), Phase::Infer);
        assert_eq!(Phase::from_flag(f64::NAN), Phase::Infer);
    }

    #[test]
    fn test_seed_derivation_spreads_elements() {
        let seeds: Vec<u64> = (0..16).map(|i| derive_seed(7, i)).collect();
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seeds.len());
        assert_eq!(derive_seed(7, 3), seeds[3]);
    }

    #[test]
    fn test_construction_mirrors_element_states() {
        let controller =
            ArrayController::new(settings(3, 2), PulseQuantizer::single(), ReadOnlyRule::default())
                .unwrap();

        assert_eq!(controller.shape(), (2, 3));
        for ((j, i), w) in controller.weights().indexed_iter() {
            assert_eq!(*w, controller.elements()[[j, i]].state());
        }
        assert_eq!(controller.components().len(), 6);
    }

    #[test]
    fn test_same_seed_same_array() {
        let a = ArrayController::new(settings(2, 2), PulseQuantizer::single(), ReadOnlyRule::default())
            .unwrap();
        let b = ArrayController::new(settings(2, 2), PulseQuantizer::single(), ReadOnlyRule::default())
            .unwrap();
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn test_rejects_empty_shape() {
        let result =
            ArrayController::new(settings(0, 2), PulseQuantizer::single(), ReadOnlyRule::default());
        assert!(matches!(result, Err(ArrayError::InvalidConfig(_))));
    }

    #[test]
    fn test_delegated_read_only_tick() {
        let mut controller =
            ArrayController::new(settings(2, 2), PulseQuantizer::single(), ReadOnlyRule::default())
                .unwrap();
        let expected = controller.weights().dot(&array![0.5, 2.0]);

        let out = controller.invoke(0.0, &[0.5, 2.0]).unwrap();

        assert_eq!(out, expected);
        assert_eq!(controller.last_phase(), Some(Phase::Delegated));
        assert_eq!(controller.history().len(), 1);
        assert!(controller.get_history(HistorySelect::Error).is_empty());
    }

    #[test]
    fn test_wrong_input_length_is_fatal() {
        let mut controller =
            ArrayController::new(settings(2, 2), PulseQuantizer::single(), ReadOnlyRule::default())
                .unwrap();

        let err = controller.invoke(0.0, &[1.0, 2.0, 3.0]).unwrap_err();

        assert_eq!(
            err,
            ArrayError::ShapeMismatch {
                what: "input vector",
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(controller.ticks(), 0);
        assert!(controller.history().is_empty());
    }
}
