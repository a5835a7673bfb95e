// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Learning-Rule Contract
//!
//! A learning rule never owns the array. On every Learn (or delegated) tick
//! the controller lends it an [`ArrayHandle`], through which it can read the
//! weights and request "pulse element (j, i) with drive d". The handle keeps
//! `weights[j, i]` equal to the element's state after each pulse, so the
//! matrix cannot drift away from the devices.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use memristor_device::PulseQuantizer;

use crate::element::ArrayElement;
use crate::error::{ArrayError, Result};

/// Error value a rule exposes for logging
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSignal {
    Scalar(f64),
    Vector(Array1<f64>),
    Matrix(Array2<f64>),
}

impl ErrorSignal {
    /// All components, row-major for matrices
    pub fn values(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            ErrorSignal::Scalar(v) => Box::new(std::iter::once(*v)),
            ErrorSignal::Vector(v) => Box::new(v.iter().copied()),
            ErrorSignal::Matrix(m) => Box::new(m.iter().copied()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ErrorSignal::Scalar(_) => 1,
            ErrorSignal::Vector(v) => v.len(),
            ErrorSignal::Matrix(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutable view of an array lent to a learning rule for one tick
pub struct ArrayHandle<'a> {
    weights: &'a mut Array2<f64>,
    elements: &'a mut Array2<ArrayElement>,
    quantizer: &'a mut PulseQuantizer,
    pulses: usize,
}

impl<'a> ArrayHandle<'a> {
    pub(crate) fn new(
        weights: &'a mut Array2<f64>,
        elements: &'a mut Array2<ArrayElement>,
        quantizer: &'a mut PulseQuantizer,
    ) -> Self {
        Self {
            weights,
            elements,
            quantizer,
            pulses: 0,
        }
    }

    /// `(outputs, inputs)`
    pub fn shape(&self) -> (usize, usize) {
        self.weights.dim()
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    pub fn weight(&self, row: usize, col: usize) -> Result<f64> {
        self.check_index(row, col)?;
        Ok(self.weights[[row, col]])
    }

    pub fn element(&self, row: usize, col: usize) -> Result<&ArrayElement> {
        self.check_index(row, col)?;
        Ok(&self.elements[[row, col]])
    }

    /// Pulse element `(row, col)` with `drive` and store the new weight
    ///
    /// Returns the updated weight. A zero drive leaves the element untouched.
    pub fn pulse(&mut self, row: usize, col: usize, drive: f64) -> Result<f64> {
        self.check_index(row, col)?;
        let weight = self.elements[[row, col]].pulse(drive, self.quantizer);
        self.weights[[row, col]] = weight;
        if drive != 0.0 {
            self.pulses += 1;
        }
        Ok(weight)
    }

    /// `weights · activity` over the current weights
    pub fn forward(&self, activity: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        let (_, inputs) = self.shape();
        if activity.len() != inputs {
            return Err(ArrayError::ShapeMismatch {
                what: "forward activity",
                expected: inputs,
                actual: activity.len(),
            });
        }
        Ok(self.weights.dot(&activity))
    }

    /// Number of nonzero drives applied through this handle
    pub fn pulse_count(&self) -> usize {
        self.pulses
    }

    fn check_index(&self, row: usize, col: usize) -> Result<()> {
        let (rows, cols) = self.shape();
        if row >= rows || col >= cols {
            return Err(ArrayError::IndexOutOfBounds {
                row,
                col,
                rows,
                cols,
            });
        }
        Ok(())
    }
}

/// Trait for learning rules driving a memristor array
///
/// The controller calls [`bind`](LearningRule::bind) once with the array
/// shape, then [`step`](LearningRule::step) on every tick it routes to the
/// rule. `step` receives the input vector with the learning flag removed
/// (when the rule has one), so it still carries any error components.
pub trait LearningRule {
    /// Name used in log lines
    fn name(&self) -> &str;

    fn bind(&mut self, input_size: usize, output_size: usize);

    /// The last input component is a learning-phase flag
    fn has_learning_signal(&self) -> bool;

    /// Error components follow the activities in the input vector
    fn has_error_signal(&self) -> bool;

    /// Exact input length the rule expects, flag included, if it knows it
    fn expected_input_len(&self) -> Option<usize> {
        None
    }

    /// Compute drives, pulse elements through `array` and return the output
    fn step(
        &mut self,
        time: f64,
        activity: ArrayView1<'_, f64>,
        array: &mut ArrayHandle<'_>,
    ) -> Result<Array1<f64>>;

    /// Error to log for the tick just processed; `None` means nothing to log
    fn error_signal(&self) -> Option<ErrorSignal> {
        None
    }
}

/// Rule that never pulses and reads out `weights · input`
///
/// Useful for freezing an array while keeping the history running.
#[derive(Debug, Clone, Default)]
pub struct ReadOnlyRule {
    input_size: usize,
}

impl LearningRule for ReadOnlyRule {
    fn name(&self) -> &str {
        "read_only"
    }

    fn bind(&mut self, input_size: usize, _output_size: usize) {
        self.input_size = input_size;
    }

    fn has_learning_signal(&self) -> bool {
        false
    }

    fn has_error_signal(&self) -> bool {
        false
    }

    fn expected_input_len(&self) -> Option<usize> {
        Some(self.input_size)
    }

    fn step(
        &mut self,
        _time: f64,
        activity: ArrayView1<'_, f64>,
        array: &mut ArrayHandle<'_>,
    ) -> Result<Array1<f64>> {
        array.forward(activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memristor_config::Encoding;
    use memristor_device::{DeviceLaw, DeviceSettings};
    use ndarray::{array, Array2};

    fn elements(rows: usize, cols: usize) -> Array2<ArrayElement> {
        let settings = DeviceSettings::default();
        Array2::from_shape_fn((rows, cols), |(j, i)| {
            ArrayElement::build(Encoding::PlusMinus, DeviceLaw::default(), (j * cols + i) as u64, &settings)
                .unwrap()
        })
    }

    #[test]
    fn test_pulse_keeps_weight_in_sync() {
        let mut elems = elements(2, 3);
        let mut weights = elems.map(|e| e.state());
        let mut quantizer = PulseQuantizer::single();
        let mut handle = ArrayHandle::new(&mut weights, &mut elems, &mut quantizer);

        let w = handle.pulse(1, 2, 0.5).unwrap();
        handle.pulse(0, 0, 0.0).unwrap();

        assert_eq!(handle.weight(1, 2).unwrap(), w);
        assert_eq!(handle.element(1, 2).unwrap().state(), w);
        assert_eq!(handle.pulse_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut elems = elements(2, 2);
        let mut weights = elems.map(|e| e.state());
        let mut quantizer = PulseQuantizer::single();
        let mut handle = ArrayHandle::new(&mut weights, &mut elems, &mut quantizer);

        assert!(matches!(
            handle.pulse(2, 0, 1.0),
            Err(ArrayError::IndexOutOfBounds { row: 2, col: 0, .. })
        ));
    }

    #[test]
    fn test_forward_checks_length() {
        let mut elems = elements(2, 2);
        let mut weights = array![[1.0, 2.0], [3.0, 4.0]];
        let mut quantizer = PulseQuantizer::single();
        let handle = ArrayHandle::new(&mut weights, &mut elems, &mut quantizer);

        assert_eq!(handle.forward(array![1.0, 1.0].view()).unwrap(), array![3.0, 7.0]);
        assert!(handle.forward(array![1.0].view()).is_err());
    }

    #[test]
    fn test_error_signal_values() {
        let matrix = ErrorSignal::Matrix(array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(matrix.values().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ErrorSignal::Scalar(0.5).len(), 1);
        assert!(ErrorSignal::Vector(Array1::zeros(0)).is_empty());
    }
}
