// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-tick history buffers and summary statistics
//!
//! Weight and conductance snapshots are appended once per logged tick, so
//! snapshot `k` belongs to simulation time `k * dt`. Error entries are only
//! appended on ticks where the rule produced one.

use core::fmt;
use core::str::FromStr;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{ArrayError, Result};
use crate::rule::ErrorSignal;

/// Which history series to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySelect {
    Weights,
    Conductances,
    Error,
}

impl HistorySelect {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistorySelect::Weights => "weights",
            HistorySelect::Conductances => "conductances",
            HistorySelect::Error => "error",
        }
    }
}

impl fmt::Display for HistorySelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistorySelect {
    type Err = ArrayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "weight" | "weights" => Ok(HistorySelect::Weights),
            "conductance" | "conductances" => Ok(HistorySelect::Conductances),
            "error" => Ok(HistorySelect::Error),
            other => Err(ArrayError::UnknownSelector(other.to_string())),
        }
    }
}

/// `{max, min, mean}` of a history slice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
}

impl Stats {
    /// `None` for an empty sequence
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        for v in values {
            count += 1;
            sum += v;
            max = max.max(v);
            min = min.min(v);
        }
        if count == 0 {
            return None;
        }
        Some(Self {
            max,
            min,
            mean: sum / count as f64,
        })
    }
}

/// Borrowed view of one history series
#[derive(Debug, Clone, Copy)]
pub enum HistoryView<'a> {
    Matrices(&'a [Array2<f64>]),
    Errors(&'a [ErrorSignal]),
}

impl HistoryView<'_> {
    pub fn len(&self) -> usize {
        match self {
            HistoryView::Matrices(m) => m.len(),
            HistoryView::Errors(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct History {
    weights: Vec<Array2<f64>>,
    conductances: Vec<Array2<f64>>,
    errors: Vec<ErrorSignal>,
}

impl History {
    pub fn record(&mut self, weights: Array2<f64>, conductances: Array2<f64>) {
        self.weights.push(weights);
        self.conductances.push(conductances);
    }

    pub fn record_error(&mut self, error: ErrorSignal) {
        self.errors.push(error);
    }

    pub fn weights(&self) -> &[Array2<f64>] {
        &self.weights
    }

    pub fn conductances(&self) -> &[Array2<f64>] {
        &self.conductances
    }

    pub fn errors(&self) -> &[ErrorSignal] {
        &self.errors
    }

    pub fn view(&self, select: HistorySelect) -> HistoryView<'_> {
        match select {
            HistorySelect::Weights => HistoryView::Matrices(&self.weights),
            HistorySelect::Conductances => HistoryView::Matrices(&self.conductances),
            HistorySelect::Error => HistoryView::Errors(&self.errors),
        }
    }

    /// Snapshot of `select` at `time`, if recorded
    pub fn matrix_at(&self, select: HistorySelect, time: f64, dt: f64) -> Option<ArrayView2<'_, f64>> {
        let series = match select {
            HistorySelect::Weights => &self.weights,
            HistorySelect::Conductances => &self.conductances,
            HistorySelect::Error => return None,
        };
        if time.is_nan() || time < 0.0 {
            return None;
        }
        series.get(tick_index(time, dt)).map(|m| m.view())
    }

    /// Stats over snapshots `[floor(start/dt), floor(end/dt))`, clipped to
    /// what has been recorded
    pub fn stats(&self, select: HistorySelect, time_range: (f64, f64), dt: f64) -> Result<Stats> {
        let (start, end) = time_range;
        let view = self.view(select);
        let lo = tick_index(start, dt).min(view.len());
        let hi = tick_index(end, dt).min(view.len());

        let stats = if lo < hi {
            match view {
                HistoryView::Matrices(m) => {
                    Stats::from_values(m[lo..hi].iter().flat_map(|s| s.iter().copied()))
                }
                HistoryView::Errors(e) => {
                    Stats::from_values(e[lo..hi].iter().flat_map(|s| s.values()))
                }
            }
        } else {
            None
        };

        stats.ok_or(ArrayError::EmptyHistory {
            select: select.as_str(),
            start,
            end,
        })
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// `floor(time / dt)`, with negative and NaN times mapped to tick 0
#[inline]
fn tick_index(time: f64, dt: f64) -> usize {
    let ticks = (time / dt).floor();
    if ticks > 0.0 {
        ticks as usize
    } else {
        0
    }
}

/// Hoyer sparsity of a weight snapshot
///
/// ```text
/// (√n - ‖w‖₁ / ‖w‖₂) / (√n - 1)
/// ```
///
/// 0 when every weight has the same magnitude, 1 when a single weight is
/// nonzero. Defined as 0 for fewer than two weights or an all-zero matrix.
pub fn sparsity(weights: ArrayView2<'_, f64>) -> f64 {
    let n = weights.len();
    if n < 2 {
        return 0.0;
    }
    let l1: f64 = weights.iter().map(|w| w.abs()).sum();
    let l2 = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
    if l2 == 0.0 {
        return 0.0;
    }
    let root_n = (n as f64).sqrt();
    (root_n - l1 / l2) / (root_n - 1.0)
}

/// Mean weight of a snapshot
pub fn magnitude(weights: ArrayView2<'_, f64>) -> f64 {
    weights.mean().unwrap_or(0.0)
}
