// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Pulse Quantizer
//!
//! Converts a continuous drive signal into a discrete number of update pulses.
//!
//! ```text
//! Single:
//!     pulses = 1                              (for every nonzero signal)
//!
//! Levels (adaptive range):
//!     lo = min(lo, signal)        hi = max(hi, signal)
//!     edges = linspace(lo, hi, levels)
//!     pulses = |{ k : edges[k] <= signal }|   (right-inclusive search)
//! ```
//!
//! The running extremes start at 0/0 and only ever widen, so the same signal
//! can map to a different count depending on what the quantizer has already
//! seen. Early calls bin coarsely; later calls bin against the wider range.

use crate::error::{DeviceError, Result};

/// Signal-to-pulse-count policy shared by every device of an array
#[derive(Debug, Clone, PartialEq)]
pub enum PulseQuantizer {
    /// One pulse per call regardless of signal magnitude
    Single,

    /// Rank of the signal within the running observed range
    Levels(LevelsQuantizer),
}

impl PulseQuantizer {
    /// Constant single-pulse quantizer
    pub fn single() -> Self {
        PulseQuantizer::Single
    }

    /// Adaptive quantizer partitioning the observed range into `levels` steps
    pub fn levels(levels: usize) -> Result<Self> {
        Ok(PulseQuantizer::Levels(LevelsQuantizer::new(levels)?))
    }

    /// Number of pulses to apply for `signal`
    ///
    /// The levels policy updates its running range before ranking, even for
    /// a zero signal.
    pub fn convert(&mut self, signal: f64) -> u32 {
        match self {
            PulseQuantizer::Single => 1,
            PulseQuantizer::Levels(quantizer) => quantizer.convert(signal),
        }
    }
}

impl Default for PulseQuantizer {
    fn default() -> Self {
        Self::single()
    }
}

/// Adaptive-range quantizer state
#[derive(Debug, Clone, PartialEq)]
pub struct LevelsQuantizer {
    levels: u32,
    smallest_seen: f64,
    largest_seen: f64,
}

impl LevelsQuantizer {
    pub fn new(levels: usize) -> Result<Self> {
        let levels = match u32::try_from(levels) {
            Ok(0) | Err(_) => return Err(DeviceError::InvalidLevels(levels)),
            Ok(levels) => levels,
        };
        Ok(Self {
            levels,
            smallest_seen: 0.0,
            largest_seen: 0.0,
        })
    }

    pub fn level_count(&self) -> usize {
        self.levels as usize
    }

    /// Running (min, max) of every signal observed so far
    pub fn observed_range(&self) -> (f64, f64) {
        (self.smallest_seen, self.largest_seen)
    }

    pub fn convert(&mut self, signal: f64) -> u32 {
        if signal < self.smallest_seen {
            self.smallest_seen = signal;
        }
        if signal > self.largest_seen {
            self.largest_seen = signal;
        }

        // Right-inclusive rank: first edge index strictly above the signal
        let (mut low, mut high) = (0u32, self.levels);
        while low < high {
            let mid = low + (high - low) / 2;
            if self.edge(mid) <= signal {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low
    }

    /// k-th bin edge of `linspace(smallest_seen, largest_seen, levels)`
    #[inline]
    fn edge(&self, k: u32) -> f64 {
        if self.levels == 1 {
            return self.smallest_seen;
        }
        if k + 1 == self.levels {
            return self.largest_seen;
        }
        let step = (self.largest_seen - self.smallest_seen) / (self.levels - 1) as f64;
        self.smallest_seen + k as f64 * step
    }
}
