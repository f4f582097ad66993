// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Trimmed-mean aggregation of timing samples.
//!
//! A symmetric two-sided 10% trimmed mean. The trim count is
//! `floor(n * 0.1)` with no interpolation at the boundaries, and both arms of
//! a comparison go through the same function so their figures stay
//! comparable.

use serde::{Deserialize, Serialize};

use crate::samples::SampleSet;

/// Fraction of samples dropped from each end of the sorted set.
pub const TRIM_FRACTION: f64 = 0.1;

/// Robust latency figure for one completed sample set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Trimmed mean in milliseconds
    pub mean: f64,
    /// Number of samples the figure was computed from, before trimming
    pub sample_count: usize,
}

impl AggregateResult {
    pub fn from_samples(samples: &SampleSet) -> Self {
        Self {
            mean: trimmed_mean(samples.as_slice()),
            sample_count: samples.len(),
        }
    }
}

/// Number of samples dropped from each end for a set of `n` samples.
pub fn trim_count(n: usize) -> usize {
    (n as f64 * TRIM_FRACTION).floor() as usize
}

/// Mean of `samples` after dropping the lowest and highest 10%.
///
/// Returns `0.0` for an empty input or when trimming leaves nothing.
/// The input slice is left untouched; a sorted copy is used.
pub fn trimmed_mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let trim = trim_count(sorted.len());
    let trimmed = &sorted[trim..sorted.len() - trim];

    if trimmed.is_empty() {
        return 0.0;
    }

    let sum: f64 = trimmed.iter().sum();
    sum / trimmed.len() as f64
}

/// Slow-over-fast ratio, `None` when the fast mean is zero.
pub fn improvement_ratio(fast_mean: f64, slow_mean: f64) -> Option<f64> {
    if fast_mean == 0.0 {
        return None;
    }
    Some(slow_mean / fast_mean)
}

/// Round to `decimals` places with ties going away from zero.
///
/// `format!` rounds exact ties to even (`2.25` becomes `2.2`); display
/// values go through this first so ties round up instead.
pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Render a ratio as `"N.Nx"`, or `"-"` when undefined.
pub fn format_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) if r.is_finite() => format!("{:.1}x", round_half_up(r, 1)),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(trimmed_mean(&[]), 0.0);
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(trimmed_mean(&[5.0]), 5.0);
    }

    #[test]
    fn test_ten_samples_trims_one_each_side() {
        let samples: Vec<f64> = (1..=10).map(f64::from).collect();
        assert_eq!(trim_count(samples.len()), 1);
        assert_eq!(trimmed_mean(&samples), 5.5);
    }

    #[test]
    fn test_outliers_are_discarded() {
        let mut samples = vec![100.0; 18];
        samples.push(0.5);
        samples.push(5_000.0);
        assert_eq!(trimmed_mean(&samples), 100.0);
    }

    #[test]
    fn test_trim_boundaries_use_floor() {
        assert_eq!(trim_count(9), 0);
        assert_eq!(trim_count(19), 1);
        assert_eq!(trim_count(20), 2);
        assert_eq!(trim_count(30), 3);
        assert_eq!(trim_count(100), 10);
    }

    #[test]
    fn test_permutation_invariant_and_input_untouched() {
        let original = vec![9.0, 1.0, 5.0, 3.0, 7.0, 2.0, 10.0, 4.0, 8.0, 6.0];
        let copy = original.clone();
        let mut reversed = original.clone();
        reversed.reverse();

        assert_eq!(trimmed_mean(&original), trimmed_mean(&reversed));
        assert_eq!(original, copy);
    }

    #[test]
    fn test_aggregate_result_from_samples() {
        let set = SampleSet::from(vec![2.0, 4.0]);
        let aggregate = AggregateResult::from_samples(&set);
        assert_eq!(aggregate.mean, 3.0);
        assert_eq!(aggregate.sample_count, 2);
        assert_eq!(aggregate, AggregateResult::from_samples(&set));
    }

    #[test]
    fn test_improvement_ratio() {
        assert_eq!(improvement_ratio(100.0, 250.0), Some(2.5));
        assert_eq!(improvement_ratio(0.0, 250.0), None);
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(Some(2.5)), "2.5x");
        assert_eq!(format_ratio(Some(1.04)), "1.0x");
        assert_eq!(format_ratio(None), "-");
    }

    #[test]
    fn test_ties_round_up() {
        assert_eq!(format_ratio(Some(2.25)), "2.3x");
        assert_eq!(format_ratio(Some(0.75)), "0.8x");
        assert_eq!(round_half_up(100.5, 0), 101.0);
        assert_eq!(round_half_up(2.4, 0), 2.0);
        assert_eq!(format!("{:.0}", round_half_up(100.5, 0)), "101");
    }
}
