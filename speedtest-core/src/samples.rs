// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Append-only timing sample storage.
//!
//! While an arm runs, its samples live in a [`SampleLog`] whose slots are
//! written once. Snapshots handed to observers share those slots and only
//! remember how many were filled, so taking one is O(1) and later appends
//! never show through.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize, Serializer};

use crate::types::ArmName;

/// Ordered trial durations (milliseconds) for one arm within one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleSet {
    samples: Vec<f64>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample recorded for `trial`, if that trial completed.
    pub fn get(&self, trial: usize) -> Option<f64> {
        self.samples.get(trial).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}

impl From<Vec<f64>> for SampleSet {
    fn from(samples: Vec<f64>) -> Self {
        Self { samples }
    }
}

/// Write side of an arm's samples. Only the trial runner appends.
pub(crate) struct SampleLog {
    slots: Arc<[OnceLock<f64>]>,
    len: usize,
}

impl SampleLog {
    /// Log holding at most `capacity` samples.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| OnceLock::new()).collect(),
            len: 0,
        }
    }

    /// Append a sample. Returns false once the log is full.
    pub(crate) fn push(&mut self, sample: f64) -> bool {
        match self.slots.get(self.len) {
            Some(slot) => {
                // Slots past `len` have never been written
                let _ = slot.set(sample);
                self.len += 1;
                true
            }
            None => false,
        }
    }

    pub(crate) fn snapshot(&self) -> SampleSnapshot {
        SampleSnapshot {
            slots: Arc::clone(&self.slots),
            len: self.len,
        }
    }

    pub(crate) fn to_sample_set(&self) -> SampleSet {
        self.snapshot().to_sample_set()
    }
}

/// Immutable view of the first `len` samples of a running arm.
#[derive(Clone)]
pub struct SampleSnapshot {
    slots: Arc<[OnceLock<f64>]>,
    len: usize,
}

impl SampleSnapshot {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, trial: usize) -> Option<f64> {
        if trial >= self.len {
            return None;
        }
        self.slots.get(trial).and_then(|slot| slot.get().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.slots[..self.len]
            .iter()
            .filter_map(|slot| slot.get().copied())
    }

    /// Copy the visible samples into an owned set.
    pub fn to_sample_set(&self) -> SampleSet {
        SampleSet::from(self.iter().collect::<Vec<_>>())
    }
}

impl Default for SampleSnapshot {
    fn default() -> Self {
        Self {
            slots: Arc::from(Vec::new()),
            len: 0,
        }
    }
}

impl From<Vec<f64>> for SampleSnapshot {
    fn from(samples: Vec<f64>) -> Self {
        let mut log = SampleLog::with_capacity(samples.len());
        for sample in samples {
            log.push(sample);
        }
        log.snapshot()
    }
}

impl fmt::Debug for SampleSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for SampleSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Serialize for SampleSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Samples of one arm, kept for inspection after a run aborts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmSamples {
    pub name: ArmName,
    pub samples: SampleSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_trial_order() {
        let mut log = SampleLog::with_capacity(3);
        log.push(3.0);
        log.push(1.0);
        log.push(2.0);

        let set = log.to_sample_set();
        assert_eq!(set.as_slice(), &[3.0, 1.0, 2.0]);
        assert_eq!(set.get(1), Some(1.0));
        assert_eq!(set.get(3), None);
    }

    #[test]
    fn test_snapshot_ignores_later_appends() {
        let mut log = SampleLog::with_capacity(2);
        log.push(1.0);
        let snapshot = log.snapshot();
        log.push(2.0);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(1), None);
        assert_eq!(snapshot.iter().collect::<Vec<_>>(), vec![1.0]);
        assert_eq!(log.snapshot().len(), 2);
    }

    #[test]
    fn test_snapshots_share_storage() {
        let mut log = SampleLog::with_capacity(1_000);
        let mut snapshots = Vec::new();
        for i in 0..1_000 {
            log.push(i as f64);
            snapshots.push(log.snapshot());
        }

        // One buffer plus one reference per snapshot, no per-trial copies
        assert_eq!(Arc::strong_count(&log.slots), 1_001);
        assert_eq!(snapshots[499].len(), 500);
        assert_eq!(snapshots[499].get(499), Some(499.0));
    }

    #[test]
    fn test_full_log_rejects_push() {
        let mut log = SampleLog::with_capacity(1);
        assert!(log.push(1.0));
        assert!(!log.push(2.0));
        assert_eq!(log.to_sample_set().len(), 1);
    }

    #[test]
    fn test_serializes_as_array() {
        let set = SampleSet::from(vec![1.5, 2.5]);
        assert_eq!(serde_json::to_string(&set).unwrap(), "[1.5,2.5]");

        let snapshot = SampleSnapshot::from(vec![1.5, 2.5]);
        assert_eq!(serde_json::to_string(&snapshot).unwrap(), "[1.5,2.5]");
    }
}
