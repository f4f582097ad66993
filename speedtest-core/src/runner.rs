// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sequential trial execution for a single arm.
//!
//! Trials run back to back: trial `i + 1` is not started until trial `i`'s
//! operation has settled, so queued work from one trial cannot skew the
//! timing of the next.

use thiserror::Error;

use crate::arm::Arm;
use crate::cancel::CancelToken;
use crate::error::OperationError;
use crate::observer::TrialProgress;
use crate::samples::{SampleLog, SampleSet};
use crate::timer::{time_operation, Clock};

/// Why an arm stopped before producing every sample.
#[derive(Debug, Error)]
pub enum TrialAbort {
    #[error("{} {trial} failed: {source}", phase_label(.warmup))]
    Failed {
        trial: usize,
        warmup: bool,
        #[source]
        source: OperationError,
    },

    #[error("cancelled")]
    Cancelled,
}

fn phase_label(warmup: &bool) -> &'static str {
    if *warmup {
        "warmup call"
    } else {
        "trial"
    }
}

/// An arm's run that ended early, with the samples recorded before it stopped.
#[derive(Debug, Error)]
#[error("arm stopped after {} trials: {reason}", .samples.len())]
pub struct AbortedTrials {
    pub samples: SampleSet,
    #[source]
    pub reason: TrialAbort,
}

/// Runs timed trials against one arm.
pub struct TrialRunner<'a> {
    clock: &'a dyn Clock,
    warmup: u32,
}

impl<'a> TrialRunner<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock, warmup: 0 }
    }

    /// Set the number of untimed warmup calls made before measurement.
    pub fn warmup(mut self, iterations: u32) -> Self {
        self.warmup = iterations;
        self
    }

    /// Produce exactly `iterations` samples for `arm`, in trial order.
    ///
    /// `on_trial` is invoked after every measured trial with a snapshot of
    /// the samples so far. Warmup calls are neither recorded nor reported.
    pub async fn run<F>(
        &self,
        arm: &Arm,
        iterations: usize,
        cancel: &CancelToken,
        mut on_trial: F,
    ) -> Result<SampleSet, AbortedTrials>
    where
        F: FnMut(TrialProgress),
    {
        for call in 0..self.warmup as usize {
            if cancel.is_cancelled() {
                return Err(AbortedTrials {
                    samples: SampleSet::new(),
                    reason: TrialAbort::Cancelled,
                });
            }
            if let Err(source) = arm.call().await {
                tracing::warn!(arm = %arm.name(), call, error = %source, "Warmup call failed");
                return Err(AbortedTrials {
                    samples: SampleSet::new(),
                    reason: TrialAbort::Failed {
                        trial: call,
                        warmup: true,
                        source,
                    },
                });
            }
        }

        let mut log = SampleLog::with_capacity(iterations);

        for trial in 0..iterations {
            if cancel.is_cancelled() {
                tracing::debug!(arm = %arm.name(), trial, "Cancellation observed at trial boundary");
                return Err(AbortedTrials {
                    samples: log.to_sample_set(),
                    reason: TrialAbort::Cancelled,
                });
            }

            let (outcome, timing) = time_operation(self.clock, arm.call()).await;

            if let Err(source) = outcome {
                tracing::warn!(arm = %arm.name(), trial, error = %source, "Trial failed");
                return Err(AbortedTrials {
                    samples: log.to_sample_set(),
                    reason: TrialAbort::Failed {
                        trial,
                        warmup: false,
                        source,
                    },
                });
            }

            let sample = timing.duration();
            log.push(sample);

            tracing::debug!(arm = %arm.name(), trial, sample_ms = sample, "Trial completed");

            on_trial(TrialProgress {
                arm: arm.name().clone(),
                trial,
                sample,
                started_at: timing.started_at,
                finished_at: timing.finished_at,
                samples: log.snapshot(),
            });
        }

        Ok(log.to_sample_set())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::MonotonicClock;
    use crate::types::ArmName;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counting_arm(calls: Arc<AtomicUsize>, fail_on: Option<usize>) -> Arm {
        Arm::from_fn(ArmName::new("counting").unwrap(), move || {
            let calls = calls.clone();
            async move {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                if Some(call) == fail_on {
                    return Err(OperationError::Transport {
                        reason: "connection reset".to_string(),
                    });
                }
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_runs_exact_iterations() {
        let clock = MonotonicClock::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let arm = counting_arm(calls.clone(), None);
        let mut snapshots = Vec::new();

        let samples = TrialRunner::new(&clock)
            .run(&arm, 5, &CancelToken::new(), |p| snapshots.push(p.samples.len()))
            .await
            .unwrap();

        assert_eq!(samples.len(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(snapshots, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_samples_reflect_operation_time() {
        let clock = MonotonicClock::new();
        let arm = Arm::from_fn(ArmName::new("sleepy").unwrap(), || async {
            tokio::time::sleep(Duration::from_millis(2)).await;
            Ok(())
        });

        let samples = TrialRunner::new(&clock)
            .run(&arm, 3, &CancelToken::new(), |_| {})
            .await
            .unwrap();

        for sample in samples.iter() {
            assert!(sample >= 2.0, "Sample {} < 2ms", sample);
        }
    }

    #[tokio::test]
    async fn test_warmup_not_recorded() {
        let clock = MonotonicClock::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let arm = counting_arm(calls.clone(), None);
        let mut notifications = 0;

        let samples = TrialRunner::new(&clock)
            .warmup(3)
            .run(&arm, 4, &CancelToken::new(), |_| notifications += 1)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 7);
        assert_eq!(samples.len(), 4);
        assert_eq!(notifications, 4);
    }

    #[tokio::test]
    async fn test_failure_aborts_and_keeps_partial() {
        let clock = MonotonicClock::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let arm = counting_arm(calls.clone(), Some(2));

        let aborted = TrialRunner::new(&clock)
            .run(&arm, 10, &CancelToken::new(), |_| {})
            .await
            .unwrap_err();

        assert_eq!(aborted.samples.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            aborted.reason,
            TrialAbort::Failed {
                trial: 2,
                warmup: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_warmup_failure_aborts() {
        let clock = MonotonicClock::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let arm = counting_arm(calls.clone(), Some(0));

        let aborted = TrialRunner::new(&clock)
            .warmup(2)
            .run(&arm, 10, &CancelToken::new(), |_| {})
            .await
            .unwrap_err();

        assert!(aborted.samples.is_empty());
        assert!(matches!(
            aborted.reason,
            TrialAbort::Failed { warmup: true, .. }
        ));
    }

    #[tokio::test]
    async fn test_cancel_at_trial_boundary() {
        let clock = MonotonicClock::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let arm = counting_arm(calls.clone(), None);
        let cancel = CancelToken::new();
        let trigger = cancel.clone();

        let aborted = TrialRunner::new(&clock)
            .run(&arm, 10, &cancel, |p| {
                if p.trial == 3 {
                    trigger.cancel();
                }
            })
            .await
            .unwrap_err();

        assert_eq!(aborted.samples.len(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(matches!(aborted.reason, TrialAbort::Cancelled));
    }

    #[tokio::test]
    async fn test_earlier_snapshots_stay_frozen() {
        let clock = MonotonicClock::new();
        let arm = counting_arm(Arc::new(AtomicUsize::new(0)), None);
        let mut snapshots = Vec::new();

        let samples = TrialRunner::new(&clock)
            .run(&arm, 4, &CancelToken::new(), |p| snapshots.push(p.samples))
            .await
            .unwrap();

        for (trial, snapshot) in snapshots.iter().enumerate() {
            assert_eq!(snapshot.len(), trial + 1);
            let seen: Vec<f64> = snapshot.iter().collect();
            assert_eq!(seen.as_slice(), &samples.as_slice()[..=trial]);
        }
    }
}
