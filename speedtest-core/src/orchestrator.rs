// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Comparison orchestration across arms.
//!
//! Arms run one after another, never interleaved, so one transport's
//! connection warm-up or caching cannot bleed into another's measurements.
//! Each arm is aggregated as soon as its trials finish, before the next arm
//! starts.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::aggregate::{improvement_ratio, AggregateResult};
use crate::arm::Arm;
use crate::cancel::CancelToken;
use crate::error::{HarnessError, HarnessResult, RunFailure, ValidationError};
use crate::observer::{RunEvent, RunObserver};
use crate::runner::{AbortedTrials, TrialAbort, TrialRunner};
use crate::samples::{ArmSamples, SampleSet, SampleSnapshot};
use crate::state::{RunState, RunStateMachine};
use crate::timer::{Clock, MonotonicClock};
use crate::types::ArmName;

/// Completed measurements of one arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmResult {
    pub name: ArmName,
    pub samples: SampleSet,
    pub aggregate: AggregateResult,
}

/// Outcome of a run in which every arm completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub run_id: Uuid,
    pub iterations: usize,
    /// Per-arm results in the order the arms were given
    pub arms: Vec<ArmResult>,
    /// `arms[1].mean / arms[0].mean`; `None` for a single arm or a zero
    /// first-arm mean
    pub improvement_ratio: Option<f64>,
}

impl ComparisonResult {
    fn new(run_id: Uuid, iterations: usize, arms: Vec<ArmResult>) -> Self {
        let improvement_ratio = match arms.as_slice() {
            [fast, slow, ..] => improvement_ratio(fast.aggregate.mean, slow.aggregate.mean),
            _ => None,
        };

        Self {
            run_id,
            iterations,
            arms,
            improvement_ratio,
        }
    }

    /// Look up an arm's result by name.
    pub fn arm(&self, name: &str) -> Option<&ArmResult> {
        self.arms.iter().find(|a| a.name.as_str() == name)
    }

    /// `arms[slow].mean / arms[fast].mean`, for N-arm comparisons.
    pub fn ratio_to(&self, fast: usize, slow: usize) -> Option<f64> {
        let fast = self.arms.get(fast)?;
        let slow = self.arms.get(slow)?;
        improvement_ratio(fast.aggregate.mean, slow.aggregate.mean)
    }
}

/// Check arms and iteration count before any trial starts.
pub fn validate_run(arms: &[Arm], iterations: usize) -> Result<(), ValidationError> {
    if arms.is_empty() {
        return Err(ValidationError::NoArms);
    }

    if iterations == 0 {
        return Err(ValidationError::InvalidIterations { iterations });
    }

    let mut seen = HashSet::with_capacity(arms.len());
    for arm in arms {
        if !seen.insert(arm.name().as_str()) {
            return Err(ValidationError::DuplicateArmName {
                name: arm.name().to_string(),
            });
        }
    }

    Ok(())
}

/// Marks the run Cancelled and sends the terminal event if its future is
/// dropped mid-run.
struct ActiveRun<'a> {
    harness: &'a ComparisonHarness,
    run_id: Uuid,
    /// Latest snapshot of every arm started so far, in run order
    progress: Mutex<Vec<(ArmName, SampleSnapshot)>>,
}

impl<'a> ActiveRun<'a> {
    fn new(harness: &'a ComparisonHarness, run_id: Uuid, arms: usize) -> Self {
        Self {
            harness,
            run_id,
            progress: Mutex::new(Vec::with_capacity(arms)),
        }
    }

    fn begin_arm(&self, name: &ArmName) {
        if let Ok(mut progress) = self.progress.lock() {
            progress.push((name.clone(), SampleSnapshot::default()));
        }
    }

    fn record(&self, snapshot: &SampleSnapshot) {
        if let Ok(mut progress) = self.progress.lock() {
            if let Some((_, latest)) = progress.last_mut() {
                *latest = snapshot.clone();
            }
        }
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        if !self.harness.state.abandon() {
            return;
        }

        let partial = self
            .progress
            .get_mut()
            .map(|progress| {
                progress
                    .drain(..)
                    .map(|(name, snapshot)| ArmSamples {
                        name,
                        samples: snapshot.to_sample_set(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.harness.publish(&RunEvent::Cancelled {
            run_id: self.run_id,
            partial,
        });
    }
}

/// Runs comparisons and publishes their progress.
///
/// One harness runs at most one comparison at a time; a second request
/// while a run is active is rejected with [`HarnessError::RunInProgress`].
pub struct ComparisonHarness {
    clock: Arc<dyn Clock>,
    warmup: u32,
    observers: Vec<Arc<dyn RunObserver>>,
    state: RunStateMachine,
}

impl ComparisonHarness {
    /// Create a harness with a monotonic clock, no warmup and no observers.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(MonotonicClock::new()),
            warmup: 0,
            observers: Vec::new(),
            state: RunStateMachine::new(),
        }
    }

    /// Set the number of untimed warmup calls per arm.
    pub fn warmup(mut self, iterations: u32) -> Self {
        self.warmup = iterations;
        self
    }

    /// Replace the clock used to time trials.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register an observer for run notifications.
    pub fn observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state.state()
    }

    /// Follow run state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Run every arm for `iterations` trials and compare them.
    pub async fn run(&self, arms: &[Arm], iterations: usize) -> HarnessResult<ComparisonResult> {
        self.run_cancellable(arms, iterations, &CancelToken::new())
            .await
    }

    /// Like [`run`](Self::run), stopping at the next trial boundary once
    /// `cancel` fires.
    pub async fn run_cancellable(
        &self,
        arms: &[Arm],
        iterations: usize,
        cancel: &CancelToken,
    ) -> HarnessResult<ComparisonResult> {
        validate_run(arms, iterations)?;

        self.state
            .transition_to(RunState::RunningArm { index: 0 })
            .map_err(|_| HarnessError::RunInProgress {
                state: self.state.state(),
            })?;
        let run_id = Uuid::new_v4();
        let active = ActiveRun::new(self, run_id, arms.len());
        tracing::info!(
            %run_id,
            arms = arms.len(),
            iterations,
            warmup = self.warmup,
            "Starting comparison run"
        );

        let runner = TrialRunner::new(self.clock.as_ref()).warmup(self.warmup);
        let mut completed: Vec<ArmResult> = Vec::with_capacity(arms.len());

        for (arm_index, arm) in arms.iter().enumerate() {
            if arm_index > 0 {
                self.state
                    .transition_to(RunState::RunningArm { index: arm_index })?;
            }

            active.begin_arm(arm.name());

            let outcome = runner
                .run(arm, iterations, cancel, |progress| {
                    active.record(&progress.samples);
                    self.publish(&RunEvent::Trial {
                        run_id,
                        arm_index,
                        progress,
                    })
                })
                .await;

            match outcome {
                Ok(samples) => {
                    let aggregate = AggregateResult::from_samples(&samples);
                    tracing::info!(
                        %run_id,
                        arm = %arm.name(),
                        mean_ms = aggregate.mean,
                        samples = aggregate.sample_count,
                        "Arm completed"
                    );
                    completed.push(ArmResult {
                        name: arm.name().clone(),
                        samples,
                        aggregate,
                    });
                }
                Err(aborted) => return Err(self.abort(run_id, arm, completed, aborted)),
            }
        }

        let result = ComparisonResult::new(run_id, iterations, completed);
        self.state.transition_to(RunState::Done)?;

        tracing::info!(
            %run_id,
            improvement_ratio = ?result.improvement_ratio,
            "Comparison run completed"
        );
        self.publish(&RunEvent::Completed(result.clone()));

        Ok(result)
    }

    /// Move to Failed or Cancelled, notify observers, and build the error.
    fn abort(
        &self,
        run_id: Uuid,
        arm: &Arm,
        completed: Vec<ArmResult>,
        aborted: AbortedTrials,
    ) -> HarnessError {
        let mut partial: Vec<ArmSamples> = completed
            .into_iter()
            .map(|r| ArmSamples {
                name: r.name,
                samples: r.samples,
            })
            .collect();
        partial.push(ArmSamples {
            name: arm.name().clone(),
            samples: aborted.samples,
        });

        match aborted.reason {
            TrialAbort::Failed {
                trial,
                warmup,
                source,
            } => {
                if let Err(e) = self.state.transition_to(RunState::Failed) {
                    return e.into();
                }
                tracing::warn!(%run_id, arm = %arm.name(), trial, error = %source, "Comparison run failed");

                self.publish(&RunEvent::Failed {
                    run_id,
                    partial: partial.clone(),
                    reason: source.to_string(),
                });

                HarnessError::RunFailed(Box::new(RunFailure {
                    run_id,
                    arm: arm.name().clone(),
                    trial,
                    warmup,
                    partial,
                    source,
                }))
            }
            TrialAbort::Cancelled => {
                if let Err(e) = self.state.transition_to(RunState::Cancelled) {
                    return e.into();
                }
                tracing::warn!(%run_id, arm = %arm.name(), "Comparison run cancelled");

                self.publish(&RunEvent::Cancelled {
                    run_id,
                    partial: partial.clone(),
                });

                HarnessError::Cancelled { run_id, partial }
            }
        }
    }

    fn publish(&self, event: &RunEvent) {
        for observer in &self.observers {
            observer.notify(event);
        }
    }
}

impl Default for ComparisonHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OperationError;

    fn arm(name: &str) -> Arm {
        Arm::from_fn(ArmName::new(name).unwrap(), || async { Ok(()) })
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        assert!(matches!(
            validate_run(&[], 10),
            Err(ValidationError::NoArms)
        ));
        assert!(matches!(
            validate_run(&[arm("a")], 0),
            Err(ValidationError::InvalidIterations { .. })
        ));
        assert!(matches!(
            validate_run(&[arm("a"), arm("a")], 1),
            Err(ValidationError::DuplicateArmName { .. })
        ));
        assert!(validate_run(&[arm("a"), arm("b")], 1).is_ok());
    }

    #[test]
    fn test_ratio_from_means() {
        let result = ComparisonResult::new(
            Uuid::nil(),
            1,
            vec![
                ArmResult {
                    name: ArmName::new("fast").unwrap(),
                    samples: SampleSet::from(vec![100.0]),
                    aggregate: AggregateResult {
                        mean: 100.0,
                        sample_count: 1,
                    },
                },
                ArmResult {
                    name: ArmName::new("slow").unwrap(),
                    samples: SampleSet::from(vec![250.0]),
                    aggregate: AggregateResult {
                        mean: 250.0,
                        sample_count: 1,
                    },
                },
            ],
        );

        assert_eq!(result.improvement_ratio, Some(2.5));
        assert_eq!(result.ratio_to(1, 0), Some(0.4));
        assert_eq!(result.ratio_to(0, 5), None);
        assert!(result.arm("slow").is_some());
    }

    #[tokio::test]
    async fn test_invalid_config_leaves_state_untouched() {
        let harness = ComparisonHarness::new();
        let err = harness.run(&[arm("a")], 0).await.unwrap_err();

        assert!(matches!(err, HarnessError::Validation(_)));
        assert_eq!(harness.state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_single_arm_has_no_ratio() {
        let harness = ComparisonHarness::new();
        let result = harness.run(&[arm("only")], 3).await.unwrap();

        assert_eq!(result.arms.len(), 1);
        assert_eq!(result.improvement_ratio, None);
        assert_eq!(harness.state(), RunState::Done);
    }

    #[tokio::test]
    async fn test_failed_run_can_be_retried() {
        let harness = ComparisonHarness::new();
        let failing = Arm::from_fn(ArmName::new("down").unwrap(), || async {
            Err(OperationError::UnexpectedStatus { status: 500 })
        });

        let err = harness.run(&[failing], 3).await.unwrap_err();
        assert!(matches!(err, HarnessError::RunFailed(_)));
        assert_eq!(harness.state(), RunState::Failed);

        assert!(harness.run(&[arm("up")], 3).await.is_ok());
        assert_eq!(harness.state(), RunState::Done);
    }
}
