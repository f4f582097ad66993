// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Progress notifications for comparison runs.
//!
//! Observers are called synchronously from the run, once per completed
//! trial and once when the run ends. Every payload is an owned snapshot.

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::orchestrator::ComparisonResult;
use crate::samples::{ArmSamples, SampleSnapshot};
use crate::types::ArmName;

/// One completed trial.
#[derive(Debug, Clone, Serialize)]
pub struct TrialProgress {
    pub arm: ArmName,
    /// Zero-based trial index within the arm
    pub trial: usize,
    /// Duration of this trial in milliseconds
    pub sample: f64,
    pub started_at: f64,
    pub finished_at: f64,
    /// Samples recorded so far for this arm, `trial + 1` entries
    pub samples: SampleSnapshot,
}

/// Notification emitted by the harness.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Trial {
        run_id: Uuid,
        arm_index: usize,
        progress: TrialProgress,
    },
    Completed(ComparisonResult),
    Failed {
        run_id: Uuid,
        partial: Vec<ArmSamples>,
        reason: String,
    },
    Cancelled {
        run_id: Uuid,
        partial: Vec<ArmSamples>,
    },
}

impl RunEvent {
    /// Whether this is the last event of a run.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Trial { .. })
    }
}

/// Receives run notifications.
pub trait RunObserver: Send + Sync {
    fn notify(&self, event: &RunEvent);
}

/// Forwards events into an unbounded channel, turning a run into a stream.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RunObserver for ChannelObserver {
    fn notify(&self, event: &RunEvent) {
        // A dropped receiver just means nobody is listening any more
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial_event(trial: usize) -> RunEvent {
        RunEvent::Trial {
            run_id: Uuid::nil(),
            arm_index: 0,
            progress: TrialProgress {
                arm: ArmName::new("rpc").unwrap(),
                trial,
                sample: 1.0,
                started_at: 0.0,
                finished_at: 1.0,
                samples: SampleSnapshot::from(vec![1.0; trial + 1]),
            },
        }
    }

    #[tokio::test]
    async fn test_channel_observer_forwards_in_order() {
        let (observer, mut rx) = ChannelObserver::new();
        observer.notify(&trial_event(0));
        observer.notify(&trial_event(1));
        drop(observer);

        let mut trials = Vec::new();
        while let Some(event) = rx.recv().await {
            if let RunEvent::Trial { progress, .. } = event {
                trials.push(progress.trial);
            }
        }
        assert_eq!(trials, vec![0, 1]);
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (observer, rx) = ChannelObserver::new();
        drop(rx);
        observer.notify(&trial_event(0));
    }

    #[test]
    fn test_terminal_events() {
        assert!(!trial_event(0).is_terminal());
        let cancelled = RunEvent::Cancelled {
            run_id: Uuid::nil(),
            partial: Vec::new(),
        };
        assert!(cancelled.is_terminal());
    }
}
