// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Run state machine with typed state transitions.
//!
//! Implements the run lifecycle: Idle → RunningArm(0) → ... → RunningArm(k-1) → Done,
//! with Failed and Cancelled as alternative terminal states.
//! Invalid transitions result in StateTransitionError.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::StateTransitionError;

/// Run lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    /// No run has been requested yet.
    Idle,

    /// Trials of the arm at `index` are executing.
    RunningArm { index: usize },

    /// Every arm completed and was aggregated.
    Done,

    /// An arm's operation failed; partial samples only.
    Failed,

    /// The run was abandoned before completing.
    Cancelled,
}

impl RunState {
    /// Get the state name for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::RunningArm { .. } => "RunningArm",
            Self::Done => "Done",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether a run currently owns the harness.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::RunningArm { .. })
    }

    /// Check if transition to the target state is valid.
    pub fn can_transition_to(&self, target: RunState) -> bool {
        match (self, target) {
            // A new run may start from any resting state
            (
                Self::Idle | Self::Done | Self::Failed | Self::Cancelled,
                Self::RunningArm { index: 0 },
            ) => true,
            // Arms run strictly in order
            (Self::RunningArm { index }, Self::RunningArm { index: next }) => next == index + 1,
            (Self::RunningArm { .. }, Self::Done | Self::Failed | Self::Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RunningArm { index } => write!(f, "RunningArm({})", index),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// State machine for a harness's runs.
///
/// The current state is published on a watch channel so UIs can follow
/// phase changes without polling.
#[derive(Debug)]
pub struct RunStateMachine {
    tx: watch::Sender<RunState>,
}

impl RunStateMachine {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RunState::Idle);
        Self { tx }
    }

    /// Get the current state.
    pub fn state(&self) -> RunState {
        *self.tx.borrow()
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.tx.subscribe()
    }

    /// Attempt to transition to a new state.
    ///
    /// The check and the update happen under the channel's lock, so two
    /// callers racing to start a run cannot both succeed.
    pub fn transition_to(&self, target: RunState) -> Result<(), StateTransitionError> {
        let mut outcome = Ok(());

        self.tx.send_if_modified(|current| {
            if !current.can_transition_to(target) {
                outcome = Err(StateTransitionError::InvalidTransition {
                    from: *current,
                    to: target,
                });
                return false;
            }

            tracing::debug!(from = %current, to = %target, "Run state transition");
            *current = target;
            true
        });

        outcome
    }

    /// Move a running state to Cancelled. Returns whether a run was active.
    pub(crate) fn abandon(&self) -> bool {
        self.tx.send_if_modified(|current| {
            if !current.is_running() {
                return false;
            }
            tracing::warn!(from = %current, "Run abandoned before completion");
            *current = RunState::Cancelled;
            true
        })
    }
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
