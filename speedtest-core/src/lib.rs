// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Speed Test Core Library
//!
//! Measures and compares the round-trip latency of alternative request
//! mechanisms performing the same logical operation. Provides the trial
//! runner, trimmed-mean aggregation, the run state machine and the
//! comparison orchestrator, plus YAML configuration for describing arms.

pub mod aggregate;
pub mod arm;
pub mod cancel;
pub mod config;
pub mod error;
pub mod observer;
pub mod orchestrator;
pub mod runner;
pub mod samples;
pub mod state;
pub mod timer;
pub mod types;

// Re-export commonly used types
pub use aggregate::{
    format_ratio, improvement_ratio, round_half_up, trimmed_mean, AggregateResult,
};
pub use arm::{Arm, Operation};
pub use cancel::CancelToken;
pub use config::{ArmConfig, BenchmarkConfig, Config, ConfigLoader, HttpMethod, TransportConfig};
pub use error::{
    HarnessError, HarnessResult, OperationError, RunFailure, StateTransitionError,
    ValidationError,
};
pub use observer::{ChannelObserver, RunEvent, RunObserver, TrialProgress};
pub use orchestrator::{ArmResult, ComparisonHarness, ComparisonResult};
pub use runner::{AbortedTrials, TrialAbort, TrialRunner};
pub use samples::{ArmSamples, SampleSet, SampleSnapshot};
pub use state::{RunState, RunStateMachine};
pub use timer::{time_operation, Clock, MonotonicClock, Timing};
pub use types::ArmName;
