// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for the speed test harness.
//!
//! All errors are explicit enum variants. No `Box<dyn Error>` crosses the
//! library boundary; arm operations report failures as [`OperationError`].

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::samples::ArmSamples;
use crate::state::RunState;
use crate::types::ArmName;

/// Top-level error type for the comparison harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    // =========================================================================
    // Configuration Errors - Rejected Before Any Trial Starts
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Run Lifecycle Errors
    // =========================================================================
    #[error("A comparison run is already in progress (state: {state})")]
    RunInProgress { state: RunState },

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(#[from] StateTransitionError),

    #[error("Run failed: {0}")]
    RunFailed(#[from] Box<RunFailure>),

    #[error("Run {run_id} was cancelled")]
    Cancelled {
        run_id: Uuid,
        partial: Vec<ArmSamples>,
    },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid run or file configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("At least one arm is required")]
    NoArms,

    #[error("Iteration count must be at least 1, got {iterations}")]
    InvalidIterations { iterations: usize },

    #[error("Duplicate arm name: {name}")]
    DuplicateArmName { name: String },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Run state machine transition errors.
#[derive(Debug, Error)]
pub enum StateTransitionError {
    #[error("Cannot transition run from {from} to {to}")]
    InvalidTransition { from: RunState, to: RunState },
}

/// Failure reported by an arm's operation.
#[derive(Debug, Clone, Error)]
pub enum OperationError {
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    #[error("Unexpected status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Failed to decode response: {reason}")]
    Decode { reason: String },

    #[error("Remote error: {message}")]
    Remote { message: String },
}

/// A run aborted because one arm's operation failed.
///
/// Samples recorded before the failing trial are preserved in `partial`,
/// one entry per arm that started.
#[derive(Debug, Error)]
#[error("arm '{arm}' failed on trial {trial}: {source}")]
pub struct RunFailure {
    pub run_id: Uuid,
    pub arm: ArmName,
    pub trial: usize,
    pub warmup: bool,
    pub partial: Vec<ArmSamples>,
    #[source]
    pub source: OperationError,
}

/// Result type alias using HarnessError.
pub type HarnessResult<T> = Result<T, HarnessError>;
