// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Speed Test Reporting
//!
//! Turns completed comparison runs into per-arm latency metrics and saves
//! them as timestamped JSON reports for later visualization.

pub mod metrics;
pub mod reporter;

pub use metrics::{format_millis, ArmMetrics, ComparisonReport, SystemInfo};
pub use reporter::{JsonReporter, ReporterError};
