// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Standardized metrics types for comparison reports.
//!
//! The trimmed mean is the headline figure; the distribution fields are
//! supporting detail for visualization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use speedtest_core::{format_ratio, ArmResult, ComparisonResult};
use sysinfo::System;
use uuid::Uuid;

/// Latency metrics for one arm, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmMetrics {
    /// Arm name
    pub name: String,
    /// 10% trimmed mean, the figure used for comparison
    pub trimmed_mean_ms: f64,
    /// Untrimmed arithmetic mean
    pub mean_ms: f64,
    /// Minimum observed latency
    pub min_ms: f64,
    /// Maximum observed latency
    pub max_ms: f64,
    /// Median (p50) latency
    pub median_ms: f64,
    /// 95th percentile latency
    pub p95_ms: f64,
    /// 99th percentile latency
    pub p99_ms: f64,
    /// Standard deviation
    pub std_dev_ms: f64,
    /// Number of samples
    pub sample_count: usize,
    /// Raw samples in trial order
    pub samples: Vec<f64>,
}

impl ArmMetrics {
    /// Calculate metrics from a completed arm.
    pub fn from_arm(arm: &ArmResult) -> Self {
        let samples = arm.samples.as_slice().to_vec();
        let trimmed_mean_ms = arm.aggregate.mean;

        if samples.is_empty() {
            return Self {
                name: arm.name.to_string(),
                trimmed_mean_ms,
                mean_ms: 0.0,
                min_ms: 0.0,
                max_ms: 0.0,
                median_ms: 0.0,
                p95_ms: 0.0,
                p99_ms: 0.0,
                std_dev_ms: 0.0,
                sample_count: 0,
                samples,
            };
        }

        let mut sorted = samples.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let len = sorted.len();

        let mean_ms = sorted.iter().sum::<f64>() / len as f64;
        let variance: f64 = sorted
            .iter()
            .map(|&x| {
                let diff = x - mean_ms;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;

        Self {
            name: arm.name.to_string(),
            trimmed_mean_ms,
            mean_ms,
            min_ms: sorted[0],
            max_ms: sorted[len - 1],
            median_ms: sorted[len / 2],
            p95_ms: sorted[(len as f64 * 0.95) as usize],
            p99_ms: sorted[(len as f64 * 0.99) as usize],
            std_dev_ms: variance.sqrt(),
            sample_count: len,
            samples,
        }
    }
}

/// Format a latency in human-readable form (auto-selects μs/ms/s).
pub fn format_millis(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.2}μs", ms * 1_000.0)
    } else if ms < 1_000.0 {
        format!("{:.2}ms", ms)
    } else {
        format!("{:.2}s", ms / 1_000.0)
    }
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Complete report of one comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Tool version
    pub version: String,
    /// Run identifier
    pub run_id: Uuid,
    /// Timestamp when the report was produced
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    /// Trials per arm
    pub iterations: usize,
    /// Per-arm metrics, in run order
    pub arms: Vec<ArmMetrics>,
    /// Second arm's trimmed mean over the first arm's
    pub improvement_ratio: Option<f64>,
    /// `improvement_ratio` rendered as `N.Nx`
    pub improvement: String,
}

impl ComparisonReport {
    /// Build a report from a completed comparison.
    pub fn from_result(result: &ComparisonResult) -> Self {
        Self::with_system_info(result, SystemInfo::collect())
    }

    /// Build a report with previously collected system information.
    pub fn with_system_info(result: &ComparisonResult, system_info: SystemInfo) -> Self {
        Self {
            benchmark_suite: "speedtest".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            run_id: result.run_id,
            timestamp: Utc::now(),
            system_info,
            iterations: result.iterations,
            arms: result.arms.iter().map(ArmMetrics::from_arm).collect(),
            improvement_ratio: result.improvement_ratio,
            improvement: format_ratio(result.improvement_ratio),
        }
    }

    /// Look up an arm's metrics by name.
    pub fn arm(&self, name: &str) -> Option<&ArmMetrics> {
        self.arms.iter().find(|a| a.name == name)
    }
}
