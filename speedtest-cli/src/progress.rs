// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Console progress reporting and metric recording for a running comparison.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use speedtest_core::{RunEvent, RunObserver};

use crate::metrics::{RUNS_TOTAL, TRIALS_TOTAL, TRIAL_DURATION};

/// Prints one progress line per arm and feeds the prometheus metrics.
pub struct ConsoleProgress {
    iterations: usize,
    /// Index of the arm whose line is currently open
    current_arm: AtomicUsize,
}

impl ConsoleProgress {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            current_arm: AtomicUsize::new(usize::MAX),
        }
    }
}

/// Progress line text for `done` of `total` trials.
pub(crate) fn progress_line(arm: &str, done: usize, total: usize, last_ms: f64) -> String {
    let percent = if total == 0 { 100 } else { done * 100 / total };
    format!(
        "  ▶ {:<12} {:>5}/{:<5} {:>3}%  last {:.2}ms",
        arm, done, total, percent, last_ms
    )
}

impl RunObserver for ConsoleProgress {
    fn notify(&self, event: &RunEvent) {
        match event {
            RunEvent::Trial {
                arm_index,
                progress,
                ..
            } => {
                let arm = progress.arm.as_str();
                TRIALS_TOTAL.with_label_values(&[arm]).inc();
                TRIAL_DURATION
                    .with_label_values(&[arm])
                    .observe(progress.sample / 1_000.0);

                let previous = self.current_arm.swap(*arm_index, Ordering::Relaxed);
                if previous != *arm_index && previous != usize::MAX {
                    println!();
                }

                print!(
                    "\r{}",
                    progress_line(arm, progress.trial + 1, self.iterations, progress.sample)
                );
                let _ = std::io::stdout().flush();
            }
            RunEvent::Completed(_) => {
                println!();
                RUNS_TOTAL.with_label_values(&["done"]).inc();
            }
            RunEvent::Failed { .. } => {
                println!();
                RUNS_TOTAL.with_label_values(&["failed"]).inc();
            }
            RunEvent::Cancelled { .. } => {
                println!();
                RUNS_TOTAL.with_label_values(&["cancelled"]).inc();
            }
        }
    }
}
