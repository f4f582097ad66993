// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `speedtest run` command - Run a latency comparison.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use speedtest_core::{
    format_ratio, round_half_up, ArmSamples, CancelToken, ComparisonHarness, ComparisonResult,
    ConfigLoader, HarnessError,
};
use speedtest_report::{ComparisonReport, JsonReporter};

use crate::arms::build_arm;
use crate::metrics::start_metrics_server;
use crate::progress::ConsoleProgress;

/// Command-line overrides for the configured benchmark settings.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub iterations: Option<usize>,
    pub warmup: Option<u32>,
    pub output: Option<PathBuf>,
    pub no_report: bool,
    pub detailed: bool,
    pub metrics_port: Option<u16>,
}

pub async fn execute(config_path: &str, options: RunOptions) -> anyhow::Result<()> {
    tracing::info!(config = %config_path, "Starting comparison");

    let config = ConfigLoader::load_file(config_path)?;
    let iterations = options.iterations.unwrap_or(config.benchmark.iterations);
    let warmup = options.warmup.unwrap_or(config.benchmark.warmup);
    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| config.benchmark.output_dir.clone());

    let arms = config
        .arms
        .iter()
        .map(build_arm)
        .collect::<Result<Vec<_>, _>>()
        .context("failed to build HTTP client")?;

    if let Some(port) = options.metrics_port {
        start_metrics_server(port);
    }

    let harness = ComparisonHarness::new()
        .warmup(warmup)
        .observer(Arc::new(ConsoleProgress::new(iterations)));

    let cancel = CancelToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping at next trial");
                cancel.cancel();
            }
        })
    };

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              SPEEDTEST LATENCY COMPARISON                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Arms:       {}", arms.len());
    println!("  Iterations: {}", iterations);
    println!("  Warmup:     {}", warmup);
    println!();

    let outcome = harness.run_cancellable(&arms, iterations, &cancel).await;
    ctrl_c.abort();

    match outcome {
        Ok(result) => {
            println!();
            print!("{}", render_summary(&result));
            if options.detailed {
                println!();
                print!("{}", render_detailed(&samples_of(&result), iterations));
            }

            if !options.no_report {
                let reporter = JsonReporter::new(&output_dir)
                    .with_context(|| format!("creating {}", output_dir.display()))?;
                let path = reporter.save(&ComparisonReport::from_result(&result))?;
                println!();
                println!("✓ Report saved to {}", path.display());
            }
            Ok(())
        }
        Err(HarnessError::RunFailed(failure)) => {
            eprintln!("✗ {}", failure);
            eprintln!();
            eprint!("{}", render_detailed(&failure.partial, iterations));
            Err(HarnessError::RunFailed(failure).into())
        }
        Err(HarnessError::Cancelled { run_id, partial }) => {
            eprintln!("✗ Run {} cancelled", run_id);
            eprintln!();
            eprint!("{}", render_detailed(&partial, iterations));
            Err(HarnessError::Cancelled { run_id, partial }.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn samples_of(result: &ComparisonResult) -> Vec<ArmSamples> {
    result
        .arms
        .iter()
        .map(|a| ArmSamples {
            name: a.name.clone(),
            samples: a.samples.clone(),
        })
        .collect()
}

/// Per-arm trimmed means and the improvement ratio.
pub fn render_summary(result: &ComparisonResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {:<16} {:>14}\n", "Arm", "Mean (ms)"));
    out.push_str(&format!("  {}\n", "─".repeat(31)));
    for arm in &result.arms {
        out.push_str(&format!(
            "  {:<16} {:>14.0}\n",
            arm.name.as_str(),
            round_half_up(arm.aggregate.mean, 0)
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "  Improvement: {}\n",
        format_ratio(result.improvement_ratio)
    ));
    out
}

/// One row per trial, one column per arm. Missing trials print as `-`.
pub fn render_detailed(arms: &[ArmSamples], iterations: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("  {:>6}", "Trial"));
    for arm in arms {
        out.push_str(&format!(" {:>12}", arm.name.as_str()));
    }
    out.push('\n');

    for trial in 0..iterations {
        out.push_str(&format!("  {:>6}", trial + 1));
        for arm in arms {
            let cell = match arm.samples.get(trial) {
                Some(ms) => format!(" {:>12.2}", round_half_up(ms, 2)),
                None => format!(" {:>12}", "-"),
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }
    out
}
