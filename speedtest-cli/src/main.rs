// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Speedtest CLI
//!
//! Command-line interface for comparing the latency of two transports.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod arms;
mod commands;
mod metrics;
mod progress;
mod rpc;
mod server;

use commands::run::RunOptions;

/// Speedtest - RPC vs HTTP latency comparison harness
#[derive(Parser)]
#[command(name = "speedtest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "speedtest.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the comparison described by the configuration
    Run {
        /// Trials per arm (overrides the configuration)
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Untimed warm-up calls per arm (overrides the configuration)
        #[arg(short, long)]
        warmup: Option<u32>,

        /// Report output directory (overrides the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip writing the JSON report
        #[arg(long)]
        no_report: bool,

        /// Print every trial's timing
        #[arg(short, long)]
        detailed: bool,

        /// Expose prometheus metrics on this port while running
        #[arg(long)]
        metrics_port: Option<u16>,
    },

    /// Start the fixture task backend
    Serve {
        /// Listen port
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Delay applied before every response, in milliseconds
        #[arg(long, default_value_t = 100)]
        delay_ms: u64,

        /// Number of generated tasks
        #[arg(long, default_value_t = 1000)]
        tasks: usize,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Run {
            iterations,
            warmup,
            output,
            no_report,
            detailed,
            metrics_port,
        } => {
            let options = RunOptions {
                iterations,
                warmup,
                output,
                no_report,
                detailed,
                metrics_port,
            };
            commands::run::execute(&cli.config, options).await
        }
        Commands::Serve {
            port,
            delay_ms,
            tasks,
        } => commands::serve::execute(port, delay_ms, tasks).await,
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
