// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `speedtest validate` command - Validate configuration file.

use speedtest_core::{ConfigLoader, TransportConfig};

pub async fn execute(file: &str) -> anyhow::Result<()> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Benchmark Settings:");
            println!("  Iterations:       {}", config.benchmark.iterations);
            println!("  Warmup:           {}", config.benchmark.warmup);
            println!(
                "  Output Directory: {}",
                config.benchmark.output_dir.display()
            );
            println!();
            println!("Arms ({}):", config.arms.len());
            for arm in &config.arms {
                match &arm.transport {
                    TransportConfig::Http { url, method } => {
                        println!("  - {} (http {} {})", arm.name, method, url)
                    }
                    TransportConfig::Rpc {
                        endpoint, method, ..
                    } => println!("  - {} (rpc {} at {})", arm.name, method, endpoint),
                    TransportConfig::Simulated { delay, jitter } => println!(
                        "  - {} (simulated {}ms ± {}ms)",
                        arm.name,
                        delay.as_millis(),
                        jitter.as_millis()
                    ),
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
