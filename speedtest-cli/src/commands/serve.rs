// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `speedtest serve` command - Run the fixture task backend.

use std::time::Duration;

use crate::server::start_server;

pub async fn execute(port: u16, delay_ms: u64, tasks: usize) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              SPEEDTEST FIXTURE SERVER                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  GET  http://127.0.0.1:{}/api/get-tasks?status=open", port);
    println!("  POST http://127.0.0.1:{}/rpc", port);
    println!("  Tasks: {}, delay: {}ms", tasks, delay_ms);
    println!();

    start_server(port, Duration::from_millis(delay_ms), tasks)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
