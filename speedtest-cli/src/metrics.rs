// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Prometheus metrics for comparison runs, served at `/metrics`.

use std::net::SocketAddr;

use axum::{http::header, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    pub static ref TRIAL_DURATION: HistogramVec = register_histogram_vec!(
        "speedtest_trial_duration_seconds",
        "Wall-clock duration of a single timed trial",
        &["arm"],
        vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5]
    )
    .unwrap();
    pub static ref TRIALS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "speedtest_trials_total",
        "Total number of completed timed trials",
        &["arm"]
    )
    .unwrap();
    pub static ref RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "speedtest_runs_total",
        "Total number of comparison runs by terminal state",
        &["state"]
    )
    .unwrap();
}

/// Router exposing the registry in the prometheus text format.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics))
}

/// Start the metrics server in a background task.
pub fn start_metrics_server(port: u16) {
    // Register every metric so the first scrape lists them all
    lazy_static::initialize(&TRIAL_DURATION);
    lazy_static::initialize(&TRIALS_TOTAL);
    lazy_static::initialize(&RUNS_TOTAL);

    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                tracing::info!("Metrics server listening on http://{}/metrics", addr);
                if let Err(e) = axum::serve(listener, metrics_router()).await {
                    tracing::error!("Metrics server stopped: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to bind metrics server: {}", e);
            }
        }
    });
}

async fn metrics() -> ([(header::HeaderName, &'static str); 1], String) {
    (
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        render_metrics(),
    )
}

pub(crate) fn render_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|_| String::from("Encoding error"))
}
