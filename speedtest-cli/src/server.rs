// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Fixture task backend.
//!
//! Serves the same logical read two ways so both transports can be compared
//! against identical data:
//! - `GET /api/get-tasks?status=open` (plain request/response)
//! - `POST /rpc` with `{ "method": "getTasks", "params": { "status": "open" } }`
//!
//! Both return the full task list; the `status` argument is accepted and
//! ignored so the two payloads are byte-for-byte the same size. Every request
//! sleeps the configured delay before answering.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::rpc::{RpcRequest, RpcResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub status: TaskStatus,
    pub description: String,
    pub date: DateTime<Utc>,
    pub priority: u8,
}

/// Build tasks numbered `1..=count`; even numbers are open, odd closed.
pub fn generate_tasks(count: usize) -> Vec<Task> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    (1..=count)
        .map(|i| Task {
            name: format!("Task name {}", i),
            status: if i % 2 == 0 {
                TaskStatus::Open
            } else {
                TaskStatus::Closed
            },
            description: format!(
                "This is a very detailed description for task {}. It contains all \
                 the information you need to know about this task.",
                i
            ),
            date: now,
            priority: rng.gen_range(1..=5),
        })
        .collect()
}

#[derive(Clone)]
struct ServerState {
    tasks: Arc<Vec<Task>>,
    delay: Duration,
}

/// Router with all fixture routes.
pub fn router(tasks: Vec<Task>, delay: Duration) -> Router {
    let state = ServerState {
        tasks: Arc::new(tasks),
        delay,
    };

    Router::new()
        .route("/api/get-tasks", get(get_tasks))
        .route("/rpc", post(rpc))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    delay: Duration,
    task_count: usize,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(generate_tasks(task_count), delay);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(
        tasks = task_count,
        delay_ms = delay.as_millis() as u64,
        "Fixture server listening on http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn get_tasks(State(state): State<ServerState>) -> Json<Vec<Task>> {
    tokio::time::sleep(state.delay).await;
    Json(state.tasks.as_ref().clone())
}

async fn rpc(
    State(state): State<ServerState>,
    Json(request): Json<RpcRequest>,
) -> Json<RpcResponse> {
    tokio::time::sleep(state.delay).await;

    match request.method.as_str() {
        "getTasks" => match serde_json::to_value(state.tasks.as_ref()) {
            Ok(tasks) => Json(RpcResponse::ok(tasks)),
            Err(e) => Json(RpcResponse::err(e.to_string())),
        },
        other => Json(RpcResponse::err(format!("unknown method '{}'", other))),
    }
}
