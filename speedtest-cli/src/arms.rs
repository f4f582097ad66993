// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Concrete arms built from configuration.
//!
//! Each arm gets its own HTTP client so connection pools are not shared
//! between the transports being compared.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use speedtest_core::{Arm, ArmConfig, HttpMethod, Operation, OperationError, TransportConfig};

use crate::rpc::{RpcRequest, RpcResponse};

/// Per-request timeout for network arms
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a runnable arm from its validated configuration.
pub fn build_arm(config: &ArmConfig) -> Result<Arm, reqwest::Error> {
    let arm = match &config.transport {
        TransportConfig::Http { url, method } => Arm::new(
            config.name.clone(),
            HttpOperation {
                client: new_client()?,
                url: url.clone(),
                method: *method,
            },
        ),
        TransportConfig::Rpc {
            endpoint,
            method,
            params,
        } => Arm::new(
            config.name.clone(),
            RpcOperation {
                client: new_client()?,
                endpoint: endpoint.clone(),
                request: RpcRequest {
                    method: method.clone(),
                    params: params.clone(),
                },
            },
        ),
        TransportConfig::Simulated { delay, jitter } => Arm::new(
            config.name.clone(),
            SimulatedOperation {
                delay: *delay,
                jitter: *jitter,
            },
        ),
    };

    tracing::debug!(arm = %config.name, "Arm built");
    Ok(arm)
}

fn new_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(REQUEST_TIMEOUT).build()
}

fn transport_error(e: reqwest::Error) -> OperationError {
    OperationError::Transport {
        reason: e.to_string(),
    }
}

/// Plain request/response fetch, decoding the JSON body.
pub struct HttpOperation {
    client: Client,
    url: String,
    method: HttpMethod,
}

#[async_trait]
impl Operation for HttpOperation {
    async fn call(&self) -> Result<(), OperationError> {
        let request = match self.method {
            HttpMethod::Get => self.client.get(&self.url),
            HttpMethod::Post => self.client.post(&self.url),
        };

        let response = request
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(OperationError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| OperationError::Decode {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}

/// Structured method call posted as an envelope.
pub struct RpcOperation {
    client: Client,
    endpoint: String,
    request: RpcRequest,
}

#[async_trait]
impl Operation for RpcOperation {
    async fn call(&self) -> Result<(), OperationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let reply: RpcResponse = response.json().await.map_err(|e| {
            if status.is_success() {
                OperationError::Decode {
                    reason: e.to_string(),
                }
            } else {
                OperationError::UnexpectedStatus {
                    status: status.as_u16(),
                }
            }
        })?;

        match (reply.result, reply.error) {
            (_, Some(error)) => Err(OperationError::Remote {
                message: error.message,
            }),
            (Some(_), None) => Ok(()),
            (None, None) => Err(OperationError::Decode {
                reason: "reply has neither result nor error".to_string(),
            }),
        }
    }
}

/// Local sleep standing in for a backend.
pub struct SimulatedOperation {
    delay: Duration,
    jitter: Duration,
}

impl SimulatedOperation {
    /// `delay ± jitter`, uniformly distributed.
    fn next_wait(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.delay;
        }

        let offset = rand::thread_rng().gen_range(0..=jitter_ms * 2);
        (self.delay + Duration::from_millis(offset)).saturating_sub(self.jitter)
    }
}

#[async_trait]
impl Operation for SimulatedOperation {
    async fn call(&self) -> Result<(), OperationError> {
        let wait = self.next_wait();
        tokio::time::sleep(wait).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speedtest_core::ArmName;

    #[test]
    fn test_simulated_wait_within_jitter() {
        let op = SimulatedOperation {
            delay: Duration::from_millis(100),
            jitter: Duration::from_millis(10),
        };
        for _ in 0..100 {
            let wait = op.next_wait();
            assert!(wait >= Duration::from_millis(90));
            assert!(wait <= Duration::from_millis(110));
        }
    }

    #[test]
    fn test_simulated_without_jitter_is_exact() {
        let op = SimulatedOperation {
            delay: Duration::from_millis(7),
            jitter: Duration::ZERO,
        };
        assert_eq!(op.next_wait(), Duration::from_millis(7));
    }

    #[tokio::test]
    async fn test_build_simulated_arm() {
        let config = ArmConfig {
            name: ArmName::new("sleepy").unwrap(),
            transport: TransportConfig::Simulated {
                delay: Duration::from_millis(1),
                jitter: Duration::ZERO,
            },
        };

        let arm = build_arm(&config).unwrap();
        assert_eq!(arm.name().as_str(), "sleepy");
        assert!(arm.call().await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let config = ArmConfig {
            name: ArmName::new("http").unwrap(),
            transport: TransportConfig::Http {
                // Port 9 (discard) is almost never listening on loopback
                url: "http://127.0.0.1:9/api/get-tasks".to_string(),
                method: HttpMethod::Get,
            },
        };

        let arm = build_arm(&config).unwrap();
        assert!(matches!(
            arm.call().await,
            Err(OperationError::Transport { .. })
        ));
    }
}
