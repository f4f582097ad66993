// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Describes the benchmark settings and the arms to compare. Any invalid
//! field results in a ValidationError before a single trial is run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult, ValidationError};
use crate::types::ArmName;

/// Upper bound on trials per arm.
pub const MAX_ITERATIONS: usize = 100_000;
/// Upper bound on warmup calls per arm.
pub const MAX_WARMUP: u32 = 10_000;
/// Upper bound on a simulated arm's delay.
const MAX_SIMULATED_DELAY_MS: u64 = 60_000;

/// Raw benchmark settings as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawBenchmarkConfig {
    #[serde(default = "default_iterations")]
    iterations: usize,
    #[serde(default)]
    warmup: u32,
    #[serde(default = "default_output_dir")]
    output_dir: String,
}

fn default_iterations() -> usize {
    100
}

fn default_output_dir() -> String {
    "data".to_string()
}

impl Default for RawBenchmarkConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            warmup: 0,
            output_dir: default_output_dir(),
        }
    }
}

/// Raw arm description.
#[derive(Debug, Deserialize)]
struct RawArmConfig {
    name: String,
    #[serde(flatten)]
    transport: RawTransport,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawTransport {
    Http {
        url: String,
        #[serde(default = "default_http_method")]
        method: String,
    },
    Rpc {
        endpoint: String,
        method: String,
        #[serde(default)]
        params: serde_json::Value,
    },
    Simulated {
        delay_ms: u64,
        #[serde(default)]
        jitter_ms: u64,
    },
}

fn default_http_method() -> String {
    "GET".to_string()
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    benchmark: RawBenchmarkConfig,
    arms: Vec<RawArmConfig>,
}

/// HTTP verbs accepted for plain request/response arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Validated transport description of an arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    /// Plain request/response call
    Http { url: String, method: HttpMethod },
    /// Structured method call posted as `{ "method", "params" }`
    Rpc {
        endpoint: String,
        method: String,
        params: serde_json::Value,
    },
    /// Local sleep, for dry runs without a backend
    Simulated { delay: Duration, jitter: Duration },
}

/// Validated arm configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    pub name: ArmName,
    pub transport: TransportConfig,
}

/// Validated benchmark settings.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub iterations: usize,
    pub warmup: u32,
    pub output_dir: PathBuf,
}

/// Complete validated configuration.
#[derive(Debug)]
pub struct Config {
    pub benchmark: BenchmarkConfig,
    pub arms: Vec<ArmConfig>,
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> HarnessResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HarnessError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> HarnessResult<Config> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| HarnessError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Ok(Self::validate(raw)?)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawConfig) -> Result<Config, ValidationError> {
        let benchmark = Self::validate_benchmark(raw.benchmark)?;

        let mut arms = Vec::with_capacity(raw.arms.len());
        let mut seen_names = HashSet::new();

        for raw_arm in raw.arms {
            let arm = Self::validate_arm(raw_arm)?;

            if !seen_names.insert(arm.name.as_str().to_string()) {
                return Err(ValidationError::DuplicateArmName {
                    name: arm.name.to_string(),
                });
            }

            arms.push(arm);
        }

        if arms.is_empty() {
            return Err(ValidationError::NoArms);
        }

        Ok(Config { benchmark, arms })
    }

    fn validate_benchmark(raw: RawBenchmarkConfig) -> Result<BenchmarkConfig, ValidationError> {
        if raw.iterations == 0 || raw.iterations > MAX_ITERATIONS {
            return Err(ValidationError::InvalidFieldValue {
                field: "iterations",
                value: raw.iterations.to_string(),
                reason: format!("Must be between 1 and {}", MAX_ITERATIONS),
            });
        }

        if raw.warmup > MAX_WARMUP {
            return Err(ValidationError::InvalidFieldValue {
                field: "warmup",
                value: raw.warmup.to_string(),
                reason: format!("Must not exceed {}", MAX_WARMUP),
            });
        }

        if raw.output_dir.trim().is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "output_dir",
                value: raw.output_dir,
                reason: "Output directory cannot be empty".to_string(),
            });
        }

        Ok(BenchmarkConfig {
            iterations: raw.iterations,
            warmup: raw.warmup,
            output_dir: PathBuf::from(raw.output_dir),
        })
    }

    fn validate_arm(raw: RawArmConfig) -> Result<ArmConfig, ValidationError> {
        let name = ArmName::new(raw.name)?;

        let transport = match raw.transport {
            RawTransport::Http { url, method } => {
                validate_url("url", &url)?;
                let method =
                    HttpMethod::parse(&method).ok_or_else(|| ValidationError::InvalidFieldValue {
                        field: "method",
                        value: method.clone(),
                        reason: "HTTP method must be GET or POST".to_string(),
                    })?;
                TransportConfig::Http { url, method }
            }
            RawTransport::Rpc {
                endpoint,
                method,
                params,
            } => {
                validate_url("endpoint", &endpoint)?;
                if method.trim().is_empty() {
                    return Err(ValidationError::InvalidFieldValue {
                        field: "method",
                        value: method,
                        reason: format!("RPC method name for arm '{}' cannot be empty", name),
                    });
                }
                TransportConfig::Rpc {
                    endpoint,
                    method,
                    params,
                }
            }
            RawTransport::Simulated {
                delay_ms,
                jitter_ms,
            } => {
                if delay_ms > MAX_SIMULATED_DELAY_MS {
                    return Err(ValidationError::InvalidFieldValue {
                        field: "delay_ms",
                        value: delay_ms.to_string(),
                        reason: format!("Must not exceed {}ms", MAX_SIMULATED_DELAY_MS),
                    });
                }
                if jitter_ms > delay_ms {
                    return Err(ValidationError::InvalidFieldValue {
                        field: "jitter_ms",
                        value: jitter_ms.to_string(),
                        reason: "Jitter must not exceed the delay".to_string(),
                    });
                }
                TransportConfig::Simulated {
                    delay: Duration::from_millis(delay_ms),
                    jitter: Duration::from_millis(jitter_ms),
                }
            }
        };

        Ok(ArmConfig { name, transport })
    }
}

fn validate_url(field: &'static str, url: &str) -> Result<(), ValidationError> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));

    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFieldValue {
            field,
            value: url.to_string(),
            reason: "Must be an absolute http:// or https:// URL".to_string(),
        }),
    }
}
