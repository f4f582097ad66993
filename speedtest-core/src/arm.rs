// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Arms: the named operations under comparison.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::OperationError;
use crate::types::ArmName;

/// A zero-argument asynchronous operation whose latency is measured.
///
/// Implementations should perform the same logical work on every call so
/// that trials are comparable.
#[async_trait]
pub trait Operation: Send + Sync {
    async fn call(&self) -> Result<(), OperationError>;
}

/// Adapter turning a closure that returns a future into an [`Operation`].
struct FnOperation<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Operation for FnOperation<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), OperationError>> + Send,
{
    async fn call(&self) -> Result<(), OperationError> {
        (self.f)().await
    }
}

/// A named operation taking part in a comparison run.
#[derive(Clone)]
pub struct Arm {
    name: ArmName,
    operation: Arc<dyn Operation>,
}

impl Arm {
    pub fn new(name: ArmName, operation: impl Operation + 'static) -> Self {
        Self {
            name,
            operation: Arc::new(operation),
        }
    }

    /// Build an arm from an async closure.
    pub fn from_fn<F, Fut>(name: ArmName, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), OperationError>> + Send + 'static,
    {
        Self::new(name, FnOperation { f })
    }

    pub fn name(&self) -> &ArmName {
        &self.name
    }

    /// Invoke the operation once.
    pub async fn call(&self) -> Result<(), OperationError> {
        self.operation.call().await
    }
}

impl fmt::Debug for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arm").field("name", &self.name).finish()
    }
}
