// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Wall-clock timing of asynchronous operations.
//!
//! Readings are milliseconds as `f64`. The [`Clock`] seam lets tests drive
//! timing deterministically.

use std::future::Future;
use std::time::Instant;

/// Source of monotonic timestamps in milliseconds.
pub trait Clock: Send + Sync {
    /// Current reading in milliseconds. Only differences are meaningful.
    fn now(&self) -> f64;
}

/// Clock backed by [`Instant`], measured from its creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1_000.0
    }
}

/// One timed invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Clock reading before the operation was invoked
    pub started_at: f64,
    /// Clock reading after the operation settled
    pub finished_at: f64,
}

impl Timing {
    /// Elapsed milliseconds, never negative.
    pub fn duration(&self) -> f64 {
        (self.finished_at - self.started_at).max(0.0)
    }
}

/// Await `operation` and report how long it took to settle.
///
/// The output is returned whether it is a success or an error; the caller
/// decides what a failed operation means.
pub async fn time_operation<F, T>(clock: &dyn Clock, operation: F) -> (T, Timing)
where
    F: Future<Output = T>,
{
    let started_at = clock.now();
    let output = operation.await;
    let finished_at = clock.now();
    (
        output,
        Timing {
            started_at,
            finished_at,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let first = clock.now();
        std::thread::sleep(Duration::from_millis(2));
        assert!(clock.now() >= first + 2.0);
    }

    #[test]
    fn test_duration_is_non_negative() {
        let timing = Timing {
            started_at: 10.0,
            finished_at: 9.5,
        };
        assert_eq!(timing.duration(), 0.0);
    }

    #[tokio::test]
    async fn test_time_operation() {
        let clock = MonotonicClock::new();
        let (value, timing) = time_operation(&clock, async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            42
        })
        .await;

        assert_eq!(value, 42);
        assert!(timing.duration() >= 5.0, "Elapsed {} < 5ms", timing.duration());
    }
}
