// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Aggregation microbenchmarks.
//!
//! Measures the trimmed mean and full report metrics at typical run sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use speedtest_core::{trimmed_mean, AggregateResult, ArmName, ArmResult, SampleSet};
use speedtest_report::ArmMetrics;

/// Sample counts to test.
const SAMPLE_COUNTS: &[usize] = &[10, 100, 1_000, 10_000];

/// Deterministic latency-like samples with a few stragglers.
fn samples(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let base = 100.0 + (i % 17) as f64 * 0.75;
            if i % 50 == 49 {
                base * 8.0
            } else {
                base
            }
        })
        .collect()
}

fn bench_trimmed_mean(c: &mut Criterion) {
    let mut group = c.benchmark_group("trimmed_mean");

    for &n in SAMPLE_COUNTS {
        let data = samples(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| trimmed_mean(black_box(data)));
        });
    }

    group.finish();
}

fn bench_arm_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("arm_metrics");

    for &n in SAMPLE_COUNTS {
        let set = SampleSet::from(samples(n));
        let arm = ArmResult {
            name: ArmName::new("bench").expect("valid arm name"),
            aggregate: AggregateResult::from_samples(&set),
            samples: set,
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &arm, |b, arm| {
            b.iter(|| ArmMetrics::from_arm(black_box(arm)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_trimmed_mean, bench_arm_metrics);
criterion_main!(benches);
