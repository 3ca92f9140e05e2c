//! Supervision Benchmarks
//!
//! Measures baseline performance of supervision operations:
//! - Child spawn via builder pattern
//! - Restart strategies comparison (OneForOne, AllForOne, AlwaysRestart)
//! - Small supervision tree operations

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::hint::black_box;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};

// Layer 3: Internal module imports
use strata_rt::supervisor::{Child, SupervisionStrategy, SupervisorNode};

/// Simple test child for benchmarking
#[derive(Clone)]
struct BenchChild {
    #[allow(dead_code)]
    id: u32,
}

impl BenchChild {
    fn new(id: u32) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Child for BenchChild {
    type Error = std::io::Error;

    async fn start(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn stop(&mut self, _timeout: Duration) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn one_for_one() -> SupervisionStrategy {
    SupervisionStrategy::OneForOne {
        max_retries: 3,
        within: Duration::from_secs(60),
    }
}

fn all_for_one() -> SupervisionStrategy {
    SupervisionStrategy::AllForOne {
        max_retries: 3,
        within: Duration::from_secs(60),
    }
}

/// Benchmark: Child spawn via builder
fn supervisor_child_spawn(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");

    c.bench_function("supervisor_child_spawn", |b| {
        b.to_async(&rt).iter(|| async {
            let mut supervisor: SupervisorNode<BenchChild> = SupervisorNode::new(one_for_one());

            let child_id = supervisor
                .child("bench-child")
                .factory(|| BenchChild::new(1))
                .spawn()
                .await
                .expect("Failed to spawn child");

            black_box(child_id);
        });
    });
}

/// Benchmark: Compare restart strategies (spawn overhead)
fn supervisor_restart_strategy(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");

    c.bench_function("supervisor_strategy_one_for_one", |b| {
        b.to_async(&rt).iter(|| async {
            let mut supervisor: SupervisorNode<BenchChild> = SupervisorNode::new(one_for_one());

            let child_id = supervisor
                .child("test-child")
                .factory(|| BenchChild::new(1))
                .spawn()
                .await
                .expect("Failed to spawn");

            black_box(child_id);
        });
    });

    c.bench_function("supervisor_strategy_all_for_one", |b| {
        b.to_async(&rt).iter(|| async {
            let mut supervisor: SupervisorNode<BenchChild> = SupervisorNode::new(all_for_one());

            let mut child_ids = Vec::with_capacity(3);
            for i in 1..=3 {
                let id = supervisor
                    .child(format!("child-{i}"))
                    .factory(move || BenchChild::new(i))
                    .spawn()
                    .await
                    .expect("Failed to spawn children");
                child_ids.push(id);
            }

            black_box(child_ids);
        });
    });

    c.bench_function("supervisor_strategy_always_restart", |b| {
        b.to_async(&rt).iter(|| async {
            let mut supervisor: SupervisorNode<BenchChild> =
                SupervisorNode::new(SupervisionStrategy::AlwaysRestart);

            let mut child_ids = Vec::with_capacity(3);
            for i in 1..=3 {
                let id = supervisor
                    .child(format!("child-{i}"))
                    .factory(move || BenchChild::new(i))
                    .spawn()
                    .await
                    .expect("Failed to spawn children");
                child_ids.push(id);
            }

            black_box(child_ids);
        });
    });
}

/// Benchmark: Small supervision tree operations
fn supervision_tree_small(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("supervision_tree_small", |b| {
        b.to_async(&rt).iter(|| async {
            let mut parent: SupervisorNode<BenchChild> = SupervisorNode::new(one_for_one());

            for i in 1..=3 {
                parent
                    .child(format!("child-{i}"))
                    .factory(move || BenchChild::new(i))
                    .spawn()
                    .await
                    .unwrap();
            }

            black_box(parent);
        });
    });
}

/// Configure criterion for resource-conscious benchmarking
fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2))
        .without_plots()
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets =
        supervisor_child_spawn,
        supervisor_restart_strategy,
        supervision_tree_small
}

criterion_main!(benches);
