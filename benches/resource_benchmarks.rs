//! Resource Usage Benchmarks
//!
//! Measures baseline resource consumption:
//! - Memory footprint per actor (incremental: 1 → 10 → 50)
//! - Mailbox construction cost at different throughput quotas

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use strata_rt::broker::{InMemoryMessageBroker, MessageBroker, ProcessRegistry};
use strata_rt::mailbox::{DelegateError, Mailbox, MailboxDelegate};
use strata_rt::message::{Envelope, SystemMessage};
use strata_rt::util::{ActorId, Address, Pid};
use strata_rt::{Actor, ActorContext, Message};

/// Test message
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BenchMessage {
    value: u64,
}

impl Message for BenchMessage {
    const MESSAGE_TYPE: &'static str = "BenchMessage";
}

/// Simple error type
#[derive(Debug)]
struct BenchError;

impl std::fmt::Display for BenchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BenchError")
    }
}

impl std::error::Error for BenchError {}

/// Test actor
struct TestActor {
    state: u64,
}

impl TestActor {
    fn new() -> Self {
        Self { state: 0 }
    }
}

#[async_trait]
impl Actor for TestActor {
    type Message = BenchMessage;
    type Error = BenchError;

    async fn handle_message<B: MessageBroker<Self::Message>>(
        &mut self,
        message: Self::Message,
        _context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        self.state += message.value;
        Ok(())
    }
}

fn bench_pid(name: &str) -> Pid {
    Pid::new(Address::new(format!("bench:{name}")), ActorId::new())
}

fn bench_broker() -> InMemoryMessageBroker<BenchMessage> {
    let registry = Arc::new(ProcessRegistry::new(Address::new("bench:9000")));
    InMemoryMessageBroker::new(registry)
}

/// Benchmark: Memory per actor (incremental scaling)
fn memory_per_actor_baseline(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_per_actor");

    for actor_count in [1, 10, 50] {
        group.bench_with_input(
            BenchmarkId::from_parameter(actor_count),
            &actor_count,
            |b, &count| {
                b.iter(|| {
                    let mut actors = Vec::with_capacity(count);

                    for i in 0..count {
                        let actor = TestActor::new();
                        let pid = bench_pid(&format!("actor-{i}"));
                        let context = ActorContext::new(pid, bench_broker());
                        actors.push((actor, context));
                    }

                    black_box(actors);
                });
            },
        );
    }

    group.finish();
}

struct NoopDelegate;

#[async_trait]
impl MailboxDelegate<BenchMessage> for NoopDelegate {
    async fn handle_system(&self, _message: SystemMessage) -> Result<(), DelegateError> {
        Ok(())
    }

    async fn handle_user(&self, _envelope: Envelope<BenchMessage>) -> Result<(), DelegateError> {
        Ok(())
    }

    async fn on_user_failure(&self, _error: DelegateError) {}
}

/// Benchmark: Mailbox construction cost at different throughput quotas
fn mailbox_memory_comparison(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("mailbox_memory");

    group.bench_function("throughput_16", |b| {
        b.to_async(&rt).iter(|| async {
            let mailboxes: Vec<_> = (0..10)
                .map(|_| Mailbox::new(NoopDelegate, 16))
                .collect();

            black_box(mailboxes);
        });
    });

    group.bench_function("throughput_default", |b| {
        b.to_async(&rt).iter(|| async {
            let mailboxes: Vec<_> = (0..10)
                .map(|_| Mailbox::with_default_throughput(NoopDelegate))
                .collect();

            black_box(mailboxes);
        });
    });

    group.finish();
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
        memory_per_actor_baseline,
        mailbox_memory_comparison
}

criterion_main!(benches);
