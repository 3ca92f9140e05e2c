//! End-to-end actor lifecycle tests against `ActorSystem`: spawn,
//! message delivery through the broker, restart, and shutdown.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use strata_rt::broker::MessageBroker;
use strata_rt::message::{Envelope, Message};
use strata_rt::util::Address;
use strata_rt::{Actor, ActorContext, ActorSystem};

#[derive(Debug, Clone)]
struct Tick;

impl Message for Tick {
    const MESSAGE_TYPE: &'static str = "tick";
}

#[derive(Debug)]
struct WorkerError;

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker error")
    }
}

impl std::error::Error for WorkerError {}

struct Worker {
    starts: Arc<AtomicU32>,
    ticks: Arc<AtomicU32>,
}

#[async_trait]
impl Actor for Worker {
    type Message = Tick;
    type Error = WorkerError;

    async fn handle_message<B: MessageBroker<Self::Message>>(
        &mut self,
        _message: Self::Message,
        _context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn pre_start<B: MessageBroker<Self::Message>>(
        &mut self,
        _context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn wait_until(predicate: impl Fn() -> bool) {
    for _ in 0..100 {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn spawn_send_and_receive_roundtrip() {
    let system = ActorSystem::with_defaults(Address::new("local:9100"));
    let starts = Arc::new(AtomicU32::new(0));
    let ticks = Arc::new(AtomicU32::new(0));
    let (s, t) = (starts.clone(), ticks.clone());

    let pid = system
        .spawn(move || Worker {
            starts: s.clone(),
            ticks: t.clone(),
        })
        .await
        .expect("spawn succeeds");

    wait_until(|| starts.load(Ordering::SeqCst) == 1).await;
    assert_eq!(system.actor_count(), 1);

    for _ in 0..5 {
        system
            .broker()
            .send(Envelope::new(pid.clone(), Tick))
            .await
            .expect("send succeeds");
    }
    wait_until(|| ticks.load(Ordering::SeqCst) == 5).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn restart_reruns_pre_start_on_a_fresh_instance() {
    let system = ActorSystem::with_defaults(Address::new("local:9101"));
    let starts = Arc::new(AtomicU32::new(0));
    let ticks = Arc::new(AtomicU32::new(0));
    let (s, t) = (starts.clone(), ticks.clone());

    let pid = system
        .spawn(move || Worker {
            starts: s.clone(),
            ticks: t.clone(),
        })
        .await
        .expect("spawn succeeds");
    wait_until(|| starts.load(Ordering::SeqCst) == 1).await;

    system.restart(&pid);
    wait_until(|| starts.load(Ordering::SeqCst) == 2).await;
    assert_eq!(starts.load(Ordering::SeqCst), 2);
    assert!(system.registry().get(&pid).is_some());
}

struct Parent;

#[async_trait]
impl Actor for Parent {
    type Message = Tick;
    type Error = WorkerError;

    async fn handle_message<B: MessageBroker<Self::Message>>(
        &mut self,
        _message: Self::Message,
        _context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

struct FlakyWorker {
    starts: Arc<AtomicU32>,
}

#[async_trait]
impl Actor for FlakyWorker {
    type Message = Tick;
    type Error = WorkerError;

    async fn handle_message<B: MessageBroker<Self::Message>>(
        &mut self,
        _message: Self::Message,
        _context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        Err(WorkerError)
    }

    async fn pre_start<B: MessageBroker<Self::Message>>(
        &mut self,
        _context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn a_child_handler_failure_is_restarted_without_a_direct_restart_call() {
    let system = ActorSystem::with_defaults(Address::new("local:9105"));
    let parent = system.spawn(|| Parent).await.expect("spawn succeeds");

    let starts = Arc::new(AtomicU32::new(0));
    let s = starts.clone();
    let child = system
        .spawn_child(parent.clone(), move || FlakyWorker { starts: s.clone() })
        .await
        .expect("spawn_child succeeds");
    wait_until(|| starts.load(Ordering::SeqCst) == 1).await;

    system
        .broker()
        .send(Envelope::new(child.clone(), Tick))
        .await
        .expect("send succeeds");

    // The handler error suspends the child's mailbox and reports the
    // failure to `parent`, whose default `OneForOne` strategy restarts
    // it — no direct call to `ActorSystem::restart` anywhere above.
    wait_until(|| starts.load(Ordering::SeqCst) == 2).await;
    assert_eq!(starts.load(Ordering::SeqCst), 2);
    assert!(system.registry().get(&child).is_some());
}

#[tokio::test]
async fn stop_removes_the_actor_and_shutdown_drains_the_system() {
    let system = ActorSystem::with_defaults(Address::new("local:9102"));
    let starts = Arc::new(AtomicU32::new(0));
    let ticks = Arc::new(AtomicU32::new(0));
    let (s, t) = (starts.clone(), ticks.clone());

    let pid = system
        .spawn(move || Worker {
            starts: s.clone(),
            ticks: t.clone(),
        })
        .await
        .expect("spawn succeeds");
    wait_until(|| starts.load(Ordering::SeqCst) == 1).await;

    system.stop(&pid);
    wait_until(|| system.registry().get(&pid).is_none()).await;
    assert!(system.registry().get(&pid).is_none());

    system.shutdown().await.expect("shutdown succeeds");
}
