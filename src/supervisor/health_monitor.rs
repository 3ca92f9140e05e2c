//! Background health monitoring utilities for supervisors.
//!
//! Polling a supervisor's children is a separate concern from the
//! supervisor itself: this module provides a standalone background task
//! users can spawn alongside a [`SupervisorNode`], rather than building
//! polling into the node.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use tokio::sync::Mutex;
use tokio::time::interval;

// Layer 3: Internal module imports
use super::node::SupervisorNode;
use super::traits::Child;
use super::types::ChildHealth;

/// Spawn a background task that polls `supervisor`'s children on
/// `check_interval` and logs any non-healthy result.
///
/// Returns the task's `JoinHandle` and a sender; send `()` (or drop the
/// sender) to stop the loop.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio::sync::Mutex;
/// use strata_rt::supervisor::{SupervisorNode, SupervisionStrategy, health_monitor::spawn_health_monitor};
///
/// # use strata_rt::supervisor::Child;
/// # use async_trait::async_trait;
/// # struct MyWorker;
/// # #[derive(Debug)]
/// # struct MyError;
/// # impl std::fmt::Display for MyError {
/// #     fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result { Ok(()) }
/// # }
/// # impl std::error::Error for MyError {}
/// # #[async_trait]
/// # impl Child for MyWorker {
/// #     type Error = MyError;
/// #     async fn start(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     async fn stop(&mut self, _: Duration) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # async fn example() {
/// let supervisor = Arc::new(Mutex::new(SupervisorNode::<MyWorker>::new(
///     SupervisionStrategy::OneForOne { max_retries: 3, within: Duration::from_secs(60) },
/// )));
///
/// let (task_handle, shutdown_tx) = spawn_health_monitor(supervisor, Duration::from_secs(30));
///
/// let _ = shutdown_tx.send(());
/// let _ = task_handle.await;
/// # }
/// ```
pub fn spawn_health_monitor<C>(
    supervisor: Arc<Mutex<SupervisorNode<C>>>,
    check_interval: Duration,
) -> (
    tokio::task::JoinHandle<()>,
    tokio::sync::oneshot::Sender<()>,
)
where
    C: Child + Send + Sync + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();

    let task_handle = tokio::spawn(async move {
        let mut ticker = interval(check_interval);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    let sup = supervisor.lock().await;
                    for (id, health) in sup.health_snapshot().await {
                        match health {
                            ChildHealth::Healthy => {}
                            ChildHealth::Degraded(reason) => {
                                tracing::warn!(child_id = %id, %reason, "child health degraded");
                            }
                            ChildHealth::Failed(reason) => {
                                tracing::error!(child_id = %id, %reason, "child health check failed");
                            }
                        }
                    }
                }
            }
        }
    });

    (task_handle, shutdown_tx)
}
