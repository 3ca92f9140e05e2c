//! Supervisor framework for fault-tolerant actor supervision (§4.D).
//!
//! BEAM/Erlang-inspired supervision: a [`SupervisorNode`] manages a set of
//! [`Child`]-implementing entities (actors, background tasks, I/O
//! handlers) under one [`SupervisionStrategy`], restarting or stopping
//! them according to that strategy when a failure is reported.
//!
//! # Core concepts
//!
//! - [`Child`] — the lifecycle interface (`start`/`stop`/`health_check`)
//!   a type implements to be supervised. Deliberately independent of
//!   `Actor`: actors must explicitly implement `Child` to be supervised.
//! - [`SupervisionStrategy`] — a closed set of failure-handling policies:
//!   `OneForOne`, `AllForOne`, `AlwaysRestart`, `Stop`, `Escalate`.
//! - [`RestartPolicy`] / [`ShutdownPolicy`] — per-child overrides for
//!   whether a terminated child restarts, and how it's asked to stop.
//! - [`SupervisorTree`] — a registry of `SupervisorNode`s linked by
//!   explicit parent references, used to escalate failures a node's own
//!   strategy can't absorb.
//!
//! # Example
//!
//! ```rust,no_run
//! use strata_rt::supervisor::{Child, ChildHealth, SupervisorNode, SupervisionStrategy};
//! use async_trait::async_trait;
//! use std::time::Duration;
//!
//! struct Worker { id: u32 }
//!
//! #[derive(Debug)]
//! struct WorkerError;
//! impl std::fmt::Display for WorkerError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
//!         write!(f, "worker error")
//!     }
//! }
//! impl std::error::Error for WorkerError {}
//!
//! #[async_trait]
//! impl Child for Worker {
//!     type Error = WorkerError;
//!     async fn start(&mut self) -> Result<(), Self::Error> { Ok(()) }
//!     async fn stop(&mut self, _timeout: Duration) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut supervisor = SupervisorNode::new(SupervisionStrategy::OneForOne {
//!     max_retries: 3,
//!     within: Duration::from_secs(60),
//! });
//!
//! let id = supervisor.child("worker-1").factory(|| Worker { id: 1 }).spawn().await?;
//! // If worker-1 fails, only worker-1 restarts.
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod backoff;
pub mod builder;
pub mod error;
pub mod health_monitor;
pub mod node;
pub mod strategy;
pub mod traits;
pub mod tree;
pub mod types;

// Re-exports for convenient access
pub use backoff::RestartStatistics;
pub use builder::SingleChildBuilder;
pub use error::SupervisorError;
pub use health_monitor::spawn_health_monitor;
pub use node::{ChildEntry, ChildSpec, SupervisorNode};
pub use strategy::{DecisionScope, SupervisionStrategy};
pub use traits::Child;
pub use tree::{SupervisorId, SupervisorTree};
pub use types::{
    ChildHealth, ChildId, ChildState, FailureReason, RestartPolicy, ShutdownPolicy,
    SupervisionDecision, SupervisionDirective,
};
