//! Core traits for the supervisor framework.
//!
//! This module defines the `Child` trait: the lifecycle interface for
//! supervised entities.
//!
//! # Architecture
//!
//! The `Child` trait is intentionally separate from the `Actor` trait
//! (ADR-006) to enable supervision of ANY entity type, not just actors.
//! Actors that need to be supervised must explicitly implement `Child`,
//! maintaining clean separation between message-passing behavior and
//! supervision lifecycle.
//!
//! Deciding WHAT to do about a failure lives in
//! [`crate::supervisor::SupervisionStrategy`], a closed set of data
//! carrying variants rather than a trait: see that module for why.

// Layer 1: Standard library imports
use std::error::Error;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::types::ChildHealth;

/// Child trait for entities that can be supervised.
///
/// Any entity implementing this trait can be placed under supervisor
/// management, enabling fault-tolerant hierarchical supervision trees.
/// This trait is intentionally independent of `Actor` to allow
/// supervision of diverse entity types including actors, background
/// tasks, I/O handlers, and system services.
///
/// # Actor Supervision
///
/// Actors are **NOT** automatically Children. To supervise an actor,
/// implement `Child` for a thin wrapper that owns the actor's mailbox
/// and issues `Started`/`Stopping` system messages from `start`/`stop`.
///
/// # Examples
///
/// ```rust
/// use strata_rt::supervisor::{Child, ChildHealth};
/// use async_trait::async_trait;
/// use std::time::Duration;
///
/// struct BackgroundWorker {
///     name: String,
///     running: bool,
/// }
///
/// #[derive(Debug)]
/// struct WorkerError;
///
/// impl std::fmt::Display for WorkerError {
///     fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
///         write!(f, "worker error")
///     }
/// }
///
/// impl std::error::Error for WorkerError {}
///
/// #[async_trait]
/// impl Child for BackgroundWorker {
///     type Error = WorkerError;
///
///     async fn start(&mut self) -> Result<(), Self::Error> {
///         self.running = true;
///         Ok(())
///     }
///
///     async fn stop(&mut self, _timeout: Duration) -> Result<(), Self::Error> {
///         self.running = false;
///         Ok(())
///     }
///
///     async fn health_check(&self) -> ChildHealth {
///         if self.running {
///             ChildHealth::Healthy
///         } else {
///             ChildHealth::Failed("not running".into())
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Child: Send + Sync + 'static {
    /// Error type for child lifecycle operations
    type Error: Error + Send + Sync + 'static;

    /// Start the child process.
    ///
    /// # Errors
    /// Returns an error if initialization fails. The supervisor applies
    /// its strategy to decide what happens next.
    async fn start(&mut self) -> Result<(), Self::Error>;

    /// Stop the child process gracefully within `timeout`.
    ///
    /// # Errors
    /// Returns an error if shutdown fails; the child is considered
    /// stopped regardless.
    async fn stop(&mut self, timeout: Duration) -> Result<(), Self::Error>;

    /// Report this child's current health. Defaults to `Healthy`;
    /// override for proactive failure detection.
    async fn health_check(&self) -> ChildHealth {
        ChildHealth::Healthy
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::{ActorContext, Message};
    use std::fmt;

    struct TestChild {
        started: bool,
        stopped: bool,
    }

    #[derive(Debug)]
    struct TestError;

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test error")
        }
    }

    impl Error for TestError {}

    #[async_trait]
    impl Child for TestChild {
        type Error = TestError;

        async fn start(&mut self) -> Result<(), Self::Error> {
            self.started = true;
            Ok(())
        }

        async fn stop(&mut self, _timeout: Duration) -> Result<(), Self::Error> {
            self.stopped = true;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_child_lifecycle() {
        let mut child = TestChild {
            started: false,
            stopped: false,
        };

        child.start().await.unwrap();
        assert!(child.started);

        let health = child.health_check().await;
        assert!(health.is_healthy());

        child.stop(Duration::from_secs(1)).await.unwrap();
        assert!(child.stopped);
    }

    struct TestActor {
        count: u32,
    }

    #[derive(Debug, Clone)]
    struct TestMessage;

    impl Message for TestMessage {
        const MESSAGE_TYPE: &'static str = "test";
    }

    #[derive(Debug)]
    struct TestActorError;

    impl fmt::Display for TestActorError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test actor error")
        }
    }

    impl Error for TestActorError {}

    #[async_trait]
    impl Actor for TestActor {
        type Message = TestMessage;
        type Error = TestActorError;

        async fn handle_message<B: crate::broker::MessageBroker<Self::Message>>(
            &mut self,
            _msg: Self::Message,
            _ctx: &mut ActorContext<Self::Message, B>,
        ) -> Result<(), Self::Error> {
            self.count += 1;
            Ok(())
        }
    }

    // Explicitly implement Child for TestActor (no blanket impl from Actor).
    #[async_trait]
    impl Child for TestActor {
        type Error = TestActorError;

        async fn start(&mut self) -> Result<(), Self::Error> {
            self.count = 0;
            Ok(())
        }

        async fn stop(&mut self, _timeout: Duration) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn health_check(&self) -> ChildHealth {
            ChildHealth::Healthy
        }
    }

    #[tokio::test]
    async fn test_actor_child_explicit_impl() {
        let mut actor = TestActor { count: 0 };
        actor.start().await.unwrap();
        let health = actor.health_check().await;
        assert!(health.is_healthy());
        actor.stop(Duration::from_secs(1)).await.unwrap();
    }

    #[test]
    fn test_child_trait_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TestChild>();
    }
}
