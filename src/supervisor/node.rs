//! `SupervisorNode`: the concrete supervisor that owns a set of children
//! of one `Child` type, applies a [`SupervisionStrategy`], and tracks
//! per-child restart history (§4.D).
//!
//! # Design notes
//!
//! A node is monomorphic in its child type `C`: every child a given
//! node supervises implements the same `Child` impl. Heterogeneous
//! supervision trees are built by nesting — a `SupervisorNode` can
//! itself be wrapped to implement `Child`, so a node of actor-workers
//! and a node of connection-pool tasks compose as siblings under a
//! parent node of a third, uniform child type. This keeps restart
//! dispatch monomorphic and avoids a `dyn Supervisor` at the center of
//! the tree.
//!
//! Each child's factory is stored as `Arc<dyn Fn() -> C + Send + Sync>`.
//! This is a deliberate, bounded exception to "no `dyn`" (§6.2): many
//! distinct closures, one concrete output type, collected into a single
//! `Vec` — the same shape as the process registry's `dyn ProcessSink`.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use super::backoff::RestartStatistics;
use super::error::SupervisorError;
use super::strategy::{DecisionScope, SupervisionStrategy};
use super::traits::Child;
use super::types::{
    ChildHealth, ChildId, ChildState, FailureReason, RestartPolicy, ShutdownPolicy,
    SupervisionDecision, SupervisionDirective,
};

type ChildFactory<C> = Arc<dyn Fn() -> C + Send + Sync>;

/// One supervised child plus the bookkeeping a node needs to restart it.
pub struct ChildEntry<C> {
    id: ChildId,
    name: String,
    child: C,
    factory: ChildFactory<C>,
    state: ChildState,
    restart_policy: RestartPolicy,
    shutdown_policy: ShutdownPolicy,
    stats: RestartStatistics,
    start_time: DateTime<Utc>,
    last_restart: Option<DateTime<Utc>>,
}

impl<C> ChildEntry<C> {
    /// This child's identifier.
    pub fn id(&self) -> &ChildId {
        &self.id
    }

    /// This child's human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChildState {
        self.state
    }

    /// Number of restarts recorded within the strategy's window.
    pub fn restart_count(&self) -> u32 {
        self.stats.count()
    }

    /// Timestamp this child was started.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Timestamp this child was (re)started most recently.
    pub fn last_restart(&self) -> Option<DateTime<Utc>> {
        self.last_restart
    }
}

/// A specification for a new child: its name, factory, and policies.
/// Mirrors [`super::types::ChildSpec`] but keeps the factory boxed so a
/// node can retain it for later restarts.
pub struct ChildSpec<C> {
    pub id: String,
    pub factory: ChildFactory<C>,
    pub restart_policy: RestartPolicy,
    pub shutdown_policy: ShutdownPolicy,
}

impl<C> ChildSpec<C> {
    /// A spec with the defaults used throughout this crate's examples:
    /// `Permanent` restart, 5s graceful shutdown.
    pub fn new<F>(id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            factory: Arc::new(factory),
            restart_policy: RestartPolicy::Permanent,
            shutdown_policy: ShutdownPolicy::Graceful(Duration::from_secs(5)),
        }
    }

    /// Override the restart policy.
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    /// Override the shutdown policy.
    pub fn with_shutdown_policy(mut self, policy: ShutdownPolicy) -> Self {
        self.shutdown_policy = policy;
        self
    }
}

/// A supervisor managing zero or more children of type `C` under one
/// [`SupervisionStrategy`].
pub struct SupervisorNode<C> {
    strategy: SupervisionStrategy,
    children: Vec<ChildEntry<C>>,
}

impl<C: Child> SupervisorNode<C> {
    /// A fresh supervisor with no children.
    pub fn new(strategy: SupervisionStrategy) -> Self {
        Self {
            strategy,
            children: Vec::new(),
        }
    }

    /// This supervisor's strategy.
    pub fn strategy(&self) -> SupervisionStrategy {
        self.strategy
    }

    /// Number of children currently supervised.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// All supervised children, in start order.
    pub fn children(&self) -> &[ChildEntry<C>] {
        &self.children
    }

    /// Look up a child by id.
    pub fn get_child(&self, id: &ChildId) -> Option<&ChildEntry<C>> {
        self.children.iter().find(|entry| &entry.id == id)
    }

    fn index_of(&self, id: &ChildId) -> Result<usize, SupervisorError> {
        self.children
            .iter()
            .position(|entry| &entry.id == id)
            .ok_or_else(|| SupervisorError::ChildNotFound { id: id.clone() })
    }

    fn retry_window(&self) -> (u32, Duration) {
        self.strategy
            .retry_budget()
            .unwrap_or((u32::MAX, Duration::from_secs(60)))
    }

    /// Start a new child from `spec` and place it under supervision.
    ///
    /// # Errors
    /// Returns [`SupervisorError::ChildStartFailed`] if `Child::start`
    /// fails; the child is not added to the supervisor in that case.
    pub async fn start_child(&mut self, spec: ChildSpec<C>) -> Result<ChildId, SupervisorError> {
        let mut child = (spec.factory)();
        child
            .start()
            .await
            .map_err(|source| SupervisorError::ChildStartFailed {
                id: spec.id.clone(),
                source: Box::new(source),
            })?;

        let id = ChildId::new();
        let (max_retries, within) = self.retry_window();
        tracing::info!(child_id = %id, name = %spec.id, "child started");

        self.children.push(ChildEntry {
            id: id.clone(),
            name: spec.id,
            child,
            factory: spec.factory,
            state: ChildState::Running,
            restart_policy: spec.restart_policy,
            shutdown_policy: spec.shutdown_policy,
            stats: RestartStatistics::new(max_retries, within),
            start_time: Utc::now(),
            last_restart: None,
        });
        Ok(id)
    }

    /// Stop and remove a child, regardless of its restart policy.
    ///
    /// # Errors
    /// Returns [`SupervisorError::ChildNotFound`] if `id` isn't
    /// supervised here.
    pub async fn stop_child(&mut self, id: &ChildId) -> Result<(), SupervisorError> {
        let index = self.index_of(id)?;
        let entry = &mut self.children[index];
        entry.state = ChildState::Stopping;
        let timeout = entry.shutdown_policy.timeout().unwrap_or(Duration::from_secs(30));
        if let Err(error) = entry.child.stop(timeout).await {
            tracing::warn!(child_id = %id, %error, "child reported an error while stopping");
        }
        tracing::info!(child_id = %id, "child stopped");
        self.children.remove(index);
        Ok(())
    }

    /// Stop the current instance and replace it with a fresh one from
    /// the same factory, resetting nothing but the restart bookkeeping.
    ///
    /// # Errors
    /// Returns [`SupervisorError::ChildStartFailed`] if the new
    /// instance's `start` fails; the child is left removed in that case
    /// (the caller should treat this as escalation-worthy).
    pub async fn restart_child(&mut self, id: &ChildId) -> Result<(), SupervisorError> {
        let index = self.index_of(id)?;
        let shutdown_timeout = self.children[index]
            .shutdown_policy
            .timeout()
            .unwrap_or(Duration::from_secs(30));

        self.children[index].state = ChildState::Restarting;
        if let Err(error) = self.children[index].child.stop(shutdown_timeout).await {
            tracing::warn!(child_id = %id, %error, "child reported an error during restart shutdown");
        }

        let mut fresh = (self.children[index].factory)();
        fresh
            .start()
            .await
            .map_err(|source| SupervisorError::ChildStartFailed {
                id: self.children[index].name.clone(),
                source: Box::new(source),
            })?;

        let entry = &mut self.children[index];
        entry.child = fresh;
        entry.state = ChildState::Running;
        entry.stats.record_restart();
        entry.last_restart = Some(Utc::now());
        tracing::info!(child_id = %id, restart_count = entry.stats.count(), "child restarted");
        Ok(())
    }

    /// Apply this supervisor's strategy to a failure reported for
    /// `id`, carrying out the resulting restarts/stops and returning
    /// the decision that was taken.
    ///
    /// # Errors
    /// Returns [`SupervisorError::ChildNotFound`] if `id` isn't
    /// supervised here, or propagates a start failure encountered while
    /// restarting.
    pub async fn handle_child_failure(
        &mut self,
        id: &ChildId,
        reason: FailureReason,
    ) -> Result<SupervisionDecision, SupervisorError> {
        let index = self.index_of(id)?;
        tracing::warn!(child_id = %id, reason = %reason.description, "child failed");

        if !self.children[index].restart_policy.should_restart(true) {
            self.stop_child(id).await?;
            return Ok(SupervisionDecision::StopChild(id.clone()));
        }

        let directive = self.strategy.decide(&self.children[index].stats);
        match directive {
            SupervisionDirective::Resume => {
                self.children[index].state = ChildState::Running;
                Ok(SupervisionDecision::Resume(id.clone()))
            }
            SupervisionDirective::Stop => {
                self.stop_child(id).await?;
                Ok(SupervisionDecision::StopChild(id.clone()))
            }
            SupervisionDirective::Escalate => {
                Ok(SupervisionDecision::Escalate(reason.description))
            }
            SupervisionDirective::Restart => match self.strategy.scope() {
                DecisionScope::FailedChild => {
                    self.restart_child(id).await?;
                    Ok(SupervisionDecision::RestartChild(id.clone()))
                }
                DecisionScope::AllChildren => {
                    let all: Vec<ChildId> = self.children.iter().map(|c| c.id.clone()).collect();
                    for child_id in &all {
                        self.restart_child(child_id).await?;
                    }
                    Ok(SupervisionDecision::RestartAll(all))
                }
            },
        }
    }

    /// Run `Child::health_check` for every supervised child.
    pub async fn health_snapshot(&self) -> Vec<(ChildId, ChildHealth)> {
        let mut snapshot = Vec::with_capacity(self.children.len());
        for entry in &self.children {
            snapshot.push((entry.id.clone(), entry.child.health_check().await));
        }
        snapshot
    }

    /// Stop every child, in reverse start order.
    pub async fn stop_all(&mut self) -> Result<(), SupervisorError> {
        let ids: Vec<ChildId> = self.children.iter().rev().map(|c| c.id.clone()).collect();
        for id in ids {
            self.stop_child(&id).await?;
        }
        Ok(())
    }

    /// Start a fluent builder for a new child named `id`.
    pub fn child(&mut self, id: impl Into<String>) -> super::builder::single::SingleChildBuilder<'_, C> {
        super::builder::single::SingleChildBuilder::new(self, id.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fmt;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct TestError;
    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test error")
        }
    }
    impl std::error::Error for TestError {}

    struct Counter {
        starts: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Child for Counter {
        type Error = TestError;

        async fn start(&mut self) -> Result<(), Self::Error> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&mut self, _timeout: Duration) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn spec(starts: Arc<AtomicU32>) -> ChildSpec<Counter> {
        ChildSpec::new("counter", move || Counter {
            starts: Arc::clone(&starts),
        })
    }

    #[tokio::test]
    async fn start_child_runs_factory_once_and_tracks_it() {
        let starts = Arc::new(AtomicU32::new(0));
        let mut node = SupervisorNode::new(SupervisionStrategy::OneForOne {
            max_retries: 3,
            within: Duration::from_secs(60),
        });
        let id = node.start_child(spec(Arc::clone(&starts))).await.unwrap();
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(node.child_count(), 1);
        assert!(node.get_child(&id).is_some());
    }

    #[tokio::test]
    async fn one_for_one_failure_restarts_only_failed_child() {
        let starts_a = Arc::new(AtomicU32::new(0));
        let starts_b = Arc::new(AtomicU32::new(0));
        let mut node = SupervisorNode::new(SupervisionStrategy::OneForOne {
            max_retries: 3,
            within: Duration::from_secs(60),
        });
        let a = node.start_child(spec(Arc::clone(&starts_a))).await.unwrap();
        let _b = node.start_child(spec(Arc::clone(&starts_b))).await.unwrap();

        let decision = node
            .handle_child_failure(&a, FailureReason::new("boom"))
            .await
            .unwrap();

        assert_eq!(decision, SupervisionDecision::RestartChild(a));
        assert_eq!(starts_a.load(Ordering::SeqCst), 2);
        assert_eq!(starts_b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_for_one_failure_restarts_every_child() {
        let starts_a = Arc::new(AtomicU32::new(0));
        let starts_b = Arc::new(AtomicU32::new(0));
        let mut node = SupervisorNode::new(SupervisionStrategy::AllForOne {
            max_retries: 3,
            within: Duration::from_secs(60),
        });
        let a = node.start_child(spec(Arc::clone(&starts_a))).await.unwrap();
        let _b = node.start_child(spec(Arc::clone(&starts_b))).await.unwrap();

        node.handle_child_failure(&a, FailureReason::new("boom"))
            .await
            .unwrap();

        assert_eq!(starts_a.load(Ordering::SeqCst), 2);
        assert_eq!(starts_b.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn restart_budget_exhaustion_stops_instead_of_restarting() {
        let starts = Arc::new(AtomicU32::new(0));
        let mut node = SupervisorNode::new(SupervisionStrategy::OneForOne {
            max_retries: 1,
            within: Duration::from_secs(60),
        });
        let id = node.start_child(spec(Arc::clone(&starts))).await.unwrap();

        node.handle_child_failure(&id, FailureReason::new("first"))
            .await
            .unwrap();
        let decision = node
            .handle_child_failure(&id, FailureReason::new("second"))
            .await
            .unwrap();

        assert_eq!(decision, SupervisionDecision::StopChild(id.clone()));
        assert_eq!(node.child_count(), 0);
    }

    #[tokio::test]
    async fn escalate_strategy_never_touches_the_child() {
        let starts = Arc::new(AtomicU32::new(0));
        let mut node = SupervisorNode::new(SupervisionStrategy::Escalate);
        let id = node.start_child(spec(Arc::clone(&starts))).await.unwrap();

        let decision = node
            .handle_child_failure(&id, FailureReason::new("boom"))
            .await
            .unwrap();

        assert!(matches!(decision, SupervisionDecision::Escalate(_)));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(node.child_count(), 1);
    }

    #[tokio::test]
    async fn temporary_restart_policy_stops_on_any_failure() {
        let starts = Arc::new(AtomicU32::new(0));
        let mut node = SupervisorNode::new(SupervisionStrategy::AlwaysRestart);
        let id = node
            .start_child(spec(Arc::clone(&starts)).with_restart_policy(RestartPolicy::Temporary))
            .await
            .unwrap();

        let decision = node
            .handle_child_failure(&id, FailureReason::new("boom"))
            .await
            .unwrap();

        assert_eq!(decision, SupervisionDecision::StopChild(id));
        assert_eq!(node.child_count(), 0);
    }

    #[tokio::test]
    async fn stop_all_removes_every_child() {
        let starts = Arc::new(AtomicU32::new(0));
        let mut node = SupervisorNode::new(SupervisionStrategy::OneForOne {
            max_retries: 3,
            within: Duration::from_secs(60),
        });
        node.start_child(spec(Arc::clone(&starts))).await.unwrap();
        node.start_child(spec(Arc::clone(&starts))).await.unwrap();
        node.stop_all().await.unwrap();
        assert_eq!(node.child_count(), 0);
    }
}
