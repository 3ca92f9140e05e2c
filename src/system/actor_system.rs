//! The actor system: spawns actors and wires them onto the shared
//! [`ProcessRegistry`]/[`InMemoryMessageBroker`] pair (§4.C plumbing
//! around [`Actor`] and [`Mailbox`]).
//!
//! [`ActorSystem`] owns no actor state directly. Each spawned actor is
//! wrapped in an internal [`ActorCell`] that bridges it onto
//! [`MailboxDelegate`], drives its lifecycle, and holds the restart
//! factory a supervisor-driven `Restart` system message replays.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

// Layer 3: Internal module imports
use crate::actor::{Actor, ActorContext, ActorLifecycle, ActorState};
use crate::broker::{InMemoryMessageBroker, LocalSink, ProcessRegistry, ProcessSink};
use crate::cluster::ClusterHandle;
use crate::event_stream::EventStream;
use crate::mailbox::{DelegateError, Mailbox, MailboxDelegate};
use crate::message::{Envelope, Failure, Message, StopReason, SystemMessage};
use crate::remote::{EndpointManager, RemoteHostResolver, RemoteMessageHandler};
use crate::supervisor::{DecisionScope, RestartStatistics, SupervisionDirective, SupervisionStrategy};
use crate::system::config::SystemConfig;
use crate::system::errors::SystemError;
use crate::util::{ActorId, Address, Pid};

fn boxed<E>(err: E) -> DelegateError
where
    E: std::error::Error + Send + Sync + 'static,
{
    Box::new(err)
}

/// Per-spawn bookkeeping shared between [`ActorSystem`] and every
/// [`ActorCell`] it creates: a live actor count plus id-to-pid table,
/// used to drive [`ActorSystem::shutdown`] without reaching into the
/// registry's private table.
struct SpawnTracker {
    count: AtomicUsize,
    live: DashMap<ActorId, Pid>,
}

struct ActorCellState<A: Actor> {
    actor: A,
    context: ActorContext<A::Message, InMemoryMessageBroker<A::Message>>,
    lifecycle: ActorLifecycle,
    watchers: Vec<Pid>,
    strategy: SupervisionStrategy,
    child_stats: HashMap<Pid, RestartStatistics>,
}

/// Bridges one [`Actor`] onto [`MailboxDelegate`], driving its
/// lifecycle and, on a `Restart` directive, replacing it in place with
/// a fresh instance from `factory` while the mailbox's queued user
/// messages survive untouched.
struct ActorCell<A, F>
where
    A: Actor,
    F: Fn() -> A + Send + Sync + 'static,
{
    state: AsyncMutex<ActorCellState<A>>,
    factory: F,
    pid: Pid,
    registry: Arc<ProcessRegistry<A::Message>>,
    tracker: Arc<SpawnTracker>,
}

impl<A, F> ActorCell<A, F>
where
    A: Actor,
    F: Fn() -> A + Send + Sync + 'static,
{
    fn new(
        actor: A,
        context: ActorContext<A::Message, InMemoryMessageBroker<A::Message>>,
        factory: F,
        pid: Pid,
        registry: Arc<ProcessRegistry<A::Message>>,
        tracker: Arc<SpawnTracker>,
    ) -> Self {
        Self {
            state: AsyncMutex::new(ActorCellState {
                actor,
                context,
                lifecycle: ActorLifecycle::new(),
                watchers: Vec::new(),
                strategy: SupervisionStrategy::default(),
                child_stats: HashMap::new(),
            }),
            factory,
            pid,
            registry,
            tracker,
        }
    }

    async fn notify_watchers(&self, watchers: &[Pid], reason: StopReason) {
        for watcher in watchers {
            if let Some(sink) = self.registry.get(watcher) {
                sink.push_system(SystemMessage::Terminated {
                    pid: self.pid.clone(),
                    reason: reason.clone(),
                });
            }
        }
    }

    /// Fire-and-forget `Stop` to every tracked child, ahead of this
    /// actor's own lifecycle transition — mirrors [`Self::notify_watchers`].
    fn stop_children(&self, context: &ActorContext<A::Message, InMemoryMessageBroker<A::Message>>) {
        for child in context.children() {
            if let Some(sink) = self.registry.get(child) {
                sink.push_system(SystemMessage::Stop);
            }
        }
    }

    /// Apply a supervision directive decided for `child`, mirroring
    /// [`crate::supervisor::SupervisorNode::handle_child_failure`].
    /// `Escalate` is handled by the caller, which alone knows this actor's
    /// own parent.
    fn apply_directive(
        &self,
        directive: SupervisionDirective,
        child: &Pid,
        reason: &str,
        scope: DecisionScope,
        all_children: &[Pid],
        child_stats: &mut HashMap<Pid, RestartStatistics>,
    ) {
        match directive {
            SupervisionDirective::Resume => {
                if let Some(sink) = self.registry.get(child) {
                    sink.resume();
                }
                debug!(child = %child, "supervisor resuming child after failure");
            }
            SupervisionDirective::Restart => {
                let targets: &[Pid] = match scope {
                    DecisionScope::AllChildren => all_children,
                    DecisionScope::FailedChild => std::slice::from_ref(child),
                };
                for target in targets {
                    child_stats.entry(target.clone()).or_default().record_restart();
                    if let Some(sink) = self.registry.get(target) {
                        sink.push_system(SystemMessage::Restart);
                        sink.resume();
                    }
                }
                info!(child = %child, "supervisor restarting after failure");
            }
            SupervisionDirective::Stop => {
                if let Some(sink) = self.registry.get(child) {
                    sink.push_system(SystemMessage::Stop);
                }
                warn!(child = %child, %reason, "supervisor stopping child: restart budget exhausted");
            }
            SupervisionDirective::Escalate => {
                warn!(child = %child, %reason, "supervisor escalating failure to its own parent");
            }
        }
    }
}

#[async_trait]
impl<A, F> MailboxDelegate<A::Message> for ActorCell<A, F>
where
    A: Actor,
    F: Fn() -> A + Send + Sync + 'static,
{
    async fn handle_system(&self, message: SystemMessage) -> Result<(), DelegateError> {
        let mut state = self.state.lock().await;
        match message {
            SystemMessage::Started => {
                state.lifecycle.transition_to(ActorState::Idle).map_err(boxed)?;
                let ActorCellState { actor, context, .. } = &mut *state;
                actor.pre_start(context).await.map_err(boxed)?;
            }
            SystemMessage::Stop => {
                self.stop_children(&state.context);
                state
                    .lifecycle
                    .transition_to(ActorState::Stopping)
                    .map_err(boxed)?;
                {
                    let ActorCellState { actor, context, .. } = &mut *state;
                    actor.post_stop(context).await.map_err(boxed)?;
                }
                state
                    .lifecycle
                    .transition_to(ActorState::Stopped)
                    .map_err(boxed)?;

                self.registry.remove(&self.pid);
                self.tracker.live.remove(&self.pid.id());
                self.tracker.count.fetch_sub(1, Ordering::AcqRel);
                self.notify_watchers(&state.watchers, StopReason::Stopped).await;
                info!(pid = %self.pid, "actor stopped");
            }
            SystemMessage::Restart => {
                self.stop_children(&state.context);
                state
                    .lifecycle
                    .transition_to(ActorState::Stopping)
                    .map_err(boxed)?;
                {
                    let ActorCellState { actor, context, .. } = &mut *state;
                    actor.post_stop(context).await.map_err(boxed)?;
                }
                state
                    .lifecycle
                    .transition_to(ActorState::Restarting)
                    .map_err(boxed)?;
                state.actor = (self.factory)();
                state
                    .lifecycle
                    .transition_to(ActorState::Starting)
                    .map_err(boxed)?;
                state.lifecycle.transition_to(ActorState::Idle).map_err(boxed)?;
                {
                    let ActorCellState { actor, context, .. } = &mut *state;
                    actor.pre_start(context).await.map_err(boxed)?;
                }
                info!(pid = %self.pid, "actor restarted");
            }
            SystemMessage::Watch { watcher } => {
                state.watchers.push(watcher);
            }
            SystemMessage::Unwatch { watcher } => {
                state.watchers.retain(|w| *w != watcher);
            }
            SystemMessage::Terminated { pid, reason } => {
                debug!(watched = %pid, %reason, "watched actor terminated");
            }
            SystemMessage::ChildSpawned { child } => {
                state.context.add_child(child);
            }
            SystemMessage::Failure(failure) => {
                let directive = {
                    let stats = state.child_stats.entry(failure.child.clone()).or_default();
                    state.strategy.decide(stats)
                };
                if directive == SupervisionDirective::Escalate {
                    match state.context.parent().cloned() {
                        Some(grandparent) => {
                            if let Some(sink) = self.registry.get(&grandparent) {
                                sink.push_system(SystemMessage::Failure(Failure {
                                    child: self.pid.clone(),
                                    reason: failure.reason.clone(),
                                    occurred_at: failure.occurred_at,
                                }));
                            }
                        }
                        None => {
                            warn!(child = %failure.child, reason = %failure.reason, "failure escalated past the root; no parent to notify");
                        }
                    }
                } else {
                    let scope = state.strategy.scope();
                    let all_children = state.context.children().to_vec();
                    self.apply_directive(
                        directive,
                        &failure.child,
                        &failure.reason,
                        scope,
                        &all_children,
                        &mut state.child_stats,
                    );
                }
            }
        }
        Ok(())
    }

    async fn handle_user(&self, envelope: Envelope<A::Message>) -> Result<(), DelegateError> {
        let mut state = self.state.lock().await;
        state
            .lifecycle
            .transition_to(ActorState::Receiving)
            .map_err(boxed)?;

        let sender = envelope.sender.clone();
        let headers = envelope.headers.clone();
        let correlation_id = envelope.correlation_id;
        let result = {
            let ActorCellState { actor, context, .. } = &mut *state;
            context.enter_delivery(sender, headers, correlation_id);
            actor.handle_message(envelope.payload, context).await
        };

        state.lifecycle.transition_to(ActorState::Idle).map_err(boxed)?;
        result.map_err(boxed)
    }

    async fn on_user_failure(&self, error: DelegateError) {
        let parent = {
            let state = self.state.lock().await;
            state.context.parent().cloned()
        };
        match parent {
            Some(parent_pid) => {
                if let Some(sink) = self.registry.get(&parent_pid) {
                    sink.push_system(SystemMessage::Failure(Failure {
                        child: self.pid.clone(),
                        reason: error.to_string(),
                        occurred_at: Utc::now(),
                    }));
                } else {
                    warn!(pid = %self.pid, parent = %parent_pid, %error, "actor handler failed but parent is no longer resolvable");
                }
            }
            None => {
                warn!(pid = %self.pid, %error, "actor handler failed; no parent to notify, mailbox stays suspended");
            }
        }
    }
}

/// Owns the shared [`ProcessRegistry`] and [`InMemoryMessageBroker`] for
/// one local actor system bound to `address`, and spawns [`Actor`]
/// implementations onto them.
///
/// Monomorphic over one message type `M`: every actor spawned on a
/// given `ActorSystem` shares the same `Actor::Message`. Running
/// several disjoint message types side by side means running several
/// `ActorSystem`s.
pub struct ActorSystem<M: Message> {
    inner: Arc<Inner<M>>,
}

struct Inner<M: Message> {
    address: Address,
    registry: Arc<ProcessRegistry<M>>,
    broker: InMemoryMessageBroker<M>,
    config: SystemConfig,
    tracker: Arc<SpawnTracker>,
    shutting_down: AtomicBool,
    event_stream: Arc<EventStream>,
    endpoint_manager: AsyncMutex<Option<Arc<EndpointManager>>>,
    cluster: AsyncMutex<Option<Arc<ClusterHandle>>>,
}

impl<M: Message> Clone for ActorSystem<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Message> ActorSystem<M> {
    /// Build a system bound to `address`, using `config` for spawn
    /// limits and timeouts.
    pub fn new(address: Address, config: SystemConfig) -> Self {
        let registry = Arc::new(ProcessRegistry::new(address.clone()));
        let broker = InMemoryMessageBroker::new(Arc::clone(&registry));
        Self {
            inner: Arc::new(Inner {
                address,
                registry,
                broker,
                config,
                tracker: Arc::new(SpawnTracker {
                    count: AtomicUsize::new(0),
                    live: DashMap::new(),
                }),
                shutting_down: AtomicBool::new(false),
                event_stream: Arc::new(EventStream::new()),
                endpoint_manager: AsyncMutex::new(None),
                cluster: AsyncMutex::new(None),
            }),
        }
    }

    /// Build a system with [`SystemConfig::default`].
    pub fn with_defaults(address: Address) -> Self {
        Self::new(address, SystemConfig::default())
    }

    /// The local address actors on this system resolve under.
    pub fn address(&self) -> &Address {
        &self.inner.address
    }

    /// The broker every spawned actor's context routes through.
    pub fn broker(&self) -> &InMemoryMessageBroker<M> {
        &self.inner.broker
    }

    /// The process registry backing this system.
    pub fn registry(&self) -> &Arc<ProcessRegistry<M>> {
        &self.inner.registry
    }

    /// Number of actors currently spawned on this system.
    pub fn actor_count(&self) -> usize {
        self.inner.tracker.count.load(Ordering::Acquire)
    }

    /// The event stream every subsystem of this actor system — remote
    /// endpoints, cluster membership, dead letters — publishes onto.
    pub fn event_stream(&self) -> &Arc<EventStream> {
        &self.inner.event_stream
    }

    /// The endpoint manager for outbound connections, if
    /// [`attach_endpoint_manager`](Self::attach_endpoint_manager) has
    /// been called.
    pub async fn endpoint_manager(&self) -> Option<Arc<EndpointManager>> {
        self.inner.endpoint_manager.lock().await.clone()
    }

    /// Attach an [`EndpointManager`] built over `provider`, wiring it to
    /// this system's address and event stream. Replaces any previously
    /// attached manager.
    ///
    /// Also registers a [`RemoteHostResolver`] on this system's registry,
    /// so a send to a non-local [`Pid`] dials out through the manager
    /// instead of dead-lettering, and a [`RemoteMessageHandler`] on the
    /// manager, so inbound frames decode and land in a local mailbox by
    /// [`Pid`].
    pub async fn attach_endpoint_manager(
        &self,
        provider: Arc<dyn crate::remote::ChannelProvider>,
    ) -> Arc<EndpointManager>
    where
        M: Serialize + DeserializeOwned,
    {
        let manager = EndpointManager::new(
            self.inner.address.clone(),
            provider,
            Arc::clone(&self.inner.event_stream),
        );
        manager.set_inbound_dispatcher(Arc::new(RemoteMessageHandler::<M>::new(Arc::clone(
            &self.inner.registry,
        ))));
        self.inner
            .registry
            .register_host_resolver(Arc::new(RemoteHostResolver::<M>::new(Arc::clone(&manager))));
        *self.inner.endpoint_manager.lock().await = Some(Arc::clone(&manager));
        manager
    }

    /// The cluster subsystem, if
    /// [`attach_cluster`](Self::attach_cluster) has been called and
    /// clustering is enabled for this system.
    pub async fn cluster(&self) -> Option<Arc<ClusterHandle>> {
        self.inner.cluster.lock().await.clone()
    }

    /// Attach and start a [`ClusterHandle`] built from `handle`,
    /// enabling gossip-based membership for this system. Replaces and
    /// stops any previously attached cluster subsystem.
    pub async fn attach_cluster(&self, handle: Arc<ClusterHandle>) {
        let previous = self.inner.cluster.lock().await.replace(Arc::clone(&handle));
        if let Some(previous) = previous {
            previous.stop().await;
        }
        handle.start().await;
    }

    /// Start a fluent spawn builder for per-actor overrides (currently
    /// just mailbox throughput). Equivalent to calling [`spawn`](Self::spawn)
    /// directly when no overrides are needed.
    pub fn spawn_builder(&self) -> super::builder::ActorSpawnBuilder<'_, M> {
        super::builder::ActorSpawnBuilder::new(self)
    }

    /// Spawn an actor built fresh from `factory` each time the actor
    /// restarts, using the system's default mailbox throughput.
    ///
    /// # Errors
    /// [`SystemError::ShuttingDown`] once [`shutdown`](Self::shutdown)
    /// has been called; [`SystemError::ActorLimitExceeded`] if
    /// `max_actors` is set and already reached; [`SystemError::SpawnFailed`]
    /// on the vanishingly unlikely event of an `ActorId` collision.
    pub async fn spawn<A, F>(&self, factory: F) -> Result<Pid, SystemError>
    where
        A: Actor<Message = M>,
        F: Fn() -> A + Send + Sync + 'static,
    {
        self.spawn_with_throughput(factory, self.inner.config.default_mailbox_throughput)
            .await
    }

    /// As [`spawn`](Self::spawn), overriding the per-actor mailbox
    /// dispatch throughput.
    pub async fn spawn_with_throughput<A, F>(
        &self,
        factory: F,
        throughput: usize,
    ) -> Result<Pid, SystemError>
    where
        A: Actor<Message = M>,
        F: Fn() -> A + Send + Sync + 'static,
    {
        self.spawn_internal(factory, throughput, None).await
    }

    /// Spawn an actor as a child of `parent`, using the system's default
    /// mailbox throughput. A user-handler failure in the child is
    /// reported to `parent` as [`SystemMessage::Failure`] instead of
    /// merely suspending the child's mailbox, and `parent` stops its
    /// children before stopping or restarting itself.
    pub async fn spawn_child<A, F>(&self, parent: Pid, factory: F) -> Result<Pid, SystemError>
    where
        A: Actor<Message = M>,
        F: Fn() -> A + Send + Sync + 'static,
    {
        self.spawn_child_with_throughput(
            parent,
            factory,
            self.inner.config.default_mailbox_throughput,
        )
        .await
    }

    /// As [`spawn_child`](Self::spawn_child), overriding the per-actor
    /// mailbox dispatch throughput.
    pub async fn spawn_child_with_throughput<A, F>(
        &self,
        parent: Pid,
        factory: F,
        throughput: usize,
    ) -> Result<Pid, SystemError>
    where
        A: Actor<Message = M>,
        F: Fn() -> A + Send + Sync + 'static,
    {
        let child = self
            .spawn_internal(factory, throughput, Some(parent.clone()))
            .await?;
        if let Some(sink) = self.inner.registry.get(&parent) {
            sink.push_system(SystemMessage::ChildSpawned { child: child.clone() });
        }
        Ok(child)
    }

    async fn spawn_internal<A, F>(
        &self,
        factory: F,
        throughput: usize,
        parent: Option<Pid>,
    ) -> Result<Pid, SystemError>
    where
        A: Actor<Message = M>,
        F: Fn() -> A + Send + Sync + 'static,
    {
        if self.inner.shutting_down.load(Ordering::Acquire) {
            return Err(SystemError::ShuttingDown);
        }

        let max = self.inner.config.max_actors;
        if max > 0 {
            let current = self.inner.tracker.count.load(Ordering::Acquire);
            if current >= max {
                return Err(SystemError::ActorLimitExceeded { current, max });
            }
        }

        let id = ActorId::new();
        let pid = Pid::new(self.inner.address.clone(), id);
        let mut context = ActorContext::new(pid.clone(), self.inner.broker.clone());
        if let Some(parent) = parent {
            context = context.with_parent(parent);
        }
        let actor = factory();
        let cell = ActorCell::new(
            actor,
            context,
            factory,
            pid.clone(),
            Arc::clone(&self.inner.registry),
            Arc::clone(&self.inner.tracker),
        );
        let mailbox = Mailbox::new(cell, throughput);
        let sink = Arc::new(LocalSink::new(pid, mailbox));

        let registered_pid = self
            .inner
            .registry
            .add(id, sink.clone())
            .map_err(|err| SystemError::SpawnFailed(err.to_string()))?;

        self.inner.tracker.live.insert(id, registered_pid.clone());
        self.inner.tracker.count.fetch_add(1, Ordering::AcqRel);
        sink.push_system(SystemMessage::Started);

        info!(pid = %registered_pid, "actor spawned");
        Ok(registered_pid)
    }

    /// Request an orderly stop of the actor at `pid`. A no-op if `pid`
    /// no longer resolves (already stopped, or never local).
    pub fn stop(&self, pid: &Pid) {
        if let Some(sink) = self.inner.registry.get(pid) {
            sink.push_system(SystemMessage::Stop);
        }
    }

    /// Request a supervisor-style restart of the actor at `pid`,
    /// replacing it in place with a fresh instance from its spawn
    /// factory. A no-op if `pid` no longer resolves.
    pub fn restart(&self, pid: &Pid) {
        if let Some(sink) = self.inner.registry.get(pid) {
            sink.push_system(SystemMessage::Restart);
        }
    }

    /// Orderly shutdown: stops every live actor and waits (polling) up
    /// to `config.shutdown_timeout` for them all to reach `Stopped`.
    ///
    /// # Errors
    /// [`SystemError::ShutdownTimeout`] if actors remain after the
    /// configured timeout; callers may retry with
    /// [`force_shutdown`](Self::force_shutdown) instead.
    pub async fn shutdown(&self) -> Result<(), SystemError> {
        self.force_shutdown();

        let deadline = Instant::now() + self.inner.config.shutdown_timeout;
        while self.actor_count() > 0 {
            if Instant::now() >= deadline {
                return Err(SystemError::ShutdownTimeout(
                    self.inner.config.shutdown_timeout,
                ));
            }
            sleep(std::time::Duration::from_millis(10)).await;
        }

        if let Some(cluster) = self.inner.cluster.lock().await.take() {
            cluster.stop().await;
        }
        if let Some(manager) = self.inner.endpoint_manager.lock().await.take() {
            manager.shutdown().await;
        }
        Ok(())
    }

    /// Mark the system as shutting down and fire a `Stop` at every
    /// live actor, without waiting for them to finish.
    pub fn force_shutdown(&self) {
        self.inner.shutting_down.store(true, Ordering::Release);
        for entry in self.inner.tracker.live.iter() {
            if let Some(sink) = self.inner.registry.get(entry.value()) {
                sink.push_system(SystemMessage::Stop);
            }
        }
    }
}
