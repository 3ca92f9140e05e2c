//! Process Registry (§4.B): maps identity to message sink.
//!
//! Local actors are resolved by id from a concurrent table. Anything
//! else — a remote PID, a client identity — is resolved by delegating,
//! in registration order, to host resolvers (the Endpoint Manager
//! registers one for remote addresses).

// Layer 1: Standard library imports
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use thiserror::Error;

// Layer 3: Internal module imports
use super::error::BrokerError;
use crate::mailbox::{Mailbox, MailboxDelegate};
use crate::message::{Envelope, Message, SystemMessage};
use crate::util::{ActorId, Address, Pid};

/// Errors raised directly by registry operations (as opposed to errors
/// surfaced while routing through a resolved sink, which are
/// [`BrokerError`]).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// `add` was called with an id already present in the local table.
    #[error("actor id already registered: {0}")]
    AlreadyExists(ActorId),
}

/// A resolved destination for envelopes of type `M`: either a local
/// mailbox or whatever a host resolver hands back for a remote PID.
///
/// This is the one seam in the runtime that reaches for `dyn`: the
/// registry must hold local and remote sinks side by side behind a
/// single type, and the whole point of host resolution is that the
/// concrete sink type is unknown to the registry.
#[async_trait]
pub trait ProcessSink<M: Message>: Send + Sync {
    /// Route `envelope` to this process.
    async fn send(&self, envelope: Envelope<M>) -> Result<(), BrokerError>;

    /// The PID this sink answers to.
    fn pid(&self) -> Pid;

    /// Deliver a system message directly, bypassing ordinary envelope
    /// routing. Non-blocking, mirroring `Mailbox::push_system`.
    fn push_system(&self, message: SystemMessage);

    /// Resume user-message delivery after a supervisor `Resume` decision.
    /// A no-op by default; only a local mailbox has anything to resume.
    fn resume(&self) {}
}

/// A resolver consulted for PIDs the registry's local table doesn't
/// own. Resolvers are tried in registration order; the first to return
/// `Some` wins. Per §4.B, at least one registered resolver is expected
/// to be total (e.g. resolving to a dead-letter sink) so resolution
/// never silently falls through.
pub trait HostResolver<M: Message>: Send + Sync {
    /// Attempt to resolve `pid`, or `None` to defer to the next resolver.
    fn resolve(&self, pid: &Pid) -> Option<Arc<dyn ProcessSink<M>>>;
}

/// A local mailbox, addressed by PID, wearing a [`ProcessSink`] face.
pub struct LocalSink<M: Message, D: MailboxDelegate<M>> {
    pid: Pid,
    mailbox: Mailbox<M, D>,
}

impl<M: Message, D: MailboxDelegate<M>> LocalSink<M, D> {
    /// Wrap `mailbox` so the registry can route to it by `pid`.
    pub fn new(pid: Pid, mailbox: Mailbox<M, D>) -> Self {
        Self { pid, mailbox }
    }
}

#[async_trait]
impl<M: Message, D: MailboxDelegate<M>> ProcessSink<M> for LocalSink<M, D> {
    async fn send(&self, envelope: Envelope<M>) -> Result<(), BrokerError> {
        self.mailbox
            .push_user(envelope)
            .map_err(|_| BrokerError::MailboxClosed(self.pid.clone()))
    }

    fn pid(&self) -> Pid {
        self.pid.clone()
    }

    fn push_system(&self, message: SystemMessage) {
        self.mailbox.push_system(message);
    }

    fn resume(&self) {
        self.mailbox.resume();
    }
}

impl<M: Message> fmt::Debug for dyn ProcessSink<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessSink({})", self.pid())
    }
}

/// Identity-to-sink routing table for one actor system.
pub struct ProcessRegistry<M: Message> {
    local_address: Address,
    local: DashMap<ActorId, Arc<dyn ProcessSink<M>>>,
    host_resolvers: RwLock<Vec<Arc<dyn HostResolver<M>>>>,
}

impl<M: Message> ProcessRegistry<M> {
    /// Build an empty registry for a system bound to `local_address`.
    pub fn new(local_address: Address) -> Self {
        Self {
            local_address,
            local: DashMap::new(),
            host_resolvers: RwLock::new(Vec::new()),
        }
    }

    /// Resolve `pid` to a sink: local table lookup if `pid.address` is
    /// this system's address, otherwise the first host resolver to
    /// claim it.
    pub fn get(&self, pid: &Pid) -> Option<Arc<dyn ProcessSink<M>>> {
        if pid.is_local(&self.local_address) {
            return self.local.get(pid.id()).map(|entry| Arc::clone(&entry));
        }
        self.host_resolvers
            .read()
            .iter()
            .find_map(|resolver| resolver.resolve(pid))
    }

    /// Register a local sink under `id`, producing its PID.
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyExists`] if `id` is already
    /// registered.
    pub fn add(
        &self,
        id: ActorId,
        sink: Arc<dyn ProcessSink<M>>,
    ) -> Result<Pid, RegistryError> {
        if self.local.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }
        let pid = Pid::new(self.local_address.clone(), id);
        self.local.insert(id, sink);
        Ok(pid)
    }

    /// Remove a local process record. A no-op for PIDs this registry
    /// doesn't own.
    pub fn remove(&self, pid: &Pid) {
        if pid.is_local(&self.local_address) {
            self.local.remove(pid.id());
        }
    }

    /// Register a resolver consulted, in order, for non-local PIDs.
    pub fn register_host_resolver(&self, resolver: Arc<dyn HostResolver<M>>) {
        self.host_resolvers.write().push(resolver);
    }

    /// The address this registry's local table is keyed under.
    pub fn local_address(&self) -> &Address {
        &self.local_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::{DelegateError, Mailbox};
    use crate::message::SystemMessage;

    #[derive(Debug, Clone)]
    struct Ping;
    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    struct NoopDelegate;

    #[async_trait]
    impl MailboxDelegate<Ping> for NoopDelegate {
        async fn handle_system(&self, _message: SystemMessage) -> Result<(), DelegateError> {
            Ok(())
        }
        async fn handle_user(&self, _envelope: Envelope<Ping>) -> Result<(), DelegateError> {
            Ok(())
        }
        async fn on_user_failure(&self, _error: DelegateError) {}
    }

    struct DeadLetterResolver;
    impl HostResolver<Ping> for DeadLetterResolver {
        fn resolve(&self, pid: &Pid) -> Option<Arc<dyn ProcessSink<Ping>>> {
            Some(Arc::new(LocalSink::new(
                pid.clone(),
                Mailbox::with_default_throughput(NoopDelegate),
            )))
        }
    }

    fn registry() -> ProcessRegistry<Ping> {
        ProcessRegistry::new(Address::new("local:9000"))
    }

    #[test]
    fn add_then_get_resolves_local_sink() {
        let registry = registry();
        let id = ActorId::new();
        let mailbox = Mailbox::with_default_throughput(NoopDelegate);
        let pid = registry
            .add(id, Arc::new(LocalSink::new(Pid::new(Address::new("local:9000"), id), mailbox)))
            .expect("first registration succeeds");

        assert!(registry.get(&pid).is_some());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let registry = registry();
        let id = ActorId::new();
        let pid = Pid::new(Address::new("local:9000"), id);
        let mailbox_a = Mailbox::with_default_throughput(NoopDelegate);
        let mailbox_b = Mailbox::with_default_throughput(NoopDelegate);

        registry
            .add(id, Arc::new(LocalSink::new(pid.clone(), mailbox_a)))
            .expect("first registration succeeds");
        let result = registry.add(id, Arc::new(LocalSink::new(pid, mailbox_b)));

        assert!(matches!(result, Err(RegistryError::AlreadyExists(_))));
    }

    #[test]
    fn remote_pid_falls_through_to_host_resolver() {
        let registry = registry();
        registry.register_host_resolver(Arc::new(DeadLetterResolver));
        let remote = Pid::new(Address::new("other:9001"), ActorId::new());

        assert!(registry.get(&remote).is_some());
    }

    #[tokio::test]
    async fn push_system_reaches_the_local_mailbox() {
        let registry = registry();
        let id = ActorId::new();
        let pid = Pid::new(Address::new("local:9000"), id);
        let mailbox = Mailbox::with_default_throughput(NoopDelegate);
        let sink = registry
            .add(id, Arc::new(LocalSink::new(pid.clone(), mailbox)))
            .map(|_| registry.get(&pid).expect("just registered"))
            .expect("registration succeeds");

        sink.push_system(SystemMessage::Started);
        // No panics, no rejected push: delivery is fire-and-forget and
        // draining happens on the mailbox's own background task.
    }

    #[test]
    fn remove_clears_local_entry() {
        let registry = registry();
        let id = ActorId::new();
        let pid = Pid::new(Address::new("local:9000"), id);
        let mailbox = Mailbox::with_default_throughput(NoopDelegate);
        registry
            .add(id, Arc::new(LocalSink::new(pid.clone(), mailbox)))
            .expect("registration succeeds");

        registry.remove(&pid);
        assert!(registry.get(&pid).is_none());
    }
}
