//! Endpoint Manager (§4.F): owns every outbound connection for one
//! local address, keyed by server address or client system id.
//!
//! The coordination lock guards map and blocklist mutation only.
//! Endpoint construction is synchronous and cheap (it spawns a
//! connector task but never awaits it), and disposal always happens
//! after the lock is released — holding the lock across a blocking
//! disposal was the cause of a deadlock in an earlier iteration of
//! this design, and every map mutation here still honors that.

// Layer 1: Standard library
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

// Layer 3: Internal
use super::channel::ChannelProvider;
use super::endpoint::{Endpoint, EndpointTarget};
use super::handler::InboundDispatcher;
use crate::event_stream::{EventStream, StreamEvent, SubscriptionToken, Topic};
use crate::util::{Address, MemberId};

/// Default outbound queue capacity for endpoints this manager creates.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// How long a terminated peer stays blocklisted before reconnection is
/// allowed again, giving the peer time to finish its own teardown.
pub const WAIT_AFTER_ENDPOINT_TERMINATION: Duration = Duration::from_millis(500);

/// Owns every [`Endpoint`] dialed from one local [`Address`], split
/// between server endpoints (keyed by the peer's dialable address) and
/// client endpoints (keyed by the peer's system id, for peers that
/// connected to us first and have no dialable address of their own).
pub struct EndpointManager {
    local_address: Address,
    provider: Arc<dyn ChannelProvider>,
    event_stream: Arc<EventStream>,
    queue_capacity: usize,

    server_endpoints: DashMap<Address, Arc<Endpoint>>,
    client_endpoints: DashMap<MemberId, Arc<Endpoint>>,
    blocked_addresses: DashMap<Address, ()>,
    blocked_client_ids: DashMap<MemberId, ()>,

    /// Guards map and blocklist mutation only — never held across an
    /// await point.
    coordination_lock: Mutex<()>,
    shutting_down: AtomicBool,
    subscription: Mutex<Option<SubscriptionToken>>,
    dispatcher: Mutex<Option<Arc<dyn InboundDispatcher>>>,
}

impl EndpointManager {
    /// Build a manager bound to `local_address` and subscribe it to the
    /// event stream so peer-initiated terminations are reaped
    /// automatically.
    pub fn new(
        local_address: Address,
        provider: Arc<dyn ChannelProvider>,
        event_stream: Arc<EventStream>,
    ) -> Arc<Self> {
        let manager = Arc::new(Self {
            local_address,
            provider,
            event_stream: Arc::clone(&event_stream),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            server_endpoints: DashMap::new(),
            client_endpoints: DashMap::new(),
            blocked_addresses: DashMap::new(),
            blocked_client_ids: DashMap::new(),
            coordination_lock: Mutex::new(()),
            shutting_down: AtomicBool::new(false),
            subscription: Mutex::new(None),
            dispatcher: Mutex::new(None),
        });

        let weak = Arc::downgrade(&manager);
        let token = event_stream.subscribe(Topic::EndpointTerminated, move |event| {
            if let (Some(manager), StreamEvent::EndpointTerminated { address, peer_system_id, .. }) =
                (weak.upgrade(), event)
            {
                manager.reap_terminated(address, peer_system_id);
            }
        });
        *manager.subscription.lock() = Some(token);
        manager
    }

    /// Register the dispatcher every endpoint this manager dials from now
    /// on will hand inbound frames to. Endpoints already connected before
    /// this call keep running without one; call this before the first
    /// lookup to avoid dropping early inbound traffic.
    pub fn set_inbound_dispatcher(&self, dispatcher: Arc<dyn InboundDispatcher>) {
        *self.dispatcher.lock() = Some(dispatcher);
    }

    /// Get the existing server endpoint for `address`, or dial a new one.
    /// Returns a [`ConnectorState::Blocked`](super::endpoint::ConnectorState::Blocked)
    /// sentinel, rather than an error, if shutting down or `address` is
    /// currently blocklisted — callers that only ever `send` through the
    /// returned endpoint don't need a second failure mode to handle.
    ///
    /// 1. short-circuit on shutdown or blocklist
    /// 2. optimistic lookup outside the lock
    /// 3. acquire the coordination lock
    /// 4. re-check under the lock (another caller may have just inserted)
    /// 5. construct the endpoint (sync, cheap)
    /// 6. insert if still absent
    /// 7. release the lock (guard drop)
    pub fn get_or_add_server(&self, address: &Address) -> Arc<Endpoint> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Endpoint::blocked(EndpointTarget::Server(address.clone()));
        }
        if self.blocked_addresses.contains_key(address) {
            return Endpoint::blocked(EndpointTarget::Server(address.clone()));
        }
        if let Some(existing) = self.server_endpoints.get(address) {
            return Arc::clone(existing.value());
        }

        let _guard = self.coordination_lock.lock();
        if self.shutting_down.load(Ordering::Acquire) {
            return Endpoint::blocked(EndpointTarget::Server(address.clone()));
        }
        if let Some(existing) = self.server_endpoints.get(address) {
            return Arc::clone(existing.value());
        }

        let endpoint = Endpoint::connect(
            EndpointTarget::Server(address.clone()),
            Arc::clone(&self.provider),
            Arc::clone(&self.event_stream),
            self.queue_capacity,
            self.dispatcher.lock().clone(),
        );
        self.server_endpoints.insert(address.clone(), Arc::clone(&endpoint));
        endpoint
    }

    /// Get the existing client endpoint for `system_id`, or dial a new
    /// one. Same seven-step shape and blocked-sentinel behavior as
    /// [`Self::get_or_add_server`].
    pub fn get_or_add_client(&self, system_id: &MemberId) -> Arc<Endpoint> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Endpoint::blocked(EndpointTarget::Client(system_id.clone()));
        }
        if self.blocked_client_ids.contains_key(system_id) {
            return Endpoint::blocked(EndpointTarget::Client(system_id.clone()));
        }
        if let Some(existing) = self.client_endpoints.get(system_id) {
            return Arc::clone(existing.value());
        }

        let _guard = self.coordination_lock.lock();
        if self.shutting_down.load(Ordering::Acquire) {
            return Endpoint::blocked(EndpointTarget::Client(system_id.clone()));
        }
        if let Some(existing) = self.client_endpoints.get(system_id) {
            return Arc::clone(existing.value());
        }

        let endpoint = Endpoint::connect(
            EndpointTarget::Client(system_id.clone()),
            Arc::clone(&self.provider),
            Arc::clone(&self.event_stream),
            self.queue_capacity,
            self.dispatcher.lock().clone(),
        );
        self.client_endpoints.insert(system_id.clone(), Arc::clone(&endpoint));
        endpoint
    }

    /// Look up a server endpoint without creating one.
    pub fn get_server(&self, address: &Address) -> Option<Arc<Endpoint>> {
        self.server_endpoints.get(address).map(|e| Arc::clone(e.value()))
    }

    /// Look up a client endpoint without creating one.
    pub fn get_client(&self, system_id: &MemberId) -> Option<Arc<Endpoint>> {
        self.client_endpoints.get(system_id).map(|e| Arc::clone(e.value()))
    }

    /// The local address this manager dials on behalf of.
    pub fn local_address(&self) -> &Address {
        &self.local_address
    }

    /// Reap a terminated endpoint reported by the event stream:
    ///
    /// 1. early-return if already shutting down (shutdown handles its
    ///    own cleanup)
    /// 2. remove from the relevant map and add to the matching blocklist
    /// 3. release the lock
    /// 4. wait out the post-termination grace period
    /// 5. unconditionally unblock, whether or not the wait ran to
    ///    completion — a future connect attempt should never be wedged
    ///    permanently by a single terminated peer
    fn reap_terminated(self: &Arc<Self>, address: Option<Address>, peer_system_id: Option<MemberId>) {
        if self.shutting_down.load(Ordering::Acquire) {
            return;
        }

        {
            let _guard = self.coordination_lock.lock();
            if self.shutting_down.load(Ordering::Acquire) {
                return;
            }
            if let Some(address) = &address {
                self.server_endpoints.remove(address);
                self.blocked_addresses.insert(address.clone(), ());
            }
            if let Some(peer_system_id) = &peer_system_id {
                self.client_endpoints.remove(peer_system_id);
                self.blocked_client_ids.insert(peer_system_id.clone(), ());
            }
        }

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(WAIT_AFTER_ENDPOINT_TERMINATION).await;
            if let Some(address) = &address {
                manager.blocked_addresses.remove(address);
                debug!(%address, "endpoint unblocked after termination grace period");
            }
            if let Some(peer_system_id) = &peer_system_id {
                manager.blocked_client_ids.remove(peer_system_id);
                debug!(%peer_system_id, "client endpoint unblocked after termination grace period");
            }
        });
    }

    /// Shut down every endpoint this manager owns.
    ///
    /// 1. acquire the lock; short-circuit if already shutting down
    /// 2. unsubscribe from the event stream and raise the shutdown flag
    /// 3. release the lock, then dispose every endpoint — servers
    ///    first, then clients — outside the lock
    /// 4. clear the maps
    pub async fn shutdown(&self) {
        {
            let _guard = self.coordination_lock.lock();
            if self.shutting_down.swap(true, Ordering::AcqRel) {
                return;
            }
            if let Some(token) = self.subscription.lock().take() {
                self.event_stream.unsubscribe(token);
            }
        }

        let servers: Vec<_> = self
            .server_endpoints
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();
        for endpoint in servers {
            endpoint.dispose().await;
        }

        let clients: Vec<_> = self
            .client_endpoints
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();
        for endpoint in clients {
            endpoint.dispose().await;
        }

        self.server_endpoints.clear();
        self.client_endpoints.clear();
        warn!(address = %self.local_address, "endpoint manager shut down");
    }

    /// Whether [`Self::shutdown`] has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::remote::channel::LoopbackChannelProvider;

    fn provider_with_listener(address: &Address) -> Arc<LoopbackChannelProvider> {
        let provider = Arc::new(LoopbackChannelProvider::new());
        provider.listen(address.clone(), 8);
        provider
    }

    #[tokio::test]
    async fn get_or_add_server_reuses_existing_endpoint() {
        let address = Address::new("peer:1");
        let provider = provider_with_listener(&address);
        let event_stream = Arc::new(EventStream::new());
        let manager = EndpointManager::new(Address::new("local:1"), provider, event_stream);

        let first = manager.get_or_add_server(&address);
        let second = manager.get_or_add_server(&address);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn shutdown_rejects_further_server_lookups() {
        let address = Address::new("peer:2");
        let provider = provider_with_listener(&address);
        let event_stream = Arc::new(EventStream::new());
        let manager = EndpointManager::new(Address::new("local:2"), provider, event_stream);

        manager.get_or_add_server(&address);
        manager.shutdown().await;

        assert!(manager.is_shutting_down());
        assert_eq!(
            manager.get_or_add_server(&address).state(),
            crate::remote::endpoint::ConnectorState::Blocked
        );
    }

    #[tokio::test]
    async fn blocked_address_is_rejected_until_grace_period_elapses() {
        let address = Address::new("peer:3");
        let provider = provider_with_listener(&address);
        let event_stream = Arc::new(EventStream::new());
        let manager = EndpointManager::new(Address::new("local:3"), provider, event_stream);

        let endpoint = manager.get_or_add_server(&address);
        endpoint.dispose().await;

        for _ in 0..50 {
            if manager.get_server(&address).is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(
            manager.get_or_add_server(&address).state(),
            crate::remote::endpoint::ConnectorState::Blocked
        );
    }
}
