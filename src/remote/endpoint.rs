//! Endpoint (§4.G): one outbound connection, its connector state
//! machine, and its outbound queue.

// Layer 1: Standard library
use std::sync::Arc;

// Layer 2: Third-party
use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tracing::{debug, warn};

// Layer 3: Internal
use super::channel::{ChannelProvider, Frame};
use super::error::RemoteError;
use super::handler::InboundDispatcher;
use crate::event_stream::{EventStream, StreamEvent};
use crate::supervisor::RestartStatistics;
use crate::util::{Address, MemberId};

/// An endpoint's position in its connector state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorState {
    /// Dialing, possibly after a backoff delay from a prior failed attempt.
    Connecting,
    /// A channel is open and accepting sends.
    Connected,
    /// Disposal has been requested; no further sends are accepted.
    Terminating,
    /// The connector task has exited; [`StreamEvent::EndpointTerminated`]
    /// has been published.
    Terminated,
    /// A sentinel for a peer the manager currently refuses to dial
    /// (shutting down, or blocklisted after a recent termination). Never
    /// transitions to any other state; carries no background task.
    Blocked,
}

/// Which side of the address space an endpoint was created for — a
/// dialable `host:port`, or a client-only peer identified by system id.
#[derive(Debug, Clone)]
pub enum EndpointTarget {
    Server(Address),
    Client(MemberId),
}

impl EndpointTarget {
    fn address(&self) -> Option<Address> {
        match self {
            Self::Server(addr) => Some(addr.clone()),
            Self::Client(_) => None,
        }
    }

    fn peer_system_id(&self) -> Option<MemberId> {
        match self {
            Self::Server(_) => None,
            Self::Client(id) => Some(id.clone()),
        }
    }
}

/// One outbound connection: an outbound queue plus a connector task that
/// drives `Connecting -> Connected -> Terminating -> Terminated`,
/// retrying with exponential backoff while `Connecting`.
pub struct Endpoint {
    target: EndpointTarget,
    state: Arc<RwLock<ConnectorState>>,
    outbound: mpsc::Sender<Frame>,
    shutdown: AsyncMutex<Option<oneshot::Sender<()>>>,
    task: AsyncMutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Endpoint {
    /// Build and start connecting a new endpoint for `target`, using
    /// `provider` to dial and publishing lifecycle events on
    /// `event_stream`. Construction is synchronous and cheap: the
    /// connector task is spawned but never awaited here. `dispatcher`,
    /// when set, receives every inbound frame the connected channel yields.
    pub fn connect(
        target: EndpointTarget,
        provider: Arc<dyn ChannelProvider>,
        event_stream: Arc<EventStream>,
        queue_capacity: usize,
        dispatcher: Option<Arc<dyn InboundDispatcher>>,
    ) -> Arc<Self> {
        let state = Arc::new(RwLock::new(ConnectorState::Connecting));
        let (outbound_tx, outbound_rx) = mpsc::channel(queue_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let endpoint = Arc::new(Self {
            target: target.clone(),
            state: Arc::clone(&state),
            outbound: outbound_tx,
            shutdown: AsyncMutex::new(Some(shutdown_tx)),
            task: AsyncMutex::new(None),
        });

        let task = tokio::spawn(Self::run(
            target,
            provider,
            event_stream,
            state,
            outbound_rx,
            shutdown_rx,
            dispatcher,
        ));
        if let Ok(mut slot) = endpoint.task.try_lock() {
            *slot = Some(task);
        }
        endpoint
    }

    /// Build a sentinel endpoint for a peer the manager currently refuses
    /// to dial (shutting down, or blocklisted). Carries no connector task:
    /// its state is permanently [`ConnectorState::Blocked`], so [`Self::send`]
    /// rejects everything and [`Self::dispose`] has nothing to tear down.
    pub fn blocked(target: EndpointTarget) -> Arc<Self> {
        let (outbound_tx, _outbound_rx) = mpsc::channel(1);
        Arc::new(Self {
            target,
            state: Arc::new(RwLock::new(ConnectorState::Blocked)),
            outbound: outbound_tx,
            shutdown: AsyncMutex::new(None),
            task: AsyncMutex::new(None),
        })
    }

    /// Queue `frame` for sending. Rejects once the outbound queue is
    /// full (backpressure) or the endpoint has begun terminating.
    pub fn send(&self, frame: Frame) -> Result<(), RemoteError> {
        if *self.state.read() != ConnectorState::Connected
            && *self.state.read() != ConnectorState::Connecting
        {
            return Err(RemoteError::EndpointTerminated(
                self.target.address().unwrap_or_else(|| Address::new("$client")),
            ));
        }
        self.outbound.try_send(frame).map_err(|_| {
            RemoteError::QueueFull(
                self.target
                    .address()
                    .unwrap_or_else(|| Address::new("$client")),
            )
        })
    }

    /// Current connector state.
    pub fn state(&self) -> ConnectorState {
        *self.state.read()
    }

    /// Request disposal: signal the connector task to stop and await its
    /// exit. Always performed outside any manager-held lock.
    pub async fn dispose(&self) {
        *self.state.write() = ConnectorState::Terminating;
        if let Some(tx) = self.shutdown.lock().await.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
        }
    }

    async fn run(
        target: EndpointTarget,
        provider: Arc<dyn ChannelProvider>,
        event_stream: Arc<EventStream>,
        state: Arc<RwLock<ConnectorState>>,
        mut outbound_rx: mpsc::Receiver<Frame>,
        mut shutdown_rx: oneshot::Receiver<()>,
        dispatcher: Option<Arc<dyn InboundDispatcher>>,
    ) {
        let mut backoff = RestartStatistics::new(u32::MAX, std::time::Duration::from_secs(3600));
        let address = match &target {
            EndpointTarget::Server(addr) => addr.clone(),
            EndpointTarget::Client(id) => Address::client(id.0.clone()),
        };

        let mut channel = loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    Self::finish(&state, &event_stream, &target, false);
                    return;
                }
                connect_result = provider.connect(&address) => {
                    match connect_result {
                        Ok(channel) => break channel,
                        Err(err) => {
                            warn!(%address, %err, "endpoint connect attempt failed; backing off");
                            backoff.record_restart();
                            let delay = backoff.calculate_delay();
                            tokio::select! {
                                _ = tokio::time::sleep(delay) => {}
                                _ = &mut shutdown_rx => {
                                    Self::finish(&state, &event_stream, &target, false);
                                    return;
                                }
                            }
                        }
                    }
                }
            }
        };

        *state.write() = ConnectorState::Connected;
        event_stream.publish(StreamEvent::EndpointConnected {
            address: target.address(),
            peer_system_id: target.peer_system_id(),
        });

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    Self::finish(&state, &event_stream, &target, false);
                    return;
                }
                frame = outbound_rx.recv() => {
                    match frame {
                        Some(frame) => {
                            if let Err(err) = channel.send(frame).await {
                                warn!(%address, %err, "endpoint send failed; terminating");
                                Self::finish(&state, &event_stream, &target, true);
                                return;
                            }
                        }
                        None => {
                            debug!(%address, "endpoint outbound queue closed");
                            Self::finish(&state, &event_stream, &target, false);
                            return;
                        }
                    }
                }
                inbound = channel.recv() => {
                    match inbound {
                        Some(frame) => {
                            if let Some(dispatcher) = &dispatcher {
                                dispatcher.dispatch(frame).await;
                            } else {
                                debug!(%address, "inbound frame arrived with no dispatcher registered; dropping");
                            }
                        }
                        None => {
                            debug!(%address, "endpoint inbound channel closed");
                            Self::finish(&state, &event_stream, &target, false);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn finish(
        state: &RwLock<ConnectorState>,
        event_stream: &EventStream,
        target: &EndpointTarget,
        should_block: bool,
    ) {
        *state.write() = ConnectorState::Terminated;
        event_stream.publish(StreamEvent::EndpointTerminated {
            should_block,
            address: target.address(),
            peer_system_id: target.peer_system_id(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::remote::channel::LoopbackChannelProvider;
    use std::time::Duration;

    #[tokio::test]
    async fn connects_and_accepts_sends() {
        let event_stream = Arc::new(EventStream::new());
        let provider = Arc::new(LoopbackChannelProvider::new());
        let mut inbound = provider.listen(Address::new("peer:1"), 8);

        let endpoint = Endpoint::connect(
            EndpointTarget::Server(Address::new("peer:1")),
            provider,
            event_stream,
            16,
            None,
        );

        for _ in 0..50 {
            if endpoint.state() == ConnectorState::Connected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(endpoint.state(), ConnectorState::Connected);

        endpoint.send(vec![9, 9]).unwrap();
        let frame = inbound.recv().await.unwrap();
        assert_eq!(frame, vec![9, 9]);

        endpoint.dispose().await;
        assert_eq!(endpoint.state(), ConnectorState::Terminated);
    }

    #[tokio::test]
    async fn publishes_terminated_on_dispose() {
        let event_stream = Arc::new(EventStream::new());
        let provider = Arc::new(LoopbackChannelProvider::new());
        provider.listen(Address::new("peer:2"), 8);

        let (tx, rx) = std::sync::mpsc::channel();
        event_stream.subscribe(crate::event_stream::Topic::EndpointTerminated, move |_e| {
            let _ = tx.send(());
        });

        let endpoint = Endpoint::connect(
            EndpointTarget::Server(Address::new("peer:2")),
            provider,
            event_stream,
            16,
            None,
        );
        for _ in 0..50 {
            if endpoint.state() == ConnectorState::Connected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        endpoint.dispose().await;

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_ok());
    }
}
