//! Channel provider contract (§6): the pluggable transport seam
//! endpoints dial through.

// Layer 1: Standard library
use std::sync::Arc;

// Layer 2: Third-party
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;

// Layer 3: Internal
use super::error::RemoteError;
use crate::util::Address;

/// An opaque frame of wire bytes. Encoding/decoding into actual
/// messages is the serialization façade's job, not the channel's.
pub type Frame = Vec<u8>;

/// One end of a connected, bidirectional frame stream.
///
/// This is a `dyn`-held seam: concrete transports (TCP, QUIC, an
/// in-process loopback) are genuinely heterogeneous, and a
/// [`ChannelProvider`] hides that behind one trait object per connection,
/// the same tradeoff `ProcessSink` makes for process routing.
#[async_trait]
pub trait Channel: Send {
    /// Send one frame. Resolves once queued for transmission — not
    /// necessarily once acknowledged by the peer.
    async fn send(&mut self, frame: Frame) -> Result<(), RemoteError>;

    /// Receive the next inbound frame, or `None` once the peer
    /// disconnects.
    async fn recv(&mut self) -> Option<Frame>;
}

/// Given a target address, dial (or accept) a connection and return the
/// resulting [`Channel`]. Implementations own their own retry semantics;
/// [`super::endpoint::Endpoint`] layers backoff on top for repeated
/// `connect` failures.
#[async_trait]
pub trait ChannelProvider: Send + Sync {
    async fn connect(&self, address: &Address) -> Result<Box<dyn Channel>, RemoteError>;
}

struct LoopbackChannel {
    tx: mpsc::Sender<Frame>,
    rx: mpsc::Receiver<Frame>,
    // Kept alive only so `rx` doesn't observe a closed channel: this
    // loopback transport has no reply path of its own, `recv` just pends
    // forever once the peer side never dials back.
    _reply_tx: mpsc::Sender<Frame>,
}

#[async_trait]
impl Channel for LoopbackChannel {
    async fn send(&mut self, frame: Frame) -> Result<(), RemoteError> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| RemoteError::ConnectFailed(Address::new("loopback"), "peer dropped".into()))
    }

    async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}

/// An in-process [`ChannelProvider`] that pairs connections to the same
/// address over a bounded channel, looping frames back to whatever
/// already-registered peer shares that address.
///
/// This is the one concrete implementation this crate ships, grounding
/// the trait without committing to a real network transport — the same
/// shape as `StaticSeedDiscovery` for membership discovery.
#[derive(Default)]
pub struct LoopbackChannelProvider {
    listeners: DashMap<Address, mpsc::Sender<Frame>>,
}

impl LoopbackChannelProvider {
    pub fn new() -> Self {
        Self {
            listeners: DashMap::new(),
        }
    }

    /// Register `address` as accepting inbound frames on `inbound`,
    /// returning the outbound sender its peers will dial into.
    pub fn listen(&self, address: Address, capacity: usize) -> mpsc::Receiver<Frame> {
        let (tx, rx) = mpsc::channel(capacity);
        self.listeners.insert(address, tx);
        rx
    }
}

#[async_trait]
impl ChannelProvider for LoopbackChannelProvider {
    async fn connect(&self, address: &Address) -> Result<Box<dyn Channel>, RemoteError> {
        let peer_tx = self
            .listeners
            .get(address)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RemoteError::ConnectFailed(address.clone(), "no listener".into()))?;
        let (local_tx, local_rx) = mpsc::channel(64);
        Ok(Box::new(LoopbackChannel {
            tx: peer_tx,
            rx: local_rx,
            _reply_tx: local_tx,
        }) as Box<dyn Channel>)
    }
}

// Re-exported for callers that need to share one provider across
// several endpoint managers in a test harness.
pub type SharedChannelProvider = Arc<dyn ChannelProvider>;
