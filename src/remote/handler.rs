//! Remote Message Handler: the inbound half of the endpoint layer.
//!
//! An [`Endpoint`](super::endpoint::Endpoint) only knows how to move
//! opaque [`Frame`]s; turning an inbound frame back into an `Envelope<M>`
//! and routing it to a local PID is this module's job.

// Layer 1: Standard library
use std::marker::PhantomData;
use std::sync::Arc;

// Layer 2: Third-party
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

// Layer 3: Internal
use super::channel::Frame;
use crate::broker::ProcessRegistry;
use crate::message::{Envelope, Message};

/// Type-erased entry point for inbound frames, the same `dyn` tradeoff
/// [`crate::broker::ProcessSink`] makes: neither `Endpoint` nor
/// `EndpointManager` is generic over a message type, so the dispatcher
/// they hold can't be either.
#[async_trait]
pub trait InboundDispatcher: Send + Sync {
    /// Decode `frame` and deliver it to whatever local process it
    /// targets. Malformed frames and unresolved targets are logged and
    /// dropped — there is no reply path to report a decode failure to.
    async fn dispatch(&self, frame: Frame);
}

/// Deserializes inbound frames as `Envelope<M>` and routes them through a
/// [`ProcessRegistry<M>`] by target PID.
pub struct RemoteMessageHandler<M: Message> {
    registry: Arc<ProcessRegistry<M>>,
    _marker: PhantomData<M>,
}

impl<M: Message> RemoteMessageHandler<M> {
    /// Build a handler that resolves inbound envelopes through `registry`.
    pub fn new(registry: Arc<ProcessRegistry<M>>) -> Self {
        Self {
            registry,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<M> InboundDispatcher for RemoteMessageHandler<M>
where
    M: Message + DeserializeOwned,
{
    async fn dispatch(&self, frame: Frame) {
        let envelope: Envelope<M> = match serde_json::from_slice(&frame) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(%err, "inbound frame failed to decode; dropping");
                return;
            }
        };

        let target = envelope.target.clone();
        match self.registry.get(&target) {
            Some(sink) => {
                if let Err(err) = sink.send(envelope).await {
                    warn!(%target, %err, "inbound frame resolved but delivery failed");
                }
            }
            None => {
                debug!(%target, "inbound frame targets an unresolvable pid; dropping");
            }
        }
    }
}
