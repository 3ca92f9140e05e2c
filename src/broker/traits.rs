//! Generic message broker trait: the DI seam actors route through.
//!
//! Actors never see the broker directly — they call
//! `ActorContext::send`/`request`, which hold a `B: MessageBroker<M>`
//! and forward to it. Kept generic, not `dyn`, so routing monomorphizes
//! per message type (§6.2).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use serde::de::DeserializeOwned;

// Layer 3: Internal module imports
use super::error::BrokerError;
use crate::message::{Envelope, Message};

/// Routes envelopes to whatever the process registry resolves their
/// target PID to.
#[async_trait]
pub trait MessageBroker<M: Message>: Send + Sync + Clone {
    /// Fire-and-forget delivery: resolves `envelope.target` and hands
    /// the envelope to its sink. Completes once enqueued, not once
    /// processed.
    async fn send(&self, envelope: Envelope<M>) -> Result<(), BrokerError>;

    /// Request-reply on top of `send`: stamps a correlation id, sends,
    /// and waits up to `timeout` for a reply envelope carrying the same
    /// id. `None` means the receiver completed without replying; `Err`
    /// covers routing failure and timeout.
    async fn request<R>(
        &self,
        envelope: Envelope<M>,
        timeout: Duration,
    ) -> Result<Option<Envelope<R>>, BrokerError>
    where
        R: Message + DeserializeOwned;

    /// Complete an outstanding `request` call from the replying side.
    /// Returns `false` if nothing is waiting on `correlation_id` (the
    /// call already timed out, or this was never a request).
    fn complete_request<R>(&self, correlation_id: uuid::Uuid, envelope: Envelope<R>) -> bool
    where
        R: Message + serde::Serialize;
}
