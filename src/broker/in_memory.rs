//! Default in-process [`MessageBroker`] backed by a [`ProcessRegistry`].

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time;
use uuid::Uuid;

// Layer 3: Internal module imports
use super::error::BrokerError;
use super::registry::ProcessRegistry;
use super::traits::MessageBroker;
use crate::message::{Envelope, Message};

/// Broker that routes through an in-process [`ProcessRegistry`].
/// Request-reply is bridged through a correlation-id-keyed table of
/// one-shot channels; replies cross the type boundary as
/// `serde_json::Value` since the response type `R` differs per call.
#[derive(Clone)]
pub struct InMemoryMessageBroker<M: Message> {
    inner: Arc<Inner<M>>,
}

struct Inner<M: Message> {
    registry: Arc<ProcessRegistry<M>>,
    pending: DashMap<Uuid, oneshot::Sender<serde_json::Value>>,
}

impl<M: Message> InMemoryMessageBroker<M> {
    /// Build a broker routing through `registry`.
    pub fn new(registry: Arc<ProcessRegistry<M>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                pending: DashMap::new(),
            }),
        }
    }
}

#[async_trait]
impl<M: Message> MessageBroker<M> for InMemoryMessageBroker<M> {
    async fn send(&self, envelope: Envelope<M>) -> Result<(), BrokerError> {
        let sink = self
            .inner
            .registry
            .get(&envelope.target)
            .ok_or_else(|| BrokerError::ActorNotFound(envelope.target.clone()))?;
        sink.send(envelope).await
    }

    async fn request<R>(
        &self,
        mut envelope: Envelope<M>,
        timeout: Duration,
    ) -> Result<Option<Envelope<R>>, BrokerError>
    where
        R: Message + DeserializeOwned,
    {
        let target = envelope.target.clone();
        let correlation_id = envelope.correlation_id.unwrap_or_else(Uuid::new_v4);
        envelope.correlation_id = Some(correlation_id);

        let (tx, rx) = oneshot::channel();
        self.inner.pending.insert(correlation_id, tx);

        if let Err(err) = self.send(envelope).await {
            self.inner.pending.remove(&correlation_id);
            return Err(err);
        }

        match time::timeout(timeout, rx).await {
            Ok(Ok(value)) => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| BrokerError::ResponseDecode(err.to_string())),
            Ok(Err(_)) => Ok(None),
            Err(_) => {
                self.inner.pending.remove(&correlation_id);
                Err(BrokerError::RequestTimeout { target, timeout })
            }
        }
    }

    fn complete_request<R>(&self, correlation_id: Uuid, envelope: Envelope<R>) -> bool
    where
        R: Message + Serialize,
    {
        let Some((_, tx)) = self.inner.pending.remove(&correlation_id) else {
            return false;
        };
        match serde_json::to_value(&envelope) {
            Ok(value) => tx.send(value).is_ok(),
            Err(_) => false,
        }
    }
}
