//! Per-delivery actor context (§4.C): sender, self, children, headers,
//! and a reply sink for request/response, plus the `send`/`request`
//! entry points actors use instead of touching the broker directly.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

// Layer 3: Internal module imports
use crate::broker::{BrokerError, MessageBroker};
use crate::message::{Envelope, Headers, Message};
use crate::util::Pid;

/// The context an `Actor::handle_message` call runs in. Rebuilt per
/// delivery from the envelope that triggered it.
pub struct ActorContext<M: Message, B: MessageBroker<M>> {
    self_pid: Pid,
    broker: B,
    sender: Option<Pid>,
    headers: Headers,
    correlation_id: Option<Uuid>,
    children: Vec<Pid>,
    parent: Option<Pid>,
}

impl<M: Message, B: MessageBroker<M>> ActorContext<M, B> {
    /// A fresh context for an actor identified by `self_pid`, routing
    /// through `broker`. No envelope metadata is populated yet; call
    /// [`Self::enter_delivery`] before each message.
    pub fn new(self_pid: Pid, broker: B) -> Self {
        Self {
            self_pid,
            broker,
            sender: None,
            headers: Headers::new(),
            correlation_id: None,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Attach the PID this actor's failures escalate to.
    pub fn with_parent(mut self, parent: Pid) -> Self {
        self.parent = Some(parent);
        self
    }

    /// This actor's supervisor, if any. A handler failure with no parent
    /// leaves the mailbox suspended: there's no one left to decide.
    pub fn parent(&self) -> Option<&Pid> {
        self.parent.as_ref()
    }

    /// Load the per-delivery metadata for the envelope about to be
    /// handled. Called by the mailbox delegate immediately before
    /// invoking `Actor::handle_message`.
    pub fn enter_delivery(&mut self, sender: Option<Pid>, headers: Headers, correlation_id: Option<Uuid>) {
        self.sender = sender;
        self.headers = headers;
        self.correlation_id = correlation_id;
    }

    /// This actor's own PID.
    pub fn self_pid(&self) -> &Pid {
        &self.self_pid
    }

    /// The sender of the message currently being handled, if any.
    pub fn sender(&self) -> Option<&Pid> {
        self.sender.as_ref()
    }

    /// Context-propagation headers on the message currently being
    /// handled.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// PIDs of this actor's children, in spawn order.
    pub fn children(&self) -> &[Pid] {
        &self.children
    }

    /// Record a newly spawned child.
    pub fn add_child(&mut self, child: Pid) {
        self.children.push(child);
    }

    /// Drop a child that has fully stopped.
    pub fn remove_child(&mut self, child: &Pid) {
        self.children.retain(|pid| pid != child);
    }

    /// Fire-and-forget send to `target`.
    pub async fn send(&self, target: Pid, payload: M) -> Result<(), BrokerError> {
        let envelope = Envelope::new(target, payload).with_sender(self.self_pid.clone());
        self.broker.send(envelope).await
    }

    /// Request-reply to `target`, waiting up to `timeout` for a
    /// response of type `R`.
    pub async fn request<R>(
        &self,
        target: Pid,
        payload: M,
        timeout: Duration,
    ) -> Result<Option<Envelope<R>>, BrokerError>
    where
        R: Message + DeserializeOwned,
    {
        let envelope = Envelope::new(target, payload).with_sender(self.self_pid.clone());
        self.broker.request(envelope, timeout).await
    }

    /// Reply to the sender of the message currently being handled,
    /// provided it arrived as a `request` (carries a correlation id).
    /// Returns `false` if there was nothing to reply to.
    pub fn reply(&self, payload: M) -> bool
    where
        M: Serialize,
    {
        let Some(correlation_id) = self.correlation_id else {
            return false;
        };
        let target = self
            .sender
            .clone()
            .unwrap_or_else(|| self.self_pid.clone());
        let envelope = Envelope::new(target, payload)
            .with_sender(self.self_pid.clone())
            .with_correlation_id(correlation_id);
        self.broker.complete_request(correlation_id, envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{InMemoryMessageBroker, ProcessRegistry};
    use crate::util::{ActorId, Address};
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Ping;
    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    fn context() -> ActorContext<Ping, InMemoryMessageBroker<Ping>> {
        let registry = Arc::new(ProcessRegistry::<Ping>::new(Address::new("local:9000")));
        let broker = InMemoryMessageBroker::new(registry);
        let pid = Pid::new(Address::new("local:9000"), ActorId::new());
        ActorContext::new(pid, broker)
    }

    #[test]
    fn fresh_context_has_no_sender_or_correlation() {
        let ctx = context();
        assert!(ctx.sender().is_none());
        assert!(ctx.headers().is_empty());
    }

    #[test]
    fn enter_delivery_populates_metadata() {
        let mut ctx = context();
        let sender = Pid::new(Address::new("local:9000"), ActorId::new());
        let mut headers = Headers::new();
        headers.insert("trace-id".into(), "abc".into());

        ctx.enter_delivery(Some(sender.clone()), headers, Some(Uuid::new_v4()));

        assert_eq!(ctx.sender(), Some(&sender));
        assert_eq!(ctx.headers().get("trace-id").map(String::as_str), Some("abc"));
    }

    #[test]
    fn reply_without_correlation_id_is_a_noop() {
        let ctx = context();
        assert!(!ctx.reply(Ping));
    }

    #[test]
    fn children_can_be_added_and_removed() {
        let mut ctx = context();
        let child = Pid::new(Address::new("local:9000"), ActorId::new());
        ctx.add_child(child.clone());
        assert_eq!(ctx.children(), &[child.clone()]);
        ctx.remove_child(&child);
        assert!(ctx.children().is_empty());
    }
}
