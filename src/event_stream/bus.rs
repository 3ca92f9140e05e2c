//! The event stream bus (§4.E): a typed pub/sub channel for system
//! events, independent of actor mailboxes.

// Layer 1: Standard library
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

// Layer 2: Third-party
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::error;

// Layer 3: Internal
use super::types::{StreamEvent, SubscriptionToken};

/// Which topic a subscriber cares about. Mirrors [`StreamEvent`]'s
/// variants without their payloads, so a subscription can filter before
/// ever touching a handler closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    EndpointConnected,
    EndpointTerminated,
    MemberJoined,
    MemberLeft,
    DeadLetter,
}

impl StreamEvent {
    fn topic(&self) -> Topic {
        match self {
            StreamEvent::EndpointConnected { .. } => Topic::EndpointConnected,
            StreamEvent::EndpointTerminated { .. } => Topic::EndpointTerminated,
            StreamEvent::MemberJoined(_) => Topic::MemberJoined,
            StreamEvent::MemberLeft(_) => Topic::MemberLeft,
            StreamEvent::DeadLetter { .. } => Topic::DeadLetter,
        }
    }
}

type Handler = Arc<dyn Fn(StreamEvent) + Send + Sync>;

struct Subscription {
    topic: Topic,
    tx: mpsc::UnboundedSender<StreamEvent>,
}

/// A typed pub/sub bus. Each subscriber gets its own background task and
/// an unbounded channel, so delivery order within one subscriber always
/// matches publication order even though `publish` never waits on a
/// handler.
///
/// Handler storage is the third seam in the runtime that reaches for
/// `dyn`: subscribers are genuinely heterogeneous closures, the same
/// justification as `ProcessSink` in `crate::broker::registry`.
#[derive(Default)]
pub struct EventStream {
    subscribers: DashMap<SubscriptionToken, Subscription>,
}

impl EventStream {
    /// A fresh bus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Subscribe `handler` to `topic`. A panic inside `handler` is caught,
    /// logged, and does not stop further delivery to this or any other
    /// subscriber.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionToken
    where
        F: Fn(StreamEvent) + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<StreamEvent>();
        let handler: Handler = Arc::new(handler);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let handler = Arc::clone(&handler);
                if std::panic::catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                    error!("event stream subscriber panicked; continuing delivery to others");
                }
            }
        });

        let token = SubscriptionToken::new();
        self.subscribers.insert(token, Subscription { topic, tx });
        token
    }

    /// Stop delivering to `token`'s subscriber. A no-op if already
    /// unsubscribed.
    pub fn unsubscribe(&self, token: SubscriptionToken) {
        self.subscribers.remove(&token);
    }

    /// Publish `event` to every subscriber of its topic. Fire-and-forget:
    /// returns as soon as the event is queued on each matching
    /// subscriber's channel, without waiting for any handler to run.
    pub fn publish(&self, event: StreamEvent) {
        let topic = event.topic();
        for entry in self.subscribers.iter() {
            if entry.value().topic == topic {
                // A closed receiver means the subscriber's task already
                // exited; the entry is stale and harmless to skip.
                let _ = entry.value().tx.send(event.clone());
            }
        }
    }
}
