// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2 MANDATORY
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
use super::traits::Message;
use crate::util::Pid;

/// Context-propagation headers carried alongside a message (e.g. trace ids).
pub type Headers = HashMap<String, String>;

/// Generic message envelope: `(target, sender, message, headers)` plus the
/// bookkeeping the runtime needs to route and expire it.
///
/// # Type Safety
/// Generic over the payload type `M`; no type erasure on the hot path.
///
/// # Example
/// ```rust
/// use strata_rt::message::{Message, Envelope};
/// use strata_rt::util::{Address, ActorId, Pid};
///
/// #[derive(Debug, Clone)]
/// struct Greeting(String);
/// impl Message for Greeting {
///     const MESSAGE_TYPE: &'static str = "greeting";
/// }
///
/// let target = Pid::new(Address::new("localhost:9000"), ActorId::new());
/// let envelope = Envelope::new(target, Greeting("hi".into()));
/// assert_eq!(envelope.message_type(), "greeting");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<M: Message> {
    /// Destination PID.
    pub target: Pid,

    /// Sender PID, when the message carries a reply address.
    pub sender: Option<Pid>,

    /// The application payload.
    pub payload: M,

    /// Context-propagation headers (trace ids, etc).
    pub headers: Headers,

    /// Envelope creation timestamp (§3.2 chrono `DateTime<Utc>`).
    pub timestamp: DateTime<Utc>,

    /// Correlation id for request/response tracking.
    pub correlation_id: Option<Uuid>,

    /// Optional time-to-live in seconds.
    pub ttl: Option<u64>,
}

impl<M: Message> Envelope<M> {
    /// Build a new envelope addressed to `target`.
    pub fn new(target: Pid, payload: M) -> Self {
        Self {
            target,
            sender: None,
            payload,
            headers: Headers::new(),
            timestamp: Utc::now(),
            correlation_id: None,
            ttl: None,
        }
    }

    /// Builder method: attach a sender PID (enables reply).
    pub fn with_sender(mut self, sender: Pid) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Builder method: attach a single header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Builder method: set the correlation id.
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Builder method: set the time-to-live, in seconds.
    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl = Some(ttl_seconds);
        self
    }

    /// Whether this envelope has exceeded its TTL, if one was set.
    pub fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => {
                let age = Utc::now()
                    .signed_duration_since(self.timestamp)
                    .num_seconds()
                    .max(0) as u64;
                age > ttl
            }
            None => false,
        }
    }

    /// The payload's compile-time message type tag.
    pub fn message_type(&self) -> &'static str {
        M::MESSAGE_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{Address, ActorId};

    #[derive(Debug, Clone)]
    struct TestMessage {
        #[allow(dead_code)]
        content: String,
    }

    impl Message for TestMessage {
        const MESSAGE_TYPE: &'static str = "test_message";
    }

    fn pid() -> Pid {
        Pid::new(Address::new("localhost:9000"), ActorId::new())
    }

    #[test]
    fn envelope_creation_defaults() {
        let envelope = Envelope::new(
            pid(),
            TestMessage {
                content: "test".into(),
            },
        );

        assert_eq!(envelope.message_type(), "test_message");
        assert!(envelope.sender.is_none());
        assert!(envelope.headers.is_empty());
        assert!(envelope.correlation_id.is_none());
        assert!(envelope.ttl.is_none());
    }

    #[test]
    fn builder_chain_sets_all_fields() {
        let sender = pid();
        let correlation_id = Uuid::new_v4();

        let envelope = Envelope::new(
            pid(),
            TestMessage {
                content: "test".into(),
            },
        )
        .with_sender(sender.clone())
        .with_header("trace-id", "abc123")
        .with_correlation_id(correlation_id)
        .with_ttl(60);

        assert_eq!(envelope.sender, Some(sender));
        assert_eq!(envelope.headers.get("trace-id").map(String::as_str), Some("abc123"));
        assert_eq!(envelope.correlation_id, Some(correlation_id));
        assert_eq!(envelope.ttl, Some(60));
    }

    #[test]
    fn ttl_not_expired_when_fresh() {
        let envelope = Envelope::new(
            pid(),
            TestMessage {
                content: "test".into(),
            },
        )
        .with_ttl(10);
        assert!(!envelope.is_expired());
    }

    #[test]
    fn ttl_expires_after_deadline() {
        let mut envelope = Envelope::new(
            pid(),
            TestMessage {
                content: "test".into(),
            },
        )
        .with_ttl(1);
        envelope.timestamp = Utc::now() - chrono::Duration::seconds(5);
        assert!(envelope.is_expired());
    }

    #[test]
    fn no_ttl_never_expires() {
        let mut envelope = Envelope::new(
            pid(),
            TestMessage {
                content: "test".into(),
            },
        );
        envelope.timestamp = Utc::now() - chrono::Duration::seconds(100);
        assert!(!envelope.is_expired());
    }
}
