//! Broker-level error types.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use super::registry::RegistryError;
use crate::util::Pid;

/// Failure modes for [`super::traits::MessageBroker`] operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// No process record resolves this PID (neither local nor any
    /// registered host resolver claimed it).
    #[error("no process found for {0}")]
    ActorNotFound(Pid),

    /// The target's mailbox has been closed.
    #[error("mailbox closed for {0}")]
    MailboxClosed(Pid),

    /// A request-reply call exceeded its timeout waiting for a response.
    #[error("request to {target} timed out after {timeout:?}")]
    RequestTimeout { target: Pid, timeout: Duration },

    /// The replier's channel was dropped before sending a response.
    #[error("no response received for request to {0}")]
    NoResponse(Pid),

    /// A response arrived but failed to deserialize into the expected
    /// response type.
    #[error("response decode failed: {0}")]
    ResponseDecode(String),

    /// Delegated from the process registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Delivery through a remote endpoint failed (encode or transport error).
    #[error("remote delivery to {0} failed: {1}")]
    RemoteSendFailed(Pid, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{ActorId, Address};

    fn pid() -> Pid {
        Pid::new(Address::new("localhost:9000"), ActorId::new())
    }

    #[test]
    fn actor_not_found_mentions_pid() {
        let err = BrokerError::ActorNotFound(pid());
        assert!(err.to_string().contains("no process found"));
    }

    #[test]
    fn request_timeout_mentions_duration() {
        let err = BrokerError::RequestTimeout {
            target: pid(),
            timeout: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BrokerError>();
    }
}
