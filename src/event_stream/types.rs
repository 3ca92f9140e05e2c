//! Event stream topics (§4.E, §6).

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use uuid::Uuid;

// Layer 3: Internal
use crate::util::{Address, MemberId, Pid};

/// Events published on the system-wide event stream.
///
/// Every variant here corresponds to one of the published topics named
/// in the external interfaces: `EndpointConnected`, `EndpointTerminated`,
/// `MemberJoined`, `MemberLeft`, `DeadLetter`.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A server or client endpoint finished connecting.
    EndpointConnected {
        /// The remote address, for server-style endpoints.
        address: Option<Address>,
        /// The remote peer's system id, for client-style endpoints.
        peer_system_id: Option<MemberId>,
    },
    /// An endpoint reached `Terminated`.
    EndpointTerminated {
        /// Whether the address/peer should be temporarily blocked.
        should_block: bool,
        address: Option<Address>,
        peer_system_id: Option<MemberId>,
    },
    /// A cluster member joined.
    MemberJoined(MemberId),
    /// A cluster member left (gracefully or via failure detection).
    MemberLeft(MemberId),
    /// A message could not be delivered to its target.
    DeadLetter {
        target: Pid,
        message_type: &'static str,
    },
}

/// A handle returned by [`super::bus::EventStream::subscribe`], used to
/// unsubscribe later. Opaque and comparable only by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(Uuid);

impl SubscriptionToken {
    pub(super) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub:{}", self.0)
    }
}
