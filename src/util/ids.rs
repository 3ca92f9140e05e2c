// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Unique identifier for an actor instance within a process.
///
/// # Example
/// ```rust
/// use strata_rt::util::ActorId;
///
/// let id1 = ActorId::new();
/// let id2 = ActorId::new();
/// assert_ne!(id1, id2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Generate a new random `ActorId`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID as an `ActorId`.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a single message instance, used for correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a new random `MessageId`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier for a cluster member, exchanged during gossip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reserved address prefix for client identities: peers that connect
/// outbound only and have no stable, dialable address.
pub const CLIENT_ADDRESS_PREFIX: &str = "$client/";

/// A logical host label: either a dialable `host:port` for server peers,
/// or a `$client/<id>` token for client-only peers.
///
/// `Address` is a plain value type; it carries no routing behavior of its
/// own. The [`crate::registry::ProcessRegistry`] and
/// [`crate::remote::EndpointManager`] interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Wrap a raw `host:port` label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Build the client-side address for a peer system id.
    pub fn client(peer_system_id: impl Into<String>) -> Self {
        Self(format!("{CLIENT_ADDRESS_PREFIX}{}", peer_system_id.into()))
    }

    /// Whether this address identifies a client-only peer.
    pub fn is_client(&self) -> bool {
        self.0.starts_with(CLIENT_ADDRESS_PREFIX)
    }

    /// The raw label, e.g. `"localhost:12000"` or `"$client/abc123"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process identifier: a routing token comprising `(address, id, requestId?)`.
///
/// Two PIDs are equal iff `address` and `id` are equal — `request_id` rides
/// along for request/response correlation but never participates in
/// equality or routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pid {
    address: Address,
    id: ActorId,
    request_id: Option<MessageId>,
}

impl Pid {
    /// Construct a PID for a freshly spawned or freshly referenced actor.
    pub fn new(address: Address, id: ActorId) -> Self {
        Self {
            address,
            id,
            request_id: None,
        }
    }

    /// Attach a request id, used to correlate a reply back to its request.
    pub fn with_request_id(mut self, request_id: MessageId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// The logical host label this PID routes through.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The actor id, unique within `address`.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// The correlation id for a pending request, if any.
    pub fn request_id(&self) -> Option<MessageId> {
        self.request_id
    }

    /// Whether this PID's address is the given local address, i.e. whether
    /// it should resolve through the local process table rather than a
    /// host resolver.
    pub fn is_local(&self, local_address: &Address) -> bool {
        self.address == *local_address
    }
}

impl PartialEq for Pid {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.id == other.id
    }
}

impl Eq for Pid {}

impl std::hash::Hash for Pid {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.id.hash(state);
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_id_is_globally_unique() {
        assert_ne!(ActorId::new(), ActorId::new());
    }

    #[test]
    fn address_recognizes_client_prefix() {
        let addr = Address::client("peer-42");
        assert!(addr.is_client());
        assert_eq!(addr.as_str(), "$client/peer-42");

        let server = Address::new("localhost:12000");
        assert!(!server.is_client());
    }

    #[test]
    fn pid_equality_ignores_request_id() {
        let addr = Address::new("localhost:12000");
        let id = ActorId::new();
        let a = Pid::new(addr.clone(), id);
        let b = Pid::new(addr, id).with_request_id(MessageId::new());
        assert_eq!(a, b);
    }

    #[test]
    fn pid_inequality_on_different_address() {
        let id = ActorId::new();
        let a = Pid::new(Address::new("localhost:12000"), id);
        let b = Pid::new(Address::new("localhost:12001"), id);
        assert_ne!(a, b);
    }

    #[test]
    fn pid_is_local_checks_address_only() {
        let local = Address::new("localhost:12000");
        let pid = Pid::new(local.clone(), ActorId::new());
        assert!(pid.is_local(&local));
        assert!(!pid.is_local(&Address::new("localhost:12001")));
    }
}
