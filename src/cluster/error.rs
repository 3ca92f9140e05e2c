//! Errors for cluster membership and gossip.

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use thiserror::Error;

// Layer 3: Internal
use crate::util::MemberId;

/// Errors surfaced by [`super::gossip::GossipLayer`] and
/// [`super::seed::SeedProvider`] operations.
#[derive(Debug, Error)]
pub enum GossipError {
    /// A delta was addressed to a peer with no known transport.
    #[error("no transport registered for peer {0}")]
    UnknownPeer(MemberId),

    /// Sending a delta to a peer failed.
    #[error("failed to send gossip delta to {0}: {1}")]
    SendFailed(MemberId, String),

    /// Seed discovery failed to produce a peer snapshot.
    #[error("seed discovery failed: {0}")]
    DiscoveryFailed(String),
}
