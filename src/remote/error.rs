//! Errors for the remote endpoint layer.

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use thiserror::Error;

// Layer 3: Internal
use crate::util::{Address, MemberId};

/// Errors surfaced by [`super::manager::EndpointManager`] and
/// [`super::endpoint::Endpoint`] operations.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The channel provider could not establish a connection.
    #[error("failed to connect to {0}: {1}")]
    ConnectFailed(Address, String),

    /// The endpoint's outbound queue is full; backpressure applied.
    #[error("outbound queue full for {0}")]
    QueueFull(Address),

    /// A send was attempted on an endpoint past `Terminating`.
    #[error("endpoint for {0} is no longer accepting sends")]
    EndpointTerminated(Address),

    /// Encoding a message for the wire failed.
    #[error("failed to encode message: {0}")]
    Encode(String),

    /// Decoding a frame off the wire failed; the frame is discarded.
    #[error("failed to decode frame: {0}")]
    Decode(String),

    /// No local target exists for a decoded inbound envelope.
    #[error("no local target for peer {0}")]
    UnknownPeer(MemberId),
}
