//! Utility types shared across the runtime: identifiers and serde helpers.

pub mod ids;
pub mod serde_helpers;

pub use ids::{Address, ActorId, MemberId, MessageId, Pid, CLIENT_ADDRESS_PREFIX};
pub use serde_helpers::duration_serde;
