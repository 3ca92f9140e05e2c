//! Event Stream (§4.E): a typed pub/sub bus for system events, separate
//! from actor mailboxes — endpoint lifecycle, cluster membership, and
//! dead letters are published here rather than routed as actor messages.

pub mod bus;
pub mod types;

pub use bus::{EventStream, Topic};
pub use types::{StreamEvent, SubscriptionToken};
