//! Cluster membership (§4.H, §4.I): gossip-based eventual convergence
//! over a shared membership table, bootstrapped by a pluggable seed
//! discovery capability.

pub mod error;
pub mod gossip;
pub mod handle;
pub mod member;
pub mod seed;

pub use error::GossipError;
pub use gossip::{GossipLayer, GossipTransport, DEFAULT_GOSSIP_FANOUT, DEFAULT_GOSSIP_INTERVAL};
pub use handle::ClusterHandle;
pub use member::{MemberStateDelta, MemberStateEntry, MemberStatus, MembershipTable};
pub use seed::{MemberDescriptor, SeedDiscovery, SeedMembershipProvider, StaticSeedDiscovery};
