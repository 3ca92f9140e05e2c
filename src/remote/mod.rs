//! Remote endpoint layer (§4.F, §4.G, §6): outbound connections to peer
//! systems, managed behind one coordination point per local address.

pub mod channel;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod manager;
pub mod resolver;

pub use channel::{Channel, ChannelProvider, Frame, LoopbackChannelProvider, SharedChannelProvider};
pub use endpoint::{ConnectorState, Endpoint, EndpointTarget};
pub use error::RemoteError;
pub use handler::{InboundDispatcher, RemoteMessageHandler};
pub use manager::{EndpointManager, DEFAULT_QUEUE_CAPACITY, WAIT_AFTER_ENDPOINT_TERMINATION};
pub use resolver::{RemoteHostResolver, RemoteProcessSink};
