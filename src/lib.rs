//! # strata-rt - Lightweight Erlang-Actor Model Runtime
//!
//! High-performance actor system with zero-cost abstractions, compile-time type safety,
//! and BEAM-inspired supervision for building fault-tolerant concurrent applications.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use strata_rt::prelude::*;
//! use async_trait::async_trait;
//!
//! // 1. Define your message type
//! #[derive(Debug, Clone)]
//! enum CounterMsg {
//!     Increment,
//!     GetCount(tokio::sync::oneshot::Sender<u64>),
//! }
//!
//! impl Message for CounterMsg {
//!     const MESSAGE_TYPE: &'static str = "counter";
//! }
//!
//! // 2. Define your actor
//! #[derive(Default)]
//! struct CounterActor {
//!     count: u64,
//! }
//!
//! // 3. Implement the Actor trait
//! #[async_trait]
//! impl Actor for CounterActor {
//!     type Message = CounterMsg;
//!     type Error = std::convert::Infallible;
//!
//!     async fn handle_message<B: MessageBroker<Self::Message>>(
//!         &mut self,
//!         msg: Self::Message,
//!         _ctx: &mut ActorContext<Self::Message, B>,
//!     ) -> Result<(), Self::Error> {
//!         match msg {
//!             CounterMsg::Increment => self.count += 1,
//!             CounterMsg::GetCount(reply) => {
//!                 let _ = reply.send(self.count);
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! // 4. Spawn and use your actor
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let system = ActorSystem::with_defaults(Address::new("local:9000"));
//!     let pid = system.spawn(CounterActor::default).await?;
//!
//!     system.broker().send(pid, CounterMsg::Increment).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Core Features
//!
//! ## Zero-Cost Abstractions
//! - **Generic constraints** instead of trait objects wherever possible
//! - **Compile-time dispatch** via monomorphization
//! - A handful of documented, deliberate `dyn` exceptions where the seam
//!   is genuinely heterogeneous: [`broker::ProcessSink`] (local vs.
//!   remote delivery), the supervisor's child factory closure (see
//!   [`supervisor::SingleChildBuilder`]), [`event_stream::EventStream`]'s
//!   subscriber handlers, [`remote::Channel`] / [`remote::ChannelProvider`]
//!   (pluggable transports), and [`cluster::GossipTransport`] /
//!   [`cluster::SeedDiscovery`] (pluggable cluster collaborators)
//!
//! ## Type Safety
//! - **Compile-time message type verification** via the [`Message`] trait
//! - **Associated types** prevent runtime type errors
//! - **Generic `MessageBroker<M>`** ensures type-safe routing
//!
//! ## BEAM-Inspired Supervision
//! - **Supervision trees** ([`supervisor::SupervisorTree`]) for fault
//!   tolerance and automatic recovery
//! - **Strategies**: `OneForOne`, `AllForOne`, `AlwaysRestart`, `Stop`,
//!   `Escalate`
//! - **Restart policies**: `Permanent`, `Transient`, `Temporary`
//! - **Health monitoring**: proactive failure detection via
//!   [`supervisor::spawn_health_monitor`]
//!
//! # Module Organization
//!
//! ## Core Actor System
//! - [`actor`] - Actor trait, lifecycle, and context for message handling
//! - [`message`] - Message trait, envelopes, and the system-message category
//! - [`mailbox`] - Per-actor dual-queue message sink
//! - [`broker`] - Message routing and the process registry
//!
//! ## Fault Tolerance
//! - [`supervisor`] - Supervision trees and restart strategies
//!
//! ## Distribution
//! - [`event_stream`] - Typed pub/sub bus for endpoint, membership, and
//!   dead-letter events
//! - [`remote`] - Outbound connections to peer systems: per-address
//!   endpoint lifecycle, connector backoff, and the pluggable channel
//!   transport seam
//! - [`cluster`] - Gossip-based membership convergence and the
//!   pluggable seed discovery seam
//!
//! ## Infrastructure
//! - [`system`] - ActorSystem configuration and lifecycle management
//! - [`util`] - Identifiers (`Pid`, `ActorId`, `Address`, `MemberId`, `MessageId`)
//!
//! Observability in this crate is ambient, not a dedicated module:
//! lifecycle transitions, spawn/stop/restart, and handler failures are
//! logged via `tracing` directly from the modules that drive them.
//!
//! # Architecture Principles
//!
//! ## Separation of Concerns
//! - **Actor**: message handling logic only, no failure-handling hook
//! - **Child**: supervision lifecycle, explicit implementation required
//! - **Message**: message type and metadata
//! - **Mailbox**: message queuing and dispatch scheduling
//! - **Broker**: routes messages between actors (hidden from actors)
//!
//! # See Also
//!
//! - [Erlang/OTP Documentation](https://www.erlang.org/doc/) - Inspiration for supervision
//! - [Actor Model (Wikipedia)](https://en.wikipedia.org/wiki/Actor_model) - Theoretical foundation

pub mod actor;
pub mod broker;
pub mod cluster;
pub mod event_stream;
pub mod mailbox;
pub mod message;
pub mod remote;
pub mod supervisor;
pub mod system;
pub mod util;

pub mod prelude;

// Re-export commonly used types
pub use actor::{Actor, ActorContext, ActorLifecycle, ActorState, IllegalTransition};
pub use broker::{
    BrokerError, HostResolver, InMemoryMessageBroker, LocalSink, MessageBroker, ProcessRegistry,
    ProcessSink, RegistryError,
};
pub use cluster::{
    ClusterHandle, GossipError, GossipLayer, GossipTransport, MemberDescriptor, MemberStateDelta,
    MemberStateEntry, MemberStatus, MembershipTable, SeedDiscovery, SeedMembershipProvider,
    StaticSeedDiscovery,
};
pub use event_stream::{EventStream, StreamEvent, SubscriptionToken, Topic};
pub use mailbox::{DelegateError, Mailbox, MailboxDelegate, MailboxError, MailboxMetrics};
pub use message::{Envelope, Headers, Message, StopReason, SystemMessage};
pub use remote::{
    Channel, ChannelProvider, ConnectorState, Endpoint, EndpointManager, EndpointTarget, Frame,
    LoopbackChannelProvider, RemoteError,
};
pub use supervisor::{
    spawn_health_monitor, Child, ChildEntry, ChildHealth, ChildId, ChildSpec, ChildState,
    DecisionScope, FailureReason, RestartPolicy, RestartStatistics, ShutdownPolicy,
    SingleChildBuilder, SupervisionDecision, SupervisionDirective, SupervisionStrategy,
    SupervisorError, SupervisorId, SupervisorNode, SupervisorTree,
};
pub use system::{ActorSpawnBuilder, ActorSystem, ClusterConfig, SystemConfig, SystemError};
pub use util::{Address, ActorId, MemberId, MessageId, Pid};
