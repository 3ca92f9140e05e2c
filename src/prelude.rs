//! Prelude module for convenient imports.
//!
//! Re-exports the most commonly used types and traits for building
//! actor systems with strata-rt:
//!
//! ```rust
//! use strata_rt::prelude::*;
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_rt::prelude::*;
//! use async_trait::async_trait;
//!
//! #[derive(Debug, Clone)]
//! struct MyMessage {
//!     data: String,
//! }
//!
//! impl Message for MyMessage {
//!     const MESSAGE_TYPE: &'static str = "my_message";
//! }
//!
//! #[derive(Default)]
//! struct MyActor {
//!     count: u64,
//! }
//!
//! #[async_trait]
//! impl Actor for MyActor {
//!     type Message = MyMessage;
//!     type Error = std::convert::Infallible;
//!
//!     async fn handle_message<B: MessageBroker<Self::Message>>(
//!         &mut self,
//!         msg: Self::Message,
//!         _ctx: &mut ActorContext<Self::Message, B>,
//!     ) -> Result<(), Self::Error> {
//!         self.count += 1;
//!         println!("Received: {}", msg.data);
//!         Ok(())
//!     }
//! }
//! ```

// Core actor system
pub use crate::actor::{Actor, ActorContext, ActorLifecycle, ActorState};

// Messaging
pub use crate::message::{Envelope, Message, SystemMessage};

// Mailbox
pub use crate::mailbox::{Mailbox, MailboxDelegate, MailboxError};

// Message broker
pub use crate::broker::{InMemoryMessageBroker, MessageBroker, ProcessRegistry};

// Supervision
pub use crate::supervisor::{
    Child, ChildHealth, ChildId, ChildSpec, ChildState, RestartPolicy, ShutdownPolicy,
    SupervisionStrategy, SupervisorNode,
};

// System
pub use crate::system::{ActorSystem, SystemConfig};

// Remote connectivity
pub use crate::remote::{ChannelProvider, Endpoint, EndpointManager, LoopbackChannelProvider};

// Cluster membership
pub use crate::cluster::{ClusterHandle, MemberStatus, MembershipTable};

// Utilities
pub use crate::util::{Address, ActorId, MemberId, Pid};
