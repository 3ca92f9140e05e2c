//! Message routing: the `MessageBroker<M>` DI seam and the Process
//! Registry (§4.B) it routes through.
//!
//! # Components
//!
//! - [`MessageBroker`] — generic send/request trait actors route
//!   through via `ActorContext`.
//! - [`InMemoryMessageBroker`] — default in-process implementation.
//! - [`ProcessRegistry`], [`ProcessSink`], [`HostResolver`] — identity
//!   to sink resolution, local table plus delegated remote resolution.
//! - [`BrokerError`] — errors surfaced while routing.
//!
//! # Design Philosophy
//!
//! - **Generic constraints**: `ActorSystem<M, B: MessageBroker<M>>`
//!   carries the broker as a type parameter, not a trait object (§6.2).
//! - **One exception**: [`ProcessSink`] is held as `dyn` inside the
//!   registry, because local and remote sinks are genuinely
//!   heterogeneous and the whole point of host resolution is that the
//!   registry never learns the concrete sink type.

pub mod error;
pub mod in_memory;
pub mod registry;
pub mod traits;

pub use error::BrokerError;
pub use in_memory::InMemoryMessageBroker;
pub use registry::{HostResolver, LocalSink, ProcessRegistry, ProcessSink, RegistryError};
pub use traits::MessageBroker;
