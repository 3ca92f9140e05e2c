//! The `Actor` trait: business logic only.
//!
//! Failure handling is owned entirely by supervision (§4.D): a failing
//! `handle_message` call produces a `Failure` system message that
//! transits to the parent's mailbox, and the parent's
//! `SupervisionStrategy` is the sole authority deciding Resume, Restart,
//! Stop, or Escalate. `Actor` itself has no error-handling hook to keep
//! that authority in one place.
//!
//! # Example
//!
//! ```rust
//! use strata_rt::{Actor, ActorContext, Message};
//! use strata_rt::broker::MessageBroker;
//! use async_trait::async_trait;
//! use std::fmt;
//!
//! #[derive(Debug, Clone)]
//! struct Ping;
//! impl Message for Ping {
//!     const MESSAGE_TYPE: &'static str = "ping";
//! }
//!
//! #[derive(Debug)]
//! struct PingError;
//! impl fmt::Display for PingError {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "ping error")
//!     }
//! }
//! impl std::error::Error for PingError {}
//!
//! struct PingActor { count: u32 }
//!
//! #[async_trait]
//! impl Actor for PingActor {
//!     type Message = Ping;
//!     type Error = PingError;
//!
//!     async fn handle_message<B: MessageBroker<Self::Message>>(
//!         &mut self,
//!         _message: Self::Message,
//!         _context: &mut ActorContext<Self::Message, B>,
//!     ) -> Result<(), Self::Error> {
//!         self.count += 1;
//!         Ok(())
//!     }
//! }
//! ```

// Layer 1: Standard library imports
use std::error::Error;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::broker::MessageBroker;
use crate::message::Message;

/// An actor's business logic: generic over message type and error
/// type, monomorphized per implementation (§6.2 — no `dyn`).
#[async_trait]
pub trait Actor: Send + Sync + 'static {
    /// The message type this actor handles.
    type Message: Message;

    /// The error type `handle_message` (and the lifecycle hooks) may
    /// return. Turned into a `Failure` system message on error, for the
    /// supervisor to act on.
    type Error: Error + Send + Sync + 'static;

    /// Process one delivered message.
    async fn handle_message<B: MessageBroker<Self::Message>>(
        &mut self,
        message: Self::Message,
        context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error>;

    /// Runs once, before the first message, on every `Started` (initial
    /// spawn or post-restart). Failure here escalates per §4.C.
    async fn pre_start<B: MessageBroker<Self::Message>>(
        &mut self,
        _context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Runs once, on `Stopping`, after children have been asked to stop.
    async fn post_stop<B: MessageBroker<Self::Message>>(
        &mut self,
        _context: &mut ActorContext<Self::Message, B>,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}
