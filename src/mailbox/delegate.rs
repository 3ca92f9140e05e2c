//! The delegate a mailbox dispatches into.
//!
//! The mailbox owns queuing, ordering, and scheduling (§4.A); it knows
//! nothing about what an actor *does* with a message. `MailboxDelegate`
//! is the seam between the two: the actor runtime implements it once and
//! the dispatch loop in [`super::queue::Mailbox`] drives it.

// Layer 1: Standard library imports
use std::error::Error as StdError;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::message::{Envelope, Message, SystemMessage};

/// Boxed, type-erased failure from a delegate callback. The mailbox
/// doesn't care what kind of error an actor raises, only that one
/// occurred.
pub type DelegateError = Box<dyn StdError + Send + Sync + 'static>;

/// Receives messages drained from a [`super::queue::Mailbox`]'s dispatch
/// loop, in order, system messages before user messages.
///
/// # Failure semantics (§4.A)
/// A `handle_user` failure suspends the mailbox (user messages keep
/// queuing, system messages keep draining) and is reported through
/// `on_user_failure` so the runtime can notify the parent. A
/// `handle_system` failure is fatal: the dispatch loop stops the
/// mailbox after the call returns.
#[async_trait]
pub trait MailboxDelegate<M: Message>: Send + Sync + 'static {
    /// Handle one system message. An `Err` is fatal: the dispatch loop
    /// closes the mailbox after the call returns.
    async fn handle_system(&self, message: SystemMessage) -> Result<(), DelegateError>;

    /// Handle one user envelope. An `Err` suspends the mailbox.
    async fn handle_user(&self, envelope: Envelope<M>) -> Result<(), DelegateError>;

    /// Called once after `handle_user` fails, with the same error,
    /// so the delegate can turn it into a `Failure` system message
    /// addressed to the parent.
    async fn on_user_failure(&self, error: DelegateError);
}
