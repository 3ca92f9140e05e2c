//! Canonical mailbox error type.

// Layer 2: Third-party crate imports
use thiserror::Error;

/// Errors raised by mailbox push/dispatch operations.
///
/// Per §4.A, a full or slow mailbox is never a source of backpressure
/// errors: the queues are unbounded and pushes are always accepted until
/// the mailbox is closed. The only failure mode a caller observes is
/// pushing into a mailbox whose actor has already stopped.
#[derive(Debug, Error)]
pub enum MailboxError {
    /// The target mailbox has been closed (actor reached `Stopped`).
    #[error("mailbox is closed")]
    Closed,
}
