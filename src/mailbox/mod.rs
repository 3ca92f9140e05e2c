//! Mailbox: the dual-queue, self-scheduling message sink behind every
//! actor (§4.A).
//!
//! # Components
//!
//! - [`Mailbox`] — the queue pair plus CAS-scheduled dispatch loop.
//! - [`MailboxDelegate`] — the seam the dispatch loop drives into; the
//!   actor runtime implements it once per actor instance.
//! - [`MailboxError`] — the single failure mode observable by callers.
//! - [`MailboxMetrics`] — lock-free observability counters.
//!
//! # Design Philosophy
//!
//! - **Generic constraints**: `Mailbox<M, D: MailboxDelegate<M>>`, never
//!   `dyn` (§6.2).
//! - **Non-blocking pushes**: queues are unbounded; the only rejection
//!   is a closed mailbox. Backpressure, where it matters, belongs to the
//!   remote endpoint's outbound queue, not here.
//! - **At most one dispatcher**: pushes CAS a `running` flag to decide
//!   whether to spawn the dispatch loop; only one loop is ever active
//!   per mailbox.

pub mod delegate;
pub mod error;
pub mod metrics;
pub mod queue;

pub use delegate::{DelegateError, MailboxDelegate};
pub use error::MailboxError;
pub use metrics::MailboxMetrics;
pub use queue::{Mailbox, DEFAULT_THROUGHPUT};
