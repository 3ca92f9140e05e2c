//! The dual-queue, self-scheduling mailbox (§4.A).
//!
//! A `Mailbox` is a thread-safe handle: `push_system`/`push_user` are
//! non-blocking and may be called from any number of senders. The first
//! push to an idle mailbox wins a compare-and-swap on `running` and
//! spawns the dispatch loop; every later push until the loop stops again
//! just enqueues. The loop drains system messages ahead of user
//! messages, honours a throughput quota so one busy actor cannot starve
//! the runtime, and yields cooperatively between batches.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::delegate::MailboxDelegate;
use super::error::MailboxError;
use super::metrics::MailboxMetrics;
use crate::message::{Envelope, Message, SystemMessage};

/// Default number of messages a single dispatch turn will drain before
/// cooperatively yielding back to the executor.
pub const DEFAULT_THROUGHPUT: usize = 64;

struct MailboxInner<M: Message> {
    system: Mutex<VecDeque<SystemMessage>>,
    user: Mutex<VecDeque<Envelope<M>>>,
    running: AtomicBool,
    suspended: AtomicBool,
    closed: AtomicBool,
    throughput: usize,
    metrics: MailboxMetrics,
}

impl<M: Message> MailboxInner<M> {
    /// Whether there is at least one message the dispatch loop could
    /// deliver right now (system messages always count; user messages
    /// only count while not suspended).
    fn has_deliverable_work(&self) -> bool {
        if !self.system.lock().is_empty() {
            return true;
        }
        !self.suspended.load(Ordering::Acquire) && !self.user.lock().is_empty()
    }
}

/// A mailbox bound to a [`MailboxDelegate`] that receives its drained
/// messages. Cheaply `Clone`: all clones share the same queues.
pub struct Mailbox<M: Message, D: MailboxDelegate<M>> {
    inner: Arc<MailboxInner<M>>,
    delegate: Arc<D>,
}

impl<M: Message, D: MailboxDelegate<M>> Clone for Mailbox<M, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            delegate: Arc::clone(&self.delegate),
        }
    }
}

impl<M: Message, D: MailboxDelegate<M>> Mailbox<M, D> {
    /// Build a new, empty mailbox around `delegate`, draining at most
    /// `throughput` messages per dispatch turn.
    pub fn new(delegate: D, throughput: usize) -> Self {
        Self {
            inner: Arc::new(MailboxInner {
                system: Mutex::new(VecDeque::new()),
                user: Mutex::new(VecDeque::new()),
                running: AtomicBool::new(false),
                suspended: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                throughput: throughput.max(1),
                metrics: MailboxMetrics::new(),
            }),
            delegate: Arc::new(delegate),
        }
    }

    /// Build a mailbox with the default throughput quota.
    pub fn with_default_throughput(delegate: D) -> Self {
        Self::new(delegate, DEFAULT_THROUGHPUT)
    }

    /// Push a system message. Non-blocking; always accepted unless the
    /// mailbox is closed, in which case the message is silently dropped
    /// (there is no one left to observe it).
    pub fn push_system(&self, message: SystemMessage) {
        if self.inner.closed.load(Ordering::Acquire) {
            return;
        }
        self.inner.system.lock().push_back(message);
        self.inner.metrics.record_pushed_system();
        self.schedule();
    }

    /// Push a user envelope. Accepted even while `suspended` (it queues);
    /// rejected with [`MailboxError::Closed`] once the mailbox is closed.
    pub fn push_user(&self, envelope: Envelope<M>) -> Result<(), MailboxError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(MailboxError::Closed);
        }
        self.inner.user.lock().push_back(envelope);
        self.inner.metrics.record_pushed_user();
        self.schedule();
        Ok(())
    }

    /// Total queued messages across both queues.
    pub fn len(&self) -> usize {
        self.inner.system.lock().len() + self.inner.user.lock().len()
    }

    /// `true` iff both queues are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether user-message delivery is currently suspended.
    pub fn is_suspended(&self) -> bool {
        self.inner.suspended.load(Ordering::Acquire)
    }

    /// Whether the mailbox has been closed (no further pushes accepted).
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Observability counters for this mailbox.
    pub fn metrics(&self) -> &MailboxMetrics {
        &self.inner.metrics
    }

    /// Close the mailbox: no further pushes are accepted and the
    /// dispatch loop exits after its current turn. Already-queued
    /// messages are dropped, not drained.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
    }

    /// Resume user-message delivery after a supervisor `Resume` or
    /// `Restart` directive.
    pub fn resume(&self) {
        self.inner.suspended.store(false, Ordering::Release);
        self.schedule();
    }

    fn schedule(&self) {
        if self.inner.closed.load(Ordering::Acquire) {
            return;
        }
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let mailbox = self.clone();
            tokio::spawn(async move {
                mailbox.dispatch_loop().await;
            });
        }
    }

    /// Drains messages until the queues are exhausted (or suspended and
    /// empty of system work), cooperatively yielding between batches of
    /// up to `throughput` messages.
    async fn dispatch_loop(&self) {
        loop {
            let mut processed = 0usize;
            while processed < self.inner.throughput {
                if self.inner.closed.load(Ordering::Acquire) {
                    return;
                }

                if let Some(message) = self.inner.system.lock().pop_front() {
                    if self.delegate.handle_system(message).await.is_err() {
                        self.inner.closed.store(true, Ordering::Release);
                        return;
                    }
                    self.inner.metrics.record_delivered_system();
                    processed += 1;
                    continue;
                }

                if self.inner.suspended.load(Ordering::Acquire) {
                    break;
                }

                let Some(envelope) = self.inner.user.lock().pop_front() else {
                    break;
                };
                if let Err(error) = self.delegate.handle_user(envelope).await {
                    self.inner.suspended.store(true, Ordering::Release);
                    self.inner.metrics.record_suspended();
                    self.delegate.on_user_failure(error).await;
                }
                self.inner.metrics.record_delivered_user();
                processed += 1;
            }

            if self.inner.closed.load(Ordering::Acquire) {
                return;
            }
            tokio::task::yield_now().await;

            if self.inner.has_deliverable_work() {
                continue;
            }

            self.inner.running.store(false, Ordering::Release);
            if self.inner.has_deliverable_work()
                && self
                    .inner
                    .running
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            {
                continue;
            }
            return;
        }
    }
}
