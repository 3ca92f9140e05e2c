//! Lightweight, lock-free observability counters for a mailbox.
//!
//! Counts are cheap enough to leave on unconditionally; anything heavier
//! (per-message tracing spans, queue-depth histograms) belongs to the
//! `tracing` layer the dispatch loop emits into, not here.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracked per mailbox.
#[derive(Debug, Default)]
pub struct MailboxMetrics {
    pushed_system: AtomicU64,
    pushed_user: AtomicU64,
    delivered_system: AtomicU64,
    delivered_user: AtomicU64,
    suspended_count: AtomicU64,
}

impl MailboxMetrics {
    /// New, zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn record_pushed_system(&self) {
        self.pushed_system.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_pushed_user(&self) {
        self.pushed_user.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_delivered_system(&self) {
        self.delivered_system.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_delivered_user(&self) {
        self.delivered_user.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_suspended(&self) {
        self.suspended_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Total system messages pushed.
    pub fn pushed_system(&self) -> u64 {
        self.pushed_system.load(Ordering::Relaxed)
    }

    /// Total user messages pushed.
    pub fn pushed_user(&self) -> u64 {
        self.pushed_user.load(Ordering::Relaxed)
    }

    /// Total system messages delivered to the delegate.
    pub fn delivered_system(&self) -> u64 {
        self.delivered_system.load(Ordering::Relaxed)
    }

    /// Total user messages delivered to the delegate.
    pub fn delivered_user(&self) -> u64 {
        self.delivered_user.load(Ordering::Relaxed)
    }

    /// Approximate in-flight user messages (pushed but not yet delivered).
    pub fn in_flight_user(&self) -> u64 {
        self.pushed_user()
            .saturating_sub(self.delivered_user())
    }

    /// Number of times the mailbox entered the `suspended` state.
    pub fn suspended_count(&self) -> u64 {
        self.suspended_count.load(Ordering::Relaxed)
    }
}
