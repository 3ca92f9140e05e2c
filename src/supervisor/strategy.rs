//! Supervision strategies (§4.D).
//!
//! Five variants, each a closed, data-carrying case rather than a
//! user-extensible trait: the set of ways a supervisor can respond to a
//! child failure is fixed, so an enum says that more plainly than an
//! open `dyn` or generic trait would.
//!
//! - `OneForOne` — restart only the failed child.
//! - `AllForOne` — restart every sibling alongside the failed child.
//! - `AlwaysRestart` — unconditional restart, no retry budget.
//! - `Stop` — never restart; the child (and, for `AllForOne`-style
//!   scoping, nothing else) is removed.
//! - `Escalate` — this supervisor can't absorb the failure; its own
//!   parent decides.
//!
//! `OneForOne` and `AllForOne` carry a `(max_retries, within)` retry
//! budget: once a child's [`RestartStatistics`] show more than
//! `max_retries` failures inside `within`, the directive is promoted to
//! `Stop` regardless of what the strategy would otherwise choose.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none needed)

// Layer 3: Internal module imports
use super::backoff::RestartStatistics;
use super::types::SupervisionDirective;

/// How many children a directive, once computed, applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionScope {
    /// Only the child that failed.
    FailedChild,
    /// The failed child and every one of its siblings.
    AllChildren,
}

/// A supervisor's failure-handling policy (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionStrategy {
    /// Restart only the failed child, bounded by a retry budget.
    OneForOne {
        max_retries: u32,
        within: Duration,
    },
    /// Restart the failed child and all of its siblings, bounded by a
    /// retry budget counted against the failed child.
    AllForOne {
        max_retries: u32,
        within: Duration,
    },
    /// Always restart the failed child; no retry budget, no promotion
    /// to `Stop`.
    AlwaysRestart,
    /// Never restart; the child is stopped.
    Stop,
    /// Defer the decision to the parent supervisor.
    Escalate,
}

impl Default for SupervisionStrategy {
    /// `OneForOne` with a 3-restart budget per 60 seconds — the same
    /// default [`super::node::SupervisorNode::retry_window`] falls back
    /// to when a strategy carries no budget of its own.
    fn default() -> Self {
        Self::OneForOne {
            max_retries: 3,
            within: Duration::from_secs(60),
        }
    }
}

impl SupervisionStrategy {
    /// The retry budget this strategy enforces, if any.
    pub fn retry_budget(&self) -> Option<(u32, Duration)> {
        match self {
            Self::OneForOne { max_retries, within } | Self::AllForOne { max_retries, within } => {
                Some((*max_retries, *within))
            }
            Self::AlwaysRestart | Self::Stop | Self::Escalate => None,
        }
    }

    /// Which children a directive produced by this strategy applies to.
    pub fn scope(&self) -> DecisionScope {
        match self {
            Self::AllForOne { .. } => DecisionScope::AllChildren,
            _ => DecisionScope::FailedChild,
        }
    }

    /// Decide what to do about a failure, given the failed child's
    /// restart history. `stats` is consulted (and not mutated) so the
    /// caller controls exactly when a restart is recorded.
    pub fn decide(&self, stats: &RestartStatistics) -> SupervisionDirective {
        match self {
            Self::AlwaysRestart => SupervisionDirective::Restart,
            Self::Stop => SupervisionDirective::Stop,
            Self::Escalate => SupervisionDirective::Escalate,
            Self::OneForOne { max_retries, .. } | Self::AllForOne { max_retries, .. } => {
                if stats.count() > *max_retries {
                    SupervisionDirective::Stop
                } else {
                    SupervisionDirective::Restart
                }
            }
        }
    }
}
