//! System messages: the privileged category that drives actor lifecycle.
//!
//! System messages always drain before the next user message in a mailbox
//! (§4.A), and their relative order among themselves is preserved.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::Pid;

/// Why an actor (or endpoint) terminated, carried in `Terminated` /
/// `EndpointTerminated` notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Orderly shutdown requested by a `Stop` system message.
    Stopped,
    /// The supervisor's decision was to stop rather than restart.
    SupervisorStopped,
    /// Parent is shutting down and cascaded the stop to its children.
    ParentStopped,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::SupervisorStopped => write!(f, "supervisor stopped"),
            Self::ParentStopped => write!(f, "parent stopped"),
        }
    }
}

/// A reported failure, carried from a failing child's mailbox to its
/// parent as a `Failure` system message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Failure {
    /// The child that failed.
    pub child: Pid,
    /// Human-readable failure description (the actor's `Error::to_string()`).
    pub reason: String,
    /// When the failure was observed.
    pub occurred_at: DateTime<Utc>,
}

/// The privileged message category that drives the actor lifecycle state
/// machine (§4.C). Disjoint from user messages but sharing a mailbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SystemMessage {
    /// First message delivered to a freshly started (or restarted) actor.
    Started,
    /// Request an orderly stop: children are stopped first, then `Stopped`
    /// is published to watchers.
    Stop,
    /// Supervisor directive: stop the current instance and start a fresh
    /// one, preserving queued user messages.
    Restart,
    /// Delivered to every watcher once the watched actor reaches `Stopped`.
    Terminated { pid: Pid, reason: StopReason },
    /// Register a watcher for `Terminated` notifications.
    Watch { watcher: Pid },
    /// Remove a previously registered watcher.
    Unwatch { watcher: Pid },
    /// A child reported an unhandled error while processing a user message.
    Failure(Failure),
    /// Informs a parent that `child` was just registered under it, so the
    /// parent's own context can track it for cascading stop/restart.
    ChildSpawned { child: Pid },
}

impl SystemMessage {
    /// A short, stable tag for logging (`tracing` fields, metrics).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Terminated { .. } => "terminated",
            Self::Watch { .. } => "watch",
            Self::Unwatch { .. } => "unwatch",
            Self::Failure(_) => "failure",
            Self::ChildSpawned { .. } => "child_spawned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{Address, ActorId};

    #[test]
    fn kind_is_stable_per_variant() {
        assert_eq!(SystemMessage::Started.kind(), "started");
        assert_eq!(SystemMessage::Stop.kind(), "stop");
        assert_eq!(SystemMessage::Restart.kind(), "restart");
    }

    #[test]
    fn failure_carries_child_pid_and_reason() {
        let pid = Pid::new(Address::new("localhost:9000"), ActorId::new());
        let failure = Failure {
            child: pid.clone(),
            reason: "boom".into(),
            occurred_at: Utc::now(),
        };
        let msg = SystemMessage::Failure(failure);
        assert_eq!(msg.kind(), "failure");
        if let SystemMessage::Failure(f) = msg {
            assert_eq!(f.child, pid);
            assert_eq!(f.reason, "boom");
        } else {
            unreachable!("constructed as Failure variant");
        }
    }
}
