//! Actor lifecycle state machine (§4.C).
//!
//! `Starting → Idle ⇄ Receiving → Stopping → Stopped`, with `Restarting`
//! reachable from any state except `Stopped`.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use thiserror::Error;

/// An actor's position in its lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// Freshly spawned (or restarted); about to receive `Started`.
    Starting,
    /// Waiting for the next message; no handler is running.
    Idle,
    /// A handler is currently executing for the message just delivered.
    Receiving,
    /// Children are being stopped; the actor is about to reach `Stopped`.
    Stopping,
    /// Terminal. The registry entry has been removed.
    Stopped,
    /// A supervisor directive is replacing this instance with a fresh
    /// one; queued user messages are preserved across the swap.
    Restarting,
}

impl fmt::Display for ActorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Starting => "starting",
            Self::Idle => "idle",
            Self::Receiving => "receiving",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Restarting => "restarting",
        };
        write!(f, "{label}")
    }
}

/// An attempted transition that the state machine doesn't permit.
#[derive(Debug, Error)]
#[error("illegal actor transition: {from} -> {to}")]
pub struct IllegalTransition {
    from: ActorState,
    to: ActorState,
}

/// Tracks one actor's current lifecycle state and validates transitions.
#[derive(Debug, Clone)]
pub struct ActorLifecycle {
    state: ActorState,
}

impl ActorLifecycle {
    /// A lifecycle freshly created for a spawning actor.
    pub fn new() -> Self {
        Self {
            state: ActorState::Starting,
        }
    }

    /// The current state.
    pub fn state(&self) -> ActorState {
        self.state
    }

    /// Attempt to move to `next`, validating the transition is legal.
    ///
    /// # Errors
    /// Returns [`IllegalTransition`] if `next` isn't reachable from the
    /// current state.
    pub fn transition_to(&mut self, next: ActorState) -> Result<(), IllegalTransition> {
        if !self.state.can_transition_to(next) {
            return Err(IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

impl Default for ActorLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorState {
    /// Whether `self -> next` is a legal edge in the state machine.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ActorState::*;
        match (self, next) {
            // Restarting is reachable from anywhere except Stopped, and
            // always proceeds back into Starting for the fresh instance.
            (Stopped, Restarting) => false,
            (_, Restarting) => true,
            (Restarting, Starting) => true,

            (Starting, Idle) => true,
            (Starting, Stopping) => true,

            (Idle, Receiving) => true,
            (Idle, Stopping) => true,
            (Receiving, Idle) => true,
            (Receiving, Stopping) => true,

            (Stopping, Stopped) => true,

            _ => false,
        }
    }
}
