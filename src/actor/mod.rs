//! Actor kernel: the `Actor` trait, its per-delivery context, and the
//! lifecycle state machine that drives it (§4.C).
//!
//! # Components
//!
//! - [`Actor`] — business logic: `handle_message`, `pre_start`,
//!   `post_stop`.
//! - [`ActorContext`] — sender, self, children, headers, reply sink.
//! - [`ActorLifecycle`], [`ActorState`] — the state machine.
//!
//! Failure handling lives entirely in [`crate::supervisor`], not here:
//! `Actor` has no `on_error` hook, so there is exactly one authority
//! deciding what happens after a failure.
//!
//! # Design Philosophy
//!
//! - **Zero-cost abstractions**: generic constraints instead of trait
//!   objects (§6.2).
//! - **Isolation**: each actor owns its state; no shared mutability.

pub mod context;
pub mod lifecycle;
pub mod traits;

pub use context::ActorContext;
pub use lifecycle::{ActorLifecycle, ActorState, IllegalTransition};
pub use traits::Actor;
