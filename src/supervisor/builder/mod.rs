//! Fluent builder for supervised children.
//!
//! [`SingleChildBuilder`] is a thin, chainable wrapper over
//! [`super::node::ChildSpec`] for the common case of spawning one child
//! with a couple of policy overrides.

pub mod single;

pub use single::SingleChildBuilder;
