//! Fluent builder for configuring and spawning a single supervised child.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none needed)

// Layer 3: Internal module imports
use crate::supervisor::error::SupervisorError;
use crate::supervisor::node::{ChildSpec, SupervisorNode};
use crate::supervisor::traits::Child;
use crate::supervisor::types::{ChildId, RestartPolicy, ShutdownPolicy};

/// Fluent builder for a single child, returned by [`SupervisorNode::child`].
///
/// Equivalent to constructing a [`ChildSpec`] directly; this exists purely
/// for call-site readability when only a couple of fields need overriding.
pub struct SingleChildBuilder<'a, C> {
    supervisor: &'a mut SupervisorNode<C>,
    id: String,
    factory: Option<Box<dyn Fn() -> C + Send + Sync>>,
    restart_policy: Option<RestartPolicy>,
    shutdown_policy: Option<ShutdownPolicy>,
}

impl<'a, C: Child> SingleChildBuilder<'a, C> {
    pub(crate) fn new(supervisor: &'a mut SupervisorNode<C>, id: String) -> Self {
        Self {
            supervisor,
            id,
            factory: None,
            restart_policy: None,
            shutdown_policy: None,
        }
    }

    /// Sets the factory function used to create (and later recreate) this
    /// child. Required before [`spawn`](Self::spawn).
    pub fn factory(mut self, f: impl Fn() -> C + Send + Sync + 'static) -> Self {
        self.factory = Some(Box::new(f));
        self
    }

    /// Sets the restart policy. Defaults to [`RestartPolicy::Permanent`].
    pub fn restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = Some(policy);
        self
    }

    /// Sets the shutdown policy. Defaults to a 5-second graceful shutdown.
    pub fn shutdown_policy(mut self, policy: ShutdownPolicy) -> Self {
        self.shutdown_policy = Some(policy);
        self
    }

    /// Sets a graceful shutdown timeout. Shorthand for
    /// `.shutdown_policy(ShutdownPolicy::Graceful(timeout))`.
    pub fn shutdown_graceful(self, timeout: Duration) -> Self {
        self.shutdown_policy(ShutdownPolicy::Graceful(timeout))
    }

    /// Builds the spec and starts the child under the supervisor.
    ///
    /// # Errors
    /// Returns [`SupervisorError::InvalidConfiguration`] if no factory was
    /// set, or propagates [`SupervisorError::ChildStartFailed`] from the
    /// underlying `start_child` call.
    pub async fn spawn(self) -> Result<ChildId, SupervisorError> {
        let factory =
            self.factory
                .ok_or_else(|| SupervisorError::InvalidConfiguration {
                    reason: "factory function is required before spawn()".into(),
                })?;

        let mut spec = ChildSpec::new(self.id, move || factory());
        if let Some(policy) = self.restart_policy {
            spec = spec.with_restart_policy(policy);
        }
        if let Some(policy) = self.shutdown_policy {
            spec = spec.with_shutdown_policy(policy);
        }

        self.supervisor.start_child(spec).await
    }
}
