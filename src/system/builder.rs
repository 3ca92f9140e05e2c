//! Actor spawn builder with fluent API.

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
// (none)

// Layer 3: Internal
use crate::actor::Actor;
use crate::message::Message;
use crate::util::Pid;

use super::{ActorSystem, SystemError};

/// Fluent builder for spawning actors, returned by [`ActorSystem::spawn_builder`].
///
/// Always spawns a parentless (top-level) actor. To spawn under a
/// supervising parent — so the child's handler failures report back as
/// [`crate::message::SystemMessage::Failure`] instead of just suspending
/// its mailbox — use [`ActorSystem::spawn_child`] directly instead of
/// this builder.
///
/// # Examples
///
/// ```rust,ignore
/// use strata_rt::system::ActorSystem;
///
/// let pid = system
///     .spawn_builder()
///     .with_mailbox_throughput(500)
///     .spawn(|| MyActor::default())
///     .await?;
/// ```
pub struct ActorSpawnBuilder<'a, M: Message> {
    system: &'a ActorSystem<M>,
    throughput: Option<usize>,
}

impl<'a, M: Message> ActorSpawnBuilder<'a, M> {
    pub(crate) fn new(system: &'a ActorSystem<M>) -> Self {
        Self {
            system,
            throughput: None,
        }
    }

    /// Override the default per-turn mailbox dispatch throughput for this actor.
    pub fn with_mailbox_throughput(mut self, throughput: usize) -> Self {
        self.throughput = Some(throughput);
        self
    }

    /// Spawn the actor produced by `factory`, returning its [`Pid`].
    ///
    /// # Errors
    /// Returns [`SystemError::ShuttingDown`] if the system is shutting down,
    /// [`SystemError::ActorLimitExceeded`] if the configured actor limit is
    /// reached, or [`SystemError::SpawnFailed`] if registration fails.
    pub async fn spawn<A, F>(self, factory: F) -> Result<Pid, SystemError>
    where
        A: Actor<Message = M>,
        F: Fn() -> A + Send + Sync + 'static,
    {
        match self.throughput {
            Some(throughput) => self.system.spawn_with_throughput(factory, throughput).await,
            None => self.system.spawn(factory).await,
        }
    }
}
