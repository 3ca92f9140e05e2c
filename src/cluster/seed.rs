//! Seed / Membership Provider (§4.I): bootstraps the initial peer set
//! and publishes topology changes onto the event stream.

// Layer 1: Standard library
use std::sync::Arc;

// Layer 2: Third-party
use async_trait::async_trait;
use dashmap::DashSet;
use tracing::info;

// Layer 3: Internal
use super::error::GossipError;
use crate::event_stream::{EventStream, StreamEvent};
use crate::util::MemberId;

/// A peer descriptor as returned by seed discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub member_id: MemberId,
    pub address: String,
}

/// Discovers the current set of peers. Implementations are external
/// collaborators — static lists, DNS SRV lookups, Kubernetes label
/// queries — this crate ships only [`StaticSeedDiscovery`].
///
/// `discover` returns a full snapshot each call; [`SeedMembershipProvider`]
/// diffs two snapshots to derive `MemberJoined`/`MemberLeft` events,
/// rather than requiring discovery implementations to track deltas
/// themselves.
#[async_trait]
pub trait SeedDiscovery: Send + Sync {
    async fn discover(&self) -> Result<Vec<MemberDescriptor>, GossipError>;
}

/// A fixed peer list, grounding [`SeedDiscovery`] without committing to
/// a DNS or Kubernetes integration.
pub struct StaticSeedDiscovery {
    members: Vec<MemberDescriptor>,
}

impl StaticSeedDiscovery {
    pub fn new(members: Vec<MemberDescriptor>) -> Self {
        Self { members }
    }
}

#[async_trait]
impl SeedDiscovery for StaticSeedDiscovery {
    async fn discover(&self) -> Result<Vec<MemberDescriptor>, GossipError> {
        Ok(self.members.clone())
    }
}

/// Polls a [`SeedDiscovery`] implementation, diffs successive snapshots
/// against the previously known peer set, and publishes `MemberJoined`
/// / `MemberLeft` onto the event stream for whatever changed.
pub struct SeedMembershipProvider {
    discovery: Arc<dyn SeedDiscovery>,
    event_stream: Arc<EventStream>,
    known: DashSet<MemberId>,
}

impl SeedMembershipProvider {
    pub fn new(discovery: Arc<dyn SeedDiscovery>, event_stream: Arc<EventStream>) -> Self {
        Self {
            discovery,
            event_stream,
            known: DashSet::new(),
        }
    }

    /// Run one discovery poll, publishing events for any membership
    /// change since the previous poll.
    pub async fn poll(&self) -> Result<(), GossipError> {
        let snapshot = self.discovery.discover().await?;
        let current: DashSet<MemberId> = DashSet::new();
        for member in &snapshot {
            current.insert(member.member_id.clone());
        }

        for member_id in current.iter().map(|e| e.clone()) {
            if self.known.insert(member_id.clone()) {
                info!(member = %member_id, "member joined");
                self.event_stream.publish(StreamEvent::MemberJoined(member_id));
            }
        }

        let departed: Vec<MemberId> = self
            .known
            .iter()
            .map(|e| e.clone())
            .filter(|id| !current.contains(id))
            .collect();
        for member_id in departed {
            self.known.remove(&member_id);
            info!(member = %member_id, "member left");
            self.event_stream.publish(StreamEvent::MemberLeft(member_id));
        }

        Ok(())
    }

    pub fn known_members(&self) -> Vec<MemberId> {
        self.known.iter().map(|e| e.clone()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedDiscovery {
        snapshots: Mutex<Vec<Vec<MemberDescriptor>>>,
    }

    #[async_trait]
    impl SeedDiscovery for ScriptedDiscovery {
        async fn discover(&self) -> Result<Vec<MemberDescriptor>, GossipError> {
            let mut snapshots = self.snapshots.lock().unwrap();
            if snapshots.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(snapshots.remove(0))
            }
        }
    }

    fn member(id: &str) -> MemberDescriptor {
        MemberDescriptor {
            member_id: MemberId(id.to_string()),
            address: format!("{id}:9000"),
        }
    }

    #[tokio::test]
    async fn poll_emits_joined_for_new_members() {
        let discovery = Arc::new(ScriptedDiscovery {
            snapshots: Mutex::new(vec![vec![member("a"), member("b")]]),
        });
        let event_stream = Arc::new(EventStream::new());
        let (tx, rx) = std::sync::mpsc::channel();
        event_stream.subscribe(crate::event_stream::Topic::MemberJoined, move |e| {
            let _ = tx.send(e);
        });

        let provider = SeedMembershipProvider::new(discovery, event_stream);
        provider.poll().await.unwrap();

        let mut joined = 0;
        while rx.recv_timeout(std::time::Duration::from_millis(100)).is_ok() {
            joined += 1;
        }
        assert_eq!(joined, 2);
        assert_eq!(provider.known_members().len(), 2);
    }

    #[tokio::test]
    async fn poll_emits_left_for_departed_members() {
        let discovery = Arc::new(ScriptedDiscovery {
            snapshots: Mutex::new(vec![vec![member("a"), member("b")], vec![member("a")]]),
        });
        let event_stream = Arc::new(EventStream::new());
        let (tx, rx) = std::sync::mpsc::channel();
        event_stream.subscribe(crate::event_stream::Topic::MemberLeft, move |e| {
            let _ = tx.send(e);
        });

        let provider = SeedMembershipProvider::new(discovery, event_stream);
        provider.poll().await.unwrap();
        provider.poll().await.unwrap();

        let event = rx.recv_timeout(std::time::Duration::from_millis(100)).unwrap();
        let left = matches!(&event, StreamEvent::MemberLeft(id) if *id == MemberId("b".to_string()));
        assert!(left, "expected MemberLeft(b), got {event:?}");
    }
}
