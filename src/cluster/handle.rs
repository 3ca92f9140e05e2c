//! Bundles the gossip layer and seed membership provider behind one
//! handle an [`crate::system::ActorSystem`] can own when clustering is
//! enabled (§4.J).

// Layer 1: Standard library
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party
use tracing::info;

// Layer 3: Internal
use super::gossip::GossipLayer;
use super::member::MembershipTable;
use super::seed::SeedMembershipProvider;
use crate::util::MemberId;

/// The running cluster subsystem for one local member: a membership
/// table, its gossip driver, and seed discovery polling.
pub struct ClusterHandle {
    local_member_id: MemberId,
    table: Arc<MembershipTable>,
    gossip: Arc<GossipLayer>,
    seed: Arc<SeedMembershipProvider>,
    seed_poll_interval: Duration,
    seed_task: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ClusterHandle {
    pub fn new(
        local_member_id: MemberId,
        table: Arc<MembershipTable>,
        gossip: Arc<GossipLayer>,
        seed: Arc<SeedMembershipProvider>,
        seed_poll_interval: Duration,
    ) -> Arc<Self> {
        table.join(local_member_id.clone());
        Arc::new(Self {
            local_member_id,
            table,
            gossip,
            seed,
            seed_poll_interval,
            seed_task: tokio::sync::Mutex::new(None),
        })
    }

    pub fn local_member_id(&self) -> &MemberId {
        &self.local_member_id
    }

    pub fn membership_table(&self) -> &Arc<MembershipTable> {
        &self.table
    }

    pub fn gossip(&self) -> &Arc<GossipLayer> {
        &self.gossip
    }

    /// Start periodic gossip rounds and seed-discovery polling.
    pub async fn start(self: &Arc<Self>) {
        self.gossip.start().await;

        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.seed_poll_interval);
            loop {
                ticker.tick().await;
                if let Err(err) = this.seed.poll().await {
                    tracing::warn!(%err, "seed discovery poll failed");
                }
                for member_id in this.seed.known_members() {
                    this.gossip.add_peer(member_id);
                }
            }
        });
        *self.seed_task.lock().await = Some(task);
        info!(local = %self.local_member_id, "cluster subsystem started");
    }

    /// Stop gossip and seed polling.
    pub async fn stop(&self) {
        self.gossip.stop().await;
        if let Some(task) = self.seed_task.lock().await.take() {
            task.abort();
        }
        self.table.leave(&self.local_member_id);
    }
}
