//! Gossip Layer (§4.H): periodic random-subset peer exchange driving
//! eventual membership convergence.

// Layer 1: Standard library
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party
use async_trait::async_trait;
use dashmap::DashMap;
use rand::rngs::SmallRng;
use rand::{seq::SliceRandom, SeedableRng};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

// Layer 3: Internal
use super::error::GossipError;
use super::member::{MemberStateDelta, MembershipTable};
use crate::util::MemberId;

/// Default interval between gossip rounds.
pub const DEFAULT_GOSSIP_INTERVAL: Duration = Duration::from_millis(500);

/// Default number of peers contacted per round.
pub const DEFAULT_GOSSIP_FANOUT: usize = 3;

/// Delivers a [`MemberStateDelta`] to one peer and reports whether it
/// was acknowledged. Concrete transports (the endpoint manager, an
/// in-process stub for tests) are genuinely heterogeneous, the same
/// tradeoff `ProcessSink` and `ChannelProvider` make elsewhere.
#[async_trait]
pub trait GossipTransport: Send + Sync {
    async fn send_delta(&self, peer: &MemberId, delta: MemberStateDelta) -> Result<(), GossipError>;
}

/// Drives periodic gossip rounds for one local member against a shared
/// [`MembershipTable`]: each round picks a random peer subset, builds a
/// per-peer delta of unacknowledged entries, sends it, and advances that
/// peer's commit offsets once acknowledged.
pub struct GossipLayer {
    local_member_id: MemberId,
    table: Arc<MembershipTable>,
    transport: Arc<dyn GossipTransport>,
    peers: DashMap<MemberId, ()>,
    sent_offsets: DashMap<MemberId, DashMap<(MemberId, String), u64>>,
    interval: Duration,
    fanout: usize,
    running: Arc<AtomicBool>,
    task: AsyncMutex<Option<tokio::task::JoinHandle<()>>>,
}

impl GossipLayer {
    pub fn new(
        local_member_id: MemberId,
        table: Arc<MembershipTable>,
        transport: Arc<dyn GossipTransport>,
    ) -> Arc<Self> {
        Self::with_params(
            local_member_id,
            table,
            transport,
            DEFAULT_GOSSIP_INTERVAL,
            DEFAULT_GOSSIP_FANOUT,
        )
    }

    pub fn with_params(
        local_member_id: MemberId,
        table: Arc<MembershipTable>,
        transport: Arc<dyn GossipTransport>,
        interval: Duration,
        fanout: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            local_member_id,
            table,
            transport,
            peers: DashMap::new(),
            sent_offsets: DashMap::new(),
            interval,
            fanout,
            running: Arc::new(AtomicBool::new(false)),
            task: AsyncMutex::new(None),
        })
    }

    /// Register a peer as a gossip target. Idempotent.
    pub fn add_peer(&self, peer: MemberId) {
        self.peers.entry(peer).or_insert(());
    }

    pub fn remove_peer(&self, peer: &MemberId) {
        self.peers.remove(peer);
        self.sent_offsets.remove(peer);
    }

    /// Start the periodic gossip task. A no-op if already running.
    pub async fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.interval);
            loop {
                ticker.tick().await;
                if !this.running.load(Ordering::Acquire) {
                    break;
                }
                this.run_round().await;
            }
        });
        *self.task.lock().await = Some(task);
    }

    /// Stop the periodic gossip task.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::Release);
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
        }
    }

    /// Run one gossip round synchronously — exposed for tests and for
    /// callers that want deterministic control over round timing.
    pub async fn run_round(&self) {
        let targets = self.select_targets();
        for peer in targets {
            let offsets = self
                .sent_offsets
                .entry(peer.clone())
                .or_insert_with(DashMap::new);
            let delta = self.table.delta_since(&offsets);
            if delta.is_empty() {
                continue;
            }
            match self.transport.send_delta(&peer, delta.clone()).await {
                Ok(()) => {
                    for entry in &delta.entries {
                        offsets.insert((entry.member_id.clone(), entry.key.clone()), entry.sequence);
                    }
                    debug!(local = %self.local_member_id, peer = %peer, entries = delta.entries.len(), "gossip delta acknowledged");
                }
                Err(err) => {
                    warn!(local = %self.local_member_id, peer = %peer, %err, "gossip delta delivery failed");
                }
            }
        }
    }

    /// Apply an inbound delta received from a peer, merging it into the
    /// shared table under last-writer-wins-by-sequence semantics.
    pub fn receive_delta(&self, delta: MemberStateDelta) {
        self.table.apply_remote(&delta.entries);
    }

    fn select_targets(&self) -> Vec<MemberId> {
        let mut candidates: Vec<MemberId> = self.peers.iter().map(|e| e.key().clone()).collect();
        let mut rng = SmallRng::from_entropy();
        candidates.shuffle(&mut rng);
        candidates.truncate(self.fanout);
        candidates
    }
}
