//! Membership state (§4.H): a per-member key/value map with monotonic
//! per-key sequence numbers, the unit gossip deltas are built from.

// Layer 1: Standard library
use std::collections::HashMap;

// Layer 2: Third-party
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;

// Layer 3: Internal
use crate::util::MemberId;

/// Whether a member is currently considered part of the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Joined,
    Left,
}

/// One key/value entry inside a member's state map, tagged with the
/// sequence number it was written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberStateEntry {
    pub member_id: MemberId,
    pub key: String,
    pub value: String,
    pub sequence: u64,
}

/// The subset of a member's state a gossip round sends to one peer:
/// every entry that peer has not yet acknowledged.
#[derive(Debug, Clone, Default)]
pub struct MemberStateDelta {
    pub entries: Vec<MemberStateEntry>,
}

impl MemberStateDelta {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct MemberRecord {
    status: MemberStatus,
    last_seen: DateTime<Utc>,
    entries: HashMap<String, (String, u64)>,
}

/// Aggregate membership and per-key state for every known member,
/// local and remote. Reads are lock-free; writes to one member's state
/// take that member's own lock only.
#[derive(Default)]
pub struct MembershipTable {
    members: DashMap<MemberId, Mutex<MemberRecord>>,
}

impl MembershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `member_id` as joined, creating its record if absent.
    pub fn join(&self, member_id: MemberId) {
        self.members
            .entry(member_id)
            .or_insert_with(|| {
                Mutex::new(MemberRecord {
                    status: MemberStatus::Joined,
                    last_seen: Utc::now(),
                    entries: HashMap::new(),
                })
            })
            .lock()
            .status = MemberStatus::Joined;
    }

    /// Mark `member_id` as left. Its state entries are retained so
    /// gossip can still converge a final `Left` status to stragglers.
    pub fn leave(&self, member_id: &MemberId) {
        if let Some(record) = self.members.get(member_id) {
            record.lock().status = MemberStatus::Left;
        }
    }

    pub fn status(&self, member_id: &MemberId) -> Option<MemberStatus> {
        self.members.get(member_id).map(|r| r.lock().status)
    }

    pub fn known_members(&self) -> Vec<MemberId> {
        self.members.iter().map(|e| e.key().clone()).collect()
    }

    /// Write `key = value` for `member_id` under local authority,
    /// assigning the next sequence number for that (member, key) pair.
    pub fn set_local(&self, member_id: &MemberId, key: impl Into<String>, value: impl Into<String>) -> u64 {
        let key = key.into();
        let value = value.into();
        let record = self
            .members
            .entry(member_id.clone())
            .or_insert_with(|| {
                Mutex::new(MemberRecord {
                    status: MemberStatus::Joined,
                    last_seen: Utc::now(),
                    entries: HashMap::new(),
                })
            });
        let mut record = record.lock();
        let sequence = record.entries.get(&key).map(|(_, seq)| seq + 1).unwrap_or(1);
        record.entries.insert(key, (value, sequence));
        sequence
    }

    /// Apply remote entries, keeping only those with a newer sequence
    /// number than what's locally known (last-writer-wins by sequence).
    /// Each (member, key) has a single writer — the owning member — so a
    /// genuine tie only arises if that member's sequence counter resets
    /// (e.g. after a restart); such entries are deduplicated by member
    /// id at the transport layer before reaching here.
    /// Returns the entries that were actually applied.
    pub fn apply_remote(&self, entries: &[MemberStateEntry]) -> Vec<MemberStateEntry> {
        let mut applied = Vec::new();
        for entry in entries {
            let record = self.members.entry(entry.member_id.clone()).or_insert_with(|| {
                Mutex::new(MemberRecord {
                    status: MemberStatus::Joined,
                    last_seen: Utc::now(),
                    entries: HashMap::new(),
                })
            });
            let mut record = record.lock();
            record.last_seen = Utc::now();
            let should_apply = match record.entries.get(&entry.key) {
                None => true,
                Some((_, existing_seq)) => entry.sequence > *existing_seq,
            };
            if should_apply {
                record
                    .entries
                    .insert(entry.key.clone(), (entry.value.clone(), entry.sequence));
                applied.push(entry.clone());
            }
        }
        applied
    }

    /// Every entry with a sequence number greater than `sent_offsets`
    /// records for its (member, key) pair — the delta to send one peer.
    pub fn delta_since(&self, sent_offsets: &DashMap<(MemberId, String), u64>) -> MemberStateDelta {
        let mut entries = Vec::new();
        for member in self.members.iter() {
            let member_id = member.key().clone();
            let record = member.value().lock();
            for (key, (value, sequence)) in record.entries.iter() {
                let offset_key = (member_id.clone(), key.clone());
                let last_sent = sent_offsets.get(&offset_key).map(|v| *v).unwrap_or(0);
                if *sequence > last_sent {
                    entries.push(MemberStateEntry {
                        member_id: member_id.clone(),
                        key: key.clone(),
                        value: value.clone(),
                        sequence: *sequence,
                    });
                }
            }
        }
        MemberStateDelta { entries }
    }
}
