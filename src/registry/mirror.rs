//! MirrorRegistry - read-only client cache of companion records
//!
//! Populated only from inbound sync messages. Entries are replaced wholesale
//! on every upsert; nothing here is ever sent back.

use crate::companion::codec;
use crate::companion::record::{CompanionRecord, SlotSizes};
use crate::core::types::{CompanionId, LiveInstanceId, OwnerId};
use crate::sync::SyncMessage;
use crate::tag::Compound;
use ahash::AHashMap;

#[derive(Debug, Default)]
pub struct MirrorRegistry {
    records: AHashMap<CompanionId, CompanionRecord>,
    by_live_instance: AHashMap<LiveInstanceId, CompanionId>,
    sizes: SlotSizes,
}

impl MirrorRegistry {
    pub fn new(sizes: SlotSizes) -> Self {
        Self {
            records: AHashMap::new(),
            by_live_instance: AHashMap::new(),
            sizes,
        }
    }

    /// Apply one inbound message
    pub fn apply(&mut self, message: &SyncMessage) {
        match message {
            SyncMessage::Upsert { tree } => self.upsert(tree),
            SyncMessage::Remove { id } => {
                self.remove(*id);
            }
            SyncMessage::Snapshot { trees } => {
                self.records.clear();
                self.by_live_instance.clear();
                for tree in trees {
                    self.upsert(tree);
                }
                tracing::debug!("Mirror replaced with snapshot of {} companions", self.records.len());
            }
        }
    }

    pub fn get_companion(&self, id: CompanionId) -> Option<&CompanionRecord> {
        self.records.get(&id)
    }

    /// Look up a record by the transient handle of its live actor
    pub fn get_by_live_instance(&self, live: LiveInstanceId) -> Option<&CompanionRecord> {
        self.by_live_instance
            .get(&live)
            .and_then(|id| self.records.get(id))
    }

    pub fn companions(&self) -> Vec<&CompanionRecord> {
        let mut records: Vec<&CompanionRecord> = self.records.values().collect();
        records.sort_by_key(|r| r.id());
        records
    }

    pub fn companions_for_owner(&self, owner: OwnerId) -> Vec<&CompanionRecord> {
        let mut records: Vec<&CompanionRecord> = self
            .records
            .values()
            .filter(|r| r.owner() == Some(owner))
            .collect();
        records.sort_by_key(|r| r.id());
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn upsert(&mut self, tree: &Compound) {
        let record = codec::decode_compound(tree, self.sizes);
        if record.id().is_nil() {
            tracing::warn!("Ignoring inbound companion without id");
            return;
        }

        let id = record.id();
        let live = record.live_instance_id();
        if let Some(previous) = self.records.insert(id, record) {
            self.unindex(&previous);
        }
        if live != LiveInstanceId::default() {
            self.by_live_instance.insert(live, id);
        }
    }

    fn remove(&mut self, id: CompanionId) {
        if let Some(previous) = self.records.remove(&id) {
            self.unindex(&previous);
        }
    }

    fn unindex(&mut self, record: &CompanionRecord) {
        let live = record.live_instance_id();
        if self.by_live_instance.get(&live) == Some(&record.id()) {
            self.by_live_instance.remove(&live);
        }
    }
}
