//! AuthoritativeRegistry - the one canonical copy of every companion record
//!
//! Every create, update and removal goes through here. Each change is queued
//! as a whole-record message for the subscribers allowed to see it, and the
//! full set is written to the backing store only on an explicit save pass.

use crate::companion::actor::LiveActor;
use crate::companion::codec::{self, SaveMode};
use crate::companion::record::{CompanionRecord, SlotSizes};
use crate::core::error::{CompanionError, Result};
use crate::core::types::{CompanionId, EpochSeconds, LiveInstanceId, OwnerId};
use crate::registry::store::CompanionStore;
use crate::sync::{ConnectionId, Envelope, SubscriberScope, SyncMessage};
use crate::tag::Compound;
use ahash::AHashMap;
use std::collections::{BTreeMap, VecDeque};

pub struct AuthoritativeRegistry {
    records: AHashMap<CompanionId, CompanionRecord>,
    attachments: AHashMap<CompanionId, LiveInstanceId>,
    /// Last persisted trees by id. `None` until first needed or after removal.
    snapshot: Option<AHashMap<CompanionId, Compound>>,
    subscribers: BTreeMap<ConnectionId, SubscriberScope>,
    outbound: VecDeque<Envelope>,
    store: Box<dyn CompanionStore>,
    sizes: SlotSizes,
    dirty: bool,
}

impl AuthoritativeRegistry {
    /// Empty registry over `store`. Nothing is loaded until a record is
    /// looked up.
    pub fn new(store: Box<dyn CompanionStore>, sizes: SlotSizes) -> Self {
        Self {
            records: AHashMap::new(),
            attachments: AHashMap::new(),
            snapshot: None,
            subscribers: BTreeMap::new(),
            outbound: VecDeque::new(),
            store,
            sizes,
            dirty: false,
        }
    }

    /// Registry populated with every record in `store`
    pub fn open(store: Box<dyn CompanionStore>, sizes: SlotSizes) -> Result<Self> {
        let mut registry = Self::new(store, sizes);
        let snapshot = registry.load_snapshot()?;

        for tree in snapshot.values() {
            let record = codec::decode_compound(tree, sizes);
            registry.records.insert(record.id(), record);
        }
        registry.snapshot = Some(snapshot);

        tracing::info!("Loaded {} companions", registry.records.len());
        Ok(registry)
    }

    pub fn slot_sizes(&self) -> SlotSizes {
        self.sizes
    }

    pub fn store(&self) -> &dyn CompanionStore {
        self.store.as_ref()
    }

    // === LOOKUP ===

    pub fn get(&self, id: CompanionId) -> Option<&CompanionRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: CompanionId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, ordered by id
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

    /// Ids of inactive records whose respawn deadline has passed
    pub fn respawn_due(&self, now: EpochSeconds) -> Vec<CompanionId> {
        let mut due: Vec<CompanionId> = self
            .records
            .values()
            .filter(|r| !r.is_active() && r.has_respawn_timer() && r.respawn_timer() < now)
            .map(|r| r.id())
            .collect();
        due.sort();
        due
    }

    // === CREATE / UPDATE ===

    /// Return the record for the actor's id, creating it if needed.
    ///
    /// Lookup order: in memory, then the last persisted copy, then a fresh
    /// record built from the actor.
    pub fn get_or_create<A: LiveActor>(&mut self, actor: &A) -> &CompanionRecord {
        let id = actor.companion_id();
        if self.insert_missing(actor) {
            let owner = self.records.get(&id).and_then(CompanionRecord::owner);
            self.publish(id, owner);
        }
        &self.records[&id]
    }

    /// Sync the record from the actor, creating it if absent.
    ///
    /// Returns `None` without touching anything when a different live
    /// instance is attached to the same id.
    pub fn update_or_register<A: LiveActor>(&mut self, actor: &A) -> Option<&CompanionRecord> {
        let id = actor.companion_id();

        if let Some(attached) = self.attachments.get(&id) {
            if *attached != actor.live_instance_id() {
                tracing::debug!(
                    "Ignoring update for {} from stale live instance {:?} (attached: {:?})",
                    id,
                    actor.live_instance_id(),
                    attached
                );
                return None;
            }
        }

        self.insert_missing(actor);
        let mut previous_owner = None;
        if let Some(record) = self.records.get_mut(&id) {
            previous_owner = record.owner();
            record.sync_from_live_actor(actor);
        }

        self.dirty = true;
        self.publish(id, previous_owner);
        self.records.get(&id)
    }

    /// Apply `f` to a record. Only a change to the record's content is
    /// published and marks the registry dirty.
    pub fn update_companion<F, R>(&mut self, id: CompanionId, f: F) -> Result<R>
    where
        F: FnOnce(&mut CompanionRecord) -> R,
    {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(CompanionError::NotFound(id))?;
        let before = record.clone();
        let result = f(record);

        if !record.content_eq(&before) {
            self.dirty = true;
            self.publish(id, before.owner());
        }
        Ok(result)
    }

    /// Delete a record from memory and notify mirrors. Storage keeps the
    /// last saved copy until the next save pass.
    pub fn remove(&mut self, id: CompanionId) -> Option<CompanionRecord> {
        self.attachments.remove(&id);
        self.snapshot = None;

        let record = self.records.remove(&id)?;
        self.dirty = true;

        let message = SyncMessage::Remove { id };
        self.queue_for(record.owner(), &message);
        tracing::debug!("Removed companion {}", record);
        Some(record)
    }

    // === ATTACHMENT ===

    /// Bind a live instance to its record id
    pub fn attach<A: LiveActor>(&mut self, actor: &A) -> Result<()> {
        let id = actor.companion_id();
        let live = actor.live_instance_id();

        match self.attachments.get(&id) {
            Some(current) if *current != live => Err(CompanionError::AlreadyAttached {
                id,
                live: *current,
            }),
            _ => {
                self.attachments.insert(id, live);
                tracing::debug!("Attached live instance {:?} to {}", live, id);
                Ok(())
            }
        }
    }

    /// Unbind a live instance. A stale live id is a no-op and returns false.
    pub fn detach(&mut self, id: CompanionId, live: LiveInstanceId) -> bool {
        match self.attachments.get(&id) {
            Some(current) if *current == live => {
                self.attachments.remove(&id);
                tracing::debug!("Detached live instance {:?} from {}", live, id);
                true
            }
            _ => {
                tracing::debug!("Detach of {} by stale live instance {:?} ignored", id, live);
                false
            }
        }
    }

    pub fn attached(&self, id: CompanionId) -> Option<LiveInstanceId> {
        self.attachments.get(&id).copied()
    }

    // === DIRTY / SAVE ===

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.records.values().any(CompanionRecord::is_dirty)
    }

    /// Write every record to the store. Dirty flags are cleared only when
    /// the store accepted the write.
    pub fn save(&mut self, mode: SaveMode) -> Result<usize> {
        let mut ids: Vec<CompanionId> = self.records.keys().copied().collect();
        ids.sort();

        let trees: Vec<Compound> = ids
            .iter()
            .map(|id| codec::encode(&self.records[id], mode))
            .collect();
        self.store.save_all(&trees)?;

        for record in self.records.values_mut() {
            record.clear_dirty();
        }
        self.dirty = false;
        self.snapshot = Some(ids.into_iter().zip(trees).collect());

        let count = self.records.len();
        tracing::info!("Saved {} companions", count);
        Ok(count)
    }

    // === SUBSCRIPTIONS ===

    /// Register a mirror connection and queue a snapshot of every record it
    /// may observe
    pub fn subscribe(&mut self, connection: ConnectionId, scope: SubscriberScope) {
        self.subscribers.insert(connection, scope);

        let trees = self
            .companions()
            .into_iter()
            .filter(|r| scope.covers(r.owner()))
            .map(|r| codec::encode(r, SaveMode::MetadataOnly))
            .collect();

        self.outbound.push_back(Envelope {
            connection,
            message: SyncMessage::Snapshot { trees },
        });
        tracing::debug!("Connection {:?} subscribed with scope {:?}", connection, scope);
    }

    /// Drop a connection and anything still queued for it
    pub fn unsubscribe(&mut self, connection: ConnectionId) -> bool {
        self.outbound.retain(|e| e.connection != connection);
        self.subscribers.remove(&connection).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Take every queued envelope in send order
    pub fn drain_outbound(&mut self) -> Vec<Envelope> {
        self.outbound.drain(..).collect()
    }

    // === INTERNALS ===

    /// Queue the record for every subscriber that may see it. Subscribers
    /// that only covered `previous_owner` get a removal instead.
    fn publish(&mut self, id: CompanionId, previous_owner: Option<OwnerId>) {
        let Some(record) = self.records.get(&id) else {
            return;
        };
        let owner = record.owner();
        let upsert = SyncMessage::Upsert {
            tree: codec::encode(record, SaveMode::MetadataOnly),
        };
        let remove = SyncMessage::Remove { id };

        for (connection, scope) in &self.subscribers {
            let message = if scope.covers(owner) {
                &upsert
            } else if scope.covers(previous_owner) {
                &remove
            } else {
                continue;
            };
            self.outbound.push_back(Envelope {
                connection: *connection,
                message: message.clone(),
            });
        }
        if owner != previous_owner {
            tracing::debug!("Companion {} changed owner", id);
        }
    }

    fn queue_for(&mut self, owner: Option<OwnerId>, message: &SyncMessage) {
        for (connection, scope) in &self.subscribers {
            if scope.covers(owner) {
                self.outbound.push_back(Envelope {
                    connection: *connection,
                    message: message.clone(),
                });
            }
        }
    }

    /// Insert a record for the actor's id if none is in memory. Returns true
    /// when something was inserted.
    fn insert_missing<A: LiveActor>(&mut self, actor: &A) -> bool {
        let id = actor.companion_id();
        if self.records.contains_key(&id) {
            return false;
        }

        match self.load_persisted(id) {
            Some(record) => {
                tracing::debug!("Reloaded companion {} from storage", id);
                self.records.insert(id, record);
            }
            None => {
                let record = CompanionRecord::from_live_actor(actor, self.sizes);
                tracing::debug!("Registered new companion {}", record);
                self.records.insert(id, record);
                self.dirty = true;
            }
        }
        true
    }

    fn load_snapshot(&self) -> Result<AHashMap<CompanionId, Compound>> {
        let mut snapshot = AHashMap::new();
        for tree in self.store.load_all()? {
            let record = codec::decode_compound(&tree, self.sizes);
            if record.id().is_nil() {
                tracing::warn!("Skipping persisted companion without id");
                continue;
            }
            snapshot.insert(record.id(), tree);
        }
        Ok(snapshot)
    }

    fn load_persisted(&mut self, id: CompanionId) -> Option<CompanionRecord> {
        if self.snapshot.is_none() {
            match self.load_snapshot() {
                Ok(snapshot) => self.snapshot = Some(snapshot),
                Err(err) => {
                    tracing::warn!("Could not read companion store: {}", err);
                    return None;
                }
            }
        }

        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.get(&id))
            .map(|tree| codec::decode_compound(tree, self.sizes))
    }
}

impl std::fmt::Debug for AuthoritativeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthoritativeRegistry")
            .field("records", &self.records.len())
            .field("attachments", &self.attachments.len())
            .field("subscribers", &self.subscribers.len())
            .field("outbound", &self.outbound.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}
