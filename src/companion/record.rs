//! CompanionRecord - the detached, serializable state of one companion
//!
//! The record outlives any particular live actor. It is keyed by a stable
//! `CompanionId`, and equality/hashing use only that id so a newer copy of a
//! record can replace an older one in any set or map.

use crate::companion::actor::LiveActor;
use crate::companion::kind::CompanionKind;
use crate::core::config::SyncConfig;
use crate::core::error::Result;
use crate::core::types::{CompanionId, EpochSeconds, LevelKey, LiveInstanceId, OwnerId};
use crate::item::{ItemCatalog, ItemStack, SlotList};
use crate::tag::Compound;
use glam::IVec3;
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Fixed slot counts for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSizes {
    pub inventory: usize,
    pub hand: usize,
    pub armor: usize,
}

impl Default for SlotSizes {
    fn default() -> Self {
        Self {
            inventory: 16,
            hand: 2,
            armor: 4,
        }
    }
}

impl From<&SyncConfig> for SlotSizes {
    fn from(config: &SyncConfig) -> Self {
        Self {
            inventory: config.inventory_size,
            hand: config.hand_size,
            armor: config.armor_size,
        }
    }
}

/// Condensed view of a record for list displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionSummary {
    pub id: CompanionId,
    pub name: String,
    pub kind: CompanionKind,
    pub owner: Option<OwnerId>,
    pub owner_name: String,
    pub active: bool,
    pub health: f32,
    pub max_health: f32,
    pub respawn_timer: EpochSeconds,
}

#[derive(Debug, Clone)]
pub struct CompanionRecord {
    id: CompanionId,
    live_instance_id: LiveInstanceId,
    name: String,
    kind: CompanionKind,
    owner: Option<OwnerId>,
    owner_name: String,
    active: bool,
    removed: bool,
    position: IVec3,
    level: LevelKey,
    dimension: String,
    entity_type: String,
    entity_data: Option<Compound>,
    sitting: bool,
    ordered_to_position: bool,
    health: f32,
    max_health: f32,
    respawn_timer: EpochSeconds,
    target: String,
    armor: SlotList,
    hand: SlotList,
    inventory: SlotList,
    dirty: bool,
}

impl CompanionRecord {
    /// Empty record with default slot sizes
    pub fn new(id: CompanionId) -> Self {
        Self::with_sizes(id, SlotSizes::default())
    }

    pub fn with_sizes(id: CompanionId, sizes: SlotSizes) -> Self {
        Self {
            id,
            live_instance_id: LiveInstanceId::default(),
            name: String::new(),
            kind: CompanionKind::Unknown,
            owner: None,
            owner_name: String::new(),
            active: true,
            removed: false,
            position: IVec3::ZERO,
            level: LevelKey::default(),
            dimension: String::new(),
            entity_type: String::new(),
            entity_data: None,
            sitting: false,
            ordered_to_position: false,
            health: 0.0,
            max_health: 0.0,
            respawn_timer: 0,
            target: String::new(),
            armor: SlotList::new("armor", sizes.armor),
            hand: SlotList::new("hand", sizes.hand),
            inventory: SlotList::new("inventory", sizes.inventory),
            dirty: false,
        }
    }

    /// Build a record from a live actor's current state
    pub fn from_live_actor<A: LiveActor>(actor: &A, sizes: SlotSizes) -> Self {
        let mut record = Self::with_sizes(actor.companion_id(), sizes);
        record.sync_from_live_actor(actor);
        record
    }

    // === IDENTITY ===

    pub fn id(&self) -> CompanionId {
        self.id
    }

    /// Returns true if both records describe the same logical companion
    pub fn is(&self, other: &CompanionRecord) -> bool {
        self.id == other.id
    }

    pub fn live_instance_id(&self) -> LiveInstanceId {
        self.live_instance_id
    }

    pub fn set_live_instance_id(&mut self, live: LiveInstanceId) {
        self.live_instance_id = live;
        self.mark_dirty();
    }

    // === DIRTY TRACKING ===

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    // === ATTRIBUTES ===

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.mark_dirty();
    }

    pub fn kind(&self) -> CompanionKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: CompanionKind) {
        self.kind = kind;
        self.mark_dirty();
    }

    pub fn has_owner(&self) -> bool {
        self.owner.is_some()
    }

    pub fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// Assign an owner. There is no way to clear one through this call.
    pub fn set_owner(&mut self, owner: OwnerId, owner_name: impl Into<String>) {
        self.owner = Some(owner);
        self.owner_name = owner_name.into();
        self.mark_dirty();
    }

    pub fn set_owner_name(&mut self, owner_name: impl Into<String>) {
        self.owner_name = owner_name.into();
        self.mark_dirty();
    }

    /// Explicitly release ownership
    pub fn release_owner(&mut self) {
        self.owner = None;
        self.owner_name.clear();
        self.mark_dirty();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.mark_dirty();
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn set_removed(&mut self, removed: bool) {
        self.removed = removed;
        self.mark_dirty();
    }

    pub fn position(&self) -> IVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: IVec3) {
        self.position = position;
        self.mark_dirty();
    }

    pub fn level(&self) -> &LevelKey {
        &self.level
    }

    pub fn set_level(&mut self, level: LevelKey) {
        self.level = level;
        self.mark_dirty();
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn set_dimension(&mut self, dimension: impl Into<String>) {
        self.dimension = dimension.into();
        self.mark_dirty();
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn set_entity_type(&mut self, entity_type: impl Into<String>) {
        self.entity_type = entity_type.into();
        self.mark_dirty();
    }

    /// Full actor restoration blob, if one was captured
    pub fn entity_data(&self) -> Option<&Compound> {
        self.entity_data.as_ref()
    }

    pub fn set_entity_data(&mut self, data: Option<Compound>) {
        self.entity_data = data;
        self.mark_dirty();
    }

    pub fn is_ordered_to_sit(&self) -> bool {
        self.sitting
    }

    pub fn set_ordered_to_sit(&mut self, sitting: bool) {
        self.sitting = sitting;
        self.mark_dirty();
    }

    pub fn is_ordered_to_position(&self) -> bool {
        self.ordered_to_position
    }

    pub fn set_ordered_to_position(&mut self, ordered: bool) {
        self.ordered_to_position = ordered;
        self.mark_dirty();
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    /// Non-finite values are ignored; the store cannot represent them.
    pub fn set_health(&mut self, health: f32) {
        if !health.is_finite() {
            tracing::warn!("Ignoring non-finite health {} for {}", health, self.id);
            return;
        }
        self.health = health;
        self.mark_dirty();
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn set_max_health(&mut self, max_health: f32) {
        if !max_health.is_finite() {
            tracing::warn!("Ignoring non-finite max health {} for {}", max_health, self.id);
            return;
        }
        self.max_health = max_health;
        self.mark_dirty();
    }

    pub fn respawn_timer(&self) -> EpochSeconds {
        self.respawn_timer
    }

    pub fn has_respawn_timer(&self) -> bool {
        self.respawn_timer > 0
    }

    pub fn set_respawn_timer(&mut self, timer: EpochSeconds) {
        self.respawn_timer = timer;
        self.mark_dirty();
    }

    pub fn clear_respawn_timer(&mut self) {
        self.set_respawn_timer(0);
    }

    /// Encoded type id of the current target, empty for none
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn has_target(&self) -> bool {
        !self.target.trim().is_empty()
    }

    pub fn set_target(&mut self, target: impl Into<String>) {
        self.target = target.into();
        self.mark_dirty();
    }

    // === SLOTS ===

    pub fn armor_items(&self) -> &SlotList {
        &self.armor
    }

    pub fn get_armor_item(&self, index: usize) -> Option<&ItemStack> {
        self.armor.get(index)
    }

    pub fn set_armor_item(&mut self, index: usize, stack: ItemStack) -> Result<ItemStack> {
        let previous = self.armor.set(index, stack)?;
        self.mark_dirty();
        Ok(previous)
    }

    pub fn hand_items(&self) -> &SlotList {
        &self.hand
    }

    pub fn get_hand_item(&self, index: usize) -> Option<&ItemStack> {
        self.hand.get(index)
    }

    pub fn set_hand_item(&mut self, index: usize, stack: ItemStack) -> Result<ItemStack> {
        let previous = self.hand.set(index, stack)?;
        self.mark_dirty();
        Ok(previous)
    }

    pub fn inventory_items(&self) -> &SlotList {
        &self.inventory
    }

    pub fn get_inventory_item(&self, index: usize) -> Option<&ItemStack> {
        self.inventory.get(index)
    }

    pub fn set_inventory_item(&mut self, index: usize, stack: ItemStack) -> Result<ItemStack> {
        let previous = self.inventory.set(index, stack)?;
        self.mark_dirty();
        Ok(previous)
    }

    /// Store a stack in the inventory.
    ///
    /// Returns false when the inventory has no room (capacity exceeded); the
    /// caller decides what happens to the stack.
    pub fn store_inventory_item(&mut self, stack: ItemStack, catalog: &ItemCatalog) -> bool {
        let stored = self.inventory.store(stack, catalog);
        if stored {
            self.mark_dirty();
        }
        stored
    }

    pub(crate) fn slots_mut(&mut self) -> (&mut SlotList, &mut SlotList, &mut SlotList) {
        (&mut self.armor, &mut self.hand, &mut self.inventory)
    }

    // === SYNC ===

    /// Overwrite all mutable fields from the live actor and clear the dirty flag.
    ///
    /// The inventory belongs to the record and is left alone. An owner is
    /// never cleared here, only replaced.
    pub fn sync_from_live_actor<A: LiveActor>(&mut self, actor: &A) {
        if actor.companion_id() != self.id {
            tracing::warn!(
                "Refusing to sync companion {} from actor of {}",
                self.id,
                actor.companion_id()
            );
            return;
        }

        self.live_instance_id = actor.live_instance_id();
        self.name = actor.custom_name().to_string();
        self.kind = actor.kind();
        if let Some(owner) = actor.owner() {
            self.owner = Some(owner);
            self.owner_name = actor.owner_name().to_string();
        }
        self.active = actor.is_active();
        self.position = actor.position();
        self.level = actor.level().clone();
        self.dimension = actor.dimension().to_string();
        self.entity_type = actor.entity_type().to_string();
        self.entity_data = Some(actor.serialize_state());
        self.sitting = actor.is_ordered_to_sit();
        self.ordered_to_position = actor.is_ordered_to_position();
        self.health = actor.health();
        self.max_health = actor.max_health();
        self.respawn_timer = actor.respawn_timer();
        self.target = actor.target_id().to_string();
        self.armor.copy_from(actor.armor_slots());
        self.hand.copy_from(actor.hand_slots());

        self.clear_dirty();
    }

    /// Compare every persisted field. Unlike `==`, which compares identity
    /// only, this tells whether two copies hold the same content.
    pub fn content_eq(&self, other: &CompanionRecord) -> bool {
        self.id == other.id
            && self.live_instance_id == other.live_instance_id
            && self.name == other.name
            && self.kind == other.kind
            && self.owner == other.owner
            && self.owner_name == other.owner_name
            && self.active == other.active
            && self.removed == other.removed
            && self.position == other.position
            && self.level == other.level
            && self.dimension == other.dimension
            && self.entity_type == other.entity_type
            && self.entity_data == other.entity_data
            && self.sitting == other.sitting
            && self.ordered_to_position == other.ordered_to_position
            && self.health == other.health
            && self.max_health == other.max_health
            && self.respawn_timer == other.respawn_timer
            && self.target == other.target
            && self.armor == other.armor
            && self.hand == other.hand
            && self.inventory == other.inventory
    }

    pub fn summary(&self) -> CompanionSummary {
        CompanionSummary {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            owner: self.owner,
            owner_name: self.owner_name.clone(),
            active: self.active,
            health: self.health,
            max_health: self.max_health,
            respawn_timer: self.respawn_timer,
        }
    }
}

impl PartialEq for CompanionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CompanionRecord {}

impl Hash for CompanionRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for CompanionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let owner = self
            .owner
            .map(|o| o.to_string())
            .unwrap_or_else(|| "~none~".to_string());
        write!(
            f,
            "Companion['{}', type={}, owner={}({}), entity={}, health={}/{}, pos=({}, {}, {}), \
             dimension={}, respawnTimer={}, live={}, id={}]",
            self.name,
            self.kind,
            owner,
            self.owner_name,
            self.entity_type,
            self.health,
            self.max_health,
            self.position.x,
            self.position.y,
            self.position.z,
            self.dimension,
            self.respawn_timer,
            self.live_instance_id.0,
            self.id
        )
    }
}
