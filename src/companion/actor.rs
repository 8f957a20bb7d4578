//! Live simulation actors
//!
//! `LiveActor` is the read contract a record syncs from. `CompanionActor` is
//! the in-process simulation object: it owns transient state (effects, leash,
//! alive flag) that never reaches the record, tracks its own dirty flag and
//! flushes into the authoritative registry on a fixed cadence.

use crate::companion::kind::{species, CompanionKind, SpeciesProfile};
use crate::companion::record::CompanionRecord;
use crate::core::config::SyncConfig;
use crate::core::types::{CompanionId, EpochSeconds, LevelKey, LiveInstanceId, OwnerId};
use crate::item::ItemStack;
use crate::registry::AuthoritativeRegistry;
use crate::sync::SyncTicker;
use crate::tag::{Compound, Tag};
use glam::IVec3;

/// Read access to a live actor's current state
pub trait LiveActor {
    fn companion_id(&self) -> CompanionId;
    fn live_instance_id(&self) -> LiveInstanceId;
    fn custom_name(&self) -> &str;
    fn kind(&self) -> CompanionKind;
    fn owner(&self) -> Option<OwnerId>;
    fn owner_name(&self) -> &str;
    fn is_active(&self) -> bool;
    fn position(&self) -> IVec3;
    fn level(&self) -> &LevelKey;
    fn dimension(&self) -> &str;
    fn entity_type(&self) -> &str;
    fn health(&self) -> f32;
    fn max_health(&self) -> f32;
    fn respawn_timer(&self) -> EpochSeconds;
    fn is_ordered_to_sit(&self) -> bool;
    fn is_ordered_to_position(&self) -> bool;
    /// Encoded type id of the current target, empty for none
    fn target_id(&self) -> &str;
    fn armor_slots(&self) -> &[ItemStack];
    fn hand_slots(&self) -> &[ItemStack];
    /// Full actor state used to restore the actor later
    fn serialize_state(&self) -> Compound;
}

/// Something a companion can target
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRef {
    /// Encoded type id, e.g. `minecraft:zombie`
    pub type_id: String,
    pub owner: Option<OwnerId>,
    pub alive: bool,
}

impl TargetRef {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            owner: None,
            alive: true,
        }
    }

    pub fn owned_by(mut self, owner: OwnerId) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Commands an owner can give a companion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionCommand {
    Sit,
    Follow,
    SitFollowToggle,
    OpenMenu,
    Pet,
}

/// What happened to an actor during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorTick {
    /// The actor flushed its state into the registry
    pub flushed: bool,
    /// The actor ran its per-tick behavior (inactive actors mostly skip it)
    pub behavior_ran: bool,
}

const PET_HEAL_AMOUNT: f32 = 0.1;

/// An instantiated companion in the simulation
#[derive(Debug, Clone)]
pub struct CompanionActor {
    id: CompanionId,
    live_id: LiveInstanceId,
    custom_name: Option<String>,
    kind: CompanionKind,
    entity_type: String,
    variant: String,
    owner: Option<OwnerId>,
    owner_name: String,
    active: bool,
    position: IVec3,
    level: LevelKey,
    dimension: String,
    health: f32,
    max_health: f32,
    respawn_timer: EpochSeconds,
    sitting: bool,
    ordered_to_position: bool,
    target: Option<TargetRef>,
    armor: Vec<ItemStack>,
    hand: Vec<ItemStack>,

    // Transient state, never persisted in the record fields
    pub(crate) effects: Vec<String>,
    pub(crate) on_fire: bool,
    pub(crate) leash_holder: Option<String>,
    pub(crate) alive: bool,

    dirty: bool,
    sync_ticker: SyncTicker,
    inactive_ticker: u32,
}

impl CompanionActor {
    /// Spawn a fresh, untamed actor of a registered species
    pub fn spawn(
        entity_type: &str,
        live_id: LiveInstanceId,
        level: LevelKey,
        position: IVec3,
        config: &SyncConfig,
    ) -> Self {
        let profile = species(entity_type);
        let max_health = profile.map(|p| p.max_health).unwrap_or(8.0);
        let dimension = level.location.clone();

        Self {
            id: CompanionId::new(),
            live_id,
            custom_name: None,
            kind: profile.map(|p| p.kind).unwrap_or_default(),
            entity_type: entity_type.to_string(),
            variant: "DEFAULT".to_string(),
            owner: None,
            owner_name: String::new(),
            active: true,
            position,
            level,
            dimension,
            health: max_health,
            max_health,
            respawn_timer: 0,
            sitting: false,
            ordered_to_position: false,
            target: None,
            armor: vec![ItemStack::empty(); config.armor_size],
            hand: vec![ItemStack::empty(); config.hand_size],
            effects: Vec::new(),
            on_fire: false,
            leash_holder: None,
            alive: true,
            dirty: true,
            sync_ticker: SyncTicker::new(config.data_sync_ticks),
            inactive_ticker: 0,
        }
    }

    /// Recreate an actor for an existing record under a new live handle
    pub fn from_record(record: &CompanionRecord, live_id: LiveInstanceId, config: &SyncConfig) -> Self {
        let blob = record.entity_data();
        let variant = blob
            .and_then(|data| data.get_string_opt("Variant"))
            .unwrap_or("DEFAULT")
            .to_string();
        let effects = blob
            .map(|data| {
                data.get_list("Effects")
                    .iter()
                    .filter_map(|tag| match tag {
                        Tag::String(effect) => Some(effect.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let custom_name = if record.name().is_empty() {
            None
        } else {
            Some(record.name().to_string())
        };

        Self {
            id: record.id(),
            live_id,
            custom_name,
            kind: record.kind(),
            entity_type: record.entity_type().to_string(),
            variant,
            owner: record.owner(),
            owner_name: record.owner_name().to_string(),
            active: record.is_active(),
            position: record.position(),
            level: record.level().clone(),
            dimension: record.dimension().to_string(),
            health: record.health(),
            max_health: record.max_health(),
            respawn_timer: record.respawn_timer(),
            sitting: record.is_ordered_to_sit(),
            ordered_to_position: record.is_ordered_to_position(),
            // Targets are encoded by type only; the live object is gone
            target: None,
            armor: record.armor_items().iter().cloned().collect(),
            hand: record.hand_items().iter().cloned().collect(),
            effects,
            on_fire: false,
            leash_holder: None,
            alive: true,
            dirty: true,
            sync_ticker: SyncTicker::new(config.data_sync_ticks),
            inactive_ticker: 0,
        }
    }

    pub fn species(&self) -> Option<&'static SpeciesProfile> {
        species(&self.entity_type)
    }

    pub fn is_tame(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn effects(&self) -> &[String] {
        &self.effects
    }

    pub fn leash_holder(&self) -> Option<&str> {
        self.leash_holder.as_deref()
    }

    pub fn has_custom_name(&self) -> bool {
        self.custom_name.is_some()
    }

    pub fn target(&self) -> Option<&TargetRef> {
        self.target.as_ref()
    }

    // === DIRTY TRACKING ===

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    // === MUTATORS ===

    pub fn set_custom_name(&mut self, name: impl Into<String>) {
        self.custom_name = Some(name.into());
        self.set_dirty();
    }

    pub fn set_variant(&mut self, variant: impl Into<String>) {
        self.variant = variant.into();
        self.set_dirty();
    }

    pub fn set_position(&mut self, position: IVec3) {
        if self.position != position {
            self.position = position;
            self.set_dirty();
        }
    }

    pub fn set_level(&mut self, level: LevelKey) {
        self.dimension = level.location.clone();
        self.level = level;
        self.set_dirty();
    }

    pub fn set_health(&mut self, health: f32) {
        if health.is_nan() {
            return;
        }
        self.health = health.clamp(0.0, self.max_health);
        self.set_dirty();
    }

    pub fn heal(&mut self, amount: f32) {
        if self.health < self.max_health {
            self.set_health(self.health + amount);
        }
    }

    pub fn hurt(&mut self, amount: f32) {
        self.set_health(self.health - amount);
    }

    pub fn set_ordered_to_sit(&mut self, sit: bool) {
        if self.sitting != sit {
            self.sitting = sit;
            self.set_dirty();
        }
    }

    pub fn set_ordered_to_position(&mut self, ordered: bool) {
        if self.ordered_to_position != ordered {
            self.ordered_to_position = ordered;
            self.set_dirty();
        }
    }

    pub fn set_owner_name(&mut self, name: impl Into<String>) {
        self.owner_name = name.into();
        self.set_dirty();
    }

    pub(crate) fn set_owner(&mut self, owner: OwnerId, owner_name: impl Into<String>) {
        self.owner = Some(owner);
        self.owner_name = owner_name.into();
        self.set_dirty();
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
        self.set_dirty();
    }

    pub fn set_respawn_timer(&mut self, timer: EpochSeconds) {
        self.respawn_timer = timer;
        self.set_dirty();
    }

    pub fn stop_respawn_timer(&mut self) {
        self.set_respawn_timer(0);
    }

    pub fn add_effect(&mut self, effect: impl Into<String>) {
        self.effects.push(effect.into());
    }

    pub fn set_on_fire(&mut self, on_fire: bool) {
        self.on_fire = on_fire;
    }

    pub fn is_on_fire(&self) -> bool {
        self.on_fire
    }

    pub fn set_leash_holder(&mut self, holder: Option<String>) {
        self.leash_holder = holder;
    }

    pub fn set_armor_item(&mut self, index: usize, stack: ItemStack) -> bool {
        match self.armor.get_mut(index) {
            Some(slot) => {
                *slot = stack;
                self.set_dirty();
                true
            }
            None => false,
        }
    }

    pub fn set_hand_item(&mut self, index: usize, stack: ItemStack) -> bool {
        match self.hand.get_mut(index) {
            Some(slot) => {
                *slot = stack;
                self.set_dirty();
                true
            }
            None => false,
        }
    }

    /// Set or clear the attack target.
    ///
    /// Dead targets clear the current one. Targets owned by this companion's
    /// owner are ignored unless friendly fire is enabled.
    pub fn set_target(&mut self, target: Option<TargetRef>, friendly_fire: bool) {
        if self.target == target {
            return;
        }

        match target {
            Some(target) if target.alive => {
                if !friendly_fire && target.owner.is_some() && target.owner == self.owner {
                    return;
                }
                self.target = Some(target);
            }
            _ => self.target = None,
        }
        self.set_dirty();
    }

    // === COMMANDS ===

    pub fn follow(&mut self) {
        self.set_ordered_to_sit(false);
    }

    pub fn sit(&mut self) {
        self.set_ordered_to_sit(true);
        if self.target.is_some() {
            self.target = None;
            self.set_dirty();
        }
    }

    /// Apply an owner command. Returns true when the caller should open the
    /// companion menu.
    pub fn handle_command(&mut self, command: CompanionCommand) -> bool {
        match command {
            CompanionCommand::Sit => self.sit(),
            CompanionCommand::Follow => self.follow(),
            CompanionCommand::SitFollowToggle => {
                if self.sitting {
                    self.follow();
                } else {
                    self.sit();
                }
            }
            CompanionCommand::Pet => self.heal(PET_HEAL_AMOUNT),
            CompanionCommand::OpenMenu => return self.is_tame(),
        }
        false
    }

    // === TICK ===

    /// Advance one simulation tick, flushing into the registry when dirty and
    /// the sync cadence has elapsed.
    pub fn tick(&mut self, registry: &mut AuthoritativeRegistry, config: &SyncConfig) -> ActorTick {
        let mut outcome = ActorTick::default();

        if self.sync_ticker.poll(self.dirty) {
            outcome.flushed = self.sync_data(registry);
        }

        if self.active {
            outcome.behavior_ran = true;
        } else {
            self.inactive_ticker += 1;
            if self.inactive_ticker >= config.inactive_tick_interval {
                self.inactive_ticker = 0;
                outcome.behavior_ran = true;
            }
        }

        outcome
    }

    /// Push the current state into the registry right away
    pub fn sync_data(&mut self, registry: &mut AuthoritativeRegistry) -> bool {
        let flushed = registry.update_or_register(self).is_some();
        if flushed {
            self.dirty = false;
        }
        flushed
    }

    /// Move the actor under a new live handle, as after recreation
    pub(crate) fn set_live_instance_id(&mut self, live_id: LiveInstanceId) {
        self.live_id = live_id;
        self.set_dirty();
    }
}

impl LiveActor for CompanionActor {
    fn companion_id(&self) -> CompanionId {
        self.id
    }

    fn live_instance_id(&self) -> LiveInstanceId {
        self.live_id
    }

    fn custom_name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or("")
    }

    fn kind(&self) -> CompanionKind {
        self.kind
    }

    fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    fn owner_name(&self) -> &str {
        &self.owner_name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn position(&self) -> IVec3 {
        self.position
    }

    fn level(&self) -> &LevelKey {
        &self.level
    }

    fn dimension(&self) -> &str {
        &self.dimension
    }

    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn health(&self) -> f32 {
        self.health
    }

    fn max_health(&self) -> f32 {
        self.max_health
    }

    fn respawn_timer(&self) -> EpochSeconds {
        self.respawn_timer
    }

    fn is_ordered_to_sit(&self) -> bool {
        self.sitting
    }

    fn is_ordered_to_position(&self) -> bool {
        self.ordered_to_position
    }

    fn target_id(&self) -> &str {
        self.target
            .as_ref()
            .map(|t| t.type_id.as_str())
            .unwrap_or("")
    }

    fn armor_slots(&self) -> &[ItemStack] {
        &self.armor
    }

    fn hand_slots(&self) -> &[ItemStack] {
        &self.hand
    }

    fn serialize_state(&self) -> Compound {
        let mut data = Compound::new();
        data.put_string("EntityType", self.entity_type.clone());
        data.put_string("Variant", self.variant.clone());
        if let Some(name) = &self.custom_name {
            data.put_string("CustomName", name.clone());
        }
        data.put_float("Health", self.health);
        data.put_int_array("Pos", vec![self.position.x, self.position.y, self.position.z]);
        data.put_bool("Sitting", self.sitting);
        data.put_list(
            "Effects",
            self.effects.iter().cloned().map(Tag::String).collect(),
        );
        if let Some(holder) = &self.leash_holder {
            data.put_string("Leash", holder.clone());
        }
        data
    }
}
