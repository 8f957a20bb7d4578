//! Session - process-scoped owner of the registry and live actors
//!
//! Created at session start and torn down at session end. Holds the config,
//! the authoritative registry, every live actor keyed by its transient
//! handle, the item catalog and a seeded RNG, and drives the tick loop.

use crate::companion::actor::{CompanionActor, CompanionCommand, LiveActor, TargetRef};
use crate::companion::codec::SaveMode;
use crate::companion::record::SlotSizes;
use crate::core::config::SyncConfig;
use crate::core::error::{CompanionError, Result};
use crate::core::types::{CompanionId, EpochSeconds, LevelKey, LiveInstanceId, OwnerId, Tick};
use crate::item::{ItemCatalog, ItemStack};
use crate::lifecycle::{CompanionState, RespawnPolicy, TameOutcome};
use crate::registry::{AuthoritativeRegistry, CompanionStore};
use crate::sync::{ConnectionId, Envelope, SubscriberScope};
use ahash::AHashMap;
use glam::IVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Per-tick counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    pub flushed: usize,
    pub behaviors: usize,
}

pub struct Session {
    config: SyncConfig,
    registry: AuthoritativeRegistry,
    actors: AHashMap<LiveInstanceId, CompanionActor>,
    catalog: ItemCatalog,
    rng: ChaCha8Rng,
    current_tick: Tick,
    next_live_id: i32,
}

impl Session {
    /// Validate the config and open the registry over `store`
    pub fn start(config: SyncConfig, store: Box<dyn CompanionStore>, seed: u64) -> Result<Self> {
        config.validate().map_err(CompanionError::Config)?;
        let registry = AuthoritativeRegistry::open(store, SlotSizes::from(&config))?;

        tracing::info!(
            "Companion session started with {} companions (seed {})",
            registry.len(),
            seed
        );

        Ok(Self {
            config,
            registry,
            actors: AHashMap::new(),
            catalog: ItemCatalog::with_defaults(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            current_tick: 0,
            next_live_id: 1,
        })
    }

    pub fn with_catalog(mut self, catalog: ItemCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn registry(&self) -> &AuthoritativeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AuthoritativeRegistry {
        &mut self.registry
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn actor(&self, live: LiveInstanceId) -> Option<&CompanionActor> {
        self.actors.get(&live)
    }

    pub fn actor_mut(&mut self, live: LiveInstanceId) -> Option<&mut CompanionActor> {
        self.actors.get_mut(&live)
    }

    /// Live handle currently bound to a companion, if any
    pub fn live_instance_of(&self, id: CompanionId) -> Option<LiveInstanceId> {
        self.registry.attached(id)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    fn allocate_live_id(&mut self) -> LiveInstanceId {
        let live = LiveInstanceId(self.next_live_id);
        self.next_live_id += 1;
        live
    }

    // === ACTOR LIFECYCLE ===

    /// Spawn a fresh untamed companion and register it
    pub fn spawn(&mut self, entity_type: &str, level: LevelKey, position: IVec3) -> Result<LiveInstanceId> {
        let live = self.allocate_live_id();
        let actor = CompanionActor::spawn(entity_type, live, level, position, &self.config);

        self.registry.attach(&actor)?;
        self.registry.get_or_create(&actor);
        tracing::debug!("Spawned {} as {:?}", entity_type, live);

        self.actors.insert(live, actor);
        Ok(live)
    }

    /// Recreate the actor for an existing record under a new live handle.
    ///
    /// The new actor restores from the record and finalizes its spawn, which
    /// clears an elapsed respawn timer.
    pub fn respawn(&mut self, id: CompanionId, now: EpochSeconds) -> Result<LiveInstanceId> {
        let record = self.registry.get(id).ok_or(CompanionError::NotFound(id))?;
        let live = LiveInstanceId(self.next_live_id);
        let mut actor = CompanionActor::from_record(record, live, &self.config);

        self.registry.attach(&actor)?;
        self.next_live_id += 1;
        self.registry.get_or_create(&actor);

        if actor.finalize_spawn(now) {
            tracing::info!("Companion {} resumed after respawn", id);
        }
        actor.sync_data(&mut self.registry);

        self.actors.insert(live, actor);
        Ok(live)
    }

    /// Respawn every companion whose deadline has passed and that has no
    /// live actor
    pub fn respawn_due(&mut self, now: EpochSeconds) -> Vec<LiveInstanceId> {
        let due = self.registry.respawn_due(now);
        let mut spawned = Vec::with_capacity(due.len());

        for id in due {
            if self.registry.attached(id).is_some() {
                continue;
            }
            match self.respawn(id, now) {
                Ok(live) => spawned.push(live),
                Err(err) => tracing::warn!("Could not respawn {}: {}", id, err),
            }
        }
        spawned
    }

    /// Remove a live actor from the simulation (unload). The record stays.
    pub fn despawn(&mut self, live: LiveInstanceId) -> Option<CompanionId> {
        let mut actor = self.actors.remove(&live)?;
        let id = actor.companion_id();
        if actor.is_dirty() {
            actor.sync_data(&mut self.registry);
        }
        self.registry.detach(id, live);
        Some(id)
    }

    /// Kill a live actor. The death is flushed immediately and the actor is
    /// removed from the simulation.
    pub fn kill(&mut self, live: LiveInstanceId, now: EpochSeconds) -> Option<CompanionState> {
        let policy = RespawnPolicy::from(&self.config);
        let mut actor = self.actors.remove(&live)?;
        let state = actor.die(now, &policy);

        actor.sync_data(&mut self.registry);
        self.registry.detach(actor.companion_id(), live);
        Some(state)
    }

    /// Permanently delete a companion and any live actor for it
    pub fn remove(&mut self, id: CompanionId) -> bool {
        if let Some(live) = self.registry.attached(id) {
            self.actors.remove(&live);
        }
        self.registry.remove(id).is_some()
    }

    // === INTERACTION ===

    /// Offer a tame item to a live actor
    pub fn tame(
        &mut self,
        live: LiveInstanceId,
        owner: OwnerId,
        owner_name: &str,
        item: &mut ItemStack,
    ) -> Option<TameOutcome> {
        let actor = self.actors.get_mut(&live)?;
        let outcome = actor.try_tame(owner, owner_name, item, &mut self.rng);
        if outcome == TameOutcome::Tamed {
            actor.sync_data(&mut self.registry);
        }
        Some(outcome)
    }

    /// Returns true when the caller should open the companion menu
    pub fn command(&mut self, live: LiveInstanceId, command: CompanionCommand) -> Option<bool> {
        self.actors
            .get_mut(&live)
            .map(|actor| actor.handle_command(command))
    }

    /// Point a live actor at a target, applying the configured friendly-fire
    /// rule. Returns false when no such actor is live.
    pub fn set_target(&mut self, live: LiveInstanceId, target: Option<TargetRef>) -> bool {
        let friendly_fire = self.config.friendly_fire;
        match self.actors.get_mut(&live) {
            Some(actor) => {
                actor.set_target(target, friendly_fire);
                true
            }
            None => false,
        }
    }

    /// Put a stack into a companion's inventory through the registry
    pub fn store_item(&mut self, id: CompanionId, stack: ItemStack) -> Result<bool> {
        let catalog = &self.catalog;
        self.registry
            .update_companion(id, |record| record.store_inventory_item(stack, catalog))
    }

    // === TICK ===

    /// Advance every live actor by one tick
    pub fn tick(&mut self) -> TickReport {
        self.current_tick += 1;
        let mut report = TickReport {
            tick: self.current_tick,
            ..Default::default()
        };

        let mut handles: Vec<LiveInstanceId> = self.actors.keys().copied().collect();
        handles.sort_by_key(|live| live.0);

        for live in handles {
            if let Some(actor) = self.actors.get_mut(&live) {
                let outcome = actor.tick(&mut self.registry, &self.config);
                report.flushed += usize::from(outcome.flushed);
                report.behaviors += usize::from(outcome.behavior_ran);
            }
        }

        if report.flushed > 0 {
            tracing::debug!("Tick {}: flushed {} companions", report.tick, report.flushed);
        }
        report
    }

    // === SYNC ===

    pub fn subscribe(&mut self, connection: ConnectionId, scope: SubscriberScope) {
        self.registry.subscribe(connection, scope);
    }

    pub fn unsubscribe(&mut self, connection: ConnectionId) -> bool {
        self.registry.unsubscribe(connection)
    }

    pub fn drain_outbound(&mut self) -> Vec<Envelope> {
        self.registry.drain_outbound()
    }

    // === PERSISTENCE ===

    /// Flush every dirty actor, then persist the registry
    pub fn save(&mut self) -> Result<usize> {
        for actor in self.actors.values_mut() {
            if actor.is_dirty() {
                actor.sync_data(&mut self.registry);
            }
        }
        self.registry.save(SaveMode::Full)
    }

    /// Save and tear down
    pub fn end(mut self) -> Result<()> {
        let saved = self.save()?;
        tracing::info!(
            "Companion session ended after {} ticks ({} companions saved)",
            self.current_tick,
            saved
        );
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("registry", &self.registry)
            .field("actors", &self.actors.len())
            .field("current_tick", &self.current_tick)
            .finish()
    }
}
