//! Ownership and respawn state machine
//!
//! ```text
//! Untamed --tame--> TamedActive --die (respawn, delay > 1)--> PendingRespawn { at }
//!                        |                                          |
//!                        +--die (no respawn)--> Retired             +--finalize after `at`--> TamedActive
//! ```
//!
//! The state is never stored; it is derived from the owner, active flag and
//! respawn timer of a record or actor.

use crate::companion::actor::{CompanionActor, LiveActor};
use crate::companion::record::CompanionRecord;
use crate::core::config::SyncConfig;
use crate::core::types::{EpochSeconds, OwnerId};
use crate::item::ItemStack;
use rand::Rng;

/// Derived lifecycle state of a companion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionState {
    Untamed,
    TamedActive,
    PendingRespawn { at: EpochSeconds },
    Retired,
}

impl CompanionState {
    pub fn of(record: &CompanionRecord) -> Self {
        Self::from_parts(record.owner(), record.is_active(), record.respawn_timer())
    }

    pub fn of_actor<A: LiveActor>(actor: &A) -> Self {
        Self::from_parts(actor.owner(), actor.is_active(), actor.respawn_timer())
    }

    fn from_parts(owner: Option<OwnerId>, active: bool, timer: EpochSeconds) -> Self {
        match (owner, active, timer > 0) {
            (None, _, _) => CompanionState::Untamed,
            (Some(_), _, true) => CompanionState::PendingRespawn { at: timer },
            (Some(_), true, false) => CompanionState::TamedActive,
            (Some(_), false, false) => CompanionState::Retired,
        }
    }

    /// Active with no timer, or pending with an elapsed deadline
    pub fn is_eligible_to_resume(&self, now: EpochSeconds) -> bool {
        match self {
            CompanionState::Untamed | CompanionState::TamedActive => true,
            CompanionState::PendingRespawn { at } => *at < now,
            CompanionState::Retired => false,
        }
    }
}

/// What happens to a tamed companion when it dies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespawnPolicy {
    pub enabled: bool,
    pub delay_secs: i64,
}

impl RespawnPolicy {
    pub fn new(enabled: bool, delay_secs: i64) -> Self {
        Self {
            enabled,
            delay_secs,
        }
    }
}

impl From<&SyncConfig> for RespawnPolicy {
    fn from(config: &SyncConfig) -> Self {
        Self::new(config.respawn_on_death, config.respawn_delay_secs)
    }
}

/// Result of offering a tame item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TameOutcome {
    /// Not tameable with this item; nothing was consumed
    Rejected,
    /// One item consumed, the companion stays wild
    Failed,
    Tamed,
}

impl CompanionActor {
    /// Whether `item` can be offered to tame this companion
    pub fn can_tame_with(&self, item: &ItemStack) -> bool {
        !self.is_tame()
            && !item.is_empty()
            && self
                .species()
                .map(|species| item.is(species.tame_item))
                .unwrap_or(false)
    }

    /// Offer a tame item. One item is consumed on every accepted attempt and
    /// one attempt in four succeeds.
    pub fn try_tame<R: Rng>(
        &mut self,
        owner: OwnerId,
        owner_name: &str,
        item: &mut ItemStack,
        rng: &mut R,
    ) -> TameOutcome {
        if !self.can_tame_with(item) {
            return TameOutcome::Rejected;
        }

        item.shrink(1);
        if rng.gen_range(0..4) != 0 {
            tracing::debug!("Taming {} by {} failed", self.companion_id(), owner_name);
            return TameOutcome::Failed;
        }

        self.set_owner(owner, owner_name);
        self.follow();
        self.set_dirty();
        tracing::debug!("Companion {} tamed by {}", self.companion_id(), owner_name);
        TameOutcome::Tamed
    }

    /// Handle death. Transient state is dropped before the state change so
    /// the flushed record never carries it.
    pub fn die(&mut self, now: EpochSeconds, policy: &RespawnPolicy) -> CompanionState {
        self.set_on_fire(false);
        self.set_leash_holder(None);
        self.effects.clear();
        self.set_target(None, true);

        if self.is_tame() {
            if policy.enabled {
                if policy.delay_secs > 1 {
                    self.set_respawn_timer(now + policy.delay_secs);
                    self.set_active(false);
                }
            } else {
                self.set_active(false);
            }
        }

        self.alive = false;
        self.set_dirty();

        let state = CompanionState::of_actor(self);
        tracing::debug!("Companion {} died, now {:?}", self.companion_id(), state);
        state
    }

    /// Run once when an actor enters the world. Assigns a default name and
    /// clears an elapsed respawn timer. Returns true when a pending respawn
    /// was resumed.
    pub fn finalize_spawn(&mut self, now: EpochSeconds) -> bool {
        if !self.has_custom_name() {
            let name = default_name(self.entity_type());
            self.set_custom_name(name);
        }

        let timer = self.respawn_timer();
        if timer > 0 && timer < now {
            self.stop_respawn_timer();
            if self.is_tame() && !self.is_active() {
                self.set_active(true);
                return true;
            }
        }
        false
    }

    pub fn is_eligible_to_resume(&self, now: EpochSeconds) -> bool {
        CompanionState::of_actor(self).is_eligible_to_resume(now)
    }
}

impl CompanionRecord {
    pub fn is_eligible_to_resume(&self, now: EpochSeconds) -> bool {
        CompanionState::of(self).is_eligible_to_resume(now)
    }
}

/// Title-cased species name, e.g. `player_companions:welsh_corgi` -> `Welsh Corgi`
fn default_name(entity_type: &str) -> String {
    let path = entity_type
        .split_once(':')
        .map(|(_, path)| path)
        .unwrap_or(entity_type);

    path.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
