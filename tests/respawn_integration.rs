//! Integration tests for the ownership / respawn lifecycle
//!
//! These tests walk companions through taming, death and resumption:
//! - Timed respawn: dead at T, resumable after T + delay, active again
//! - Retirement when respawn is disabled
//! - Attachment rules while an actor is live
//! - Deadlines persisted across a session restart

use companion_sync::companion::{CompanionRecord, LiveActor};
use companion_sync::core::config::SyncConfig;
use companion_sync::core::error::CompanionError;
use companion_sync::core::types::{CompanionId, LevelKey, LiveInstanceId, OwnerId};
use companion_sync::item::ItemStack;
use companion_sync::lifecycle::{CompanionState, TameOutcome};
use companion_sync::registry::{FileStore, MemoryStore};
use companion_sync::session::Session;
use glam::IVec3;

const T: i64 = 1_700_000_000;

fn overworld() -> LevelKey {
    LevelKey::new("minecraft:dimension", "minecraft:overworld")
}

fn session_with(config: SyncConfig) -> Session {
    Session::start(config, Box::new(MemoryStore::new()), 21).unwrap()
}

fn tamed(session: &mut Session, owner: OwnerId) -> (LiveInstanceId, CompanionId) {
    let live = session
        .spawn("player_companions:welsh_corgi", overworld(), IVec3::new(2, 64, 2))
        .unwrap();
    let mut bones = ItemStack::new("player_companions:tame_bone", 64);
    while let Some(TameOutcome::Failed) = session.tame(live, owner, "Alex", &mut bones) {}

    let id = session.actor(live).unwrap().companion_id();
    assert_eq!(
        CompanionState::of(session.registry().get(id).unwrap()),
        CompanionState::TamedActive
    );
    (live, id)
}

// ============================================================================
// Timed Respawn
// ============================================================================

/// Integration test: tame, kill at T with a 120 s delay, resume at T + 121
#[test]
fn test_timed_respawn_scenario() {
    let mut session = session_with(SyncConfig::default());
    let owner = OwnerId::new();
    let (live, id) = tamed(&mut session, owner);

    let state = session.kill(live, T).unwrap();
    assert_eq!(state, CompanionState::PendingRespawn { at: T + 120 });
    assert!(session.actor(live).is_none());
    assert_eq!(session.live_instance_of(id), None);

    let record = session.registry().get(id).unwrap();
    assert!(!record.is_active());
    assert_eq!(record.respawn_timer(), T + 120);
    assert_eq!(record.owner(), Some(owner));

    // Not yet
    assert!(session.respawn_due(T + 60).is_empty());
    assert!(session.respawn_due(T + 120).is_empty());

    let resumed = session.respawn_due(T + 121);
    assert_eq!(resumed.len(), 1);
    let new_live = resumed[0];
    assert_ne!(new_live, live);

    let record = session.registry().get(id).unwrap();
    assert!(record.is_active());
    assert_eq!(record.respawn_timer(), 0);
    assert_eq!(record.live_instance_id(), new_live);
    assert_eq!(session.live_instance_of(id), Some(new_live));

    let actor = session.actor(new_live).unwrap();
    assert_eq!(actor.companion_id(), id);
    assert_eq!(actor.owner(), Some(owner));
    assert!(actor.is_alive());
}

#[test]
fn test_early_respawn_stays_pending() {
    let mut session = session_with(SyncConfig::default());
    let (live, id) = tamed(&mut session, OwnerId::new());
    session.kill(live, T).unwrap();

    // Recreated before the deadline: attached but still resting
    let early = session.respawn(id, T + 30).unwrap();
    let record = session.registry().get(id).unwrap();
    assert!(!record.is_active());
    assert_eq!(record.respawn_timer(), T + 120);
    assert!(!record.is_eligible_to_resume(T + 30));

    // Still attached, so the due pass leaves it alone
    assert!(session.respawn_due(T + 121).is_empty());
    assert_eq!(session.live_instance_of(id), Some(early));
}

#[test]
fn test_inactive_actor_ticks_slowly_but_flushes() {
    let mut session = session_with(SyncConfig::default());
    let (live, id) = tamed(&mut session, OwnerId::new());
    session.kill(live, T).unwrap();
    let resting = session.respawn(id, T + 30).unwrap();

    let mut behaviors = 0;
    for _ in 0..100 {
        behaviors += session.tick().behaviors;
    }
    assert_eq!(behaviors, 1);

    session.actor_mut(resting).unwrap().set_position(IVec3::new(50, 64, 50));
    for _ in 0..10 {
        session.tick();
    }
    assert_eq!(
        session.registry().get(id).unwrap().position(),
        IVec3::new(50, 64, 50)
    );
}

// ============================================================================
// Retirement
// ============================================================================

#[test]
fn test_death_without_respawn_retires() {
    let config = SyncConfig {
        respawn_on_death: false,
        ..Default::default()
    };
    let mut session = session_with(config);
    let (live, id) = tamed(&mut session, OwnerId::new());

    assert_eq!(session.kill(live, T), Some(CompanionState::Retired));
    let record = session.registry().get(id).unwrap();
    assert!(!record.is_active());
    assert!(!record.has_respawn_timer());
    assert!(session.respawn_due(T + 1_000_000).is_empty());
}

#[test]
fn test_short_delay_keeps_companion_active() {
    let config = SyncConfig {
        respawn_delay_secs: 1,
        ..Default::default()
    };
    let mut session = session_with(config);
    let (live, id) = tamed(&mut session, OwnerId::new());

    assert_eq!(session.kill(live, T), Some(CompanionState::TamedActive));
    let record = session.registry().get(id).unwrap();
    assert!(record.is_active());
    assert!(record.is_eligible_to_resume(T));
}

// ============================================================================
// Eligibility on Records
// ============================================================================

#[test]
fn test_record_eligibility() {
    let now = T;
    let mut elapsed = CompanionRecord::new(CompanionId::new());
    elapsed.set_owner(OwnerId::new(), "Alex");
    elapsed.set_active(false);
    elapsed.set_respawn_timer(now - 1);
    assert!(elapsed.is_eligible_to_resume(now));

    let mut waiting = elapsed.clone();
    waiting.set_respawn_timer(now + 3600);
    assert!(!waiting.is_eligible_to_resume(now));
}

// ============================================================================
// Attachment
// ============================================================================

#[test]
fn test_respawn_while_live_is_rejected() {
    let mut session = session_with(SyncConfig::default());
    let (live, id) = tamed(&mut session, OwnerId::new());

    let err = session.respawn(id, T).unwrap_err();
    assert!(matches!(err, CompanionError::AlreadyAttached { live: l, .. } if l == live));
    assert_eq!(session.actor_count(), 1);
}

#[test]
fn test_respawn_unknown_companion() {
    let mut session = session_with(SyncConfig::default());
    let err = session.respawn(CompanionId::new(), T).unwrap_err();
    assert!(matches!(err, CompanionError::NotFound(_)));
}

// ============================================================================
// Persistence of Deadlines
// ============================================================================

#[test]
fn test_pending_respawn_survives_restart() {
    let dir = std::env::temp_dir().join(format!("companion_respawn_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("companions.json");
    let owner = OwnerId::new();

    let id = {
        let mut session =
            Session::start(SyncConfig::default(), Box::new(FileStore::new(&path)), 8).unwrap();
        let (live, id) = tamed(&mut session, owner);
        session.kill(live, T).unwrap();
        session.end().unwrap();
        id
    };

    let mut session = Session::start(SyncConfig::default(), Box::new(FileStore::new(&path)), 8).unwrap();
    assert_eq!(
        CompanionState::of(session.registry().get(id).unwrap()),
        CompanionState::PendingRespawn { at: T + 120 }
    );

    let resumed = session.respawn_due(T + 121);
    assert_eq!(resumed.len(), 1);
    let actor = session.actor(resumed[0]).unwrap();
    assert_eq!(actor.owner(), Some(owner));
    assert!(actor.is_active());
    assert_eq!(actor.custom_name(), "Welsh Corgi");

    let _ = std::fs::remove_dir_all(&dir);
}
