//! Integration tests for authoritative -> mirror replication
//!
//! These tests drive a session, ship every outbound envelope to the mirror
//! registered for its connection, and check that:
//! - Mirrors converge to the authoritative state after any update sequence
//! - Owner-scoped connections only ever see their owner's companions
//! - Removals and snapshots reach mirrors
//! - Stale live instances never produce updates

use ahash::AHashMap;
use companion_sync::companion::{CompanionActor, CompanionCommand, CompanionRecord, LiveActor};
use companion_sync::core::config::SyncConfig;
use companion_sync::core::types::{LevelKey, LiveInstanceId, OwnerId};
use companion_sync::item::ItemStack;
use companion_sync::lifecycle::TameOutcome;
use companion_sync::registry::{MemoryStore, MirrorRegistry};
use companion_sync::session::Session;
use companion_sync::sync::{ConnectionId, SubscriberScope, SyncMessage};
use glam::IVec3;

fn overworld() -> LevelKey {
    LevelKey::new("minecraft:dimension", "minecraft:overworld")
}

fn session() -> Session {
    Session::start(SyncConfig::default(), Box::new(MemoryStore::new()), 5).unwrap()
}

fn tame(session: &mut Session, live: LiveInstanceId, owner: OwnerId, name: &str) {
    let tame_item = session.actor(live).unwrap().species().unwrap().tame_item;
    let mut offer = ItemStack::new(tame_item, 64);
    while let Some(TameOutcome::Failed) = session.tame(live, owner, name, &mut offer) {}
    assert!(session.actor(live).unwrap().is_tame());
}

/// Deliver everything queued so far to the matching mirrors
fn pump(session: &mut Session, mirrors: &mut AHashMap<ConnectionId, MirrorRegistry>) {
    for envelope in session.drain_outbound() {
        if let Some(mirror) = mirrors.get_mut(&envelope.connection) {
            mirror.apply(&envelope.message);
        }
    }
}

fn run(session: &mut Session, mirrors: &mut AHashMap<ConnectionId, MirrorRegistry>, ticks: u32) {
    for _ in 0..ticks {
        session.tick();
        pump(session, mirrors);
    }
}

fn assert_converged(authoritative: &CompanionRecord, mirrored: &CompanionRecord) {
    assert_eq!(mirrored.summary(), authoritative.summary());
    assert_eq!(mirrored.position(), authoritative.position());
    assert_eq!(mirrored.level(), authoritative.level());
    assert_eq!(mirrored.is_ordered_to_sit(), authoritative.is_ordered_to_sit());
    assert_eq!(mirrored.target(), authoritative.target());
    assert_eq!(mirrored.live_instance_id(), authoritative.live_instance_id());
    assert_eq!(mirrored.inventory_items(), authoritative.inventory_items());
    assert_eq!(mirrored.armor_items(), authoritative.armor_items());
    assert_eq!(mirrored.hand_items(), authoritative.hand_items());
}

// ============================================================================
// Convergence
// ============================================================================

/// Integration test: after an arbitrary update sequence the mirror matches
#[test]
fn test_mirror_converges_after_update_sequence() {
    let mut session = session();
    let mut mirrors = AHashMap::new();
    mirrors.insert(ConnectionId(1), MirrorRegistry::default());
    session.subscribe(ConnectionId(1), SubscriberScope::All);

    let owner = OwnerId::new();
    let a = session.spawn("player_companions:samurai", overworld(), IVec3::ZERO).unwrap();
    let b = session.spawn("player_companions:firefly", overworld(), IVec3::new(3, 80, 3)).unwrap();
    tame(&mut session, a, owner, "Alex");

    for step in 0..25 {
        if let Some(actor) = session.actor_mut(a) {
            actor.set_position(IVec3::new(step, 64, -step));
            if step % 7 == 0 {
                actor.hurt(1.5);
            }
        }
        if step == 12 {
            session.command(b, CompanionCommand::Sit);
        }
        run(&mut session, &mut mirrors, 3);
    }

    let a_id = session.actor(a).unwrap().companion_id();
    session
        .registry_mut()
        .update_companion(a_id, |r| r.set_hand_item(0, ItemStack::new("minecraft:iron_sword", 1)))
        .unwrap()
        .unwrap();
    // Settle any pending actor flush
    run(&mut session, &mut mirrors, 10);

    let mirror = &mirrors[&ConnectionId(1)];
    assert_eq!(mirror.len(), session.registry().len());
    for record in session.registry().companions() {
        let mirrored = mirror.get_companion(record.id()).expect("record missing from mirror");
        assert_converged(record, mirrored);
    }

    // Lookup by transient handle
    assert_eq!(mirror.get_by_live_instance(a).unwrap().id(), a_id);
}

/// Integration test: a late subscriber catches up from the snapshot alone
#[test]
fn test_late_subscriber_gets_snapshot() {
    let mut session = session();
    for x in 0..3 {
        session.spawn("player_companions:rooster", overworld(), IVec3::new(x, 64, 0)).unwrap();
    }
    run(&mut session, &mut AHashMap::new(), 10);

    let mut mirrors = AHashMap::new();
    mirrors.insert(ConnectionId(9), MirrorRegistry::default());
    session.subscribe(ConnectionId(9), SubscriberScope::All);

    let envelopes = session.drain_outbound();
    assert_eq!(envelopes.len(), 1);
    assert!(matches!(&envelopes[0].message, SyncMessage::Snapshot { trees } if trees.len() == 3));

    for envelope in &envelopes {
        mirrors.get_mut(&envelope.connection).unwrap().apply(&envelope.message);
    }
    assert_eq!(mirrors[&ConnectionId(9)].len(), 3);
}

// ============================================================================
// Scoping, Removal and Unsubscribe
// ============================================================================

#[test]
fn test_owner_scoped_subscription() {
    let mut session = session();
    let alex = OwnerId::new();
    let sam = OwnerId::new();

    let mut mirrors = AHashMap::new();
    mirrors.insert(ConnectionId(1), MirrorRegistry::default());
    mirrors.insert(ConnectionId(2), MirrorRegistry::default());
    session.subscribe(ConnectionId(1), SubscriberScope::Owner(alex));
    session.subscribe(ConnectionId(2), SubscriberScope::Owner(sam));

    let mine = session.spawn("player_companions:pig", overworld(), IVec3::ZERO).unwrap();
    let theirs = session.spawn("player_companions:pig", overworld(), IVec3::ZERO).unwrap();
    let wild = session.spawn("player_companions:pig", overworld(), IVec3::ZERO).unwrap();
    tame(&mut session, mine, alex, "Alex");
    tame(&mut session, theirs, sam, "Sam");
    run(&mut session, &mut mirrors, 20);

    let alex_view = &mirrors[&ConnectionId(1)];
    let sam_view = &mirrors[&ConnectionId(2)];
    assert_eq!(alex_view.len(), 1);
    assert_eq!(sam_view.len(), 1);
    assert_eq!(alex_view.companions_for_owner(alex).len(), 1);
    assert!(alex_view.companions_for_owner(sam).is_empty());

    let wild_id = session.actor(wild).unwrap().companion_id();
    assert!(alex_view.get_companion(wild_id).is_none());
    assert!(sam_view.get_companion(wild_id).is_none());
}

#[test]
fn test_removal_reaches_mirror() {
    let mut session = session();
    let mut mirrors = AHashMap::new();
    mirrors.insert(ConnectionId(1), MirrorRegistry::default());
    session.subscribe(ConnectionId(1), SubscriberScope::All);

    let live = session.spawn("player_companions:small_slime", overworld(), IVec3::ZERO).unwrap();
    let id = session.actor(live).unwrap().companion_id();
    run(&mut session, &mut mirrors, 10);
    assert!(mirrors[&ConnectionId(1)].get_companion(id).is_some());

    assert!(session.remove(id));
    pump(&mut session, &mut mirrors);
    assert!(mirrors[&ConnectionId(1)].get_companion(id).is_none());
    assert!(mirrors[&ConnectionId(1)].get_by_live_instance(live).is_none());
}

/// Integration test: a mirror scoped to the old owner drops a companion that
/// changes hands, and stays converged through its later removal
#[test]
fn test_owner_change_leaves_old_scope() {
    let mut session = session();
    let alex = OwnerId::new();
    let sam = OwnerId::new();

    let mut mirrors = AHashMap::new();
    mirrors.insert(ConnectionId(1), MirrorRegistry::default());
    mirrors.insert(ConnectionId(2), MirrorRegistry::default());
    session.subscribe(ConnectionId(1), SubscriberScope::Owner(alex));
    session.subscribe(ConnectionId(2), SubscriberScope::Owner(sam));

    let live = session.spawn("player_companions:pig", overworld(), IVec3::ZERO).unwrap();
    tame(&mut session, live, alex, "Alex");
    let id = session.actor(live).unwrap().companion_id();
    session.despawn(live);
    run(&mut session, &mut mirrors, 10);
    assert!(mirrors[&ConnectionId(1)].get_companion(id).is_some());
    assert!(mirrors[&ConnectionId(2)].get_companion(id).is_none());

    session
        .registry_mut()
        .update_companion(id, |r| r.set_owner(sam, "Sam"))
        .unwrap();
    pump(&mut session, &mut mirrors);
    assert!(mirrors[&ConnectionId(1)].get_companion(id).is_none());
    assert_eq!(mirrors[&ConnectionId(2)].get_companion(id).unwrap().owner(), Some(sam));

    session
        .registry_mut()
        .update_companion(id, |r| r.release_owner())
        .unwrap();
    pump(&mut session, &mut mirrors);
    assert!(mirrors[&ConnectionId(2)].get_companion(id).is_none());

    assert!(session.remove(id));
    pump(&mut session, &mut mirrors);
    for mirror in mirrors.values() {
        assert!(mirror.is_empty());
    }
}

#[test]
fn test_unsubscribed_connection_gets_nothing() {
    let mut session = session();
    session.subscribe(ConnectionId(4), SubscriberScope::All);
    assert!(session.unsubscribe(ConnectionId(4)));
    assert!(!session.unsubscribe(ConnectionId(4)));

    session.spawn("player_companions:pig", overworld(), IVec3::ZERO).unwrap();
    run(&mut session, &mut AHashMap::new(), 10);
    assert!(session.drain_outbound().is_empty());
}

// ============================================================================
// Stale Attachments
// ============================================================================

/// Integration test: a leftover actor for a respawned companion cannot
/// overwrite the record or reach mirrors
#[test]
fn test_stale_actor_produces_no_updates() {
    let mut session = session();
    let live = session.spawn("player_companions:raptor", overworld(), IVec3::ZERO).unwrap();
    let id = session.actor(live).unwrap().companion_id();
    run(&mut session, &mut AHashMap::new(), 10);

    let record = session.registry().get(id).unwrap().clone();
    let mut ghost = CompanionActor::from_record(&record, LiveInstanceId(999), session.config());
    ghost.set_health(1.0);

    session.subscribe(ConnectionId(1), SubscriberScope::All);
    session.drain_outbound();

    assert!(!ghost.sync_data(session.registry_mut()));
    assert!(ghost.is_dirty());
    assert!(session.drain_outbound().is_empty());
    assert_eq!(session.registry().get(id).unwrap().health(), record.health());
}
