//! Companion Sync - Session Driver
//!
//! Runs a scripted session against a store on disk: spawns and tames a few
//! companions, ticks them, kills one, resumes it once its respawn deadline
//! passes, mirrors everything through a subscribed connection and saves.

use clap::Parser;
use companion_sync::companion::{CompanionCommand, LiveActor, TargetRef};
use companion_sync::core::error::Result;
use companion_sync::core::types::{now_epoch_seconds, LevelKey, OwnerId};
use companion_sync::core::SyncConfig;
use companion_sync::item::{ItemCatalog, ItemStack};
use companion_sync::lifecycle::TameOutcome;
use companion_sync::registry::{FileStore, MirrorRegistry};
use companion_sync::session::Session;
use companion_sync::sync::{ConnectionId, SubscriberScope};
use glam::IVec3;
use std::path::PathBuf;

/// Scripted companion session
#[derive(Parser, Debug)]
#[command(name = "companion-sync")]
#[command(about = "Run a scripted companion session and persist the result")]
struct Args {
    /// Store file the session loads from and saves to
    #[arg(long, default_value = "companions.json")]
    store: PathBuf,

    /// Optional TOML config overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Optional TOML table of per-item stack limits
    #[arg(long)]
    items: Option<PathBuf>,

    /// Random seed for the taming gate
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Ticks to run between scripted steps
    #[arg(long, default_value_t = 40)]
    ticks: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("companion_sync=debug")
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };
    let respawn_delay = config.respawn_delay_secs;

    let catalog = match &args.items {
        Some(path) => ItemCatalog::load_from_toml(path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring item catalog {}: {}", path.display(), e);
            ItemCatalog::with_defaults()
        }),
        None => ItemCatalog::with_defaults(),
    };

    let mut session = Session::start(config, Box::new(FileStore::new(&args.store)), args.seed)?
        .with_catalog(catalog);
    let mut mirror = MirrorRegistry::new(session.registry().slot_sizes());
    session.subscribe(ConnectionId(1), SubscriberScope::All);

    let owner = OwnerId::new();
    let overworld = LevelKey::new("minecraft:dimension", "minecraft:overworld");

    // Spawn one of each collector and guard and tame them
    let mut handles = Vec::new();
    for (entity_type, x) in [("player_companions:snail", 0), ("player_companions:raptor", 8)] {
        let live = session.spawn(entity_type, overworld.clone(), IVec3::new(x, 64, 0))?;
        let tame_item = session
            .actor(live)
            .and_then(|actor| actor.species())
            .map(|species| species.tame_item)
            .unwrap_or_default();

        // Keep offering until tamed or the stack runs out
        let mut offer = ItemStack::new(tame_item, 16);
        while let Some(TameOutcome::Failed) = session.tame(live, owner, "Steve", &mut offer) {}
        session.command(live, CompanionCommand::Follow);
        handles.push(live);
    }

    // The guard picks a fight
    if let Some(&guard) = handles.last() {
        session.set_target(guard, Some(TargetRef::new("minecraft:zombie")));
    }

    run_ticks(&mut session, &mut mirror, args.ticks);

    // The collector picks something up
    if let Some(id) = handles
        .first()
        .and_then(|&live| session.actor(live))
        .map(|actor| actor.companion_id())
    {
        let stored = session.store_item(id, ItemStack::new("minecraft:seagrass", 12))?;
        println!("Collector stored seagrass: {}", stored);
    }

    // Kill the guard and bring it back once the deadline has passed
    let now = now_epoch_seconds();
    if let Some(&guard) = handles.last() {
        let id = session.actor(guard).map(|actor| actor.companion_id());
        let state = session.kill(guard, now);
        println!("Guard died: {:?}", state);

        let resumed = session.respawn_due(now + respawn_delay + 1);
        println!("Resumed {} companion(s)", resumed.len());
        if let Some(id) = id {
            println!("Guard live handle is now {:?}", session.live_instance_of(id));
        }
    }

    run_ticks(&mut session, &mut mirror, args.ticks);

    println!();
    println!("=== COMPANIONS ({}) ===", mirror.len());
    for record in mirror.companions_for_owner(owner) {
        println!("  {}", record);
    }

    session.end()
}

fn run_ticks(session: &mut Session, mirror: &mut MirrorRegistry, ticks: u32) {
    for _ in 0..ticks {
        session.tick();
        for envelope in session.drain_outbound() {
            mirror.apply(&envelope.message);
        }
    }
}
