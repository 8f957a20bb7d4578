//! Companion Store Inspector
//!
//! Lists the companions persisted in a store file and optionally dumps one
//! record as its tagged tree.

use clap::Parser;
use companion_sync::companion::codec::{self, SaveMode};
use companion_sync::companion::SlotSizes;
use companion_sync::core::types::{CompanionId, OwnerId};
use companion_sync::lifecycle::CompanionState;
use companion_sync::registry::{AuthoritativeRegistry, FileStore};
use companion_sync::tag::{io, Tag};
use std::path::PathBuf;
use uuid::Uuid;

/// Inspect a persisted companion store
#[derive(Parser, Debug)]
#[command(name = "companion_inspect")]
#[command(about = "List and dump companions from a persisted store file")]
struct Args {
    /// Store file to read
    #[arg(default_value = "companions.json")]
    store: PathBuf,

    /// Only list companions of this owner
    #[arg(long)]
    owner: Option<Uuid>,

    /// Dump the full record with this id
    #[arg(long)]
    dump: Option<Uuid>,

    /// Print the list as JSON summaries
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("companion_sync=warn")
        .init();

    let args = Args::parse();

    let registry = match AuthoritativeRegistry::open(
        Box::new(FileStore::new(&args.store)),
        SlotSizes::default(),
    ) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to open {}: {}", args.store.display(), e);
            std::process::exit(1);
        }
    };

    if let Some(id) = args.dump {
        let Some(record) = registry.get(CompanionId(id)) else {
            eprintln!("No companion {} in {}", id, args.store.display());
            std::process::exit(1);
        };
        match io::to_json(&Tag::Compound(codec::encode(record, SaveMode::Full))) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to render companion: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let records = match args.owner {
        Some(owner) => registry.companions_for_owner(OwnerId(owner)),
        None => registry.companions(),
    };

    if args.json {
        let summaries: Vec<_> = records.iter().map(|r| r.summary()).collect();
        match serde_json::to_string_pretty(&summaries) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to render summaries: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("{} companion(s) in {}", records.len(), args.store.display());
    for record in records {
        println!(
            "  {}  {:<16} {:<10} {:<24} {:>5.1}/{:<5.1} {:?}",
            record.id(),
            record.name(),
            record.kind().name(),
            record.owner_name(),
            record.health(),
            record.max_health(),
            CompanionState::of(record)
        );
    }
}
