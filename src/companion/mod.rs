//! Companion data model
//!
//! Records, the codec that maps them to tagged trees, kind/species tables and
//! the live simulation actor.

pub mod actor;
pub mod codec;
pub mod kind;
pub mod record;

pub use actor::{ActorTick, CompanionActor, CompanionCommand, LiveActor, TargetRef};
pub use codec::SaveMode;
pub use kind::{CompanionKind, KindProfile, SpeciesProfile};
pub use record::{CompanionRecord, CompanionSummary, SlotSizes};
