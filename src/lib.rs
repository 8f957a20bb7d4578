//! Companion Sync - record replication and persistence for ownable companions

pub mod companion;
pub mod core;
pub mod item;
pub mod lifecycle;
pub mod registry;
pub mod session;
pub mod sync;
pub mod tag;
