//! Companion registries
//!
//! The authoritative registry owns every record and its persistence; mirrors
//! hold read-only copies fed by sync messages.

pub mod authoritative;
pub mod mirror;
pub mod store;

pub use authoritative::AuthoritativeRegistry;
pub use mirror::MirrorRegistry;
pub use store::{CompanionStore, FileStore, MemoryStore, STORE_VERSION};
