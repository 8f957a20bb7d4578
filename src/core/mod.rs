pub mod config;
pub mod error;
pub mod types;

pub use config::SyncConfig;
pub use error::{CompanionError, Result};
pub use types::{CompanionId, EpochSeconds, LevelKey, LiveInstanceId, OwnerId, Tick};
