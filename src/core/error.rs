use crate::core::types::{CompanionId, LiveInstanceId};
use crate::tag::CodecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompanionError {
    #[error("Companion not found: {0}")]
    NotFound(CompanionId),

    #[error("Slot {index} out of range for {slots} slots of size {size}")]
    SlotOutOfRange {
        slots: &'static str,
        index: usize,
        size: usize,
    },

    #[error("Companion {id} already attached to live instance {live:?}")]
    AlreadyAttached { id: CompanionId, live: LiveInstanceId },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CompanionError>;
