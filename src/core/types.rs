//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier for a companion, unchanged across respawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanionId(pub Uuid);

impl CompanionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The nil id marks a record decoded from a tree without a usable id
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for CompanionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompanionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the player that owns a companion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-local handle of the currently instantiated actor object.
///
/// Changes every time the actor is recreated; only meaningful for lookups
/// by transient handle on the mirror side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LiveInstanceId(pub i32);

/// Simulation tick counter
pub type Tick = u64;

/// Wall-clock time in seconds since the unix epoch
pub type EpochSeconds = i64;

/// Current wall-clock time as epoch seconds
pub fn now_epoch_seconds() -> EpochSeconds {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as EpochSeconds)
        .unwrap_or(0)
}

/// Reference to a world partition by key, since the partition may not be loaded.
///
/// Persisted as the composite `"<registry>/<location>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LevelKey {
    pub registry: String,
    pub location: String,
}

impl LevelKey {
    pub fn new(registry: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            location: location.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty() && self.location.is_empty()
    }

    /// Composite key as stored in persisted trees
    pub fn composite(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("{}/{}", self.registry, self.location)
        }
    }

    /// Parse a composite key. The location keeps any further `/` segments.
    pub fn parse(composite: &str) -> Self {
        match composite.split_once('/') {
            Some((registry, location)) => Self::new(registry, location),
            None => Self::new("", composite),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_companion_id_uniqueness() {
        let a = CompanionId::new();
        let b = CompanionId::new();
        assert_ne!(a, b);
        assert!(!a.is_nil());
        assert!(CompanionId::nil().is_nil());
    }

    #[test]
    fn test_companion_id_hash() {
        use std::collections::HashMap;
        let id = CompanionId::new();
        let mut map: HashMap<CompanionId, &str> = HashMap::new();
        map.insert(id, "snail");
        assert_eq!(map.get(&id), Some(&"snail"));
    }

    #[test]
    fn test_level_key_composite() {
        let key = LevelKey::new("minecraft:dimension", "minecraft:overworld");
        assert_eq!(key.composite(), "minecraft:dimension/minecraft:overworld");
        assert_eq!(LevelKey::parse(&key.composite()), key);
    }

    #[test]
    fn test_level_key_empty() {
        assert_eq!(LevelKey::default().composite(), "");
        assert_eq!(LevelKey::parse(""), LevelKey::default());
    }
}
