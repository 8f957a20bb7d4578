//! Companion sync configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use crate::core::error::{CompanionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for record synchronization and the respawn lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    // === SYNC CADENCE ===
    /// Ticks a dirty live actor waits before flushing into the registry
    ///
    /// Mutations made within this window coalesce into a single update.
    /// Propagation latency to the registry is bounded by this many ticks.
    pub data_sync_ticks: u32,

    /// Ticks between behavior updates for an inactive actor
    ///
    /// Inactive (resting) companions skip most of their per-tick work.
    /// They still flush dirty state on the regular cadence.
    pub inactive_tick_interval: u32,

    // === RESPAWN ===
    /// Whether a tamed companion comes back after death
    ///
    /// When false, death retires the companion permanently (active = false,
    /// no timer).
    pub respawn_on_death: bool,

    /// Seconds between death and eligibility to respawn
    ///
    /// Only delays greater than one second start a timer. Shorter delays
    /// make the companion eligible immediately.
    pub respawn_delay_secs: i64,

    /// Whether companions may target actors owned by the same player
    pub friendly_fire: bool,

    // === SLOTS ===
    /// Inventory slot count per companion
    pub inventory_size: usize,

    /// Hand slot count per companion
    pub hand_size: usize,

    /// Armor slot count per companion
    pub armor_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            data_sync_ticks: 10,
            inactive_tick_interval: 100,

            respawn_on_death: true,
            respawn_delay_secs: 120,
            friendly_fire: false,

            inventory_size: 16,
            hand_size: 2,
            armor_size: 4,
        }
    }
}

impl SyncConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SyncConfig =
            toml::from_str(content).map_err(|e| CompanionError::Config(e.to_string()))?;
        config.validate().map_err(CompanionError::Config)?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.data_sync_ticks == 0 {
            return Err("data_sync_ticks must be at least 1".into());
        }

        if self.inactive_tick_interval == 0 {
            return Err("inactive_tick_interval must be at least 1".into());
        }

        if self.respawn_delay_secs < 0 {
            return Err(format!(
                "respawn_delay_secs ({}) must not be negative",
                self.respawn_delay_secs
            ));
        }

        if self.inventory_size == 0 || self.hand_size == 0 || self.armor_size == 0 {
            return Err("slot sizes must be positive".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.inventory_size, 16);
        assert_eq!(config.hand_size, 2);
        assert_eq!(config.armor_size, 4);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SyncConfig::from_toml_str(
            r#"
            respawn_on_death = false
            data_sync_ticks = 4
            "#,
        )
        .unwrap();
        assert!(!config.respawn_on_death);
        assert_eq!(config.data_sync_ticks, 4);
        assert_eq!(config.respawn_delay_secs, 120);
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        let result = SyncConfig::from_toml_str("data_sync_ticks = 0");
        assert!(matches!(result, Err(CompanionError::Config(_))));

        let result = SyncConfig::from_toml_str("respawn_delay_secs = -5");
        assert!(matches!(result, Err(CompanionError::Config(_))));
    }
}
