//! Item catalog - per-item stack limits
//!
//! Items not listed in the catalog stack up to `DEFAULT_MAX_STACK`.

use ahash::AHashMap;
use serde::Deserialize;

/// Stack limit for items the catalog does not list
pub const DEFAULT_MAX_STACK: u32 = 64;

/// Catalog of item stack limits
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    max_stack: AHashMap<String, u32>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Common limits for tools, armor and the smaller stackables
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        for item in [
            "minecraft:iron_sword",
            "minecraft:wooden_sword",
            "minecraft:bow",
            "minecraft:shield",
            "minecraft:leather_helmet",
            "minecraft:leather_chestplate",
            "minecraft:leather_leggings",
            "minecraft:leather_boots",
            "minecraft:iron_helmet",
            "minecraft:iron_chestplate",
            "minecraft:iron_leggings",
            "minecraft:iron_boots",
        ] {
            catalog.set_max_stack(item, 1);
        }

        for item in ["minecraft:egg", "minecraft:snowball", "minecraft:ender_pearl"] {
            catalog.set_max_stack(item, 16);
        }

        catalog
    }

    /// Set the stack limit for an item kind
    pub fn set_max_stack(&mut self, item: impl Into<String>, max: u32) {
        self.max_stack.insert(item.into(), max.max(1));
    }

    /// Stack limit for an item kind
    pub fn max_stack_size(&self, item: &str) -> u32 {
        self.max_stack
            .get(item)
            .copied()
            .unwrap_or(DEFAULT_MAX_STACK)
    }

    /// Load limits from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self, CatalogLoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogLoadError::IoError(e.to_string()))?;
        Self::parse_toml(&content)
    }

    /// Parse limits from a TOML string, layered over the defaults
    ///
    /// ```toml
    /// [max_stack]
    /// "player_companions:tame_seagrass" = 1
    /// ```
    pub fn parse_toml(content: &str) -> Result<Self, CatalogLoadError> {
        let toml_data: TomlCatalog =
            toml::from_str(content).map_err(|e| CatalogLoadError::ParseError(e.to_string()))?;

        let mut catalog = Self::with_defaults();
        for (item, max) in toml_data.max_stack {
            if max == 0 {
                return Err(CatalogLoadError::InvalidLimit(item));
            }
            catalog.set_max_stack(item, max);
        }
        Ok(catalog)
    }
}

/// Error type for catalog loading
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogLoadError {
    IoError(String),
    ParseError(String),
    InvalidLimit(String),
}

impl std::fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogLoadError::IoError(msg) => write!(f, "IO error: {}", msg),
            CatalogLoadError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            CatalogLoadError::InvalidLimit(item) => {
                write!(f, "Stack limit for {} must be positive", item)
            }
        }
    }
}

impl std::error::Error for CatalogLoadError {}

#[derive(Debug, Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    max_stack: std::collections::HashMap<String, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit() {
        let catalog = ItemCatalog::with_defaults();
        assert_eq!(catalog.max_stack_size("minecraft:seagrass"), DEFAULT_MAX_STACK);
        assert_eq!(catalog.max_stack_size("minecraft:iron_sword"), 1);
        assert_eq!(catalog.max_stack_size("minecraft:egg"), 16);
    }

    #[test]
    fn test_parse_toml_overrides() {
        let catalog = ItemCatalog::parse_toml(
            r#"
            [max_stack]
            "minecraft:seagrass" = 32
            "#,
        )
        .unwrap();
        assert_eq!(catalog.max_stack_size("minecraft:seagrass"), 32);
        // Defaults survive
        assert_eq!(catalog.max_stack_size("minecraft:egg"), 16);
    }

    #[test]
    fn test_parse_toml_rejects_zero() {
        let result = ItemCatalog::parse_toml(
            r#"
            [max_stack]
            "minecraft:seagrass" = 0
            "#,
        );
        assert_eq!(
            result.unwrap_err(),
            CatalogLoadError::InvalidLimit("minecraft:seagrass".into())
        );
    }
}
