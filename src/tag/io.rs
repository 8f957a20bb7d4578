//! Reading and writing tagged trees as JSON files

use crate::core::error::Result;
use crate::tag::Tag;
use std::path::Path;

/// Parse a tree from a JSON string
pub fn from_json(json: &str) -> Result<Tag> {
    Ok(serde_json::from_str(json)?)
}

/// Render a tree as pretty-printed JSON
pub fn to_json(tag: &Tag) -> Result<String> {
    Ok(serde_json::to_string_pretty(tag)?)
}

/// Load a tree from a JSON file on disk
pub fn read_file(path: &Path) -> Result<Tag> {
    let content = std::fs::read_to_string(path)?;
    from_json(&content)
}

/// Write a tree to disk.
///
/// The content goes to a sibling temporary file first and is renamed over the
/// target, so an interrupted write never leaves a truncated file behind.
pub fn write_file(path: &Path, tag: &Tag) -> Result<()> {
    let content = to_json(tag)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
