//! Persistence backends for the authoritative registry

use crate::core::error::Result;
use crate::tag::{io, Compound, Tag};
use std::path::{Path, PathBuf};

/// Version written into every storage root
pub const STORE_VERSION: i32 = 1;

const VERSION_TAG: &str = "version";
const COMPANIONS_TAG: &str = "companions";

/// Where encoded companion trees live between sessions
pub trait CompanionStore {
    /// Load every persisted companion tree
    fn load_all(&self) -> Result<Vec<Compound>>;

    /// Replace the persisted set with `trees`
    fn save_all(&mut self, trees: &[Compound]) -> Result<()>;
}

/// Store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CompanionStore for FileStore {
    fn load_all(&self) -> Result<Vec<Compound>> {
        if !self.path.exists() {
            tracing::debug!("No companion store at {}, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let root = io::read_file(&self.path)?;
        let root = root.expect_compound()?;

        let version = root.get_int(VERSION_TAG);
        if version != STORE_VERSION {
            tracing::warn!(
                "Companion store {} has version {}, expected {}",
                self.path.display(),
                version,
                STORE_VERSION
            );
        }

        let mut trees = Vec::new();
        for entry in root.get_list(COMPANIONS_TAG) {
            match entry {
                Tag::Compound(tree) => trees.push(tree.clone()),
                other => tracing::warn!(
                    "Skipping {} entry in companion store {}",
                    other.type_name(),
                    self.path.display()
                ),
            }
        }
        Ok(trees)
    }

    fn save_all(&mut self, trees: &[Compound]) -> Result<()> {
        let mut root = Compound::new();
        root.put_int(VERSION_TAG, STORE_VERSION);
        root.put_list(
            COMPANIONS_TAG,
            trees.iter().cloned().map(Tag::Compound).collect(),
        );

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        io::write_file(&self.path, &Tag::Compound(root))
    }
}

/// In-memory store for tests and diskless sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    trees: Vec<Compound>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with trees already "on disk"
    pub fn with_trees(trees: Vec<Compound>) -> Self {
        Self { trees, saves: 0 }
    }

    pub fn trees(&self) -> &[Compound] {
        &self.trees
    }

    /// Number of completed save passes
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl CompanionStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Compound>> {
        Ok(self.trees.clone())
    }

    fn save_all(&mut self, trees: &[Compound]) -> Result<()> {
        self.trees = trees.to_vec();
        self.saves += 1;
        Ok(())
    }
}
