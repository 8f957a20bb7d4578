//! Hierarchical tagged value tree
//!
//! A `Tag` is a self-describing typed value. `Compound` maps names to tags and
//! is the unit of persistence: companion records encode into one compound and
//! a storage file holds a compound whose list contains them.
//!
//! Typed getters follow the usual tagged-tree convention: an absent key or a
//! key holding a different type reads as the type's default. This is what lets
//! decoders accept partial or newer trees without failing.

pub mod io;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when a tree cannot be interpreted at all
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// The root of a tree was expected to be a compound
    #[error("Corrupt root: expected compound, found {found}")]
    CorruptRoot { found: &'static str },
}

/// A typed value in a tagged tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tag {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    String(String),
    Uuid(Uuid),
    IntArray(Vec<i32>),
    List(Vec<Tag>),
    Compound(Compound),
}

impl Tag {
    /// Name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Tag::Bool(_) => "bool",
            Tag::Int(_) => "int",
            Tag::Long(_) => "long",
            Tag::Float(_) => "float",
            Tag::String(_) => "string",
            Tag::Uuid(_) => "uuid",
            Tag::IntArray(_) => "int_array",
            Tag::List(_) => "list",
            Tag::Compound(_) => "compound",
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    /// Interpret this tag as a compound root, failing on any other type
    pub fn expect_compound(&self) -> Result<&Compound, CodecError> {
        self.as_compound().ok_or(CodecError::CorruptRoot {
            found: self.type_name(),
        })
    }
}

impl From<Compound> for Tag {
    fn from(compound: Compound) -> Self {
        Tag::Compound(compound)
    }
}

/// A map of named tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Compound {
    entries: BTreeMap<String, Tag>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, tag: Tag) -> Option<Tag> {
        self.entries.insert(key.into(), tag)
    }

    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    // === WRITERS ===

    pub fn put_bool(&mut self, key: &str, value: bool) {
        self.insert(key, Tag::Bool(value));
    }

    pub fn put_int(&mut self, key: &str, value: i32) {
        self.insert(key, Tag::Int(value));
    }

    pub fn put_long(&mut self, key: &str, value: i64) {
        self.insert(key, Tag::Long(value));
    }

    pub fn put_float(&mut self, key: &str, value: f32) {
        self.insert(key, Tag::Float(value));
    }

    pub fn put_string(&mut self, key: &str, value: impl Into<String>) {
        self.insert(key, Tag::String(value.into()));
    }

    pub fn put_uuid(&mut self, key: &str, value: Uuid) {
        self.insert(key, Tag::Uuid(value));
    }

    pub fn put_int_array(&mut self, key: &str, value: Vec<i32>) {
        self.insert(key, Tag::IntArray(value));
    }

    pub fn put_list(&mut self, key: &str, value: Vec<Tag>) {
        self.insert(key, Tag::List(value));
    }

    pub fn put_compound(&mut self, key: &str, value: Compound) {
        self.insert(key, Tag::Compound(value));
    }

    // === READERS ===

    pub fn get_bool(&self, key: &str) -> bool {
        self.get_bool_opt(key).unwrap_or(false)
    }

    pub fn get_bool_opt(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Tag::Bool(value) => Some(*value),
            Tag::Int(value) => Some(*value != 0),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> i32 {
        match self.get(key) {
            Some(Tag::Int(value)) => *value,
            Some(Tag::Long(value)) => i32::try_from(*value).unwrap_or(0),
            _ => 0,
        }
    }

    pub fn get_long(&self, key: &str) -> i64 {
        match self.get(key) {
            Some(Tag::Long(value)) => *value,
            Some(Tag::Int(value)) => i64::from(*value),
            _ => 0,
        }
    }

    pub fn get_float(&self, key: &str) -> f32 {
        match self.get(key) {
            Some(Tag::Float(value)) => *value,
            Some(Tag::Int(value)) => *value as f32,
            _ => 0.0,
        }
    }

    pub fn get_string(&self, key: &str) -> &str {
        self.get_string_opt(key).unwrap_or("")
    }

    pub fn get_string_opt(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Tag::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Read a uuid stored natively, as a hyphenated string, or as four ints
    pub fn get_uuid(&self, key: &str) -> Option<Uuid> {
        match self.get(key)? {
            Tag::Uuid(value) => Some(*value),
            Tag::String(value) => Uuid::parse_str(value).ok(),
            Tag::IntArray(parts) if parts.len() == 4 => {
                let mut bytes = [0u8; 16];
                for (chunk, part) in bytes.chunks_mut(4).zip(parts) {
                    chunk.copy_from_slice(&part.to_be_bytes());
                }
                Some(Uuid::from_bytes(bytes))
            }
            _ => None,
        }
    }

    pub fn get_int_array(&self, key: &str) -> &[i32] {
        match self.get(key) {
            Some(Tag::IntArray(values)) => values,
            _ => &[],
        }
    }

    pub fn get_list(&self, key: &str) -> &[Tag] {
        match self.get(key) {
            Some(Tag::List(values)) => values,
            _ => &[],
        }
    }

    pub fn get_compound(&self, key: &str) -> Option<&Compound> {
        self.get(key)?.as_compound()
    }
}
