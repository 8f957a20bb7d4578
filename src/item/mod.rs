//! Item stacks, per-item stack limits and fixed-size slot lists

pub mod catalog;
pub mod slots;

pub use catalog::{ItemCatalog, DEFAULT_MAX_STACK};
pub use slots::SlotList;

use crate::tag::{Compound, Tag};
use serde::{Deserialize, Serialize};

/// A count of one item kind held in a slot
///
/// A stack with an empty item key or a zero count is the empty stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Registered item key, e.g. `minecraft:seagrass`
    pub item: String,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_empty() || self.count == 0
    }

    /// Check whether this stack holds the given item kind
    pub fn is(&self, item: &str) -> bool {
        !self.is_empty() && self.item == item
    }

    pub fn grow(&mut self, amount: u32) {
        self.count = self.count.saturating_add(amount);
    }

    /// Remove up to `amount` items, returning how many were removed
    pub fn shrink(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.count);
        self.count -= removed;
        if self.count == 0 {
            self.item.clear();
        }
        removed
    }

    /// Encode as a slot entry of an item list
    pub fn to_tag(&self, slot: usize) -> Tag {
        let mut compound = Compound::new();
        compound.put_int("slot", slot as i32);
        compound.put_string("id", self.item.clone());
        compound.put_int("count", self.count as i32);
        Tag::Compound(compound)
    }

    /// Decode a slot entry, returning its slot index and stack
    pub fn from_tag(tag: &Tag) -> Option<(usize, ItemStack)> {
        let compound = tag.as_compound()?;
        let slot = usize::try_from(compound.get_int("slot")).ok()?;
        let count = u32::try_from(compound.get_int("count")).unwrap_or(0);
        let stack = ItemStack::new(compound.get_string("id"), count);
        Some((slot, stack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack() {
        assert!(ItemStack::empty().is_empty());
        assert!(ItemStack::new("minecraft:egg", 0).is_empty());
        assert!(ItemStack::new("", 5).is_empty());
        assert!(!ItemStack::new("minecraft:egg", 1).is_empty());
    }

    #[test]
    fn test_is_ignores_empty_stacks() {
        let stack = ItemStack::new("minecraft:egg", 0);
        assert!(!stack.is("minecraft:egg"));
        assert!(ItemStack::new("minecraft:egg", 3).is("minecraft:egg"));
    }

    #[test]
    fn test_shrink_to_zero_empties_stack() {
        let mut stack = ItemStack::new("minecraft:egg", 3);
        assert_eq!(stack.shrink(5), 3);
        assert!(stack.is_empty());
        assert_eq!(stack, ItemStack::empty());
    }

    #[test]
    fn test_slot_entry_tag() {
        let stack = ItemStack::new("minecraft:seagrass", 12);
        let (slot, decoded) = ItemStack::from_tag(&stack.to_tag(7)).unwrap();
        assert_eq!(slot, 7);
        assert_eq!(decoded, stack);

        // Negative slots are rejected
        let mut compound = Compound::new();
        compound.put_int("slot", -1);
        assert!(ItemStack::from_tag(&Tag::Compound(compound)).is_none());
    }
}
