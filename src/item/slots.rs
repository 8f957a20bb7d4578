//! Fixed-size ordered slot lists (inventory, hand, armor)

use crate::core::error::{CompanionError, Result};
use crate::item::{ItemCatalog, ItemStack};
use crate::tag::Tag;

/// An ordered list of item stacks whose length never changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotList {
    label: &'static str,
    slots: Vec<ItemStack>,
}

impl SlotList {
    /// Create `size` empty slots. `label` names the list in errors.
    pub fn new(label: &'static str, size: usize) -> Self {
        Self {
            label,
            slots: vec![ItemStack::empty(); size],
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(ItemStack::is_empty)
    }

    pub fn get(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index)
    }

    /// Write a slot, returning the stack it held before
    pub fn set(&mut self, index: usize, stack: ItemStack) -> Result<ItemStack> {
        let size = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(CompanionError::SlotOutOfRange {
                slots: self.label,
                index,
                size,
            })?;
        Ok(std::mem::replace(slot, stack))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter()
    }

    /// Overwrite every slot from `stacks`. Extra stacks are ignored and
    /// missing ones leave empty slots; the length stays fixed.
    pub fn copy_from(&mut self, stacks: &[ItemStack]) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            *slot = stacks.get(index).cloned().unwrap_or_default();
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = ItemStack::empty();
        }
    }

    /// Store a stack by merging into the first slot of the same kind that
    /// can take the whole stack, else the first empty slot.
    ///
    /// Returns false when neither exists; the slots are left untouched.
    pub fn store(&mut self, stack: ItemStack, catalog: &ItemCatalog) -> bool {
        if stack.is_empty() {
            return true;
        }

        let limit = catalog.max_stack_size(&stack.item);
        if stack.count > limit {
            return false;
        }

        if let Some(existing) = self
            .slots
            .iter_mut()
            .find(|s| s.is(&stack.item) && s.count + stack.count <= limit)
        {
            existing.grow(stack.count);
            return true;
        }

        if let Some(empty) = self.slots.iter_mut().find(|s| s.is_empty()) {
            *empty = stack;
            return true;
        }

        false
    }

    /// Encode non-empty slots as a list of slot entries
    pub fn to_tags(&self) -> Vec<Tag> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, stack)| !stack.is_empty())
            .map(|(slot, stack)| stack.to_tag(slot))
            .collect()
    }

    /// Fill slots from a list of slot entries. Entries outside the fixed
    /// range or not decodable are skipped.
    pub fn load_tags(&mut self, tags: &[Tag]) {
        self.clear();
        for tag in tags {
            if let Some((index, stack)) = ItemStack::from_tag(tag) {
                if let Some(slot) = self.slots.get_mut(index) {
                    *slot = stack;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_out_of_range_fails() {
        let mut slots = SlotList::new("hand", 2);
        assert!(slots.set(1, ItemStack::new("minecraft:bow", 1)).is_ok());
        let err = slots.set(2, ItemStack::new("minecraft:bow", 1)).unwrap_err();
        assert!(matches!(
            err,
            CompanionError::SlotOutOfRange { slots: "hand", index: 2, size: 2 }
        ));
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_store_merges_into_matching_slot() {
        let catalog = ItemCatalog::with_defaults();
        let mut slots = SlotList::new("inventory", 16);
        slots.set(3, ItemStack::new("minecraft:seagrass", 50)).unwrap();

        assert!(slots.store(ItemStack::new("minecraft:seagrass", 10), &catalog));
        assert_eq!(slots.get(3).unwrap().count, 60);
        // Earlier empty slots were not used
        assert!(slots.get(0).unwrap().is_empty());
    }

    #[test]
    fn test_store_overflow_goes_to_empty_slot() {
        let catalog = ItemCatalog::with_defaults();
        let mut slots = SlotList::new("inventory", 4);
        slots.set(0, ItemStack::new("minecraft:seagrass", 60)).unwrap();

        assert!(slots.store(ItemStack::new("minecraft:seagrass", 10), &catalog));
        assert_eq!(slots.get(0).unwrap().count, 60);
        assert_eq!(slots.get(1).unwrap(), &ItemStack::new("minecraft:seagrass", 10));
    }

    #[test]
    fn test_store_fills_exactly_to_limit() {
        let catalog = ItemCatalog::with_defaults();
        let mut slots = SlotList::new("inventory", 1);
        slots.set(0, ItemStack::new("minecraft:egg", 10)).unwrap();
        assert!(slots.store(ItemStack::new("minecraft:egg", 6), &catalog));
        assert_eq!(slots.get(0).unwrap().count, 16);
        assert!(!slots.store(ItemStack::new("minecraft:egg", 1), &catalog));
    }

    #[test]
    fn test_store_into_full_list_fails() {
        let catalog = ItemCatalog::with_defaults();
        let mut slots = SlotList::new("inventory", 16);
        for i in 0..16 {
            slots.set(i, ItemStack::new("minecraft:iron_sword", 1)).unwrap();
        }
        let before = slots.clone();

        assert!(!slots.store(ItemStack::new("minecraft:bow", 1), &catalog));
        assert_eq!(slots, before);
    }

    #[test]
    fn test_store_rejects_oversized_stack() {
        let catalog = ItemCatalog::with_defaults();
        let mut slots = SlotList::new("inventory", 4);
        assert!(!slots.store(ItemStack::new("minecraft:egg", 17), &catalog));
        assert!(slots.is_empty());
    }

    #[test]
    fn test_copy_from_keeps_length() {
        let mut slots = SlotList::new("armor", 4);
        slots.copy_from(&[ItemStack::new("minecraft:iron_boots", 1)]);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots.get(0).unwrap().item, "minecraft:iron_boots");

        let many = vec![ItemStack::new("minecraft:iron_helmet", 1); 6];
        slots.copy_from(&many);
        assert_eq!(slots.len(), 4);
    }

    #[test]
    fn test_tags_skip_out_of_range_entries() {
        let mut source = SlotList::new("inventory", 16);
        source.set(15, ItemStack::new("minecraft:seagrass", 5)).unwrap();
        let tags = source.to_tags();
        assert_eq!(tags.len(), 1);

        let mut smaller = SlotList::new("inventory", 4);
        smaller.load_tags(&tags);
        assert!(smaller.is_empty());

        let mut same = SlotList::new("inventory", 16);
        same.load_tags(&tags);
        assert_eq!(same, source);
    }
}
