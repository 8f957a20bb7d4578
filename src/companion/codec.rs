//! Encode/decode between `CompanionRecord` and tagged trees
//!
//! Encoding never fails. Decoding only fails when the root is not a compound;
//! every absent or mistyped key falls back to the record default, and keys
//! this version does not know are ignored.

use crate::companion::kind::CompanionKind;
use crate::companion::record::{CompanionRecord, SlotSizes};
use crate::core::types::{CompanionId, LevelKey, LiveInstanceId, OwnerId};
use crate::tag::{CodecError, Compound, Tag};
use glam::IVec3;

pub const ID_TAG: &str = "id";
pub const NAME_TAG: &str = "name";
pub const TYPE_TAG: &str = "type";
pub const OWNER_TAG: &str = "owner";
pub const OWNER_NAME_TAG: &str = "ownerName";
pub const ACTIVE_TAG: &str = "active";
pub const REMOVED_TAG: &str = "removed";
pub const POSITION_TAG: &str = "position";
pub const LEVEL_TAG: &str = "levelName";
pub const ENTITY_ID_TAG: &str = "entityId";
pub const ENTITY_DIMENSION_TAG: &str = "entityDimension";
pub const ENTITY_TYPE_TAG: &str = "entityType";
pub const ENTITY_DATA_TAG: &str = "entityData";
pub const ENTITY_SITTING_TAG: &str = "entitySitting";
pub const ENTITY_ORDERED_TO_POSITION_TAG: &str = "entityOrderedToPosition";
pub const ENTITY_HEALTH_TAG: &str = "entityHealth";
pub const ENTITY_HEALTH_MAX_TAG: &str = "entityHealthMax";
pub const ENTITY_RESPAWN_TIMER_TAG: &str = "entityRespawnTimer";
pub const ENTITY_TARGET_TAG: &str = "entityTarget";
pub const ARMOR_ITEMS_TAG: &str = "armorItems";
pub const HAND_ITEMS_TAG: &str = "handItems";
pub const INVENTORY_ITEMS_TAG: &str = "inventoryItems";

/// How much of a record to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Everything, including the actor restoration blob
    Full,
    /// Everything except the restoration blob, for lists and summaries
    MetadataOnly,
}

/// Encode a record as a compound tag
pub fn encode(record: &CompanionRecord, mode: SaveMode) -> Compound {
    let mut tag = Compound::new();

    tag.put_uuid(ID_TAG, record.id().0);
    tag.put_string(NAME_TAG, record.name());
    tag.put_string(TYPE_TAG, record.kind().name());
    if let Some(owner) = record.owner() {
        tag.put_uuid(OWNER_TAG, owner.0);
        tag.put_string(OWNER_NAME_TAG, record.owner_name());
    }
    tag.put_bool(ACTIVE_TAG, record.is_active());
    tag.put_bool(REMOVED_TAG, record.is_removed());

    let position = record.position();
    tag.put_int_array(POSITION_TAG, vec![position.x, position.y, position.z]);
    if !record.level().is_empty() {
        tag.put_string(LEVEL_TAG, record.level().composite());
    }

    tag.put_int(ENTITY_ID_TAG, record.live_instance_id().0);
    tag.put_string(ENTITY_DIMENSION_TAG, record.dimension());
    tag.put_string(ENTITY_TYPE_TAG, record.entity_type());
    tag.put_bool(ENTITY_SITTING_TAG, record.is_ordered_to_sit());
    tag.put_bool(ENTITY_ORDERED_TO_POSITION_TAG, record.is_ordered_to_position());
    tag.put_float(ENTITY_HEALTH_TAG, record.health());
    tag.put_float(ENTITY_HEALTH_MAX_TAG, record.max_health());
    tag.put_long(ENTITY_RESPAWN_TIMER_TAG, record.respawn_timer());
    tag.put_string(ENTITY_TARGET_TAG, record.target());

    if mode == SaveMode::Full {
        if let Some(data) = record.entity_data() {
            tag.put_compound(ENTITY_DATA_TAG, data.clone());
        }
    }

    tag.put_list(ARMOR_ITEMS_TAG, record.armor_items().to_tags());
    tag.put_list(HAND_ITEMS_TAG, record.hand_items().to_tags());
    tag.put_list(INVENTORY_ITEMS_TAG, record.inventory_items().to_tags());

    tag
}

/// Decode a record from a tree root with default slot sizes
pub fn decode(root: &Tag) -> Result<CompanionRecord, CodecError> {
    decode_sized(root, SlotSizes::default())
}

/// Decode a record from a tree root
pub fn decode_sized(root: &Tag, sizes: SlotSizes) -> Result<CompanionRecord, CodecError> {
    let compound = root.expect_compound()?;
    Ok(decode_compound(compound, sizes))
}

/// Decode a record from a compound. Never fails; see module docs.
pub fn decode_compound(tag: &Compound, sizes: SlotSizes) -> CompanionRecord {
    let id = match tag.get_uuid(ID_TAG) {
        Some(uuid) => CompanionId(uuid),
        None => {
            tracing::warn!(
                "Persisted companion without a usable id (keys: {:?}); using nil id",
                tag.keys().collect::<Vec<_>>()
            );
            CompanionId::nil()
        }
    };

    let mut record = CompanionRecord::with_sizes(id, sizes);

    record.set_name(tag.get_string(NAME_TAG));
    if let Some(kind) = tag.get_string_opt(TYPE_TAG) {
        record.set_kind(CompanionKind::from_name(kind));
    }
    if let Some(owner) = tag.get_uuid(OWNER_TAG) {
        record.set_owner(OwnerId(owner), tag.get_string(OWNER_NAME_TAG));
    }
    record.set_active(tag.get_bool_opt(ACTIVE_TAG).unwrap_or(true));
    record.set_removed(tag.get_bool(REMOVED_TAG));

    if let [x, y, z] = tag.get_int_array(POSITION_TAG) {
        record.set_position(IVec3::new(*x, *y, *z));
    }
    if let Some(level) = tag.get_string_opt(LEVEL_TAG) {
        record.set_level(LevelKey::parse(level));
    }

    record.set_live_instance_id(LiveInstanceId(tag.get_int(ENTITY_ID_TAG)));
    record.set_dimension(tag.get_string(ENTITY_DIMENSION_TAG));
    record.set_entity_type(tag.get_string(ENTITY_TYPE_TAG));
    record.set_entity_data(tag.get_compound(ENTITY_DATA_TAG).cloned());
    record.set_ordered_to_sit(tag.get_bool(ENTITY_SITTING_TAG));
    record.set_ordered_to_position(tag.get_bool(ENTITY_ORDERED_TO_POSITION_TAG));
    record.set_health(tag.get_float(ENTITY_HEALTH_TAG));
    record.set_max_health(tag.get_float(ENTITY_HEALTH_MAX_TAG));
    record.set_respawn_timer(tag.get_long(ENTITY_RESPAWN_TIMER_TAG));
    record.set_target(tag.get_string(ENTITY_TARGET_TAG));

    let (armor, hand, inventory) = record.slots_mut();
    armor.load_tags(tag.get_list(ARMOR_ITEMS_TAG));
    hand.load_tags(tag.get_list(HAND_ITEMS_TAG));
    inventory.load_tags(tag.get_list(INVENTORY_ITEMS_TAG));

    record.clear_dirty();
    tracing::trace!("Decoded companion {}", record);
    record
}
