//! Companion kinds and their capability tables
//!
//! A record stores only the kind tag. Everything that differs between kinds
//! (goal set, whether the inventory is usable) lives in a `KindProfile`, and
//! everything that differs between species of the same kind (tame item, food,
//! default attributes) lives in a `SpeciesProfile` keyed by entity type.

use serde::{Deserialize, Serialize};

/// Behavioral category of a companion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompanionKind {
    Collector,
    Follower,
    Guard,
    Healer,
    Lighting,
    Supporter,
    #[default]
    Unknown,
}

impl CompanionKind {
    pub const ALL: [CompanionKind; 7] = [
        CompanionKind::Collector,
        CompanionKind::Follower,
        CompanionKind::Guard,
        CompanionKind::Healer,
        CompanionKind::Lighting,
        CompanionKind::Supporter,
        CompanionKind::Unknown,
    ];

    /// Name as persisted in the `type` key
    pub fn name(&self) -> &'static str {
        match self {
            CompanionKind::Collector => "COLLECTOR",
            CompanionKind::Follower => "FOLLOWER",
            CompanionKind::Guard => "GUARD",
            CompanionKind::Healer => "HEALER",
            CompanionKind::Lighting => "LIGHTING",
            CompanionKind::Supporter => "SUPPORTER",
            CompanionKind::Unknown => "UNKNOWN",
        }
    }

    /// Parse a persisted name; anything unrecognised is `Unknown`
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
            .unwrap_or_default()
    }

    pub fn profile(&self) -> KindProfile {
        match self {
            CompanionKind::Collector => KindProfile {
                inventory_enabled: true,
                goals: &[
                    Goal::Float,
                    Goal::Panic,
                    Goal::MoveToPosition,
                    Goal::SitWhenOrdered,
                    Goal::FollowOwner,
                    Goal::CollectItems,
                    Goal::LookAtPlayer,
                ],
            },
            CompanionKind::Follower => KindProfile {
                inventory_enabled: false,
                goals: &[
                    Goal::Float,
                    Goal::Panic,
                    Goal::MoveToPosition,
                    Goal::SitWhenOrdered,
                    Goal::FollowOwner,
                    Goal::LookAtPlayer,
                ],
            },
            CompanionKind::Guard => KindProfile {
                inventory_enabled: false,
                goals: &[
                    Goal::Float,
                    Goal::MoveToPosition,
                    Goal::SitWhenOrdered,
                    Goal::LeapAtTarget,
                    Goal::MeleeAttack,
                    Goal::FollowOwner,
                    Goal::OwnerHurtByTarget,
                    Goal::HurtByTarget,
                ],
            },
            CompanionKind::Healer => KindProfile {
                inventory_enabled: false,
                goals: &[
                    Goal::Float,
                    Goal::Panic,
                    Goal::SitWhenOrdered,
                    Goal::HealOwner,
                    Goal::FollowOwner,
                ],
            },
            CompanionKind::Lighting => KindProfile {
                inventory_enabled: false,
                goals: &[Goal::Float, Goal::SitWhenOrdered, Goal::FollowOwner],
            },
            CompanionKind::Supporter => KindProfile {
                inventory_enabled: false,
                goals: &[
                    Goal::Float,
                    Goal::Panic,
                    Goal::SitWhenOrdered,
                    Goal::SupportOwner,
                    Goal::FollowOwner,
                ],
            },
            CompanionKind::Unknown => KindProfile {
                inventory_enabled: false,
                goals: &[],
            },
        }
    }
}

impl std::fmt::Display for CompanionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Behavior goals a kind registers with the movement AI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Goal {
    Float,
    Panic,
    MoveToPosition,
    SitWhenOrdered,
    FollowOwner,
    LeapAtTarget,
    MeleeAttack,
    HurtByTarget,
    OwnerHurtByTarget,
    HealOwner,
    SupportOwner,
    CollectItems,
    LookAtPlayer,
}

/// Capabilities shared by every species of a kind
#[derive(Debug, Clone, Copy)]
pub struct KindProfile {
    /// Whether the inventory slots are exposed to the owner
    pub inventory_enabled: bool,
    pub goals: &'static [Goal],
}

/// Per-species data keyed by registered entity type
#[derive(Debug, Clone, Copy)]
pub struct SpeciesProfile {
    pub entity_type: &'static str,
    pub kind: CompanionKind,
    /// Item offered to tame an untamed companion
    pub tame_item: &'static str,
    /// Items that heal a tamed companion
    pub food_items: &'static [&'static str],
    pub max_health: f32,
    pub attack_damage: f32,
    pub movement_speed: f32,
}

impl SpeciesProfile {
    pub fn is_food(&self, item: &str) -> bool {
        self.food_items.contains(&item) || self.tame_item == item
    }
}

const SPECIES: &[SpeciesProfile] = &[
    SpeciesProfile {
        entity_type: "player_companions:pig",
        kind: CompanionKind::Collector,
        tame_item: "player_companions:tame_carrot",
        food_items: &["minecraft:carrot", "minecraft:potato", "minecraft:beetroot"],
        max_health: 10.0,
        attack_damage: 0.5,
        movement_speed: 0.3,
    },
    SpeciesProfile {
        entity_type: "player_companions:snail",
        kind: CompanionKind::Collector,
        tame_item: "player_companions:tame_seagrass",
        food_items: &["minecraft:seagrass"],
        max_health: 10.0,
        attack_damage: 0.5,
        movement_speed: 0.3,
    },
    SpeciesProfile {
        entity_type: "player_companions:dobutsu",
        kind: CompanionKind::Follower,
        tame_item: "player_companions:tame_sweet_berries",
        food_items: &["minecraft:sweet_berries"],
        max_health: 8.0,
        attack_damage: 1.0,
        movement_speed: 0.3,
    },
    SpeciesProfile {
        entity_type: "player_companions:lizard",
        kind: CompanionKind::Follower,
        tame_item: "player_companions:tame_apple",
        food_items: &["minecraft:apple"],
        max_health: 8.0,
        attack_damage: 1.0,
        movement_speed: 0.3,
    },
    SpeciesProfile {
        entity_type: "player_companions:small_slime",
        kind: CompanionKind::Follower,
        tame_item: "player_companions:tame_slime_ball",
        food_items: &["minecraft:slime_ball"],
        max_health: 8.0,
        attack_damage: 2.0,
        movement_speed: 0.3,
    },
    SpeciesProfile {
        entity_type: "player_companions:samurai",
        kind: CompanionKind::Guard,
        tame_item: "player_companions:tame_sweet_berries",
        food_items: &["minecraft:cooked_beef", "minecraft:bread"],
        max_health: 20.0,
        attack_damage: 3.0,
        movement_speed: 0.3,
    },
    SpeciesProfile {
        entity_type: "player_companions:raptor",
        kind: CompanionKind::Guard,
        tame_item: "player_companions:tame_raw_mutton",
        food_items: &["minecraft:mutton", "minecraft:beef"],
        max_health: 20.0,
        attack_damage: 3.5,
        movement_speed: 0.35,
    },
    SpeciesProfile {
        entity_type: "player_companions:rooster",
        kind: CompanionKind::Guard,
        tame_item: "player_companions:tame_wheat_seeds",
        food_items: &["minecraft:wheat_seeds"],
        max_health: 16.0,
        attack_damage: 2.5,
        movement_speed: 0.3,
    },
    SpeciesProfile {
        entity_type: "player_companions:small_ghast",
        kind: CompanionKind::Guard,
        tame_item: "player_companions:tame_bone",
        food_items: &["minecraft:bone"],
        max_health: 16.0,
        attack_damage: 2.0,
        movement_speed: 0.3,
    },
    SpeciesProfile {
        entity_type: "player_companions:fairy",
        kind: CompanionKind::Healer,
        tame_item: "player_companions:tame_cake",
        food_items: &["minecraft:cake", "minecraft:cookie"],
        max_health: 12.0,
        attack_damage: 0.5,
        movement_speed: 0.3,
    },
    SpeciesProfile {
        entity_type: "player_companions:firefly",
        kind: CompanionKind::Lighting,
        tame_item: "player_companions:tame_honeycomb",
        food_items: &["minecraft:honeycomb"],
        max_health: 4.0,
        attack_damage: 0.0,
        movement_speed: 0.3,
    },
    SpeciesProfile {
        entity_type: "player_companions:welsh_corgi",
        kind: CompanionKind::Supporter,
        tame_item: "player_companions:tame_bone",
        food_items: &["minecraft:bone", "minecraft:cooked_porkchop"],
        max_health: 12.0,
        attack_damage: 1.0,
        movement_speed: 0.3,
    },
];

/// Look up species data by registered entity type
pub fn species(entity_type: &str) -> Option<&'static SpeciesProfile> {
    SPECIES.iter().find(|s| s.entity_type == entity_type)
}

/// All registered species
pub fn all_species() -> &'static [SpeciesProfile] {
    SPECIES
}
