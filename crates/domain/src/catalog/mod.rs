//! Static game content: monsters, items, spells and quests.
//!
//! The catalog is loaded once at start and shared read-only. All lookups are
//! case-insensitive and hand back the canonical entry, whose `name` is what
//! inventories and combatant records store.

pub mod class;
pub mod item;
pub mod monster;
pub mod quest;
pub mod rarity;
pub mod spell;

use std::collections::HashMap;

pub use class::CharacterClass;
pub use item::{
    ConsumableEffect, ConsumableRisk, ItemDef, ItemKind, RollRange, StrengthBonus,
};
pub use monster::MonsterTemplate;
pub use quest::{QuestDef, QuestTarget};
pub use rarity::Rarity;
pub use spell::{SpellDef, SpellEffect, SpellRider};

use crate::error::DomainError;

/// Loot handed out for a raid boss without its own loot entry.
pub const DEFAULT_RAID_LOOT: &str = "Titan Relic";

/// Read-only content registry.
///
/// # Invariants
///
/// - Item, spell and quest names are unique ignoring case
/// - Every monster has positive max hp
/// - Every monster loot and quest reward names an item in the catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    monsters: Vec<MonsterTemplate>,
    items: Vec<ItemDef>,
    spells: Vec<SpellDef>,
    quests: Vec<QuestDef>,
    item_index: HashMap<String, usize>,
    quest_index: HashMap<String, usize>,
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Catalog {
    pub fn new(
        monsters: Vec<MonsterTemplate>,
        items: Vec<ItemDef>,
        spells: Vec<SpellDef>,
        quests: Vec<QuestDef>,
    ) -> Result<Self, DomainError> {
        let mut item_index = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(DomainError::validation("Item name cannot be empty"));
            }
            if item_index.insert(key(&item.name), idx).is_some() {
                return Err(DomainError::constraint(format!(
                    "Duplicate item '{}'",
                    item.name
                )));
            }
        }

        for monster in &monsters {
            if monster.max_hp <= 0.0 || monster.hp <= 0.0 {
                return Err(DomainError::validation(format!(
                    "Monster '{}' must have positive hp",
                    monster.name
                )));
            }
            if let Some(loot) = &monster.loot {
                if !item_index.contains_key(&key(loot)) {
                    return Err(DomainError::not_found("Item", loot.clone()));
                }
            }
        }

        let mut seen_spells = HashMap::new();
        for spell in &spells {
            if spell.mana < 0.0 {
                return Err(DomainError::validation(format!(
                    "Spell '{}' has negative mana cost",
                    spell.name
                )));
            }
            if seen_spells
                .insert((spell.class, key(&spell.name)), ())
                .is_some()
            {
                return Err(DomainError::constraint(format!(
                    "Duplicate spell '{}' for {}",
                    spell.name, spell.class
                )));
            }
        }

        let mut quest_index = HashMap::with_capacity(quests.len());
        for (idx, quest) in quests.iter().enumerate() {
            if quest.amount == 0 {
                return Err(DomainError::validation(format!(
                    "Quest '{}' needs a positive amount",
                    quest.name
                )));
            }
            if !item_index.contains_key(&key(&quest.reward)) {
                return Err(DomainError::not_found("Item", quest.reward.clone()));
            }
            if quest_index.insert(key(&quest.name), idx).is_some() {
                return Err(DomainError::constraint(format!(
                    "Duplicate quest '{}'",
                    quest.name
                )));
            }
        }

        Ok(Self {
            monsters,
            items,
            spells,
            quests,
            item_index,
            quest_index,
        })
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub fn item(&self, name: &str) -> Option<&ItemDef> {
        self.item_index
            .get(&key(name))
            .and_then(|idx| self.items.get(*idx))
    }

    pub fn weapon(&self, name: &str) -> Option<&ItemDef> {
        self.item(name).filter(|item| item.is_weapon())
    }

    /// Whether the item belongs to the RPG catalog (and is lost on defeat).
    pub fn is_rpg_item(&self, name: &str) -> bool {
        self.item_index.contains_key(&key(name))
    }

    pub fn items(&self) -> &[ItemDef] {
        &self.items
    }

    /// Revival items, strongest first.
    pub fn revival_items(&self) -> Vec<&ItemDef> {
        let mut revivals: Vec<&ItemDef> = self
            .items
            .iter()
            .filter(|item| item.revival_fraction().is_some())
            .collect();
        revivals.sort_by(|a, b| {
            b.revival_fraction()
                .unwrap_or(0.0)
                .total_cmp(&a.revival_fraction().unwrap_or(0.0))
        });
        revivals
    }

    // =========================================================================
    // Spells
    // =========================================================================

    pub fn spells_for(&self, class: CharacterClass) -> impl Iterator<Item = &SpellDef> {
        self.spells.iter().filter(move |spell| spell.class == class)
    }

    pub fn spell(&self, class: CharacterClass, name: &str) -> Option<&SpellDef> {
        let wanted = key(name);
        self.spells_for(class).find(|spell| key(&spell.name) == wanted)
    }

    // =========================================================================
    // Quests
    // =========================================================================

    pub fn quest(&self, name: &str) -> Option<&QuestDef> {
        self.quest_index
            .get(&key(name))
            .and_then(|idx| self.quests.get(*idx))
    }

    pub fn quests(&self) -> &[QuestDef] {
        &self.quests
    }

    // =========================================================================
    // Monsters
    // =========================================================================

    pub fn monsters(&self) -> &[MonsterTemplate] {
        &self.monsters
    }

    pub fn monsters_of(&self, rarity: Rarity) -> Vec<&MonsterTemplate> {
        self.monsters
            .iter()
            .filter(|monster| monster.rarity == rarity)
            .collect()
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod fixtures {
    //! Small hand-built catalog shared by scenario tests.

    use super::*;
    use crate::combat::status::Status;
    use crate::combat::weapon_effects::WeaponEffect;

    pub fn monster(name: &str, hp: f64, atk: f64, defense: f64) -> MonsterTemplate {
        MonsterTemplate {
            name: name.to_string(),
            hp,
            max_hp: hp,
            atk,
            defense,
            crit_chance: 0.0,
            crit_damage: 1.0,
            evasion_chance: 0.0,
            hp_regen: 0.0,
            exp: 10,
            loot: Some("Slime Gel".to_string()),
            rarity: Rarity::Common,
            signature: None,
        }
    }

    fn item(name: &str, rarity: Rarity, kind: ItemKind) -> ItemDef {
        ItemDef {
            name: name.to_string(),
            rarity,
            description: String::new(),
            kind,
        }
    }

    fn weapon(name: &str, damage: i32, effect: Option<WeaponEffect>) -> ItemDef {
        item(name, Rarity::Common, ItemKind::Weapon { damage, effect })
    }

    fn spell(name: &str, class: CharacterClass, mana: f64, effect: SpellEffect) -> SpellDef {
        SpellDef {
            name: name.to_string(),
            class,
            mana,
            description: String::new(),
            effect,
        }
    }

    /// Catalog with one monster per tier, starter weapons, a few spells and quests.
    pub fn catalog() -> Catalog {
        let mut raid = monster("Ancient Titan", 1000.0, 30.0, 5.0);
        raid.rarity = Rarity::Raid;
        raid.loot = None;
        let mut rare = monster("Cave Troll", 80.0, 9.0, 3.0);
        rare.rarity = Rarity::Rare;
        rare.loot = Some("Troll Hide".to_string());

        let items = vec![
            weapon("Iron Sword", 3, None),
            weapon("Rusty Dagger", 2, None),
            weapon("Wooden Staff", 1, None),
            weapon(
                "Vampire Fang",
                2,
                Some(WeaponEffect::Lifesteal),
            ),
            item(
                "Potion",
                Rarity::Common,
                ItemKind::Consumable(ConsumableEffect {
                    hp: Some(RollRange::new(5, 10)),
                    strength_bonus: StrengthBonus::Full,
                    regen_bonus: true,
                    ..ConsumableEffect::default()
                }),
            ),
            item(
                "Bandage",
                Rarity::Common,
                ItemKind::Consumable(ConsumableEffect {
                    hp: Some(RollRange::new(6, 12)),
                    strength_bonus: StrengthBonus::Full,
                    cures: Some(Status::Bleed),
                    ..ConsumableEffect::default()
                }),
            ),
            item(
                "Rotten Flesh",
                Rarity::Common,
                ItemKind::Consumable(ConsumableEffect {
                    hp: Some(RollRange::new(4, 8)),
                    risk: Some(ConsumableRisk {
                        chance: 0.4,
                        status: Status::Poison,
                        turns: 2,
                    }),
                    ..ConsumableEffect::default()
                }),
            ),
            item(
                "Revive Feather",
                Rarity::Rare,
                ItemKind::Revival {
                    restore_fraction: 0.7,
                },
            ),
            item(
                "Phoenix Down",
                Rarity::Epic,
                ItemKind::Revival {
                    restore_fraction: 1.0,
                },
            ),
            item("Slime Gel", Rarity::Common, ItemKind::Loot),
            item("Troll Hide", Rarity::Rare, ItemKind::Loot),
            item(DEFAULT_RAID_LOOT, Rarity::Raid, ItemKind::Loot),
            item("Magic Scroll", Rarity::Uncommon, ItemKind::Loot),
        ];

        let spells = vec![
            spell(
                "Shield Bash",
                CharacterClass::Warrior,
                3.0,
                SpellEffect::Damage {
                    amount: 4.0,
                    crit_chance: 0.0,
                    crit_damage: 0.0,
                    rider: Some(SpellRider::Stun { chance: 0.3 }),
                },
            ),
            spell(
                "Battle Cry",
                CharacterClass::Warrior,
                2.0,
                SpellEffect::Buff {
                    status: Status::BattleCry,
                    turns: 3,
                },
            ),
            spell(
                "Rally",
                CharacterClass::Warrior,
                4.0,
                SpellEffect::Rally { amount: 10.0 },
            ),
            spell(
                "Taunt",
                CharacterClass::Warrior,
                2.0,
                SpellEffect::Taunt { turns: 2 },
            ),
            spell(
                "Poison Blade",
                CharacterClass::Assassin,
                3.0,
                SpellEffect::Damage {
                    amount: 3.0,
                    crit_chance: 0.1,
                    crit_damage: 0.25,
                    rider: Some(SpellRider::Afflict {
                        status: Status::Poison,
                        turns: 3,
                    }),
                },
            ),
            spell(
                "Heal",
                CharacterClass::Mage,
                4.0,
                SpellEffect::Heal { amount: 18.0 },
            ),
            spell(
                "Fireball",
                CharacterClass::Mage,
                4.0,
                SpellEffect::Damage {
                    amount: 10.0,
                    crit_chance: 0.0,
                    crit_damage: 0.0,
                    rider: None,
                },
            ),
        ];

        let quests = vec![
            QuestDef {
                name: "Blade Practice".to_string(),
                description: String::new(),
                target: QuestTarget::Sword,
                amount: 3,
                reward: "Magic Scroll".to_string(),
            },
            QuestDef {
                name: "Slime Cleanup".to_string(),
                description: String::new(),
                target: QuestTarget::Monster("slime".to_string()),
                amount: 2,
                reward: "Potion".to_string(),
            },
        ];

        Catalog::new(
            vec![
                monster("Green Slime", 12.0, 3.0, 0.0),
                rare,
                raid,
            ],
            items,
            spells,
            quests,
        )
        .unwrap_or_default()
    }
}
