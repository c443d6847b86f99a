//! Read models shared by several use-case areas.

use serde::Serialize;
use tabletop_domain::combat::MonsterInstance;
use tabletop_domain::{Catalog, Combatant, Inventory, PartyQuest, Rarity, UserId};

/// One inventory line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedItem {
    pub name: String,
    pub quantity: u32,
}

impl OwnedItem {
    pub fn list(inventory: &Inventory) -> Vec<OwnedItem> {
        inventory
            .iter()
            .map(|(name, quantity)| OwnedItem {
                name: name.to_string(),
                quantity,
            })
            .collect()
    }
}

/// Progress on an accepted quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestProgress {
    pub name: String,
    pub description: String,
    pub progress: u32,
    pub amount: u32,
    pub reward: String,
    /// Held by the party rather than the player.
    pub shared: bool,
}

impl QuestProgress {
    pub fn personal(catalog: &Catalog, combatant: &Combatant) -> Option<Self> {
        let quest = catalog.quest(combatant.quest()?)?;
        Some(Self {
            name: quest.name.clone(),
            description: quest.description.clone(),
            progress: combatant.quest_progress(),
            amount: quest.amount,
            reward: quest.reward.clone(),
            shared: false,
        })
    }

    pub fn shared(catalog: &Catalog, slot: &PartyQuest) -> Option<Self> {
        let quest = catalog.quest(&slot.name)?;
        Some(Self {
            name: quest.name.clone(),
            description: quest.description.clone(),
            progress: slot.progress,
            amount: quest.amount,
            reward: quest.reward.clone(),
            shared: true,
        })
    }
}

/// Everything `status` shows about a player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterSheet {
    pub user_id: UserId,
    pub combatant: Combatant,
    pub inventory: Vec<OwnedItem>,
    pub quest: Option<QuestProgress>,
}

impl CharacterSheet {
    pub fn new(
        catalog: &Catalog,
        user_id: UserId,
        combatant: Combatant,
        inventory: &Inventory,
    ) -> Self {
        let quest = QuestProgress::personal(catalog, &combatant);
        Self {
            user_id,
            combatant,
            inventory: OwnedItem::list(inventory),
            quest,
        }
    }
}

/// The monster as players see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonsterView {
    pub name: String,
    pub rarity: Rarity,
    pub hp: f64,
    pub max_hp: f64,
    pub atk: f64,
    pub defense: f64,
}

impl From<&MonsterInstance> for MonsterView {
    fn from(monster: &MonsterInstance) -> Self {
        Self {
            name: monster.name().to_string(),
            rarity: monster.rarity(),
            hp: monster.hp(),
            max_hp: monster.max_hp(),
            atk: monster.atk(),
            defense: monster.defense(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabletop_domain::catalog::fixtures;

    #[test]
    fn quest_progress_reads_catalog_amount() {
        let catalog = fixtures::catalog();
        let quest = catalog.quests().first().expect("fixture quest").clone();
        let combatant = Combatant::new().with_quest(quest.name.to_uppercase(), 1);

        let progress = QuestProgress::personal(&catalog, &combatant).expect("known quest");
        assert_eq!(progress.name, quest.name);
        assert_eq!(progress.amount, quest.amount);
        assert_eq!(progress.progress, 1);
        assert!(!progress.shared);

        let unknown = Combatant::new().with_quest("Nope", 0);
        assert!(QuestProgress::personal(&catalog, &unknown).is_none());
    }
}
