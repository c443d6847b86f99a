//! Loot and quest bookkeeping for a won fight.

use super::monster::MonsterInstance;
use crate::aggregates::party::PartyQuest;
use crate::aggregates::Combatant;
use crate::catalog::{Catalog, QuestDef};
use crate::random::RandomSource;

/// Rolls the monster's loot against its rarity drop chance.
pub fn roll_loot<'m>(monster: &'m MonsterInstance, rng: &dyn RandomSource) -> Option<&'m str> {
    let loot = monster.loot()?;
    rng.chance(monster.rarity().loot_drop_chance()).then_some(loot)
}

/// Progress made on a quest by one victory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestReport {
    pub quest: String,
    pub progress: u32,
    pub amount: u32,
    /// Reward item, present once the quest is complete.
    pub reward: Option<String>,
}

/// Looks up `quest` and checks whether this victory counts toward it.
pub fn matching_quest<'c>(
    catalog: &'c Catalog,
    quest: &str,
    monster_name: &str,
    weapon: Option<&str>,
) -> Option<&'c QuestDef> {
    catalog
        .quest(quest)
        .filter(|def| def.target.matches(monster_name, weapon))
}

/// Advances the combatant's own quest. Completing it clears the slot; the
/// caller hands out the reward.
pub fn advance_personal_quest(
    catalog: &Catalog,
    combatant: &mut Combatant,
    monster_name: &str,
) -> Option<QuestReport> {
    let def = matching_quest(catalog, combatant.quest()?, monster_name, combatant.weapon())?;
    let progress = combatant.advance_quest();
    let reward = (progress >= def.amount).then(|| def.reward.clone());
    if reward.is_some() {
        combatant.clear_quest();
    }
    Some(QuestReport {
        quest: def.name.clone(),
        progress,
        amount: def.amount,
        reward,
    })
}

/// Advances a shared party quest, judged by the finisher's weapon.
///
/// On completion `slot` is emptied.
pub fn advance_party_quest(
    catalog: &Catalog,
    slot: &mut Option<PartyQuest>,
    monster_name: &str,
    weapon: Option<&str>,
) -> Option<QuestReport> {
    let quest = slot.as_mut()?;
    let def = matching_quest(catalog, &quest.name, monster_name, weapon)?;
    quest.progress += 1;
    let progress = quest.progress;
    let reward = (progress >= def.amount).then(|| def.reward.clone());
    if reward.is_some() {
        *slot = None;
    }
    Some(QuestReport {
        quest: def.name.clone(),
        progress,
        amount: def.amount,
        reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{fixtures, Rarity};
    use crate::random::testing::ScriptedRandom;

    #[test]
    fn loot_respects_drop_chance() {
        let mut template = fixtures::monster("Green Slime", 10.0, 1.0, 0.0);
        let monster = MonsterInstance::spawn(&template);
        assert_eq!(roll_loot(&monster, &ScriptedRandom::constant(0.49, 0)), Some("Slime Gel"));
        assert_eq!(roll_loot(&monster, &ScriptedRandom::constant(0.5, 0)), None);

        template.rarity = Rarity::Legendary;
        let legendary = MonsterInstance::spawn(&template);
        assert_eq!(roll_loot(&legendary, &ScriptedRandom::constant(0.99, 0)), Some("Slime Gel"));
    }

    #[test]
    fn sword_quest_completes_and_clears() {
        let catalog = fixtures::catalog();
        let mut c = Combatant::new()
            .with_weapon("Iron Sword")
            .with_quest("Blade Practice", 2);
        let report = advance_personal_quest(&catalog, &mut c, "Green Slime").expect("sword counts");
        assert_eq!(report.progress, 3);
        assert_eq!(report.reward.as_deref(), Some("Magic Scroll"));
        assert!(c.quest().is_none());
    }

    #[test]
    fn non_matching_victory_leaves_quest_alone() {
        let catalog = fixtures::catalog();
        let mut c = Combatant::new()
            .with_weapon("Rusty Dagger")
            .with_quest("Blade Practice", 1);
        assert!(advance_personal_quest(&catalog, &mut c, "Green Slime").is_none());
        assert_eq!(c.quest_progress(), 1);
    }

    #[test]
    fn party_quest_empties_slot_on_completion() {
        let catalog = fixtures::catalog();
        let mut slot = Some(PartyQuest {
            name: "Slime Cleanup".to_string(),
            progress: 0,
        });
        let first = advance_party_quest(&catalog, &mut slot, "Green Slime", None).expect("counts");
        assert_eq!((first.progress, first.reward), (1, None));
        let second = advance_party_quest(&catalog, &mut slot, "Green Slime", None).expect("counts");
        assert_eq!(second.reward.as_deref(), Some("Potion"));
        assert!(slot.is_none());
    }
}
