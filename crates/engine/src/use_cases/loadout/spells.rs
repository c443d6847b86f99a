//! Spell loadout operations.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::{Catalog, CharacterClass, Combatant, SpellDef, UserId};

use crate::infrastructure::ports::{RecordStore, WriteBatch};
use crate::stores::RecordLocks;

use super::error::LoadoutError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellSummary {
    pub name: String,
    pub mana: f64,
    pub description: String,
}

impl From<&SpellDef> for SpellSummary {
    fn from(spell: &SpellDef) -> Self {
        Self {
            name: spell.name.clone(),
            mana: spell.mana,
            description: spell.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellBook {
    pub class: CharacterClass,
    pub available: Vec<SpellSummary>,
    pub equipped: Vec<String>,
}

pub struct SpellOps {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    locks: Arc<RecordLocks>,
}

impl SpellOps {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        locks: Arc<RecordLocks>,
    ) -> Self {
        Self {
            records,
            catalog,
            locks,
        }
    }

    async fn load(&self, user_id: UserId) -> Result<(Combatant, CharacterClass), LoadoutError> {
        let combatant = self
            .records
            .get_combatant(user_id)
            .await?
            .ok_or(LoadoutError::NotStarted)?;
        let class = combatant.class().ok_or(LoadoutError::NoClass)?;
        Ok((combatant, class))
    }

    fn book(&self, class: CharacterClass, combatant: &Combatant) -> SpellBook {
        SpellBook {
            class,
            available: self
                .catalog
                .spells_for(class)
                .map(SpellSummary::from)
                .collect(),
            equipped: combatant.equipped_spells().to_vec(),
        }
    }

    pub async fn list(&self, user_id: UserId) -> Result<SpellBook, LoadoutError> {
        let (combatant, class) = self.load(user_id).await?;
        Ok(self.book(class, &combatant))
    }

    pub async fn equip(&self, user_id: UserId, name: &str) -> Result<SpellBook, LoadoutError> {
        let _record = self.locks.lock(user_id).await;
        let (mut combatant, class) = self.load(user_id).await?;
        let spell = self
            .catalog
            .spell(class, name)
            .ok_or_else(|| LoadoutError::UnknownSpell(name.to_string()))?;
        combatant.equip_spell(spell.name.clone())?;

        let book = self.book(class, &combatant);
        let mut batch = WriteBatch::new();
        batch.upsert_combatant(user_id, combatant);
        self.records.commit(batch).await?;
        tracing::debug!(user_id = %user_id, spell = %spell.name, "Spell equipped");
        Ok(book)
    }

    pub async fn unequip(&self, user_id: UserId, name: &str) -> Result<SpellBook, LoadoutError> {
        let _record = self.locks.lock(user_id).await;
        let (mut combatant, class) = self.load(user_id).await?;
        let equipped = combatant
            .equipped_spells()
            .iter()
            .find(|spell| spell.eq_ignore_ascii_case(name.trim()))
            .cloned()
            .ok_or_else(|| LoadoutError::UnknownSpell(name.to_string()))?;
        combatant.unequip_spell(&equipped)?;

        let book = self.book(class, &combatant);
        let mut batch = WriteBatch::new();
        batch.upsert_combatant(user_id, combatant);
        self.records.commit(batch).await?;
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockRecordStore;
    use mockall::predicate::*;
    use tabletop_domain::catalog::fixtures;
    use tabletop_domain::DomainError;

    fn warrior() -> Combatant {
        Combatant::new()
            .with_level(3)
            .with_class(CharacterClass::Warrior)
    }

    #[tokio::test]
    async fn equip_stores_the_catalog_name() {
        let mut mock = MockRecordStore::new();
        mock.expect_get_combatant()
            .with(eq(UserId::new(1)))
            .returning(|_| Ok(Some(warrior())));
        mock.expect_commit()
            .withf(|batch: &WriteBatch| batch.len() == 1)
            .times(1)
            .returning(|_| Ok(()));
        let ops = SpellOps::new(
            Arc::new(mock),
            Arc::new(fixtures::catalog()),
            Arc::new(RecordLocks::new()),
        );

        let book = ops.equip(UserId::new(1), "shield bash").await.expect("equipped");
        assert_eq!(book.equipped, vec!["Shield Bash".to_string()]);
        assert!(book.available.iter().any(|s| s.name == "Taunt"));
    }

    #[tokio::test]
    async fn other_class_spells_and_duplicates_are_rejected() {
        let mut mock = MockRecordStore::new();
        mock.expect_get_combatant().returning(|_| {
            let mut c = warrior();
            c.equip_spell("Battle Cry").expect("fresh slot");
            Ok(Some(c))
        });
        mock.expect_commit().never();
        let ops = SpellOps::new(
            Arc::new(mock),
            Arc::new(fixtures::catalog()),
            Arc::new(RecordLocks::new()),
        );

        let err = ops.equip(UserId::new(1), "Fireball").await.expect_err("mage spell");
        assert!(matches!(err, LoadoutError::UnknownSpell(_)));
        let err = ops.equip(UserId::new(1), "battle cry").await.expect_err("duplicate");
        assert!(matches!(err, LoadoutError::Validation(DomainError::Constraint(_))));
        let err = ops.unequip(UserId::new(1), "Rally").await.expect_err("not equipped");
        assert!(matches!(err, LoadoutError::UnknownSpell(_)));
    }

    #[tokio::test]
    async fn classless_players_have_no_spell_book() {
        let mut mock = MockRecordStore::new();
        mock.expect_get_combatant()
            .returning(|_| Ok(Some(Combatant::new())));
        let ops = SpellOps::new(
            Arc::new(mock),
            Arc::new(fixtures::catalog()),
            Arc::new(RecordLocks::new()),
        );

        assert!(matches!(
            ops.list(UserId::new(1)).await,
            Err(LoadoutError::NoClass)
        ));
    }
}
