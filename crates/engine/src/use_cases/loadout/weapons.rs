//! Weapon loadout operations.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::combat::WeaponEffect;
use tabletop_domain::{Catalog, Combatant, Inventory, ItemDef, Rarity, UserId};

use crate::infrastructure::ports::{RecordStore, WriteBatch};
use crate::stores::RecordLocks;
use crate::use_cases::views::OwnedItem;

use super::error::LoadoutError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponInfo {
    pub name: String,
    pub rarity: Rarity,
    pub description: String,
    pub damage: i32,
    pub effect: Option<WeaponEffect>,
}

impl From<&ItemDef> for WeaponInfo {
    fn from(item: &ItemDef) -> Self {
        Self {
            name: item.name.clone(),
            rarity: item.rarity,
            description: item.description.clone(),
            damage: item.weapon_damage(),
            effect: item.weapon_effect().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponSwap {
    pub equipped: String,
    /// Back in the inventory.
    pub previous: Option<String>,
}

/// Weapon commands. The equipped weapon is held outside the inventory.
pub struct WeaponOps {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    locks: Arc<RecordLocks>,
}

impl WeaponOps {
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

    async fn load(&self, user_id: UserId) -> Result<(Combatant, Inventory), LoadoutError> {
        let combatant = self
            .records
            .get_combatant(user_id)
            .await?
            .ok_or(LoadoutError::NotStarted)?;
        let inventory = self.records.get_inventory(user_id).await?;
        Ok((combatant, inventory))
    }

    pub async fn equip(&self, user_id: UserId, name: &str) -> Result<WeaponSwap, LoadoutError> {
        let weapon = self
            .catalog
            .weapon(name)
            .ok_or_else(|| LoadoutError::UnknownWeapon(name.to_string()))?;
        let _record = self.locks.lock(user_id).await;
        let (mut combatant, mut inventory) = self.load(user_id).await?;
        if !inventory.remove_one(&weapon.name) {
            return Err(LoadoutError::NotOwned(weapon.name.clone()));
        }
        let previous = combatant.equip_weapon(weapon.name.clone());
        if let Some(previous) = &previous {
            inventory.add(previous.clone(), 1);
        }

        let mut batch = WriteBatch::new();
        batch
            .upsert_combatant(user_id, combatant)
            .put_inventory(user_id, inventory);
        self.records.commit(batch).await?;

        tracing::info!(user_id = %user_id, weapon = %weapon.name, "Weapon equipped");
        Ok(WeaponSwap {
            equipped: weapon.name.clone(),
            previous,
        })
    }

    pub async fn unequip(&self, user_id: UserId) -> Result<String, LoadoutError> {
        let _record = self.locks.lock(user_id).await;
        let (mut combatant, mut inventory) = self.load(user_id).await?;
        let weapon = combatant
            .unequip_weapon()
            .ok_or(LoadoutError::NoWeaponEquipped)?;
        inventory.add(weapon.clone(), 1);

        let mut batch = WriteBatch::new();
        batch
            .upsert_combatant(user_id, combatant)
            .put_inventory(user_id, inventory);
        self.records.commit(batch).await?;
        Ok(weapon)
    }

    /// The equipped weapon, if any.
    pub async fn status(&self, user_id: UserId) -> Result<Option<WeaponInfo>, LoadoutError> {
        let (combatant, _) = self.load(user_id).await?;
        Ok(combatant
            .weapon()
            .and_then(|name| self.catalog.weapon(name))
            .map(WeaponInfo::from))
    }

    /// Weapons in the inventory with their counts.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<OwnedItem>, LoadoutError> {
        let (_, inventory) = self.load(user_id).await?;
        Ok(OwnedItem::list(&inventory)
            .into_iter()
            .filter(|item| self.catalog.weapon(&item.name).is_some())
            .collect())
    }

    pub fn info(&self, name: &str) -> Result<WeaponInfo, LoadoutError> {
        self.catalog
            .weapon(name)
            .map(WeaponInfo::from)
            .ok_or_else(|| LoadoutError::UnknownWeapon(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryRecordStore;
    use crate::infrastructure::ports::MockRecordStore;
    use mockall::predicate::*;
    use tabletop_domain::catalog::fixtures;

    async fn seeded(combatant: Combatant, items: &[(&str, u32)]) -> Arc<InMemoryRecordStore> {
        let records = Arc::new(InMemoryRecordStore::new());
        let mut inventory = Inventory::new();
        for (name, quantity) in items {
            inventory.add(*name, *quantity);
        }
        let mut batch = WriteBatch::new();
        batch
            .upsert_combatant(UserId::new(1), combatant)
            .put_inventory(UserId::new(1), inventory);
        records.commit(batch).await.expect("seed");
        records
    }

    #[tokio::test]
    async fn equip_swaps_with_the_current_weapon() {
        let user = UserId::new(1);
        let records = seeded(
            Combatant::new().with_weapon("Rusty Dagger"),
            &[("Iron Sword", 1), ("Slime Gel", 3)],
        )
        .await;
        let ops = WeaponOps::new(
            records.clone(),
            Arc::new(fixtures::catalog()),
            Arc::new(RecordLocks::new()),
        );

        let swap = ops.equip(user, "iron sword").await.expect("equipped");
        assert_eq!(swap.equipped, "Iron Sword");
        assert_eq!(swap.previous.as_deref(), Some("Rusty Dagger"));

        let inventory = records.get_inventory(user).await.expect("load");
        assert_eq!(inventory.count("Iron Sword"), 0);
        assert_eq!(inventory.count("Rusty Dagger"), 1);

        let owned = ops.list(user).await.expect("list");
        assert_eq!(
            owned,
            vec![OwnedItem {
                name: "Rusty Dagger".to_string(),
                quantity: 1
            }]
        );

        let status = ops.status(user).await.expect("status").expect("armed");
        assert_eq!(status.name, "Iron Sword");
    }

    #[tokio::test]
    async fn unequip_returns_weapon_to_inventory() {
        let user = UserId::new(1);
        let records = seeded(Combatant::new().with_weapon("Wooden Staff"), &[]).await;
        let ops = WeaponOps::new(
            records.clone(),
            Arc::new(fixtures::catalog()),
            Arc::new(RecordLocks::new()),
        );

        assert_eq!(ops.unequip(user).await.expect("unequip"), "Wooden Staff");
        assert_eq!(
            records.get_inventory(user).await.expect("load").count("Wooden Staff"),
            1
        );
        assert!(matches!(
            ops.unequip(user).await,
            Err(LoadoutError::NoWeaponEquipped)
        ));
    }

    #[tokio::test]
    async fn equip_rejects_unknown_or_missing_weapons_without_writing() {
        let mut mock = MockRecordStore::new();
        mock.expect_get_combatant()
            .with(eq(UserId::new(1)))
            .returning(|_| Ok(Some(Combatant::new())));
        mock.expect_get_inventory()
            .returning(|_| Ok(Inventory::new()));
        mock.expect_commit().never();
        let ops = WeaponOps::new(
            Arc::new(mock),
            Arc::new(fixtures::catalog()),
            Arc::new(RecordLocks::new()),
        );

        let err = ops.equip(UserId::new(1), "Excalibur").await.expect_err("unknown");
        assert!(matches!(err, LoadoutError::UnknownWeapon(_)));
        let err = ops.equip(UserId::new(1), "Iron Sword").await.expect_err("not owned");
        assert!(matches!(err, LoadoutError::NotOwned(name) if name == "Iron Sword"));

        let info = ops.info("vampire fang").expect("known weapon");
        assert!(info.effect.is_some());
    }
}
