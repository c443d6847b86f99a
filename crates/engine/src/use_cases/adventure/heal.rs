//! Consumable (heal) use case.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::combat::Status;
use tabletop_domain::{Catalog, GuildId, UserId};

use crate::infrastructure::ports::{RandomPort, RecordStore, WriteBatch};
use crate::stores::{PartyStore, RecordLocks, SessionStore};
use crate::use_cases::battle::find_battle;
use crate::use_cases::views::OwnedItem;

use super::error::AdventureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusApplied {
    pub status: Status,
    pub turns: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealReport {
    pub item: String,
    pub hp_restored: f64,
    pub mana_restored: f64,
    pub hp: f64,
    pub max_hp: f64,
    pub mana: f64,
    pub max_mana: f64,
    pub cured: Option<Status>,
    pub afflicted: Option<StatusApplied>,
    /// Status changes landed on a live fight.
    pub in_battle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HealOutcome {
    /// No item named: the consumables on hand.
    Consumables { items: Vec<OwnedItem> },
    Consumed(HealReport),
}

/// Eats or drinks a consumable from the inventory.
pub struct UseConsumable {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    sessions: Arc<SessionStore>,
    parties: Arc<PartyStore>,
    locks: Arc<RecordLocks>,
    random: Arc<dyn RandomPort>,
}

impl UseConsumable {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        sessions: Arc<SessionStore>,
        parties: Arc<PartyStore>,
        locks: Arc<RecordLocks>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            records,
            catalog,
            sessions,
            parties,
            locks,
            random,
        }
    }

    pub async fn execute(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        item: Option<&str>,
    ) -> Result<HealOutcome, AdventureError> {
        // A live fight commits this record too: hold its slot, then the record.
        let mut battle = find_battle(&self.sessions, &self.parties, guild_id, user_id).await;
        let _record = self.locks.lock(user_id).await;

        let mut combatant = self
            .records
            .get_combatant(user_id)
            .await?
            .ok_or(AdventureError::NotStarted)?;
        let mut inventory = self.records.get_inventory(user_id).await?;

        let Some(name) = item.map(str::trim).filter(|name| !name.is_empty()) else {
            let items = inventory
                .iter()
                .filter(|(name, _)| {
                    self.catalog
                        .item(name)
                        .is_some_and(|def| def.consumable().is_some())
                })
                .map(|(name, quantity)| OwnedItem {
                    name: name.to_string(),
                    quantity,
                })
                .collect();
            return Ok(HealOutcome::Consumables { items });
        };

        let def = self
            .catalog
            .item(name)
            .ok_or_else(|| AdventureError::UnknownItem(name.to_string()))?;
        let effect = def
            .consumable()
            .ok_or_else(|| AdventureError::NotConsumable(def.name.clone()))?;
        if !inventory.remove_one(&def.name) {
            return Err(AdventureError::NotOwned(def.name.clone()));
        }

        let outcome = combatant.consume(effect, self.random.as_ref());

        let mut batch = WriteBatch::new();
        batch
            .upsert_combatant(user_id, combatant.clone())
            .put_inventory(user_id, inventory);
        self.records.commit(batch).await?;

        let mut in_battle = false;
        if outcome.cured.is_some() || outcome.afflicted.is_some() {
            if let Some(session) = battle.as_mut().and_then(|b| b.session_mut()) {
                let statuses = session.statuses_mut(user_id);
                if let Some(status) = outcome.cured {
                    statuses.remove(status);
                }
                if let Some((status, turns)) = outcome.afflicted {
                    statuses.apply(status, turns);
                }
                in_battle = true;
            }
        }
        if let Some(battle) = battle {
            battle.finish(&self.sessions);
        }

        tracing::info!(
            user_id = %user_id,
            item = %def.name,
            hp = outcome.hp_restored,
            mana = outcome.mana_restored,
            "Consumable used"
        );
        Ok(HealOutcome::Consumed(HealReport {
            item: def.name.clone(),
            hp_restored: outcome.hp_restored,
            mana_restored: outcome.mana_restored,
            hp: combatant.hp(),
            max_hp: combatant.max_hp(),
            mana: combatant.mana(),
            max_mana: combatant.max_mana(),
            cured: outcome.cured,
            afflicted: outcome
                .afflicted
                .map(|(status, turns)| StatusApplied { status, turns }),
            in_battle,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryRecordStore;
    use crate::stores::SessionKey;
    use tabletop_domain::catalog::fixtures;
    use tabletop_domain::combat::MonsterInstance;
    use tabletop_domain::random::testing::ScriptedRandom;
    use tabletop_domain::{Combatant, EncounterSession, Inventory};

    struct Harness {
        records: Arc<InMemoryRecordStore>,
        sessions: Arc<SessionStore>,
        use_case: Arc<UseConsumable>,
    }

    async fn harness(combatant: Combatant, items: &[(&str, u32)], rng: ScriptedRandom) -> Harness {
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

        let sessions = Arc::new(SessionStore::new());
        let use_case = Arc::new(UseConsumable::new(
            records.clone(),
            Arc::new(fixtures::catalog()),
            sessions.clone(),
            Arc::new(PartyStore::new()),
            Arc::new(RecordLocks::new()),
            Arc::new(rng),
        ));
        Harness {
            records,
            sessions,
            use_case,
        }
    }

    #[tokio::test]
    async fn potion_heals_and_is_used_up() {
        // Potion rolls 5..=10 plus strength plus whole hp regen
        let h = harness(
            Combatant::new().with_hp(5.0, 20.0),
            &[("Potion", 1), ("Slime Gel", 2)],
            ScriptedRandom::new().with_ints([7]),
        )
        .await;

        let outcome = h
            .use_case
            .execute(GuildId::new(1), UserId::new(1), Some("potion"))
            .await
            .expect("healed");

        let HealOutcome::Consumed(report) = outcome else {
            panic!("expected a consumed report");
        };
        assert_eq!(report.item, "Potion");
        assert_eq!(report.hp_restored, 7.0);
        assert_eq!(report.hp, 12.0);
        assert!(!report.in_battle);

        let inventory = h.records.get_inventory(UserId::new(1)).await.expect("read");
        assert_eq!(inventory.count("Potion"), 0);
        assert_eq!(inventory.count("Slime Gel"), 2);
    }

    #[tokio::test]
    async fn bandage_cures_bleed_in_a_live_fight() {
        let h = harness(
            Combatant::new().with_hp(10.0, 20.0),
            &[("Bandage", 1)],
            ScriptedRandom::new(),
        )
        .await;
        let guild = GuildId::new(1);
        let key = SessionKey::Solo {
            guild,
            user: UserId::new(1),
        };
        let mut session = EncounterSession::solo(
            guild,
            UserId::new(1),
            MonsterInstance::spawn(&fixtures::monster("Green Slime", 12.0, 3.0, 0.0)),
        );
        session.statuses_mut(UserId::new(1)).apply(Status::Bleed, 3);
        *h.sessions.slot(key).lock().await = Some(session);

        let outcome = h
            .use_case
            .execute(guild, UserId::new(1), Some("Bandage"))
            .await
            .expect("bandaged");

        let HealOutcome::Consumed(report) = outcome else {
            panic!("expected a consumed report");
        };
        assert_eq!(report.cured, Some(Status::Bleed));
        assert!(report.in_battle);
        let slot = h.sessions.slot(key);
        let guard = slot.lock().await;
        let statuses = guard
            .as_ref()
            .and_then(|s| s.statuses(UserId::new(1)))
            .expect("statuses kept");
        assert!(!statuses.has(Status::Bleed));
    }

    #[tokio::test]
    async fn potion_waits_for_the_turn_in_progress() {
        let h = harness(
            Combatant::new().with_hp(5.0, 20.0),
            &[("Potion", 1)],
            ScriptedRandom::new().with_ints([7]),
        )
        .await;
        let (guild, user) = (GuildId::new(1), UserId::new(1));
        let key = SessionKey::Solo { guild, user };
        *h.sessions.slot(key).lock().await = Some(EncounterSession::solo(
            guild,
            user,
            MonsterInstance::spawn(&fixtures::monster("Green Slime", 12.0, 3.0, 0.0)),
        ));

        // A turn holds the fight while it resolves.
        let turn = h.sessions.slot(key).lock_owned().await;
        let drink = {
            let use_case = h.use_case.clone();
            tokio::spawn(async move { use_case.execute(guild, user, Some("Potion")).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!drink.is_finished());

        // The monster's hit lands and the turn commits before the potion reads.
        let mut batch = WriteBatch::new();
        batch.upsert_combatant(user, Combatant::new().with_hp(2.0, 20.0));
        h.records.commit(batch).await.expect("turn commit");
        drop(turn);

        let outcome = drink.await.expect("joined").expect("healed");
        let HealOutcome::Consumed(report) = outcome else {
            panic!("expected a consumed report");
        };
        assert_eq!(report.hp, 9.0);
        let stored = h
            .records
            .get_combatant(user)
            .await
            .expect("read")
            .expect("record");
        assert_eq!(stored.hp(), 9.0);
        let inventory = h.records.get_inventory(user).await.expect("read");
        assert_eq!(inventory.count("Potion"), 0);
    }

    #[tokio::test]
    async fn listing_and_rejections() {
        let h = harness(
            Combatant::new(),
            &[("Potion", 2), ("Slime Gel", 1), ("Iron Sword", 1)],
            ScriptedRandom::new(),
        )
        .await;
        let (guild, user) = (GuildId::new(1), UserId::new(1));

        let listed = h.use_case.execute(guild, user, None).await.expect("list");
        assert_eq!(
            listed,
            HealOutcome::Consumables {
                items: vec![OwnedItem {
                    name: "Potion".into(),
                    quantity: 2
                }]
            }
        );

        let unknown = h.use_case.execute(guild, user, Some("Elixir of Life")).await;
        assert!(matches!(unknown, Err(AdventureError::UnknownItem(_))));
        let sword = h.use_case.execute(guild, user, Some("iron sword")).await;
        assert!(matches!(sword, Err(AdventureError::NotConsumable(_))));
        let bandage = h.use_case.execute(guild, user, Some("Bandage")).await;
        assert!(matches!(bandage, Err(AdventureError::NotOwned(_))));
    }
}
