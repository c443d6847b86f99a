//! In-memory record storage.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tabletop_domain::{ActiveRaid, Combatant, GuildId, Inventory, UserId};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{RecordStore, RepoError, WriteBatch, WriteOp};

#[derive(Debug, Default)]
struct Records {
    combatants: HashMap<UserId, Combatant>,
    inventories: HashMap<UserId, Inventory>,
    cooldowns: HashMap<(UserId, String), DateTime<Utc>>,
    raids: HashMap<GuildId, ActiveRaid>,
}

impl Records {
    fn apply(&mut self, op: WriteOp) {
        match op {
            WriteOp::UpsertCombatant { user_id, combatant } => {
                self.combatants.insert(user_id, combatant);
            }
            WriteOp::DeleteCombatant { user_id } => {
                self.combatants.remove(&user_id);
            }
            WriteOp::PutInventory { user_id, inventory } => {
                if inventory.is_empty() {
                    self.inventories.remove(&user_id);
                } else {
                    self.inventories.insert(user_id, inventory);
                }
            }
            WriteOp::SetCooldown {
                user_id,
                key,
                used_at,
            } => {
                self.cooldowns.insert((user_id, key), used_at);
            }
            WriteOp::SaveRaid(raid) => {
                self.raids.insert(raid.guild(), raid);
            }
            WriteOp::ClearRaid(guild_id) => {
                self.raids.remove(&guild_id);
            }
        }
    }
}

/// [`RecordStore`] kept entirely in process memory.
///
/// A batch is applied under one write lock, so readers never see half of it.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Records>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get_combatant(&self, user_id: UserId) -> Result<Option<Combatant>, RepoError> {
        Ok(self.records.read().await.combatants.get(&user_id).cloned())
    }

    async fn get_inventory(&self, user_id: UserId) -> Result<Inventory, RepoError> {
        Ok(self
            .records
            .read()
            .await
            .inventories
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_cooldown(
        &self,
        user_id: UserId,
        key: &str,
    ) -> Result<Option<DateTime<Utc>>, RepoError> {
        Ok(self
            .records
            .read()
            .await
            .cooldowns
            .get(&(user_id, key.to_string()))
            .copied())
    }

    async fn load_raid(&self, guild_id: GuildId) -> Result<Option<ActiveRaid>, RepoError> {
        Ok(self.records.read().await.raids.get(&guild_id).cloned())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), RepoError> {
        let mut records = self.records.write().await;
        for op in batch.into_ops() {
            records.apply(op);
        }
        Ok(())
    }
}
