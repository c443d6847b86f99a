//! Record store port.
//!
//! Everything the game persists goes through [`RecordStore`]: progression
//! records, inventories, cooldowns and the durable raid per guild. Reads are
//! individual; writes for one logical command are grouped into a
//! [`WriteBatch`] and committed atomically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tabletop_domain::{ActiveRaid, Combatant, GuildId, Inventory, RosterChanges, UserId};

use super::error::RepoError;

// =============================================================================
// Write batches
// =============================================================================

/// One pending write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    UpsertCombatant {
        user_id: UserId,
        combatant: Combatant,
    },
    DeleteCombatant {
        user_id: UserId,
    },
    /// Replaces the whole inventory; an empty inventory clears the rows.
    PutInventory {
        user_id: UserId,
        inventory: Inventory,
    },
    SetCooldown {
        user_id: UserId,
        key: String,
        used_at: DateTime<Utc>,
    },
    SaveRaid(ActiveRaid),
    ClearRaid(GuildId),
}

/// Writes committed together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn upsert_combatant(&mut self, user_id: UserId, combatant: Combatant) -> &mut Self {
        self.push(WriteOp::UpsertCombatant { user_id, combatant })
    }

    pub fn put_inventory(&mut self, user_id: UserId, inventory: Inventory) -> &mut Self {
        self.push(WriteOp::PutInventory { user_id, inventory })
    }

    /// Adds everything a resolved turn changed. The party quest slot is not
    /// stored here; it lives with the party.
    pub fn extend_from_changes(&mut self, changes: RosterChanges) -> &mut Self {
        for (user_id, combatant) in changes.combatants {
            self.ops.push(WriteOp::UpsertCombatant { user_id, combatant });
        }
        for user_id in changes.deleted {
            self.ops.push(WriteOp::DeleteCombatant { user_id });
        }
        for (user_id, inventory) in changes.inventories {
            self.ops.push(WriteOp::PutInventory { user_id, inventory });
        }
        for grant in changes.cooldowns {
            self.ops.push(WriteOp::SetCooldown {
                user_id: grant.user_id,
                key: grant.key,
                used_at: grant.used_at,
            });
        }
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

// =============================================================================
// Record Store
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_combatant(&self, user_id: UserId) -> Result<Option<Combatant>, RepoError>;

    /// Missing inventories read as empty.
    async fn get_inventory(&self, user_id: UserId) -> Result<Inventory, RepoError>;

    /// Last use of `key` by `user_id`, if any.
    async fn get_cooldown(
        &self,
        user_id: UserId,
        key: &str,
    ) -> Result<Option<DateTime<Utc>>, RepoError>;

    async fn load_raid(&self, guild_id: GuildId) -> Result<Option<ActiveRaid>, RepoError>;

    async fn commit(&self, batch: WriteBatch) -> Result<(), RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabletop_domain::combat::CooldownGrant;

    #[test]
    fn changes_become_ordered_ops() {
        let mut inventory = Inventory::new();
        inventory.add("Potion", 2);
        let used_at = Utc::now();
        let changes = RosterChanges {
            combatants: vec![(UserId::new(1), Combatant::new())],
            deleted: vec![UserId::new(2)],
            inventories: vec![(UserId::new(1), inventory.clone())],
            cooldowns: vec![CooldownGrant {
                user_id: UserId::new(1),
                key: "rpgraid_7".to_string(),
                used_at,
            }],
            party_quest: None,
        };

        let mut batch = WriteBatch::new();
        batch.extend_from_changes(changes);

        assert_eq!(batch.len(), 4);
        assert!(matches!(batch.ops()[0], WriteOp::UpsertCombatant { .. }));
        assert_eq!(
            batch.ops()[1],
            WriteOp::DeleteCombatant {
                user_id: UserId::new(2)
            }
        );
        assert_eq!(
            batch.ops()[2],
            WriteOp::PutInventory {
                user_id: UserId::new(1),
                inventory
            }
        );
        assert!(matches!(&batch.ops()[3], WriteOp::SetCooldown { key, .. } if key == "rpgraid_7"));
    }
}
