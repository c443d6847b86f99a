//! SQLite-backed record storage.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tabletop_domain::{ActiveRaid, Combatant, GuildId, Inventory, UserId};

use crate::infrastructure::ports::{ClockPort, RecordStore, RepoError, WriteBatch, WriteOp};

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS combatants (
        user_id INTEGER PRIMARY KEY,
        record_json TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_items (
        user_id INTEGER NOT NULL,
        item_name TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        PRIMARY KEY (user_id, item_name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cooldowns (
        user_id INTEGER NOT NULL,
        command_key TEXT NOT NULL,
        used_at TEXT NOT NULL,
        PRIMARY KEY (user_id, command_key)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS raid_state (
        guild_id INTEGER PRIMARY KEY,
        raid_json TEXT NOT NULL,
        spawned_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
];

/// Snowflakes are stored as SQLite's signed 64-bit integers.
fn db_id(raw: u64) -> Result<i64, RepoError> {
    i64::try_from(raw).map_err(|_| RepoError::constraint(format!("id {raw} exceeds i64")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(RepoError::serialization)
}

/// SQLite implementation of [`RecordStore`].
pub struct SqliteRecordStore {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteRecordStore {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        if let Some(parent) = Path::new(db_path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RepoError::database("open", e))?;
        }

        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("open", e))?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| RepoError::database("schema", e))?;
        }

        tracing::info!(path = %db_path, "SQLite record store ready");
        Ok(Self { pool, clock })
    }

    async fn apply(
        tx: &mut Transaction<'_, Sqlite>,
        op: WriteOp,
        now: &str,
    ) -> Result<(), RepoError> {
        match op {
            WriteOp::UpsertCombatant { user_id, combatant } => {
                let json = serde_json::to_string(&combatant).map_err(RepoError::serialization)?;
                sqlx::query(
                    r#"
                    INSERT INTO combatants (user_id, record_json, updated_at)
                    VALUES (?, ?, ?)
                    ON CONFLICT(user_id) DO UPDATE SET
                        record_json = excluded.record_json,
                        updated_at = excluded.updated_at
                    "#,
                )
                .bind(db_id(user_id.get())?)
                .bind(json)
                .bind(now)
                .execute(&mut **tx)
                .await
                .map_err(|e| RepoError::database("upsert_combatant", e))?;
            }
            WriteOp::DeleteCombatant { user_id } => {
                sqlx::query("DELETE FROM combatants WHERE user_id = ?")
                    .bind(db_id(user_id.get())?)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| RepoError::database("delete_combatant", e))?;
            }
            WriteOp::PutInventory { user_id, inventory } => {
                let id = db_id(user_id.get())?;
                sqlx::query("DELETE FROM inventory_items WHERE user_id = ?")
                    .bind(id)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| RepoError::database("put_inventory", e))?;
                for (name, quantity) in inventory.iter() {
                    sqlx::query(
                        "INSERT INTO inventory_items (user_id, item_name, quantity) VALUES (?, ?, ?)",
                    )
                    .bind(id)
                    .bind(name)
                    .bind(i64::from(quantity))
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| RepoError::database("put_inventory", e))?;
                }
            }
            WriteOp::SetCooldown {
                user_id,
                key,
                used_at,
            } => {
                sqlx::query(
                    r#"
                    INSERT INTO cooldowns (user_id, command_key, used_at)
                    VALUES (?, ?, ?)
                    ON CONFLICT(user_id, command_key) DO UPDATE SET
                        used_at = excluded.used_at
                    "#,
                )
                .bind(db_id(user_id.get())?)
                .bind(key)
                .bind(used_at.to_rfc3339())
                .execute(&mut **tx)
                .await
                .map_err(|e| RepoError::database("set_cooldown", e))?;
            }
            WriteOp::SaveRaid(raid) => {
                let json = serde_json::to_string(&raid).map_err(RepoError::serialization)?;
                sqlx::query(
                    r#"
                    INSERT INTO raid_state (guild_id, raid_json, spawned_at, updated_at)
                    VALUES (?, ?, ?, ?)
                    ON CONFLICT(guild_id) DO UPDATE SET
                        raid_json = excluded.raid_json,
                        spawned_at = excluded.spawned_at,
                        updated_at = excluded.updated_at
                    "#,
                )
                .bind(db_id(raid.guild().get())?)
                .bind(json)
                .bind(raid.spawned_at.to_rfc3339())
                .bind(now)
                .execute(&mut **tx)
                .await
                .map_err(|e| RepoError::database("save_raid", e))?;
            }
            WriteOp::ClearRaid(guild_id) => {
                sqlx::query("DELETE FROM raid_state WHERE guild_id = ?")
                    .bind(db_id(guild_id.get())?)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| RepoError::database("clear_raid", e))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get_combatant(&self, user_id: UserId) -> Result<Option<Combatant>, RepoError> {
        let row = sqlx::query("SELECT record_json FROM combatants WHERE user_id = ?")
            .bind(db_id(user_id.get())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_combatant", e))?;

        match row {
            Some(row) => {
                let json: String = row.get("record_json");
                let combatant =
                    serde_json::from_str(&json).map_err(RepoError::serialization)?;
                Ok(Some(combatant))
            }
            None => Ok(None),
        }
    }

    async fn get_inventory(&self, user_id: UserId) -> Result<Inventory, RepoError> {
        let rows = sqlx::query(
            "SELECT item_name, quantity FROM inventory_items WHERE user_id = ? ORDER BY item_name",
        )
        .bind(db_id(user_id.get())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_inventory", e))?;

        let mut inventory = Inventory::new();
        for row in rows {
            let name: String = row.get("item_name");
            let quantity: i64 = row.get("quantity");
            let quantity = u32::try_from(quantity).map_err(|_| {
                RepoError::constraint(format!("invalid quantity {quantity} for {name}"))
            })?;
            inventory.add(name, quantity);
        }
        Ok(inventory)
    }

    async fn get_cooldown(
        &self,
        user_id: UserId,
        key: &str,
    ) -> Result<Option<DateTime<Utc>>, RepoError> {
        let row = sqlx::query("SELECT used_at FROM cooldowns WHERE user_id = ? AND command_key = ?")
            .bind(db_id(user_id.get())?)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_cooldown", e))?;

        match row {
            Some(row) => {
                let raw: String = row.get("used_at");
                parse_timestamp(&raw).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn load_raid(&self, guild_id: GuildId) -> Result<Option<ActiveRaid>, RepoError> {
        let row = sqlx::query("SELECT raid_json FROM raid_state WHERE guild_id = ?")
            .bind(db_id(guild_id.get())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("load_raid", e))?;

        match row {
            Some(row) => {
                let json: String = row.get("raid_json");
                let raid = serde_json::from_str(&json).map_err(RepoError::serialization)?;
                Ok(Some(raid))
            }
            None => Ok(None),
        }
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), RepoError> {
        if batch.is_empty() {
            return Ok(());
        }
        let ops = batch.len();
        let now = self.clock.now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("commit", e))?;
        for op in batch.into_ops() {
            // Dropping `tx` on error rolls the whole batch back.
            Self::apply(&mut tx, op, &now).await?;
        }
        tx.commit()
            .await
            .map_err(|e| RepoError::database("commit", e))?;

        tracing::debug!(ops, "Write batch committed");
        Ok(())
    }
}
