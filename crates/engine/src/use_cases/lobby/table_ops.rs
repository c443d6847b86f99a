//! Lobby and life total operations.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::aggregates::{LifeChange, LobbyLeft, Seating, Table, TablePhase};
use tabletop_domain::{CardGame, GuildId, LobbyError, TableFormat, TableId, UserId};

use crate::infrastructure::ports::RandomPort;
use crate::stores::LobbyStore;

use super::error::LobbyCommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommanderDamage {
    pub from: UserId,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub user_id: UserId,
    pub life: i64,
    pub active: bool,
    pub commander_damage: Vec<CommanderDamage>,
}

/// A table as the players see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub id: TableId,
    pub game: CardGame,
    pub format: TableFormat,
    pub owner: UserId,
    pub phase: TablePhase,
    pub seats: usize,
    pub first_player: Option<UserId>,
    pub players: Vec<PlayerView>,
}

impl From<&Table> for TableView {
    fn from(table: &Table) -> Self {
        Self {
            id: table.id(),
            game: table.format().game(),
            format: table.format(),
            owner: table.owner(),
            phase: table.phase(),
            seats: table.format().seats(),
            first_player: table.first_player(),
            players: table
                .seats()
                .iter()
                .map(|(user_id, seat)| PlayerView {
                    user_id: *user_id,
                    life: seat.life(),
                    active: seat.is_active(),
                    commander_damage: seat
                        .commander_damage()
                        .iter()
                        .map(|(from, amount)| CommanderDamage {
                            from: *from,
                            amount: *amount,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatingView {
    pub table: TableView,
    pub opened: bool,
    pub started: bool,
}

impl From<Seating> for SeatingView {
    fn from(seating: Seating) -> Self {
        Self {
            table: TableView::from(&seating.table),
            opened: seating.opened,
            started: seating.started,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifeReport {
    pub table: TableView,
    pub eliminated: Option<UserId>,
    pub winner: Option<UserId>,
}

impl From<LifeChange> for LifeReport {
    fn from(change: LifeChange) -> Self {
        Self {
            table: TableView::from(&change.table),
            eliminated: change.eliminated,
            winner: change.winner,
        }
    }
}

/// Table commands for both card games. Each game's directory has its own lock.
pub struct LobbyOps {
    lobbies: Arc<LobbyStore>,
    random: Arc<dyn RandomPort>,
}

impl LobbyOps {
    pub fn new(lobbies: Arc<LobbyStore>, random: Arc<dyn RandomPort>) -> Self {
        Self { lobbies, random }
    }

    /// Takes a seat at an open lobby of `format`, or opens one.
    pub async fn start(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        format: TableFormat,
    ) -> Result<SeatingView, LobbyCommandError> {
        let seating = self.lobbies.lock(format.game()).await.start(
            guild_id,
            user_id,
            format,
            self.random.as_ref(),
        )?;
        log_seating(guild_id, user_id, &seating);
        Ok(seating.into())
    }

    pub async fn join(
        &self,
        game: CardGame,
        guild_id: GuildId,
        user_id: UserId,
        table_id: TableId,
    ) -> Result<SeatingView, LobbyCommandError> {
        let seating = self.lobbies.lock(game).await.join(
            guild_id,
            user_id,
            table_id,
            self.random.as_ref(),
        )?;
        log_seating(guild_id, user_id, &seating);
        Ok(seating.into())
    }

    /// Any table of the guild, by id.
    pub async fn view(
        &self,
        game: CardGame,
        guild_id: GuildId,
        table_id: TableId,
    ) -> Result<TableView, LobbyCommandError> {
        let directory = self.lobbies.lock(game).await;
        let table = directory
            .get(guild_id, table_id)
            .ok_or(LobbyError::TableNotFound(table_id))?;
        Ok(table.into())
    }

    /// The running game the caller is still playing in.
    pub async fn current(
        &self,
        game: CardGame,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<TableView, LobbyCommandError> {
        let directory = self.lobbies.lock(game).await;
        let table = directory
            .table_of(guild_id, user_id)
            .filter(|table| {
                !table.is_lobby() && table.seat(user_id).is_some_and(|seat| seat.is_active())
            })
            .ok_or(LobbyError::NoActiveGame)?;
        Ok(table.into())
    }

    pub async fn adjust_life(
        &self,
        game: CardGame,
        guild_id: GuildId,
        user_id: UserId,
        amount: i64,
    ) -> Result<LifeReport, LobbyCommandError> {
        let change = self
            .lobbies
            .lock(game)
            .await
            .adjust_life(guild_id, user_id, amount)?;
        tracing::debug!(
            guild_id = %guild_id,
            user_id = %user_id,
            amount,
            "Life adjusted",
        );
        log_result(guild_id, &change);
        Ok(change.into())
    }

    /// Commander damage only exists in Magic.
    pub async fn commander_damage(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        from: UserId,
        amount: i64,
    ) -> Result<LifeReport, LobbyCommandError> {
        let change = self
            .lobbies
            .lock(CardGame::Mtg)
            .await
            .commander_damage(guild_id, user_id, from, amount)?;
        tracing::debug!(
            guild_id = %guild_id,
            user_id = %user_id,
            from = %from,
            amount,
            "Commander damage taken",
        );
        log_result(guild_id, &change);
        Ok(change.into())
    }

    pub async fn tables(&self, game: CardGame, guild_id: GuildId) -> Vec<TableView> {
        let directory = self.lobbies.lock(game).await;
        directory
            .tables(guild_id)
            .into_iter()
            .map(TableView::from)
            .collect()
    }

    pub async fn leave(
        &self,
        game: CardGame,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<LobbyLeft, LobbyCommandError> {
        let left = self.lobbies.lock(game).await.leave(guild_id, user_id)?;
        tracing::info!(
            guild_id = %guild_id,
            table_id = %left.table_id,
            user_id = %user_id,
            "Left lobby",
        );
        Ok(left)
    }

    pub async fn force_start(
        &self,
        game: CardGame,
        guild_id: GuildId,
        user_id: UserId,
        table_id: Option<TableId>,
    ) -> Result<TableView, LobbyCommandError> {
        let table = self.lobbies.lock(game).await.force_start(
            guild_id,
            user_id,
            table_id,
            self.random.as_ref(),
        )?;
        tracing::info!(
            guild_id = %guild_id,
            table_id = %table.id(),
            players = table.seats().len(),
            "Game force started"
        );
        Ok(TableView::from(&table))
    }

    /// Scoop in Magic, surrender in Yu-Gi-Oh!.
    pub async fn concede(
        &self,
        game: CardGame,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<LifeReport, LobbyCommandError> {
        let change = self.lobbies.lock(game).await.concede(guild_id, user_id)?;
        log_result(guild_id, &change);
        Ok(change.into())
    }
}

fn log_seating(guild_id: GuildId, user_id: UserId, seating: &Seating) {
    let table = &seating.table;
    if seating.opened {
        tracing::info!(
            guild_id = %guild_id,
            table_id = %table.id(),
            owner = %user_id,
            format = %table.format(),
            "Lobby opened",
        );
    } else if seating.started {
        tracing::info!(
            guild_id = %guild_id,
            table_id = %table.id(),
            players = table.seats().len(),
            "Game started",
        );
    } else {
        tracing::debug!(
            guild_id = %guild_id,
            table_id = %table.id(),
            user_id = %user_id,
            "Joined lobby",
        );
    }
}

fn log_result(guild_id: GuildId, change: &LifeChange) {
    if let Some(winner) = change.winner {
        tracing::info!(
            guild_id = %guild_id,
            table_id = %change.table.id(),
            winner = %winner,
            "Game over",
        );
    } else if let Some(user) = change.eliminated {
        tracing::info!(
            guild_id = %guild_id,
            table_id = %change.table.id(),
            user_id = %user,
            "Player eliminated",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabletop_domain::random::testing::ScriptedRandom;

    const GUILD: GuildId = GuildId::new(3);

    fn ops() -> LobbyOps {
        LobbyOps::new(
            Arc::new(LobbyStore::new()),
            Arc::new(ScriptedRandom::new()),
        )
    }

    fn uid(raw: u64) -> UserId {
        UserId::new(raw)
    }

    #[tokio::test]
    async fn standard_game_from_lobby_to_winner() {
        let ops = ops();

        let opened = ops
            .start(GUILD, uid(1), TableFormat::Standard)
            .await
            .expect("free");
        assert!(opened.opened);
        assert_eq!(opened.table.players.len(), 1);

        let err = ops
            .current(CardGame::Mtg, GUILD, uid(1))
            .await
            .expect_err("still a lobby");
        assert!(matches!(
            err,
            LobbyCommandError::Lobby(LobbyError::NoActiveGame)
        ));

        let started = ops
            .join(CardGame::Mtg, GUILD, uid(2), opened.table.id)
            .await
            .expect("open seat");
        assert!(started.started);
        assert_eq!(started.table.phase, TablePhase::Active);
        assert_eq!(started.table.first_player, Some(uid(1)));

        let hit = ops
            .adjust_life(CardGame::Mtg, GUILD, uid(2), -5)
            .await
            .expect("playing");
        assert_eq!(hit.winner, None);
        let mine = ops
            .current(CardGame::Mtg, GUILD, uid(2))
            .await
            .expect("playing");
        assert_eq!(mine.players[1].life, 15);

        let scooped = ops
            .concede(CardGame::Mtg, GUILD, uid(2))
            .await
            .expect("playing");
        assert_eq!(scooped.winner, Some(uid(1)));
        assert!(ops.tables(CardGame::Mtg, GUILD).await.is_empty());
    }

    #[tokio::test]
    async fn each_game_keeps_its_own_tables() {
        let ops = ops();
        ops.start(GUILD, uid(1), TableFormat::Commander)
            .await
            .expect("free");
        let duel = ops
            .start(GUILD, uid(1), TableFormat::TagDuel)
            .await
            .expect("separate game");
        assert_eq!(duel.table.id, TableId::new(1));
        assert_eq!(duel.table.game, CardGame::Yugioh);
        assert_eq!(duel.table.seats, 4);
        assert_eq!(duel.table.players[0].life, 8000);

        let mtg = ops.tables(CardGame::Mtg, GUILD).await;
        assert_eq!(mtg.len(), 1);
        assert_eq!(mtg[0].format, TableFormat::Commander);
        assert!(ops.tables(CardGame::Yugioh, GuildId::new(4)).await.is_empty());

        let err = ops
            .view(CardGame::Yugioh, GUILD, TableId::new(2))
            .await
            .expect_err("no such table");
        assert!(matches!(
            err,
            LobbyCommandError::Lobby(LobbyError::TableNotFound(_))
        ));
    }

    #[tokio::test]
    async fn owner_force_starts_a_commander_pod() {
        let ops = ops();
        for raw in 1..=3 {
            ops.start(GUILD, uid(raw), TableFormat::Commander)
                .await
                .expect("free");
        }
        let err = ops
            .force_start(CardGame::Mtg, GUILD, uid(2), None)
            .await
            .expect_err("not owner");
        assert!(matches!(err, LobbyCommandError::Lobby(LobbyError::NotOwner)));

        let table = ops
            .force_start(CardGame::Mtg, GUILD, uid(1), None)
            .await
            .expect("owner");
        assert_eq!(table.phase, TablePhase::Active);
        assert_eq!(table.players.len(), 3);

        let report = ops
            .commander_damage(GUILD, uid(3), uid(2), 21)
            .await
            .expect("playing");
        assert_eq!(report.eliminated, Some(uid(3)));
        let seat = &report.table.players[2];
        assert!(!seat.active);
        assert_eq!(
            seat.commander_damage,
            vec![CommanderDamage {
                from: uid(2),
                amount: 21
            }]
        );

        let err = ops
            .leave(CardGame::Mtg, GUILD, uid(1))
            .await
            .expect_err("game running");
        assert!(matches!(err, LobbyCommandError::Lobby(LobbyError::GameStarted)));
    }
}
