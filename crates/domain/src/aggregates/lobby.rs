//! Card game tables: lobbies that fill up into games with life tracking.
//!
//! One [`LobbyDirectory`] per card game. Ids are counted per guild, and a
//! user sits at no more than one table of that game per guild.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{GuildId, TableId, UserId};
use crate::random::RandomSource;

/// Commander damage from a single opponent that knocks a player out.
pub const COMMANDER_DAMAGE_LIMIT: i64 = 21;

/// Rejections raised by table commands. None of them mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("Unknown format '{0}'. Use `strd` for Standard (2 players) or `cmdr` for Commander (up to 6 players).")]
    UnknownFormat(String),
    #[error("A duel takes 2 or 4 players, not {0}.")]
    InvalidPlayerCount(u32),
    #[error("You are already in game {0}. Leave it or wait for it to end first.")]
    AlreadySeated(TableId),
    #[error("Game {0} does not exist.")]
    TableNotFound(TableId),
    #[error("Game {0} is already in progress.")]
    NotALobby(TableId),
    #[error("Game {0} is full.")]
    LobbyFull(TableId),
    #[error("You are not in a lobby.")]
    NotInLobby,
    #[error("You can't leave a game that has started. Concede instead.")]
    GameStarted,
    #[error("Only the player who opened the lobby can force start it.")]
    NotOwner,
    #[error("A game needs at least two players.")]
    NotEnoughPlayers,
    #[error("You are not in an active game.")]
    NoActiveGame,
    #[error("Commander damage only counts in Commander games.")]
    NotCommander,
    #[error("{} is not at your table.", .0.mention())]
    NotAtTable(UserId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardGame {
    Mtg,
    Yugioh,
}

impl fmt::Display for CardGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CardGame::Mtg => "Magic: The Gathering",
            CardGame::Yugioh => "Yu-Gi-Oh!",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    Standard,
    Commander,
    Duel,
    TagDuel,
}

impl TableFormat {
    pub fn game(self) -> CardGame {
        match self {
            TableFormat::Standard | TableFormat::Commander => CardGame::Mtg,
            TableFormat::Duel | TableFormat::TagDuel => CardGame::Yugioh,
        }
    }

    /// Players needed before the lobby starts on its own.
    pub fn seats(self) -> usize {
        match self {
            TableFormat::Standard | TableFormat::Duel => 2,
            TableFormat::TagDuel => 4,
            TableFormat::Commander => 6,
        }
    }

    pub fn starting_life(self) -> i64 {
        match self {
            TableFormat::Standard => 20,
            TableFormat::Commander => 40,
            TableFormat::Duel | TableFormat::TagDuel => 8000,
        }
    }

    /// Yu-Gi-Oh! format by head count.
    pub fn duel(players: u32) -> Result<Self, LobbyError> {
        match players {
            2 => Ok(TableFormat::Duel),
            4 => Ok(TableFormat::TagDuel),
            other => Err(LobbyError::InvalidPlayerCount(other)),
        }
    }
}

/// Magic formats by name or short code.
impl FromStr for TableFormat {
    type Err = LobbyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "strd" => Ok(TableFormat::Standard),
            "commander" | "cmdr" => Ok(TableFormat::Commander),
            _ => Err(LobbyError::UnknownFormat(s.trim().to_string())),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableFormat::Standard => "Standard",
            TableFormat::Commander => "Commander",
            TableFormat::Duel => "Duel",
            TableFormat::TagDuel => "Tag Duel",
        })
    }
}

/// One player's place at a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seat {
    life: i64,
    active: bool,
    /// Commander damage taken, by the dealing player.
    commander_damage: BTreeMap<UserId, i64>,
}

impl Seat {
    fn new(life: i64) -> Self {
        Self {
            life,
            active: true,
            commander_damage: BTreeMap::new(),
        }
    }

    pub fn life(&self) -> i64 {
        self.life
    }

    /// Still in the game.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn commander_damage(&self) -> &BTreeMap<UserId, i64> {
        &self.commander_damage
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TablePhase {
    Lobby,
    Active,
}

/// A lobby or a running game.
///
/// # Invariants
///
/// - `owner` is seated while the table is a lobby
/// - `seats` never holds more than `format.seats()` players
/// - `first_player` is set once the game starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    id: TableId,
    format: TableFormat,
    owner: UserId,
    phase: TablePhase,
    seats: BTreeMap<UserId, Seat>,
    first_player: Option<UserId>,
}

impl Table {
    fn open(id: TableId, format: TableFormat, owner: UserId) -> Self {
        Self {
            id,
            format,
            owner,
            phase: TablePhase::Lobby,
            seats: BTreeMap::from([(owner, Seat::new(format.starting_life()))]),
            first_player: None,
        }
    }

    #[inline]
    pub fn id(&self) -> TableId {
        self.id
    }

    #[inline]
    pub fn format(&self) -> TableFormat {
        self.format
    }

    #[inline]
    pub fn owner(&self) -> UserId {
        self.owner
    }

    #[inline]
    pub fn phase(&self) -> TablePhase {
        self.phase
    }

    pub fn is_lobby(&self) -> bool {
        self.phase == TablePhase::Lobby
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= self.format.seats()
    }

    pub fn seats(&self) -> &BTreeMap<UserId, Seat> {
        &self.seats
    }

    pub fn seat(&self, user: UserId) -> Option<&Seat> {
        self.seats.get(&user)
    }

    pub fn first_player(&self) -> Option<UserId> {
        self.first_player
    }

    fn begin(&mut self, rng: &dyn RandomSource) {
        let players: Vec<UserId> = self.seats.keys().copied().collect();
        self.first_player = players.get(rng.pick_index(players.len())).copied();
        self.phase = TablePhase::Active;
    }

    /// The winner, once only one player is left in.
    fn last_standing(&self) -> Option<UserId> {
        let mut active = self
            .seats
            .iter()
            .filter(|(_, seat)| seat.active)
            .map(|(user, _)| *user);
        match (active.next(), active.next()) {
            (Some(winner), None) => Some(winner),
            _ => None,
        }
    }
}

/// Result of `start` or `join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seating {
    pub table: Table,
    /// A new lobby was opened for the caller.
    pub opened: bool,
    /// The caller filled the last seat and the game began.
    pub started: bool,
}

/// Result of a life change or a concession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifeChange {
    /// The table after the change. Once there is a winner it is already
    /// closed and this is its final state.
    pub table: Table,
    pub eliminated: Option<UserId>,
    pub winner: Option<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LobbyLeft {
    pub table_id: TableId,
    /// Owner after the departure; `None` when the lobby closed.
    pub owner: Option<UserId>,
}

#[derive(Debug, Clone, Default)]
struct GuildTables {
    tables: BTreeMap<TableId, Table>,
    seated: HashMap<UserId, TableId>,
}

impl GuildTables {
    fn next_id(&self) -> TableId {
        TableId::new(self.tables.keys().next_back().map_or(1, |id| id.get() + 1))
    }

    fn seat(
        &mut self,
        id: TableId,
        user: UserId,
        rng: &dyn RandomSource,
    ) -> Result<(Table, bool), LobbyError> {
        let table = self
            .tables
            .get_mut(&id)
            .ok_or(LobbyError::TableNotFound(id))?;
        if !table.is_lobby() {
            return Err(LobbyError::NotALobby(id));
        }
        if table.is_full() {
            return Err(LobbyError::LobbyFull(id));
        }
        table
            .seats
            .insert(user, Seat::new(table.format.starting_life()));
        self.seated.insert(user, id);
        let started = table.is_full();
        if started {
            table.begin(rng);
        }
        Ok((table.clone(), started))
    }

    /// The running game `user` is still playing in.
    fn active_table(&self, user: UserId) -> Result<TableId, LobbyError> {
        let id = *self.seated.get(&user).ok_or(LobbyError::NoActiveGame)?;
        let table = self.tables.get(&id).ok_or(LobbyError::NoActiveGame)?;
        if table.is_lobby() || !table.seat(user).is_some_and(Seat::is_active) {
            return Err(LobbyError::NoActiveGame);
        }
        Ok(id)
    }

    fn seat_mut(&mut self, id: TableId, user: UserId) -> Result<&mut Seat, LobbyError> {
        self.tables
            .get_mut(&id)
            .and_then(|table| table.seats.get_mut(&user))
            .ok_or(LobbyError::NoActiveGame)
    }

    /// Applies an elimination and closes the table when one player remains.
    fn settle(&mut self, id: TableId, eliminated: Option<UserId>) -> Result<LifeChange, LobbyError> {
        let table = self
            .tables
            .get_mut(&id)
            .ok_or(LobbyError::TableNotFound(id))?;
        if let Some(seat) = eliminated.and_then(|user| table.seats.get_mut(&user)) {
            seat.active = false;
        }
        let winner = eliminated.and_then(|_| table.last_standing());
        let snapshot = table.clone();
        if winner.is_some() {
            self.tables.remove(&id);
            self.seated.retain(|_, seated_at| *seated_at != id);
        }
        Ok(LifeChange {
            table: snapshot,
            eliminated,
            winner,
        })
    }
}

/// Every table of one card game, per guild.
#[derive(Debug, Clone)]
pub struct LobbyDirectory {
    game: CardGame,
    guilds: HashMap<GuildId, GuildTables>,
}

impl LobbyDirectory {
    pub fn new(game: CardGame) -> Self {
        Self {
            game,
            guilds: HashMap::new(),
        }
    }

    pub fn game(&self) -> CardGame {
        self.game
    }

    /// Lobbies and running games of a guild, by id.
    pub fn tables(&self, guild: GuildId) -> Vec<&Table> {
        self.guilds
            .get(&guild)
            .map(|tables| tables.tables.values().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, guild: GuildId, id: TableId) -> Option<&Table> {
        self.guilds.get(&guild)?.tables.get(&id)
    }

    pub fn table_of(&self, guild: GuildId, user: UserId) -> Option<&Table> {
        let tables = self.guilds.get(&guild)?;
        tables.tables.get(tables.seated.get(&user)?)
    }

    /// Joins the first open lobby of `format`, or opens a new one.
    pub fn start(
        &mut self,
        guild: GuildId,
        user: UserId,
        format: TableFormat,
        rng: &dyn RandomSource,
    ) -> Result<Seating, LobbyError> {
        if format.game() != self.game {
            return Err(LobbyError::UnknownFormat(format.to_string()));
        }
        let tables = self.guilds.entry(guild).or_default();
        if let Some(id) = tables.seated.get(&user) {
            return Err(LobbyError::AlreadySeated(*id));
        }

        let open = tables
            .tables
            .values()
            .find(|table| table.is_lobby() && table.format == format && !table.is_full())
            .map(Table::id);
        if let Some(id) = open {
            let (table, started) = tables.seat(id, user, rng)?;
            return Ok(Seating {
                table,
                opened: false,
                started,
            });
        }

        let id = tables.next_id();
        let table = Table::open(id, format, user);
        tables.tables.insert(id, table.clone());
        tables.seated.insert(user, id);
        Ok(Seating {
            table,
            opened: true,
            started: false,
        })
    }

    pub fn join(
        &mut self,
        guild: GuildId,
        user: UserId,
        id: TableId,
        rng: &dyn RandomSource,
    ) -> Result<Seating, LobbyError> {
        let tables = self
            .guilds
            .get_mut(&guild)
            .ok_or(LobbyError::TableNotFound(id))?;
        if let Some(seated_at) = tables.seated.get(&user) {
            return Err(LobbyError::AlreadySeated(*seated_at));
        }
        let (table, started) = tables.seat(id, user, rng)?;
        Ok(Seating {
            table,
            opened: false,
            started,
        })
    }

    /// Adds `amount` (negative for damage) to the caller's life total.
    pub fn adjust_life(
        &mut self,
        guild: GuildId,
        user: UserId,
        amount: i64,
    ) -> Result<LifeChange, LobbyError> {
        let tables = self
            .guilds
            .get_mut(&guild)
            .ok_or(LobbyError::NoActiveGame)?;
        let id = tables.active_table(user)?;
        let seat = tables.seat_mut(id, user)?;
        seat.life = seat.life.saturating_add(amount);
        let out = seat.life <= 0;
        tables.settle(id, out.then_some(user))
    }

    /// Records commander damage the caller took from `from`.
    pub fn commander_damage(
        &mut self,
        guild: GuildId,
        user: UserId,
        from: UserId,
        amount: i64,
    ) -> Result<LifeChange, LobbyError> {
        let tables = self
            .guilds
            .get_mut(&guild)
            .ok_or(LobbyError::NoActiveGame)?;
        let id = tables.active_table(user)?;
        let table = tables
            .tables
            .get(&id)
            .ok_or(LobbyError::TableNotFound(id))?;
        if table.format != TableFormat::Commander {
            return Err(LobbyError::NotCommander);
        }
        if from == user || table.seat(from).is_none() {
            return Err(LobbyError::NotAtTable(from));
        }

        let seat = tables.seat_mut(id, user)?;
        let taken = seat.commander_damage.entry(from).or_insert(0);
        *taken = taken.saturating_add(amount);
        let out = *taken >= COMMANDER_DAMAGE_LIMIT;
        tables.settle(id, out.then_some(user))
    }

    /// Leaves a lobby that has not started. The lowest remaining id inherits
    /// ownership; an empty lobby is removed.
    pub fn leave(&mut self, guild: GuildId, user: UserId) -> Result<LobbyLeft, LobbyError> {
        let tables = self
            .guilds
            .get_mut(&guild)
            .ok_or(LobbyError::NotInLobby)?;
        let id = *tables.seated.get(&user).ok_or(LobbyError::NotInLobby)?;
        let table = tables
            .tables
            .get_mut(&id)
            .ok_or(LobbyError::TableNotFound(id))?;
        if !table.is_lobby() {
            return Err(LobbyError::GameStarted);
        }

        table.seats.remove(&user);
        tables.seated.remove(&user);
        let Some(successor) = table.seats.keys().next().copied() else {
            tables.tables.remove(&id);
            return Ok(LobbyLeft {
                table_id: id,
                owner: None,
            });
        };
        if table.owner == user {
            table.owner = successor;
        }
        Ok(LobbyLeft {
            table_id: id,
            owner: Some(table.owner),
        })
    }

    /// Starts a lobby before it fills. Defaults to the caller's own lobby.
    pub fn force_start(
        &mut self,
        guild: GuildId,
        user: UserId,
        id: Option<TableId>,
        rng: &dyn RandomSource,
    ) -> Result<Table, LobbyError> {
        let Some(tables) = self.guilds.get_mut(&guild) else {
            return Err(id.map_or(LobbyError::NotInLobby, LobbyError::TableNotFound));
        };
        let id = match id {
            Some(id) => id,
            None => *tables.seated.get(&user).ok_or(LobbyError::NotInLobby)?,
        };
        let table = tables
            .tables
            .get_mut(&id)
            .ok_or(LobbyError::TableNotFound(id))?;
        if !table.is_lobby() {
            return Err(LobbyError::NotALobby(id));
        }
        if table.owner != user {
            return Err(LobbyError::NotOwner);
        }
        if table.seats.len() < 2 {
            return Err(LobbyError::NotEnoughPlayers);
        }
        table.begin(rng);
        Ok(table.clone())
    }

    /// Forfeits a running game. The caller is free to sit elsewhere right away.
    pub fn concede(&mut self, guild: GuildId, user: UserId) -> Result<LifeChange, LobbyError> {
        let tables = self
            .guilds
            .get_mut(&guild)
            .ok_or(LobbyError::NoActiveGame)?;
        let id = tables.active_table(user)?;
        tables.seated.remove(&user);
        tables.settle(id, Some(user))
    }
}
