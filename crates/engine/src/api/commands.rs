//! Chat-style command payloads and their dispatch to use cases.

use serde::{Deserialize, Serialize};
use tabletop_domain::aggregates::StatKind;
use tabletop_domain::aggregates::LobbyLeft;
use tabletop_domain::{
    Action, CardGame, CharacterClass, GuildId, PartyId, QuestDef, TableFormat, TableId, UserId,
};

use crate::app::App;
use crate::use_cases::adventure::{ClassChosen, HealOutcome, QuitReport};
use crate::use_cases::battle::TurnReport;
use crate::use_cases::encounter::{EncounterStarted, Retreated};
use crate::use_cases::loadout::{QuestAbandoned, QuestLog, SpellBook, WeaponInfo, WeaponSwap};
use crate::use_cases::lobby::{LifeReport, SeatingView, TableView};
use crate::use_cases::party::{Departure, Kicked, PartyView};
use crate::use_cases::raid::RaidStarted;
use crate::use_cases::views::{CharacterSheet, OwnedItem, QuestProgress};

use super::http::ApiError;

/// One command issued by a user in a guild.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Start,
    Status,
    Spend {
        stat: String,
        amount: u32,
    },
    Class {
        class: String,
    },
    Heal {
        #[serde(default)]
        item: Option<String>,
    },
    Quit,
    Encounter,
    /// Plain attack, or a spell cast when `spell` is set.
    Attack {
        #[serde(default)]
        spell: Option<String>,
        #[serde(default)]
        target: Option<String>,
    },
    Retreat,

    PartyCreate,
    /// `user` is a raw id or a mention.
    PartyInvite {
        user: String,
    },
    PartyJoin {
        party_id: u64,
    },
    PartyLeave,
    PartyKick {
        user: String,
    },
    PartyPromote {
        user: String,
    },
    PartyStatus,

    Raid,
    RaidAttack {
        #[serde(default)]
        spell: Option<String>,
        #[serde(default)]
        target: Option<String>,
    },

    WeaponEquip {
        name: String,
    },
    WeaponUnequip,
    WeaponStatus,
    WeaponList,
    WeaponInfo {
        name: String,
    },

    SpellsList,
    SpellsEquip {
        name: String,
    },
    SpellsUnequip {
        name: String,
    },

    QuestList,
    QuestAccept {
        name: String,
    },
    QuestStatus,
    QuestAbandon,

    /// `format` is `strd` or `cmdr`.
    MtgStart {
        format: String,
    },
    MtgJoin {
        game_id: u64,
    },
    /// Shows the caller's game, a game by id, or adjusts life when `amount`
    /// is set. With `commander`, the change is commander damage from `from`.
    MtgLife {
        #[serde(default)]
        amount: Option<i64>,
        #[serde(default)]
        game_id: Option<u64>,
        #[serde(default)]
        commander: bool,
        #[serde(default)]
        from: Option<String>,
    },
    MtgLobbies,
    MtgLeave,
    MtgForcestart {
        #[serde(default)]
        game_id: Option<u64>,
    },
    MtgScoop,

    /// Two players unless `players` says otherwise.
    YgoStart {
        #[serde(default)]
        players: Option<u32>,
    },
    YgoJoin {
        game_id: u64,
    },
    YgoLife {
        #[serde(default)]
        amount: Option<i64>,
        #[serde(default)]
        game_id: Option<u64>,
    },
    YgoLobbies,
    YgoLeave,
    YgoForcestart {
        #[serde(default)]
        game_id: Option<u64>,
    },
    YgoSurrender,
}

/// Typed answer to a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reply", content = "data", rename_all = "snake_case")]
pub enum Reply {
    Sheet(CharacterSheet),
    ClassChosen(ClassChosen),
    Heal(HealOutcome),
    Quit(QuitReport),
    EncounterStarted(EncounterStarted),
    Turn(TurnReport),
    Retreated(Retreated),
    Party(PartyView),
    PartyLeft(Departure),
    PartyKicked(Kicked),
    RaidStarted(RaidStarted),
    WeaponSwapped(WeaponSwap),
    WeaponUnequipped { weapon: String },
    WeaponStatus { equipped: Option<WeaponInfo> },
    Weapons(Vec<OwnedItem>),
    WeaponInfo(WeaponInfo),
    SpellBook(SpellBook),
    Quests(Vec<QuestDef>),
    QuestAccepted(QuestProgress),
    QuestLog(QuestLog),
    QuestAbandoned(QuestAbandoned),
    Seated(SeatingView),
    Table(TableView),
    Tables(Vec<TableView>),
    Life(LifeReport),
    LobbyLeft(LobbyLeft),
}

fn action(spell: Option<String>) -> Action {
    match spell {
        Some(spell) => Action::Cast { spell },
        None => Action::Attack,
    }
}

fn user_arg(raw: &str) -> Result<UserId, ApiError> {
    UserId::parse_mention(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("'{raw}' is not a user id or mention")))
}

async fn life(
    app: &App,
    game: CardGame,
    guild_id: GuildId,
    user_id: UserId,
    amount: Option<i64>,
    game_id: Option<u64>,
) -> Result<Reply, ApiError> {
    let lobby = &app.use_cases.lobby;
    let reply = match (game_id, amount) {
        (Some(id), _) => Reply::Table(lobby.view(game, guild_id, TableId::new(id)).await?),
        (None, Some(amount)) => {
            Reply::Life(lobby.adjust_life(game, guild_id, user_id, amount).await?)
        }
        (None, None) => Reply::Table(lobby.current(game, guild_id, user_id).await?),
    };
    Ok(reply)
}

/// Runs `command` for `user_id` in `guild_id`.
pub async fn dispatch(
    app: &App,
    guild_id: GuildId,
    user_id: UserId,
    command: Command,
) -> Result<Reply, ApiError> {
    let uc = &app.use_cases;
    let reply = match command {
        Command::Start => Reply::Sheet(uc.adventure.start.execute(user_id).await?),
        Command::Status => Reply::Sheet(uc.adventure.status.execute(user_id).await?),
        Command::Spend { stat, amount } => {
            let stat: StatKind = stat.parse()?;
            Reply::Sheet(uc.adventure.spend.execute(user_id, stat, amount).await?)
        }
        Command::Class { class } => {
            let class: CharacterClass = class.parse()?;
            Reply::ClassChosen(uc.adventure.class.execute(user_id, class).await?)
        }
        Command::Heal { item } => Reply::Heal(
            uc.adventure
                .heal
                .execute(guild_id, user_id, item.as_deref())
                .await?,
        ),
        Command::Quit => Reply::Quit(uc.adventure.quit.execute(guild_id, user_id).await?),

        Command::Encounter => {
            Reply::EncounterStarted(uc.encounter.start.execute(guild_id, user_id).await?)
        }
        Command::Attack { spell, target } => Reply::Turn(
            uc.encounter
                .turn
                .execute(guild_id, user_id, action(spell), target.as_deref())
                .await?,
        ),
        Command::Retreat => Reply::Retreated(uc.encounter.retreat.execute(guild_id, user_id).await?),

        Command::PartyCreate => Reply::Party(uc.party.create(user_id).await?),
        Command::PartyInvite { user } => {
            Reply::Party(uc.party.invite(user_id, user_arg(&user)?).await?)
        }
        Command::PartyJoin { party_id } => {
            Reply::Party(uc.party.join(user_id, PartyId::new(party_id)).await?)
        }
        Command::PartyLeave => Reply::PartyLeft(uc.party.leave(guild_id, user_id).await?),
        Command::PartyKick { user } => {
            Reply::PartyKicked(uc.party.kick(guild_id, user_id, user_arg(&user)?).await?)
        }
        Command::PartyPromote { user } => {
            Reply::Party(uc.party.promote(user_id, user_arg(&user)?).await?)
        }
        Command::PartyStatus => Reply::Party(uc.party.status(user_id).await?),

        Command::Raid => Reply::RaidStarted(uc.raid.start.execute(guild_id, user_id).await?),
        Command::RaidAttack { spell, target } => Reply::Turn(
            uc.raid
                .attack
                .execute(guild_id, user_id, action(spell), target.as_deref())
                .await?,
        ),

        Command::WeaponEquip { name } => {
            Reply::WeaponSwapped(uc.loadout.weapons.equip(user_id, &name).await?)
        }
        Command::WeaponUnequip => Reply::WeaponUnequipped {
            weapon: uc.loadout.weapons.unequip(user_id).await?,
        },
        Command::WeaponStatus => Reply::WeaponStatus {
            equipped: uc.loadout.weapons.status(user_id).await?,
        },
        Command::WeaponList => Reply::Weapons(uc.loadout.weapons.list(user_id).await?),
        Command::WeaponInfo { name } => Reply::WeaponInfo(uc.loadout.weapons.info(&name)?),

        Command::SpellsList => Reply::SpellBook(uc.loadout.spells.list(user_id).await?),
        Command::SpellsEquip { name } => {
            Reply::SpellBook(uc.loadout.spells.equip(user_id, &name).await?)
        }
        Command::SpellsUnequip { name } => {
            Reply::SpellBook(uc.loadout.spells.unequip(user_id, &name).await?)
        }

        Command::QuestList => Reply::Quests(uc.loadout.quests.list()),
        Command::QuestAccept { name } => {
            Reply::QuestAccepted(uc.loadout.quests.accept(user_id, &name).await?)
        }
        Command::QuestStatus => Reply::QuestLog(uc.loadout.quests.status(user_id).await?),
        Command::QuestAbandon => {
            Reply::QuestAbandoned(uc.loadout.quests.abandon(user_id).await?)
        }

        Command::MtgStart { format } => {
            let format: TableFormat = format.parse()?;
            Reply::Seated(uc.lobby.start(guild_id, user_id, format).await?)
        }
        Command::MtgJoin { game_id } => Reply::Seated(
            uc.lobby
                .join(CardGame::Mtg, guild_id, user_id, TableId::new(game_id))
                .await?,
        ),
        Command::MtgLife {
            amount,
            game_id,
            commander: true,
            from,
        } => {
            let from = from.ok_or_else(|| {
                ApiError::BadRequest("Commander damage needs the player who dealt it".to_string())
            })?;
            let amount = amount.ok_or_else(|| {
                ApiError::BadRequest("Commander damage needs an amount".to_string())
            })?;
            if game_id.is_some() {
                return Err(ApiError::BadRequest(
                    "Commander damage applies to your own game".to_string(),
                ));
            }
            Reply::Life(
                uc.lobby
                    .commander_damage(guild_id, user_id, user_arg(&from)?, amount)
                    .await?,
            )
        }
        Command::MtgLife { amount, game_id, .. } => {
            life(app, CardGame::Mtg, guild_id, user_id, amount, game_id).await?
        }
        Command::MtgLobbies => Reply::Tables(uc.lobby.tables(CardGame::Mtg, guild_id).await),
        Command::MtgLeave => {
            Reply::LobbyLeft(uc.lobby.leave(CardGame::Mtg, guild_id, user_id).await?)
        }
        Command::MtgForcestart { game_id } => Reply::Table(
            uc.lobby
                .force_start(CardGame::Mtg, guild_id, user_id, game_id.map(TableId::new))
                .await?,
        ),
        Command::MtgScoop => {
            Reply::Life(uc.lobby.concede(CardGame::Mtg, guild_id, user_id).await?)
        }

        Command::YgoStart { players } => {
            let format = TableFormat::duel(players.unwrap_or(2))?;
            Reply::Seated(uc.lobby.start(guild_id, user_id, format).await?)
        }
        Command::YgoJoin { game_id } => Reply::Seated(
            uc.lobby
                .join(CardGame::Yugioh, guild_id, user_id, TableId::new(game_id))
                .await?,
        ),
        Command::YgoLife { amount, game_id } => {
            life(app, CardGame::Yugioh, guild_id, user_id, amount, game_id).await?
        }
        Command::YgoLobbies => Reply::Tables(uc.lobby.tables(CardGame::Yugioh, guild_id).await),
        Command::YgoLeave => {
            Reply::LobbyLeft(uc.lobby.leave(CardGame::Yugioh, guild_id, user_id).await?)
        }
        Command::YgoForcestart { game_id } => Reply::Table(
            uc.lobby
                .force_start(CardGame::Yugioh, guild_id, user_id, game_id.map(TableId::new))
                .await?,
        ),
        Command::YgoSurrender => {
            Reply::Life(uc.lobby.concede(CardGame::Yugioh, guild_id, user_id).await?)
        }
    };
    Ok(reply)
}
