//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tabletop_domain::value_objects::{ActionRollResult, DamageRoll};
use tabletop_domain::{
    CombatError, DiceError, DomainError, GuildId, LobbyError, MonsterTemplate, PartyError,
    RaidError, UserId,
};

use crate::app::App;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::adventure::AdventureError;
use crate::use_cases::dice::FormulaRoll;
use crate::use_cases::encounter::EncounterError;
use crate::use_cases::loadout::{LoadoutError, WeaponInfo};
use crate::use_cases::lobby::LobbyCommandError;
use crate::use_cases::party::PartyCommandError;
use crate::use_cases::raid::RaidCommandError;

use super::commands::{dispatch, Command, Reply};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route(
            "/api/guilds/{guild_id}/users/{user_id}/commands",
            post(run_command),
        )
        .route("/api/dice/damage", post(roll_damage))
        .route("/api/dice/action", post(roll_action))
        .route("/api/dice/roll", post(roll_formula))
        .route("/api/catalog/monsters", get(list_monsters))
        .route("/api/catalog/weapons/{name}", get(weapon_info))
}

async fn health() -> &'static str {
    "OK"
}

async fn run_command(
    State(app): State<Arc<App>>,
    Path((guild_id, user_id)): Path<(u64, u64)>,
    Json(command): Json<Command>,
) -> Result<Json<Reply>, ApiError> {
    let reply = dispatch(&app, GuildId::new(guild_id), UserId::new(user_id), command).await?;
    Ok(Json(reply))
}

// =============================================================================
// Dice
// =============================================================================

#[derive(Debug, Deserialize)]
struct DamageRequest {
    die: String,
    amount: u32,
    #[serde(default)]
    modifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FormulaRequest {
    formula: String,
}

async fn roll_damage(
    State(app): State<Arc<App>>,
    Json(req): Json<DamageRequest>,
) -> Result<Json<DamageRoll>, ApiError> {
    let roll = app
        .use_cases
        .dice
        .damage(&req.die, req.amount, req.modifier.as_deref())?;
    Ok(Json(roll))
}

async fn roll_action(
    State(app): State<Arc<App>>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<ActionRollResult>, ApiError> {
    Ok(Json(app.use_cases.dice.action(req.kind.as_deref())?))
}

async fn roll_formula(
    State(app): State<Arc<App>>,
    Json(req): Json<FormulaRequest>,
) -> Result<Json<FormulaRoll>, ApiError> {
    Ok(Json(app.use_cases.dice.roll(&req.formula)?))
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_monsters(State(app): State<Arc<App>>) -> Json<Vec<MonsterTemplate>> {
    Json(app.catalog.monsters().to_vec())
}

async fn weapon_info(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<WeaponInfo>, ApiError> {
    Ok(Json(app.use_cases.loadout.weapons.info(&name)?))
}

// =============================================================================
// Errors
// =============================================================================

/// API error type.
///
/// Game rule rejections carry their message to the caller; storage failures
/// are logged and answered with a generic body.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            DomainError::Constraint(_) | DomainError::InvalidStateTransition(_) => {
                ApiError::Conflict(e.to_string())
            }
            DomainError::Validation(_) | DomainError::InvalidId(_) | DomainError::Parse(_) => {
                ApiError::BadRequest(e.to_string())
            }
        }
    }
}

impl From<DiceError> for ApiError {
    fn from(e: DiceError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<CombatError> for ApiError {
    fn from(e: CombatError) -> Self {
        match e {
            CombatError::AlreadyActed | CombatError::MonsterDefeated => {
                ApiError::Conflict(e.to_string())
            }
            CombatError::NotParticipant
            | CombatError::MissingCombatant(_)
            | CombatError::UnknownAlly(_) => ApiError::NotFound(e.to_string()),
            CombatError::NoMonsters | CombatError::NoRaidBoss => ApiError::Internal(e.to_string()),
            CombatError::NoClass
            | CombatError::UnknownSpell(_)
            | CombatError::InsufficientMana { .. }
            | CombatError::SelfTargetedDamage => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<PartyError> for ApiError {
    fn from(e: PartyError) -> Self {
        match e {
            PartyError::AlreadyInParty
            | PartyError::AlreadyInvited
            | PartyError::TargetInParty
            | PartyError::AlreadyLeader => ApiError::Conflict(e.to_string()),
            PartyError::NotInParty | PartyError::NotMember | PartyError::PartyNotFound(_) => {
                ApiError::NotFound(e.to_string())
            }
            PartyError::NotLeader(_) | PartyError::NotInvited | PartyError::CannotKickSelf => {
                ApiError::BadRequest(e.to_string())
            }
        }
    }
}

impl From<RaidError> for ApiError {
    fn from(e: RaidError) -> Self {
        match e {
            RaidError::NoActiveRaid => ApiError::NotFound(e.to_string()),
            RaidError::AlreadyActive { .. } | RaidError::InvalidTransition { .. } => {
                ApiError::Conflict(e.to_string())
            }
        }
    }
}

impl From<AdventureError> for ApiError {
    fn from(e: AdventureError) -> Self {
        match e {
            AdventureError::AlreadyStarted => ApiError::Conflict(e.to_string()),
            AdventureError::NotStarted | AdventureError::UnknownItem(_) => {
                ApiError::NotFound(e.to_string())
            }
            AdventureError::NotConsumable(_) | AdventureError::NotOwned(_) => {
                ApiError::BadRequest(e.to_string())
            }
            AdventureError::Validation(e) => e.into(),
            AdventureError::Repo(e) => e.into(),
        }
    }
}

impl From<EncounterError> for ApiError {
    fn from(e: EncounterError) -> Self {
        match e {
            EncounterError::NotStarted | EncounterError::NotInBattle => {
                ApiError::NotFound(e.to_string())
            }
            EncounterError::AlreadyInBattle => ApiError::Conflict(e.to_string()),
            EncounterError::NotLeader => ApiError::BadRequest(e.to_string()),
            EncounterError::Combat(e) => e.into(),
            EncounterError::Repo(e) => e.into(),
        }
    }
}

impl From<PartyCommandError> for ApiError {
    fn from(e: PartyCommandError) -> Self {
        match e {
            PartyCommandError::Party(e) => e.into(),
        }
    }
}

impl From<RaidCommandError> for ApiError {
    fn from(e: RaidCommandError) -> Self {
        match e {
            RaidCommandError::NotStarted | RaidCommandError::NotInParty => {
                ApiError::NotFound(e.to_string())
            }
            RaidCommandError::NotLeader => ApiError::BadRequest(e.to_string()),
            RaidCommandError::OnCooldown { .. } => ApiError::Conflict(e.to_string()),
            RaidCommandError::Raid(e) => e.into(),
            RaidCommandError::Combat(e) => e.into(),
            RaidCommandError::Repo(e) => e.into(),
        }
    }
}

impl From<LoadoutError> for ApiError {
    fn from(e: LoadoutError) -> Self {
        match e {
            LoadoutError::NotStarted
            | LoadoutError::UnknownWeapon(_)
            | LoadoutError::UnknownSpell(_)
            | LoadoutError::UnknownQuest(_)
            | LoadoutError::NoActiveQuest => ApiError::NotFound(e.to_string()),
            LoadoutError::NotOwned(_) | LoadoutError::NoWeaponEquipped | LoadoutError::NoClass => {
                ApiError::BadRequest(e.to_string())
            }
            LoadoutError::PartyQuestActive(_) => ApiError::Conflict(e.to_string()),
            LoadoutError::Validation(e) => e.into(),
            LoadoutError::Party(e) => e.into(),
            LoadoutError::Repo(e) => e.into(),
        }
    }
}

impl From<LobbyError> for ApiError {
    fn from(e: LobbyError) -> Self {
        match e {
            LobbyError::AlreadySeated(_)
            | LobbyError::NotALobby(_)
            | LobbyError::LobbyFull(_)
            | LobbyError::GameStarted => ApiError::Conflict(e.to_string()),
            LobbyError::TableNotFound(_)
            | LobbyError::NotInLobby
            | LobbyError::NoActiveGame
            | LobbyError::NotAtTable(_) => ApiError::NotFound(e.to_string()),
            LobbyError::UnknownFormat(_)
            | LobbyError::InvalidPlayerCount(_)
            | LobbyError::NotOwner
            | LobbyError::NotEnoughPlayers
            | LobbyError::NotCommander => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<LobbyCommandError> for ApiError {
    fn from(e: LobbyCommandError) -> Self {
        match e {
            LobbyCommandError::Lobby(e) => e.into(),
        }
    }
}
