//! Combat plumbing shared by encounters, raids and the commands that touch
//! a live fight.

use serde::Serialize;
use tabletop_domain::{
    CombatEvent, EncounterResult, EncounterSession, GuildId, PartyQuest, Roster, RosterChanges,
    UserId,
};
use tokio::sync::OwnedMutexGuard;

use crate::infrastructure::ports::{RecordStore, RepoError, WriteBatch};
use crate::stores::{PartyStore, SessionKey, SessionStore};
use crate::use_cases::views::MonsterView;

/// How a fight stands after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BattleOutcome {
    Continuing,
    Victory { finisher: UserId },
    Wiped,
}

impl From<EncounterResult> for BattleOutcome {
    fn from(result: EncounterResult) -> Self {
        match result {
            EncounterResult::Continuing => BattleOutcome::Continuing,
            EncounterResult::Victory { finisher } => BattleOutcome::Victory { finisher },
            EncounterResult::Wiped => BattleOutcome::Wiped,
        }
    }
}

/// Result of one resolved action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReport {
    pub events: Vec<CombatEvent>,
    pub outcome: BattleOutcome,
    pub monster: MonsterView,
}

/// Loads the records of everyone in a fight. Users without a record are
/// left out; the resolver treats them as absent.
pub(crate) async fn load_roster(
    records: &dyn RecordStore,
    users: impl IntoIterator<Item = UserId>,
) -> Result<Roster, RepoError> {
    let mut roster = Roster::new();
    for user in users {
        if let Some(combatant) = records.get_combatant(user).await? {
            let inventory = records.get_inventory(user).await?;
            roster.insert(user, combatant, inventory);
        }
    }
    Ok(roster)
}

/// Splits resolver changes into the store batch and the party quest slot.
pub(crate) fn into_batch(changes: RosterChanges) -> (WriteBatch, Option<Option<PartyQuest>>) {
    let party_quest = changes.party_quest.clone();
    let mut batch = WriteBatch::new();
    batch.extend_from_changes(changes);
    (batch, party_quest)
}

/// A locked live fight.
pub(crate) struct BattleGuard {
    pub key: SessionKey,
    pub guard: OwnedMutexGuard<Option<EncounterSession>>,
}

impl BattleGuard {
    pub fn session(&self) -> Option<&EncounterSession> {
        self.guard.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EncounterSession> {
        self.guard.as_mut()
    }

    /// Unlocks, dropping the registry entry when the fight is gone.
    pub fn finish(self, sessions: &SessionStore) {
        let key = self.key;
        drop(self.guard);
        sessions.release(&key);
    }
}

/// Locks the fight `user` is part of in `guild`: the party fight first, then
/// a solo one.
pub(crate) async fn find_battle(
    sessions: &SessionStore,
    parties: &PartyStore,
    guild: GuildId,
    user: UserId,
) -> Option<BattleGuard> {
    if let Some(party) = parties.party_of(user).await {
        let key = SessionKey::Party {
            guild,
            party: party.id(),
        };
        let guard = sessions.slot(key).lock_owned().await;
        if guard.as_ref().is_some_and(|s| s.is_participant(user)) {
            return Some(BattleGuard { key, guard });
        }
        BattleGuard { key, guard }.finish(sessions);
    }

    let key = SessionKey::Solo { guild, user };
    let guard = sessions.slot(key).lock_owned().await;
    if guard.is_some() {
        return Some(BattleGuard { key, guard });
    }
    BattleGuard { key, guard }.finish(sessions);
    None
}

/// Pulls `user` out of their party's fight, ending it when nobody is left.
pub(crate) async fn withdraw_from_party_battle(
    sessions: &SessionStore,
    key: SessionKey,
    user: UserId,
) -> bool {
    let mut battle = BattleGuard {
        key,
        guard: sessions.slot(key).lock_owned().await,
    };
    let (removed, emptied) = match battle.session_mut() {
        Some(session) => (
            session.remove_participant(user),
            session.participants().is_empty(),
        ),
        None => (false, false),
    };
    if emptied {
        *battle.guard = None;
    }
    battle.finish(sessions);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryRecordStore;
    use tabletop_domain::catalog::fixtures;
    use tabletop_domain::combat::MonsterInstance;
    use tabletop_domain::{Combatant, PartyId};

    fn slime() -> MonsterInstance {
        MonsterInstance::spawn(&fixtures::monster("Green Slime", 12.0, 3.0, 0.0))
    }

    #[tokio::test]
    async fn roster_skips_users_without_records() {
        let records = InMemoryRecordStore::new();
        let mut batch = WriteBatch::new();
        batch.upsert_combatant(UserId::new(1), Combatant::new());
        records.commit(batch).await.expect("seed");

        let roster = load_roster(&records, [UserId::new(1), UserId::new(2)])
            .await
            .expect("load");
        assert!(roster.combatant(UserId::new(1)).is_some());
        assert!(roster.combatant(UserId::new(2)).is_none());
    }

    #[tokio::test]
    async fn finds_party_fight_before_solo() {
        let sessions = SessionStore::new();
        let parties = PartyStore::new();
        let guild = GuildId::new(1);
        let (leader, member) = (UserId::new(1), UserId::new(2));
        let party = {
            let mut dir = parties.lock().await;
            let id = dir.create(leader).expect("create");
            dir.invite(leader, member).expect("invite");
            dir.join(member, id).expect("join");
            id
        };
        let key = SessionKey::Party { guild, party };
        *sessions.slot(key).lock().await =
            Some(EncounterSession::party(guild, party, slime(), [leader, member]));
        *sessions.slot(SessionKey::Solo { guild, user: member }).lock().await =
            Some(EncounterSession::solo(guild, member, slime()));

        let battle = find_battle(&sessions, &parties, guild, member)
            .await
            .expect("in a fight");
        assert_eq!(battle.key, key);
        battle.finish(&sessions);

        assert!(find_battle(&sessions, &parties, GuildId::new(2), member)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn last_member_out_ends_the_fight() {
        let sessions = SessionStore::new();
        let guild = GuildId::new(1);
        let key = SessionKey::Party {
            guild,
            party: PartyId::new(4),
        };
        *sessions.slot(key).lock().await = Some(EncounterSession::party(
            guild,
            PartyId::new(4),
            slime(),
            [UserId::new(1), UserId::new(2)],
        ));

        assert!(withdraw_from_party_battle(&sessions, key, UserId::new(1)).await);
        assert!(sessions.is_active(key).await);
        assert!(withdraw_from_party_battle(&sessions, key, UserId::new(2)).await);
        assert!(!sessions.is_active(key).await);
        assert!(sessions.is_empty());
    }
}
