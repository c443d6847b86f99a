//! Party management operations.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::aggregates::LeaveOutcome;
use tabletop_domain::{Catalog, GuildId, Party, PartyError, PartyId, UserId};

use crate::stores::{PartyStore, SessionKey, SessionStore};
use crate::use_cases::battle::withdraw_from_party_battle;
use crate::use_cases::views::QuestProgress;

use super::error::PartyCommandError;

/// A party as members see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyView {
    pub id: PartyId,
    pub leader: UserId,
    pub members: Vec<UserId>,
    pub invited: Vec<UserId>,
    pub quest: Option<QuestProgress>,
}

impl PartyView {
    pub fn new(catalog: &Catalog, party: &Party) -> Self {
        Self {
            id: party.id(),
            leader: party.leader(),
            members: party.members().iter().copied().collect(),
            invited: party.invited().iter().copied().collect(),
            quest: party
                .quest()
                .and_then(|quest| QuestProgress::shared(catalog, quest)),
        }
    }
}

/// Membership changes that may pull someone out of a live party fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Departure {
    pub party_id: PartyId,
    pub outcome: LeaveOutcome,
    /// The user was taken out of the party's running encounter.
    pub left_battle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Kicked {
    pub party_id: PartyId,
    pub target: UserId,
    pub left_battle: bool,
}

/// Party operations. All directory mutations go through the party store's lock.
pub struct PartyOps {
    catalog: Arc<Catalog>,
    sessions: Arc<SessionStore>,
    parties: Arc<PartyStore>,
}

impl PartyOps {
    pub fn new(catalog: Arc<Catalog>, sessions: Arc<SessionStore>, parties: Arc<PartyStore>) -> Self {
        Self {
            catalog,
            sessions,
            parties,
        }
    }

    pub async fn create(&self, user_id: UserId) -> Result<PartyView, PartyCommandError> {
        let mut directory = self.parties.lock().await;
        let id = directory.create(user_id)?;
        let party = directory.get(id).ok_or(PartyError::PartyNotFound(id))?;
        tracing::info!(party_id = %id, leader = %user_id, "Party created");
        Ok(PartyView::new(&self.catalog, party))
    }

    pub async fn invite(
        &self,
        user_id: UserId,
        target: UserId,
    ) -> Result<PartyView, PartyCommandError> {
        let mut directory = self.parties.lock().await;
        let id = directory.invite(user_id, target)?;
        let party = directory.get(id).ok_or(PartyError::PartyNotFound(id))?;
        tracing::debug!(party_id = %id, target = %target, "Party invite sent");
        Ok(PartyView::new(&self.catalog, party))
    }

    pub async fn join(
        &self,
        user_id: UserId,
        party_id: PartyId,
    ) -> Result<PartyView, PartyCommandError> {
        let mut directory = self.parties.lock().await;
        let party = directory.join(user_id, party_id)?;
        tracing::info!(party_id = %party_id, user_id = %user_id, "Joined party");
        Ok(PartyView::new(&self.catalog, party))
    }

    pub async fn leave(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Departure, PartyCommandError> {
        let (party_id, outcome) = {
            let mut directory = self.parties.lock().await;
            let party_id = directory
                .party_of(user_id)
                .map(Party::id)
                .ok_or(PartyError::NotInParty)?;
            (party_id, directory.leave(user_id)?)
        };
        let left_battle = self.withdraw(guild_id, party_id, user_id).await;
        tracing::info!(party_id = %party_id, user_id = %user_id, ?outcome, "Left party");
        Ok(Departure {
            party_id,
            outcome,
            left_battle,
        })
    }

    pub async fn kick(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        target: UserId,
    ) -> Result<Kicked, PartyCommandError> {
        let party_id = self.parties.lock().await.kick(user_id, target)?;
        let left_battle = self.withdraw(guild_id, party_id, target).await;
        tracing::info!(party_id = %party_id, target = %target, "Kicked from party");
        Ok(Kicked {
            party_id,
            target,
            left_battle,
        })
    }

    pub async fn promote(
        &self,
        user_id: UserId,
        target: UserId,
    ) -> Result<PartyView, PartyCommandError> {
        let mut directory = self.parties.lock().await;
        let id = directory.promote(user_id, target)?;
        let party = directory.get(id).ok_or(PartyError::PartyNotFound(id))?;
        Ok(PartyView::new(&self.catalog, party))
    }

    pub async fn status(&self, user_id: UserId) -> Result<PartyView, PartyCommandError> {
        let party = self
            .parties
            .party_of(user_id)
            .await
            .ok_or(PartyError::NotInParty)?;
        Ok(PartyView::new(&self.catalog, &party))
    }

    async fn withdraw(&self, guild_id: GuildId, party: PartyId, user_id: UserId) -> bool {
        let key = SessionKey::Party {
            guild: guild_id,
            party,
        };
        withdraw_from_party_battle(&self.sessions, key, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabletop_domain::catalog::fixtures;
    use tabletop_domain::combat::MonsterInstance;
    use tabletop_domain::EncounterSession;

    fn ops() -> (PartyOps, Arc<SessionStore>, Arc<PartyStore>) {
        let sessions = Arc::new(SessionStore::new());
        let parties = Arc::new(PartyStore::new());
        let ops = PartyOps::new(
            Arc::new(fixtures::catalog()),
            sessions.clone(),
            parties.clone(),
        );
        (ops, sessions, parties)
    }

    #[tokio::test]
    async fn invite_join_and_status() {
        let (ops, _, _) = ops();
        let (leader, friend, stranger) = (UserId::new(1), UserId::new(2), UserId::new(3));

        let created = ops.create(leader).await.expect("create");
        assert_eq!(created.members, vec![leader]);

        let invited = ops.invite(leader, friend).await.expect("invite");
        assert_eq!(invited.invited, vec![friend]);

        let err = ops.join(stranger, created.id).await.expect_err("no invite");
        assert!(matches!(err, PartyCommandError::Party(PartyError::NotInvited)));

        let joined = ops.join(friend, created.id).await.expect("join");
        assert_eq!(joined.members, vec![leader, friend]);
        assert!(joined.invited.is_empty());

        let err = ops.invite(friend, stranger).await.expect_err("not leader");
        assert!(matches!(err, PartyCommandError::Party(PartyError::NotLeader(_))));

        let status = ops.status(friend).await.expect("status");
        assert_eq!(status.leader, leader);
        assert!(status.quest.is_none());
        assert!(matches!(
            ops.status(stranger).await,
            Err(PartyCommandError::Party(PartyError::NotInParty))
        ));
    }

    #[tokio::test]
    async fn leader_leaving_hands_over_and_quits_the_fight() {
        let (ops, sessions, _) = ops();
        let guild = GuildId::new(9);
        let (leader, friend) = (UserId::new(1), UserId::new(2));
        let party = ops.create(leader).await.expect("create").id;
        ops.invite(leader, friend).await.expect("invite");
        ops.join(friend, party).await.expect("join");

        let key = SessionKey::Party { guild, party };
        *sessions.slot(key).lock().await = Some(EncounterSession::party(
            guild,
            party,
            MonsterInstance::spawn(&fixtures::monster("Green Slime", 12.0, 3.0, 0.0)),
            [leader, friend],
        ));

        let departure = ops.leave(guild, leader).await.expect("leave");
        assert_eq!(departure.outcome, LeaveOutcome::LeaderChanged(friend));
        assert!(departure.left_battle);
        assert!(sessions.is_active(key).await);

        let err = ops.kick(guild, friend, friend).await.expect_err("self kick");
        assert!(matches!(err, PartyCommandError::Party(PartyError::CannotKickSelf)));

        let departure = ops.leave(guild, friend).await.expect("leave");
        assert_eq!(departure.outcome, LeaveOutcome::Disbanded);
        assert!(!sessions.is_active(key).await);
    }

    #[tokio::test]
    async fn kick_and_promote() {
        let (ops, _, parties) = ops();
        let guild = GuildId::new(9);
        let (leader, a, b) = (UserId::new(1), UserId::new(2), UserId::new(3));
        let party = ops.create(leader).await.expect("create").id;
        for user in [a, b] {
            ops.invite(leader, user).await.expect("invite");
            ops.join(user, party).await.expect("join");
        }

        let kicked = ops.kick(guild, leader, b).await.expect("kick");
        assert_eq!(kicked.target, b);
        assert!(!kicked.left_battle);
        assert!(parties.party_of(b).await.is_none());

        let promoted = ops.promote(leader, a).await.expect("promote");
        assert_eq!(promoted.leader, a);
        assert!(matches!(
            ops.promote(a, a).await,
            Err(PartyCommandError::Party(PartyError::AlreadyLeader))
        ));
    }
}
