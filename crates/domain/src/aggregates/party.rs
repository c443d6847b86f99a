//! Party aggregate and the directory that owns every party in the process.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{PartyId, UserId};

/// Rejections raised by party commands. None of them mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartyError {
    #[error("You are already in a party.")]
    AlreadyInParty,
    #[error("You are not in a party.")]
    NotInParty,
    #[error("Only the party leader can {0}.")]
    NotLeader(&'static str),
    #[error("That user has already been invited.")]
    AlreadyInvited,
    #[error("That user is already in a party.")]
    TargetInParty,
    #[error("You have not been invited to this party.")]
    NotInvited,
    #[error("You can't kick yourself. Leave the party instead.")]
    CannotKickSelf,
    #[error("That user is not in your party.")]
    NotMember,
    #[error("You are already the leader.")]
    AlreadyLeader,
    #[error("Party {0} does not exist.")]
    PartyNotFound(PartyId),
}

/// Shared quest slot of a party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyQuest {
    pub name: String,
    pub progress: u32,
}

/// A group of users fighting together.
///
/// # Invariants
///
/// - `leader` is always a member
/// - `members` is never empty (an empty party is removed from the directory)
/// - `invited` and `members` are disjoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    id: PartyId,
    leader: UserId,
    members: BTreeSet<UserId>,
    invited: BTreeSet<UserId>,
    quest: Option<PartyQuest>,
}

impl Party {
    fn new(id: PartyId, leader: UserId) -> Self {
        Self {
            id,
            leader,
            members: BTreeSet::from([leader]),
            invited: BTreeSet::new(),
            quest: None,
        }
    }

    #[inline]
    pub fn id(&self) -> PartyId {
        self.id
    }

    #[inline]
    pub fn leader(&self) -> UserId {
        self.leader
    }

    pub fn members(&self) -> &BTreeSet<UserId> {
        &self.members
    }

    pub fn invited(&self) -> &BTreeSet<UserId> {
        &self.invited
    }

    pub fn quest(&self) -> Option<&PartyQuest> {
        self.quest.as_ref()
    }

    pub fn is_leader(&self, user: UserId) -> bool {
        self.leader == user
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// What happened when a member left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum LeaveOutcome {
    Left,
    LeaderChanged(UserId),
    Disbanded,
}

/// Registry of live parties plus the user -> party index.
#[derive(Debug, Clone, Default)]
pub struct PartyDirectory {
    parties: BTreeMap<PartyId, Party>,
    membership: HashMap<UserId, PartyId>,
    next_id: u64,
}

impl PartyDirectory {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn get(&self, id: PartyId) -> Option<&Party> {
        self.parties.get(&id)
    }

    pub fn party_of(&self, user: UserId) -> Option<&Party> {
        self.membership
            .get(&user)
            .and_then(|id| self.parties.get(id))
    }

    fn led_party_mut(&mut self, leader: UserId, action: &'static str) -> Result<&mut Party, PartyError> {
        let id = *self.membership.get(&leader).ok_or(PartyError::NotInParty)?;
        let party = self
            .parties
            .get_mut(&id)
            .ok_or(PartyError::PartyNotFound(id))?;
        if !party.is_leader(leader) {
            return Err(PartyError::NotLeader(action));
        }
        Ok(party)
    }

    pub fn create(&mut self, leader: UserId) -> Result<PartyId, PartyError> {
        if self.membership.contains_key(&leader) {
            return Err(PartyError::AlreadyInParty);
        }
        let id = PartyId::new(self.next_id.max(1));
        self.next_id = id.get() + 1;
        self.parties.insert(id, Party::new(id, leader));
        self.membership.insert(leader, id);
        Ok(id)
    }

    pub fn invite(&mut self, leader: UserId, target: UserId) -> Result<PartyId, PartyError> {
        let target_in_party = self.membership.contains_key(&target);
        let party = self.led_party_mut(leader, "invite members")?;
        if target_in_party {
            return Err(PartyError::TargetInParty);
        }
        if !party.invited.insert(target) {
            return Err(PartyError::AlreadyInvited);
        }
        Ok(party.id)
    }

    pub fn join(&mut self, user: UserId, id: PartyId) -> Result<&Party, PartyError> {
        if self.membership.contains_key(&user) {
            return Err(PartyError::AlreadyInParty);
        }
        let party = self
            .parties
            .get_mut(&id)
            .ok_or(PartyError::PartyNotFound(id))?;
        if !party.invited.remove(&user) {
            return Err(PartyError::NotInvited);
        }
        party.members.insert(user);
        self.membership.insert(user, id);
        self.parties.get(&id).ok_or(PartyError::PartyNotFound(id))
    }

    /// Removes `user`; the lowest remaining id inherits leadership.
    pub fn leave(&mut self, user: UserId) -> Result<LeaveOutcome, PartyError> {
        let id = self.membership.remove(&user).ok_or(PartyError::NotInParty)?;
        let party = self
            .parties
            .get_mut(&id)
            .ok_or(PartyError::PartyNotFound(id))?;
        party.members.remove(&user);
        let Some(successor) = party.members.iter().next().copied() else {
            self.parties.remove(&id);
            return Ok(LeaveOutcome::Disbanded);
        };
        if party.leader == user {
            party.leader = successor;
            return Ok(LeaveOutcome::LeaderChanged(successor));
        }
        Ok(LeaveOutcome::Left)
    }

    pub fn kick(&mut self, leader: UserId, target: UserId) -> Result<PartyId, PartyError> {
        let party = self.led_party_mut(leader, "kick members")?;
        if target == leader {
            return Err(PartyError::CannotKickSelf);
        }
        if !party.members.remove(&target) {
            return Err(PartyError::NotMember);
        }
        let id = party.id;
        self.membership.remove(&target);
        Ok(id)
    }

    pub fn promote(&mut self, leader: UserId, target: UserId) -> Result<PartyId, PartyError> {
        let party = self.led_party_mut(leader, "promote another member")?;
        if !party.is_member(target) {
            return Err(PartyError::NotMember);
        }
        if target == leader {
            return Err(PartyError::AlreadyLeader);
        }
        party.leader = target;
        Ok(party.id)
    }

    /// Puts a quest on the caller's party, resetting shared progress.
    pub fn set_quest(&mut self, user: UserId, quest: impl Into<String>) -> Result<PartyId, PartyError> {
        let id = *self.membership.get(&user).ok_or(PartyError::NotInParty)?;
        let party = self
            .parties
            .get_mut(&id)
            .ok_or(PartyError::PartyNotFound(id))?;
        party.quest = Some(PartyQuest {
            name: quest.into(),
            progress: 0,
        });
        Ok(id)
    }

    pub fn clear_quest(&mut self, id: PartyId) -> Option<PartyQuest> {
        self.parties.get_mut(&id).and_then(|party| party.quest.take())
    }

    /// Stores the result of a resolved fight in the shared quest slot.
    ///
    /// `loaded` is the slot the fight started from. When the slot changed in
    /// the meantime it is left alone and `false` comes back.
    pub fn settle_quest(
        &mut self,
        id: PartyId,
        loaded: Option<&PartyQuest>,
        settled: Option<PartyQuest>,
    ) -> Result<bool, PartyError> {
        let party = self
            .parties
            .get_mut(&id)
            .ok_or(PartyError::PartyNotFound(id))?;
        if party.quest.as_ref() != loaded {
            return Ok(false);
        }
        party.quest = settled;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(raw: u64) -> UserId {
        UserId::new(raw)
    }

    #[test]
    fn ids_increase_monotonically() {
        let mut dir = PartyDirectory::new();
        let a = dir.create(uid(1)).expect("free user");
        let b = dir.create(uid(2)).expect("free user");
        assert!(b > a);
        assert_eq!(dir.create(uid(1)), Err(PartyError::AlreadyInParty));
    }

    #[test]
    fn invite_then_join_consumes_invitation() {
        let mut dir = PartyDirectory::new();
        let id = dir.create(uid(1)).expect("free user");
        assert_eq!(dir.join(uid(2), id).map(|_| ()), Err(PartyError::NotInvited));
        dir.invite(uid(1), uid(2)).expect("leader invites");
        assert_eq!(dir.invite(uid(1), uid(2)), Err(PartyError::AlreadyInvited));
        let party = dir.join(uid(2), id).expect("invited");
        assert!(party.is_member(uid(2)));
        assert!(party.invited().is_empty());
        assert_eq!(dir.invite(uid(1), uid(2)), Err(PartyError::TargetInParty));
    }

    #[test]
    fn only_leader_manages_party() {
        let mut dir = PartyDirectory::new();
        let id = dir.create(uid(1)).expect("free user");
        dir.invite(uid(1), uid(2)).expect("leader");
        dir.join(uid(2), id).expect("invited");
        assert_eq!(
            dir.invite(uid(2), uid(3)),
            Err(PartyError::NotLeader("invite members"))
        );
        assert_eq!(dir.kick(uid(1), uid(1)), Err(PartyError::CannotKickSelf));
        assert_eq!(dir.kick(uid(1), uid(9)), Err(PartyError::NotMember));
        assert_eq!(dir.promote(uid(1), uid(1)), Err(PartyError::AlreadyLeader));
        dir.promote(uid(1), uid(2)).expect("member");
        assert_eq!(dir.party_of(uid(1)).map(Party::leader), Some(uid(2)));
    }

    #[test]
    fn leader_leaving_hands_over_then_disbands() {
        let mut dir = PartyDirectory::new();
        let id = dir.create(uid(5)).expect("free user");
        dir.invite(uid(5), uid(3)).expect("leader");
        dir.join(uid(3), id).expect("invited");
        assert_eq!(dir.leave(uid(5)), Ok(LeaveOutcome::LeaderChanged(uid(3))));
        assert_eq!(dir.leave(uid(3)), Ok(LeaveOutcome::Disbanded));
        assert!(dir.get(id).is_none());
        assert_eq!(dir.leave(uid(3)), Err(PartyError::NotInParty));
    }

    #[test]
    fn kicked_member_is_free_again() {
        let mut dir = PartyDirectory::new();
        let id = dir.create(uid(1)).expect("free user");
        dir.invite(uid(1), uid(2)).expect("leader");
        dir.join(uid(2), id).expect("invited");
        dir.kick(uid(1), uid(2)).expect("member");
        assert!(dir.party_of(uid(2)).is_none());
        assert!(dir.create(uid(2)).is_ok());
    }

    #[test]
    fn shared_quest_progress() {
        let mut dir = PartyDirectory::new();
        let id = dir.create(uid(1)).expect("free user");
        assert!(dir.clear_quest(id).is_none());
        dir.set_quest(uid(1), "Slime Cleanup").expect("in party");
        let loaded = dir.get(id).and_then(Party::quest).cloned();
        let settled = Some(PartyQuest {
            name: "Slime Cleanup".to_string(),
            progress: 2,
        });
        assert_eq!(
            dir.settle_quest(id, loaded.as_ref(), settled.clone()),
            Ok(true)
        );
        assert_eq!(dir.clear_quest(id).map(|q| q.progress), Some(2));
        assert!(dir.settle_quest(PartyId::new(99), None, None).is_err());
    }

    #[test]
    fn stale_fight_result_leaves_a_newer_quest_alone() {
        let mut dir = PartyDirectory::new();
        let id = dir.create(uid(1)).expect("free user");
        dir.set_quest(uid(1), "Slime Cleanup").expect("in party");
        let loaded = dir.get(id).and_then(Party::quest).cloned();

        // The leader swaps quests while a fight is still resolving.
        dir.clear_quest(id);
        dir.set_quest(uid(1), "Goblin Menace").expect("in party");

        let stale = Some(PartyQuest {
            name: "Slime Cleanup".to_string(),
            progress: 1,
        });
        assert_eq!(dir.settle_quest(id, loaded.as_ref(), stale), Ok(false));
        let current = dir.get(id).and_then(Party::quest).expect("quest kept");
        assert_eq!(current.name, "Goblin Menace");
        assert_eq!(current.progress, 0);
    }
}
