use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::CombatError;
use super::monster::MonsterInstance;
use super::regen::RegenAccumulator;
use super::status::StatusMap;
use crate::ids::{GuildId, PartyId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleMode {
    Solo,
    Party,
    Raid,
}

/// One monster and the users fighting it.
///
/// # Invariants
///
/// - `acted` is a subset of `participants`
/// - In party and raid mode each participant acts at most once per round;
///   the round ends when `acted` covers every living participant, and `acted`
///   is emptied right after the monster's turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterSession {
    mode: BattleMode,
    guild: GuildId,
    #[serde(default)]
    party: Option<PartyId>,
    pub(crate) monster: MonsterInstance,
    participants: BTreeSet<UserId>,
    #[serde(default)]
    acted: BTreeSet<UserId>,
    #[serde(default)]
    statuses: BTreeMap<UserId, StatusMap>,
    #[serde(default)]
    hp_regen: BTreeMap<UserId, RegenAccumulator>,
    #[serde(default)]
    mana_regen: BTreeMap<UserId, RegenAccumulator>,
}

impl EncounterSession {
    pub fn solo(guild: GuildId, user: UserId, monster: MonsterInstance) -> Self {
        Self::new(BattleMode::Solo, guild, None, monster, [user])
    }

    pub fn party(
        guild: GuildId,
        party: PartyId,
        monster: MonsterInstance,
        members: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self::new(BattleMode::Party, guild, Some(party), monster, members)
    }

    pub fn raid(
        guild: GuildId,
        party: PartyId,
        boss: MonsterInstance,
        members: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self::new(BattleMode::Raid, guild, Some(party), boss, members)
    }

    fn new(
        mode: BattleMode,
        guild: GuildId,
        party: Option<PartyId>,
        monster: MonsterInstance,
        members: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self {
            mode,
            guild,
            party,
            monster,
            participants: members.into_iter().collect(),
            acted: BTreeSet::new(),
            statuses: BTreeMap::new(),
            hp_regen: BTreeMap::new(),
            mana_regen: BTreeMap::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn mode(&self) -> BattleMode {
        self.mode
    }

    #[inline]
    pub fn guild(&self) -> GuildId {
        self.guild
    }

    #[inline]
    pub fn party_id(&self) -> Option<PartyId> {
        self.party
    }

    #[inline]
    pub fn monster(&self) -> &MonsterInstance {
        &self.monster
    }

    pub fn participants(&self) -> &BTreeSet<UserId> {
        &self.participants
    }

    pub fn acted(&self) -> &BTreeSet<UserId> {
        &self.acted
    }

    pub fn is_participant(&self, user: UserId) -> bool {
        self.participants.contains(&user)
    }

    pub fn statuses(&self, user: UserId) -> Option<&StatusMap> {
        self.statuses.get(&user)
    }

    // =========================================================================
    // Turn gating
    // =========================================================================

    /// Rejects outsiders and, outside solo play, members who already acted.
    pub fn ensure_can_act(&self, user: UserId) -> Result<(), CombatError> {
        if !self.is_participant(user) {
            return Err(CombatError::NotParticipant);
        }
        if self.mode != BattleMode::Solo && self.acted.contains(&user) {
            return Err(CombatError::AlreadyActed);
        }
        Ok(())
    }

    pub fn mark_acted(&mut self, user: UserId) {
        if self.is_participant(user) {
            self.acted.insert(user);
        }
    }

    /// Every living participant has acted this round.
    pub fn round_complete(&self, living: &BTreeSet<UserId>) -> bool {
        !living.is_empty() && living.iter().all(|user| self.acted.contains(user))
    }

    pub fn reset_round(&mut self) {
        self.acted.clear();
    }

    /// `(acted, total)` counted over living participants.
    pub fn turn_progress(&self, living: &BTreeSet<UserId>) -> (usize, usize) {
        let acted = living.iter().filter(|u| self.acted.contains(u)).count();
        (acted, living.len())
    }

    // =========================================================================
    // Per-participant state
    // =========================================================================

    pub fn statuses_mut(&mut self, user: UserId) -> &mut StatusMap {
        self.statuses.entry(user).or_default()
    }

    pub(crate) fn hp_regen_mut(&mut self, user: UserId) -> &mut RegenAccumulator {
        self.hp_regen.entry(user).or_default()
    }

    pub(crate) fn mana_regen_mut(&mut self, user: UserId) -> &mut RegenAccumulator {
        self.mana_regen.entry(user).or_default()
    }

    /// Drops a participant and all of their transient state.
    pub fn remove_participant(&mut self, user: UserId) -> bool {
        self.acted.remove(&user);
        self.statuses.remove(&user);
        self.hp_regen.remove(&user);
        self.mana_regen.remove(&user);
        if self.monster.taunted_by == Some(user) {
            self.monster.taunted_by = None;
        }
        self.participants.remove(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;

    fn party_session(members: &[u64]) -> EncounterSession {
        let monster = MonsterInstance::spawn(&fixtures::monster("Slime", 10.0, 1.0, 0.0));
        EncounterSession::party(
            GuildId::new(1),
            PartyId::new(1),
            monster,
            members.iter().copied().map(UserId::new),
        )
    }

    #[test]
    fn party_members_act_once_per_round() {
        let mut session = party_session(&[1, 2]);
        let living = session.participants().clone();
        session.ensure_can_act(UserId::new(1)).expect("first action");
        session.mark_acted(UserId::new(1));
        assert_eq!(
            session.ensure_can_act(UserId::new(1)),
            Err(CombatError::AlreadyActed)
        );
        assert!(!session.round_complete(&living));
        assert_eq!(session.turn_progress(&living), (1, 2));
        session.mark_acted(UserId::new(2));
        assert!(session.round_complete(&living));
        session.reset_round();
        assert!(session.acted().is_empty());
    }

    #[test]
    fn outsiders_cannot_act() {
        let session = party_session(&[1]);
        assert_eq!(
            session.ensure_can_act(UserId::new(7)),
            Err(CombatError::NotParticipant)
        );
    }

    #[test]
    fn solo_player_is_never_gated() {
        let monster = MonsterInstance::spawn(&fixtures::monster("Slime", 10.0, 1.0, 0.0));
        let mut session = EncounterSession::solo(GuildId::new(1), UserId::new(1), monster);
        session.mark_acted(UserId::new(1));
        assert!(session.ensure_can_act(UserId::new(1)).is_ok());
    }

    #[test]
    fn removing_participant_clears_their_state() {
        let mut session = party_session(&[1, 2]);
        session.statuses_mut(UserId::new(2)).apply(super::super::status::Status::Haste, 2);
        session.mark_acted(UserId::new(2));
        assert!(session.remove_participant(UserId::new(2)));
        assert!(session.statuses(UserId::new(2)).is_none());
        assert!(session.acted().is_empty());
        assert!(!session.remove_participant(UserId::new(2)));
    }
}
