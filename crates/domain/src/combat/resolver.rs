//! Turn resolution.
//!
//! [`TurnResolver`] runs one actor's action against an [`EncounterSession`],
//! including the monster's counter-turn, regeneration, defeat handling and
//! rewards. It never touches storage: the combatant records and inventories it
//! needs are loaded into a [`Roster`] beforehand, and [`Roster::into_changes`]
//! hands back exactly what must be written in one batch.
//!
//! Validation runs before anything mutates, so an `Err` leaves both the
//! session and the roster untouched.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Timelike, Utc};

use super::error::CombatError;
use super::events::{CombatEvent, DefeatPenalty, StatusTarget};
use super::regen::regenerate;
use super::rewards::{advance_party_quest, advance_personal_quest, roll_loot, QuestReport};
use super::session::{BattleMode, EncounterSession};
use super::status::{Modifiers, Status};
use super::target::{resolve_target, Target};
use super::weapon_effects::{apply_weapon_effect, EffectInput, WeaponEffect};
use crate::aggregates::party::PartyQuest;
use crate::aggregates::raid::{raid_cooldown_key, RAID_COOLDOWN};
use crate::aggregates::{Combatant, Inventory};
use crate::catalog::{
    Catalog, CharacterClass, ItemDef, SpellDef, SpellEffect, SpellRider, DEFAULT_RAID_LOOT,
};
use crate::ids::UserId;
use crate::random::RandomSource;

/// What the actor chose to do this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Attack,
    Cast { spell: String },
}

/// A cooldown started by this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownGrant {
    pub user_id: UserId,
    pub key: String,
    pub used_at: DateTime<Utc>,
}

/// Records the resolver may read and write, with change tracking.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    combatants: BTreeMap<UserId, Combatant>,
    inventories: BTreeMap<UserId, Inventory>,
    dirty_combatants: BTreeSet<UserId>,
    dirty_inventories: BTreeSet<UserId>,
    deleted: BTreeSet<UserId>,
    cooldowns: Vec<CooldownGrant>,
    party_quest: Option<PartyQuest>,
    party_quest_changed: bool,
}

/// Everything a resolved turn wants persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterChanges {
    pub combatants: Vec<(UserId, Combatant)>,
    pub deleted: Vec<UserId>,
    pub inventories: Vec<(UserId, Inventory)>,
    pub cooldowns: Vec<CooldownGrant>,
    /// New party quest slot, when it changed.
    pub party_quest: Option<Option<PartyQuest>>,
}

impl RosterChanges {
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
            && self.deleted.is_empty()
            && self.inventories.is_empty()
            && self.cooldowns.is_empty()
            && self.party_quest.is_none()
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: UserId, combatant: Combatant, inventory: Inventory) {
        self.combatants.insert(user, combatant);
        self.inventories.insert(user, inventory);
    }

    /// Loads the fighting party's shared quest slot.
    pub fn with_party_quest(mut self, quest: Option<PartyQuest>) -> Self {
        self.party_quest = quest;
        self
    }

    pub fn combatant(&self, user: UserId) -> Option<&Combatant> {
        self.combatants.get(&user)
    }

    pub fn combatant_mut(&mut self, user: UserId) -> Option<&mut Combatant> {
        let combatant = self.combatants.get_mut(&user)?;
        self.dirty_combatants.insert(user);
        Some(combatant)
    }

    pub fn inventory(&self, user: UserId) -> Option<&Inventory> {
        self.inventories.get(&user)
    }

    pub fn inventory_mut(&mut self, user: UserId) -> &mut Inventory {
        self.dirty_inventories.insert(user);
        self.inventories.entry(user).or_default()
    }

    pub fn party_quest(&self) -> Option<&PartyQuest> {
        self.party_quest.as_ref()
    }

    fn party_quest_mut(&mut self) -> &mut Option<PartyQuest> {
        self.party_quest_changed = true;
        &mut self.party_quest
    }

    /// Drops a progression record for good.
    pub fn delete(&mut self, user: UserId) {
        self.combatants.remove(&user);
        self.dirty_combatants.remove(&user);
        self.deleted.insert(user);
    }

    pub fn grant_cooldown(&mut self, user: UserId, key: String, used_at: DateTime<Utc>) {
        self.cooldowns.push(CooldownGrant {
            user_id: user,
            key,
            used_at,
        });
    }

    pub fn into_changes(mut self) -> RosterChanges {
        let combatants = self
            .dirty_combatants
            .iter()
            .filter_map(|user| self.combatants.remove(user).map(|c| (*user, c)))
            .collect();
        let inventories = self
            .dirty_inventories
            .iter()
            .filter_map(|user| self.inventories.remove(user).map(|inv| (*user, inv)))
            .collect();
        RosterChanges {
            combatants,
            deleted: self.deleted.into_iter().collect(),
            inventories,
            cooldowns: self.cooldowns,
            party_quest: self.party_quest_changed.then_some(self.party_quest),
        }
    }
}

/// How the encounter stands after the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterResult {
    Continuing,
    Victory { finisher: UserId },
    /// No participant is left standing.
    Wiped,
}

impl EncounterResult {
    pub fn is_over(self) -> bool {
        !matches!(self, EncounterResult::Continuing)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub events: Vec<CombatEvent>,
    pub result: EncounterResult,
}

/// Resolves one action. Build a fresh resolver per turn.
pub struct TurnResolver<'a> {
    catalog: &'a Catalog,
    rng: &'a dyn RandomSource,
    now: DateTime<Utc>,
    session: &'a mut EncounterSession,
    roster: &'a mut Roster,
    events: Vec<CombatEvent>,
}

impl<'a> TurnResolver<'a> {
    pub fn new(
        catalog: &'a Catalog,
        rng: &'a dyn RandomSource,
        now: DateTime<Utc>,
        session: &'a mut EncounterSession,
        roster: &'a mut Roster,
    ) -> Self {
        Self {
            catalog,
            rng,
            now,
            session,
            roster,
            events: Vec::new(),
        }
    }

    /// Runs `action` for `actor` aimed at the raw `target` input.
    pub fn resolve(
        mut self,
        actor: UserId,
        action: &Action,
        target: Option<&str>,
    ) -> Result<TurnOutcome, CombatError> {
        self.session.ensure_can_act(actor)?;
        if self.session.monster().is_defeated() {
            return Err(CombatError::MonsterDefeated);
        }
        let combatant = self
            .roster
            .combatant(actor)
            .ok_or(CombatError::MissingCombatant(actor))?;
        let target = resolve_target(target, actor, self.session.participants());
        let spell = match action {
            Action::Attack => None,
            Action::Cast { spell } => Some(self.validate_spell(combatant, spell, target)?),
        };

        let result = match self.session.mode() {
            BattleMode::Solo => self.resolve_solo(actor, spell, target),
            BattleMode::Party | BattleMode::Raid => self.resolve_group(actor, spell, target),
        };
        Ok(TurnOutcome {
            events: self.events,
            result,
        })
    }

    fn validate_spell(
        &self,
        combatant: &Combatant,
        name: &str,
        target: Target,
    ) -> Result<&'a SpellDef, CombatError> {
        let catalog = self.catalog;
        let class = combatant.class().ok_or(CombatError::NoClass)?;
        let spell = catalog
            .spell(class, name)
            .ok_or_else(|| CombatError::UnknownSpell(name.to_string()))?;
        if combatant.mana() < spell.mana {
            return Err(CombatError::InsufficientMana {
                have: combatant.mana(),
                max: combatant.max_mana(),
                cost: spell.mana,
            });
        }
        match target {
            Target::Own if spell.is_damaging() => return Err(CombatError::SelfTargetedDamage),
            Target::Ally(ally) if self.roster.combatant(ally).is_none() => {
                return Err(CombatError::UnknownAlly(ally));
            }
            _ => {}
        }
        Ok(spell)
    }

    // =========================================================================
    // Turn order
    // =========================================================================

    fn resolve_solo(
        &mut self,
        actor: UserId,
        spell: Option<&'a SpellDef>,
        target: Target,
    ) -> EncounterResult {
        if self.monster_debuffs_before(spell) {
            return self.victory(actor);
        }
        let player_first = spell.is_some() || self.rng.player_first();
        if spell.is_none() {
            self.events.push(CombatEvent::Initiative { player_first });
        }

        if player_first {
            self.act(actor, spell, target);
            if self.session.monster().is_defeated() {
                return self.victory(actor);
            }
            self.monster_turn(actor);
        } else {
            self.monster_turn(actor);
            if !self.session.is_participant(actor) {
                return EncounterResult::Wiped;
            }
            self.act(actor, spell, target);
            if self.session.monster().is_defeated() {
                return self.victory(actor);
            }
        }

        if !self.session.is_participant(actor) {
            return EncounterResult::Wiped;
        }
        self.regenerate_player(actor);
        self.regenerate_monster();
        EncounterResult::Continuing
    }

    fn resolve_group(
        &mut self,
        actor: UserId,
        spell: Option<&'a SpellDef>,
        target: Target,
    ) -> EncounterResult {
        if self.monster_debuffs_before(spell) {
            return self.victory(actor);
        }
        self.act(actor, spell, target);
        self.session.mark_acted(actor);
        if self.session.monster().is_defeated() {
            return self.victory(actor);
        }

        let living = self.living();
        if self.session.round_complete(&living) {
            self.environment_turn(&living);
            self.session.reset_round();
        } else {
            let (acted, total) = self.session.turn_progress(&living);
            self.events.push(CombatEvent::TurnProgress { acted, total });
        }

        if self.session.participants().is_empty() {
            EncounterResult::Wiped
        } else {
            EncounterResult::Continuing
        }
    }

    fn living(&self) -> BTreeSet<UserId> {
        self.session
            .participants()
            .iter()
            .copied()
            .filter(|user| self.roster.combatant(*user).is_some_and(|c| !c.is_downed()))
            .collect()
    }

    /// The monster's turn once every living member has acted.
    fn environment_turn(&mut self, living: &BTreeSet<UserId>) {
        let taunter = self.session.monster().taunted_by().filter(|user| {
            living.contains(user)
                && self
                    .session
                    .statuses(*user)
                    .is_some_and(|s| s.has(Status::Taunt))
        });
        if taunter.is_none() {
            self.session.monster.taunted_by = None;
        }
        let target = match taunter {
            Some(user) => user,
            None => {
                let candidates: Vec<UserId> = living.iter().copied().collect();
                match candidates.get(self.rng.pick_index(candidates.len())) {
                    Some(user) => *user,
                    None => return,
                }
            }
        };

        self.events.push(CombatEvent::EnvironmentTurn { target });
        self.monster_turn(target);
        if self.session.is_participant(target) {
            self.regenerate_player(target);
        }
        self.regenerate_monster();
    }

    // =========================================================================
    // Player action
    // =========================================================================

    fn act(&mut self, actor: UserId, spell: Option<&'a SpellDef>, target: Target) {
        self.bleed(actor);

        let bsd = self
            .roster
            .combatant(actor)
            .map_or(0.0, Combatant::bonus_spell_damage);
        let statuses = self.session.statuses_mut(actor);
        let mods = statuses.modifiers(bsd);
        statuses.tick();
        if mods.incapacitated {
            self.events
                .push(CombatEvent::PlayerIncapacitated { user_id: actor });
        } else {
            match spell {
                None => self.attack(actor, mods),
                Some(spell) => self.cast(actor, spell, target, mods),
            }
        }

        // Casts let their own debuffs land before the tick.
        if spell.is_some() {
            self.tick_monster_debuffs();
        }
    }

    /// Attacks tick the monster's debuffs before anything else happens.
    /// Returns `true` when that alone finished it off.
    fn monster_debuffs_before(&mut self, spell: Option<&SpellDef>) -> bool {
        spell.is_none() && self.tick_monster_debuffs()
    }

    /// Bleed drains hp at the start of the actor's turn but never kills.
    fn bleed(&mut self, actor: UserId) {
        if !self
            .session
            .statuses(actor)
            .is_some_and(|s| s.has(Status::Bleed))
        {
            return;
        }
        let Some(c) = self.roster.combatant_mut(actor) else {
            return;
        };
        let drain = (0.07 * c.max_hp()).floor();
        let floor_hp = c.hp().min(1.0);
        let next = (c.hp() - drain).max(floor_hp);
        let damage = c.hp() - next;
        c.hp = next;
        if damage > 0.0 {
            self.events.push(CombatEvent::PlayerBled {
                user_id: actor,
                damage,
            });
        }
    }

    fn attack(&mut self, actor: UserId, mods: Modifiers) {
        let catalog = self.catalog;
        let rng = self.rng;
        let Some(c) = self.roster.combatant(actor) else {
            return;
        };

        let weapon_name = c.weapon().map(str::to_owned);
        let weapon: Option<&ItemDef> = weapon_name.as_deref().and_then(|n| catalog.weapon(n));
        let effect = weapon.and_then(ItemDef::weapon_effect);
        let rarity = weapon.map(|w| w.rarity).unwrap_or_default();

        let monster = &mut self.session.monster;
        let never_miss = effect.is_some_and(WeaponEffect::ignores_evasion);
        if !never_miss && rng.chance(monster.evasion_chance) {
            self.events
                .push(CombatEvent::MonsterEvaded { user_id: actor });
            return;
        }

        let weapon_damage = weapon.map_or(0.0, |w| f64::from(w.weapon_damage()));
        let base = c.atk() + mods.attack + weapon_damage + f64::from(c.strength() / 2);
        let mut raw = base * (0.9 + 0.2 * rng.gen_unit()) + f64::from(rng.gen_range(-1, 1));
        let critical = rng.chance(c.crit_chance());
        if critical {
            raw *= c.crit_damage().max(2.0);
        }
        let damage = (raw - monster.effective_defense()).trunc().max(1.0);

        let input = EffectInput {
            damage,
            critical,
            actor_hp: c.hp(),
            actor_max_hp: c.max_hp(),
            bonus_spell_damage: c.bonus_spell_damage(),
            in_party: self.session.mode() != BattleMode::Solo
                && self.session.participants().len() > 1,
            hour_utc: self.now.hour(),
        };
        let monster = &mut self.session.monster;
        let result = apply_weapon_effect(effect, rarity, monster, input, rng);

        let mut damage = result.damage;
        if let Some(multiplier) = monster.curse_multiplier() {
            let cursed = (damage * multiplier).trunc();
            self.events.push(CombatEvent::CurseBonus {
                user_id: actor,
                damage: cursed - damage,
            });
            damage = cursed;
        }
        monster.take_damage(damage);
        let monster_hp = monster.hp();

        if let Some(outcome) = result.outcome {
            self.events.push(CombatEvent::WeaponEffect {
                user_id: actor,
                weapon: weapon_name.clone().unwrap_or_default(),
                outcome,
            });
        }
        let healed = result.actor_hp - input.actor_hp;
        if healed > 0.0 {
            if let Some(c) = self.roster.combatant_mut(actor) {
                c.heal(healed);
            }
        }
        if let Some(turns) = result.party_leadership {
            let others: Vec<UserId> = self
                .session
                .participants()
                .iter()
                .copied()
                .filter(|user| *user != actor)
                .collect();
            for user in others {
                self.session.statuses_mut(user).apply(Status::Leadership, turns);
                self.events.push(CombatEvent::StatusApplied {
                    target: StatusTarget::Player(user),
                    status: Status::Leadership,
                    turns,
                });
            }
        }

        self.events.push(CombatEvent::PlayerHit {
            user_id: actor,
            damage,
            critical,
            monster_hp,
        });
    }

    fn cast(&mut self, actor: UserId, spell: &'a SpellDef, target: Target, mods: Modifiers) {
        let rng = self.rng;
        let Some(c) = self.roster.combatant_mut(actor) else {
            return;
        };
        c.spend_mana(spell.mana);
        let class = c.class();
        let (atk, max_hp, bsd) = (c.atk(), c.max_hp(), c.bonus_spell_damage());
        let (strength, dexterity) = (f64::from(c.strength()), f64::from(c.dexterity()));
        self.events.push(CombatEvent::SpellCast {
            user_id: actor,
            spell: spell.name.clone(),
            mana_spent: spell.mana,
        });

        match &spell.effect {
            SpellEffect::Damage {
                amount,
                crit_chance,
                crit_damage,
                rider,
            } => {
                let roll = f64::from(rng.gen_range(0, 5));
                let mut damage = match class {
                    Some(CharacterClass::Warrior) => {
                        amount + atk + strength + bsd + mods.spell_damage + roll
                    }
                    Some(CharacterClass::Assassin) => {
                        amount + atk + dexterity + bsd + mods.spell_damage + roll
                    }
                    Some(CharacterClass::Mage) | None => {
                        amount + 2.0 * bsd + mods.spell_damage + roll
                    }
                };
                let mut critical = false;
                if class == Some(CharacterClass::Assassin) && rng.chance(0.2 + crit_chance) {
                    damage *= 1.5 + crit_damage;
                    critical = true;
                }
                let damage = damage.trunc().max(0.0);
                let monster = &mut self.session.monster;
                monster.take_damage(damage);
                self.events.push(CombatEvent::SpellDamage {
                    user_id: actor,
                    spell: spell.name.clone(),
                    damage,
                    critical,
                    monster_hp: monster.hp(),
                });
                match rider {
                    Some(SpellRider::Stun { chance }) => {
                        if rng.chance(*chance) {
                            monster.stunned = true;
                            self.events
                                .push(CombatEvent::MonsterStunned { user_id: actor });
                        }
                    }
                    Some(SpellRider::Afflict { status, turns }) => {
                        monster.debuffs.apply(*status, *turns);
                        self.events.push(CombatEvent::StatusApplied {
                            target: StatusTarget::Monster,
                            status: *status,
                            turns: *turns,
                        });
                    }
                    None => {}
                }
            }
            SpellEffect::Buff { status, turns } => self.buff(actor, *status, *turns),
            SpellEffect::SecondWind { fraction } => {
                let amount = (max_hp * fraction).floor() + strength + bsd;
                self.heal_player(actor, amount);
            }
            SpellEffect::Rally { amount } => {
                let amount = amount + strength + bsd;
                let members: Vec<UserId> = self.session.participants().iter().copied().collect();
                for member in members {
                    self.heal_player(member, amount);
                }
            }
            SpellEffect::Heal { amount } => {
                let amount = amount + bsd + f64::from(rng.gen_range(2, 8));
                let recipient = match target {
                    Target::Ally(ally) => ally,
                    Target::Own | Target::Monster => actor,
                };
                self.heal_player(recipient, amount);
            }
            SpellEffect::Vanish { amount } => {
                self.buff(actor, Status::Vanish, 1);
                self.heal_player(actor, amount + bsd);
            }
            SpellEffect::AdrenalineRush { turns } => {
                self.buff(actor, Status::AdrenalineRush, *turns);
                self.restore_player_mana(actor, 5.0 + bsd);
            }
            SpellEffect::ArcaneSurge { turns } => {
                self.buff(actor, Status::ArcaneSurge, *turns);
                self.restore_player_mana(actor, 8.0 + bsd);
            }
            SpellEffect::Taunt { turns } => {
                self.session.monster.taunted_by = Some(actor);
                self.events
                    .push(CombatEvent::MonsterTaunted { user_id: actor });
                self.buff(actor, Status::Taunt, *turns);
            }
            SpellEffect::Debuff { status, turns } => {
                self.session.monster.debuffs.apply(*status, *turns);
                self.events.push(CombatEvent::StatusApplied {
                    target: StatusTarget::Monster,
                    status: *status,
                    turns: *turns,
                });
            }
        }
    }

    fn buff(&mut self, user: UserId, status: Status, turns: u32) {
        self.session.statuses_mut(user).apply(status, turns);
        self.events.push(CombatEvent::StatusApplied {
            target: StatusTarget::Player(user),
            status,
            turns,
        });
    }

    fn heal_player(&mut self, user: UserId, amount: f64) {
        if let Some(c) = self.roster.combatant_mut(user) {
            let gained = c.heal(amount);
            let hp = c.hp();
            self.events.push(CombatEvent::Healed {
                user_id: user,
                amount: gained,
                hp,
            });
        }
    }

    fn restore_player_mana(&mut self, user: UserId, amount: f64) {
        if let Some(c) = self.roster.combatant_mut(user) {
            let gained = c.restore_mana(amount);
            let mana = c.mana();
            self.events.push(CombatEvent::ManaRestored {
                user_id: user,
                amount: gained,
                mana,
            });
        }
    }

    /// Periodic monster debuffs. Returns `true` when they finished it off.
    fn tick_monster_debuffs(&mut self) -> bool {
        let monster = &mut self.session.monster;
        let tick = monster.tick_debuffs();
        for (status, damage) in tick.damage {
            self.events.push(CombatEvent::MonsterAfflicted {
                status,
                damage,
                monster_hp: monster.hp(),
            });
        }
        if let Some(status) = tick.lost_turn {
            self.events.push(CombatEvent::MonsterLosesTurn { status });
        }
        monster.is_defeated()
    }

    // =========================================================================
    // Monster turn
    // =========================================================================

    fn monster_turn(&mut self, defender: UserId) {
        let rng = self.rng;
        let monster = &mut self.session.monster;
        if monster.stunned {
            monster.stunned = false;
            self.events.push(CombatEvent::MonsterStunSkipped);
            return;
        }
        if monster.skip_turn {
            monster.skip_turn = false;
            self.events.push(CombatEvent::MonsterSkipsTurn);
            return;
        }

        let Some(c) = self.roster.combatant(defender) else {
            return;
        };
        let mods = self
            .session
            .statuses(defender)
            .map(|s| s.modifiers(c.bonus_spell_damage()))
            .unwrap_or_default();
        let monster = &mut self.session.monster;

        let mut evasion = (0.01 * f64::from(c.dexterity()) + c.evasion()).min(0.25) + mods.evasion;
        if monster.debuffs.has(Status::Blind) {
            evasion += 0.2;
        }
        if rng.chance(evasion.clamp(0.0, 1.0)) {
            self.events
                .push(CombatEvent::PlayerEvaded { user_id: defender });
            return;
        }

        let mut raw = monster.effective_attack() - (c.defense() + mods.defense)
            + f64::from(rng.gen_range(-1, 1));
        let critical = rng.chance(monster.crit_chance);
        if critical {
            raw *= monster.crit_damage;
        }
        let damage = raw.trunc().max(1.0);

        let signature = match monster.signature {
            Some(attack) if rng.chance(monster.rarity.signature_chance()) => {
                Some(attack.unleash(monster, rng))
            }
            _ => None,
        };
        let monster_hp = monster.hp();

        let Some(c) = self.roster.combatant_mut(defender) else {
            return;
        };
        c.take_damage(damage);
        self.events.push(CombatEvent::MonsterHit {
            user_id: defender,
            damage,
            critical,
            hp: c.hp(),
        });

        if let Some(effect) = signature {
            c.take_damage(effect.damage);
            self.events.push(CombatEvent::SignatureAttack {
                user_id: defender,
                attack: effect.attack,
                damage: effect.damage,
                hits: effect.hits,
            });
            if let Some((status, turns)) = effect.defender_status {
                self.buff(defender, status, turns);
            }
            if effect.monster_healed > 0.0 {
                self.events.push(CombatEvent::MonsterHealed {
                    amount: effect.monster_healed,
                    monster_hp,
                });
            }
        }

        if self
            .roster
            .combatant(defender)
            .is_some_and(Combatant::is_downed)
        {
            self.handle_downed(defender);
        }
    }

    /// Revival first, then the defeat penalty for the current mode.
    fn handle_downed(&mut self, user: UserId) {
        let catalog = self.catalog;
        let owned_revival = self.roster.inventory(user).and_then(|inv| {
            catalog
                .revival_items()
                .into_iter()
                .find(|item| inv.contains(&item.name))
        });
        if let Some(item) = owned_revival {
            self.roster.inventory_mut(user).remove_one(&item.name);
            let fraction = item.revival_fraction().unwrap_or(1.0);
            if let Some(c) = self.roster.combatant_mut(user) {
                c.revive_to((c.max_hp() * fraction).floor().max(1.0));
                let hp = c.hp();
                self.events.push(CombatEvent::Revived {
                    user_id: user,
                    source: item.name.clone(),
                    hp,
                });
            }
            return;
        }

        if let Some(c) = self.roster.combatant_mut(user) {
            let weapon = c.weapon().and_then(|name| catalog.weapon(name));
            let revive = weapon.and_then(|w| {
                w.weapon_effect()
                    .and_then(|effect| effect.revive_hp(c.max_hp(), w.rarity))
            });
            if let (Some(weapon), Some(hp)) = (weapon, revive) {
                c.revive_to(hp.max(1.0));
                let hp = c.hp();
                self.events.push(CombatEvent::Revived {
                    user_id: user,
                    source: weapon.name.clone(),
                    hp,
                });
                return;
            }
        }

        let penalty = match self.session.mode() {
            BattleMode::Raid => {
                if let Some(c) = self.roster.combatant_mut(user) {
                    c.restore_full();
                }
                self.roster
                    .grant_cooldown(user, raid_cooldown_key(self.session.guild()), self.now);
                DefeatPenalty::RaidCooldown {
                    until: self.now + RAID_COOLDOWN,
                }
            }
            BattleMode::Solo | BattleMode::Party => {
                let items_lost = self
                    .roster
                    .inventory_mut(user)
                    .strip(|name| !catalog.is_rpg_item(name));
                self.roster.delete(user);
                DefeatPenalty::ProgressLost { items_lost }
            }
        };
        self.session.remove_participant(user);
        self.events.push(CombatEvent::PlayerDefeated {
            user_id: user,
            penalty,
        });
    }

    // =========================================================================
    // Regeneration
    // =========================================================================

    fn regenerate_player(&mut self, user: UserId) {
        let Some(c) = self.roster.combatant(user) else {
            return;
        };
        if c.is_downed() {
            return;
        }
        let (hp, max_hp, hp_rate) = (c.hp(), c.max_hp(), 0.5 * c.hp_regen());
        let (mana, max_mana, mana_rate) = (c.mana(), c.max_mana(), 0.5 * c.mana_regen());

        let hp_gain = regenerate(hp, max_hp, self.session.hp_regen_mut(user), hp_rate);
        let mana_gain = self
            .session
            .mana_regen_mut(user)
            .accrue(mana_rate)
            .min((max_mana - mana).max(0.0));
        if hp_gain <= 0.0 && mana_gain <= 0.0 {
            return;
        }
        if let Some(c) = self.roster.combatant_mut(user) {
            c.heal(hp_gain);
            c.restore_mana(mana_gain);
            self.events.push(CombatEvent::Regenerated {
                user_id: user,
                hp: hp_gain,
                mana: mana_gain,
            });
        }
    }

    fn regenerate_monster(&mut self) {
        let monster = &mut self.session.monster;
        let gain = regenerate(monster.hp, monster.max_hp, &mut monster.regen, monster.hp_regen);
        if gain > 0.0 {
            monster.heal(gain);
            self.events.push(CombatEvent::MonsterRegenerated {
                amount: gain,
                monster_hp: monster.hp(),
            });
        }
    }

    // =========================================================================
    // Victory
    // =========================================================================

    fn victory(&mut self, finisher: UserId) -> EncounterResult {
        let catalog = self.catalog;
        let rng = self.rng;
        let monster = self.session.monster().clone();
        self.events.push(CombatEvent::MonsterDefeated {
            name: monster.name().to_string(),
            finisher,
        });

        let mut finisher_weapon = None;
        if let Some(c) = self.roster.combatant_mut(finisher) {
            let report = c.gain_experience(monster.exp());
            finisher_weapon = c.weapon().map(str::to_owned);
            self.events.push(CombatEvent::ExperienceGained {
                user_id: finisher,
                exp: monster.exp(),
            });
            if report.levels_gained > 0 {
                self.events.push(CombatEvent::LevelUp {
                    user_id: finisher,
                    level: report.new_level,
                });
            }
            if report.class_unlocked {
                self.events
                    .push(CombatEvent::ClassUnlocked { user_id: finisher });
            }
        }

        let participants: Vec<UserId> = self.session.participants().iter().copied().collect();
        if self.session.mode() == BattleMode::Raid {
            let loot = monster.loot().unwrap_or(DEFAULT_RAID_LOOT).to_string();
            let key = raid_cooldown_key(self.session.guild());
            for user in participants {
                self.roster.inventory_mut(user).add(loot.clone(), 1);
                self.roster.grant_cooldown(user, key.clone(), self.now);
                self.events.push(CombatEvent::LootDropped {
                    user_id: user,
                    item: loot.clone(),
                });
            }
            return EncounterResult::Victory { finisher };
        }

        match roll_loot(&monster, rng) {
            Some(item) => {
                self.roster.inventory_mut(finisher).add(item, 1);
                self.events.push(CombatEvent::LootDropped {
                    user_id: finisher,
                    item: item.to_string(),
                });
            }
            None => self.events.push(CombatEvent::NoLoot { user_id: finisher }),
        }

        let personal = self
            .roster
            .combatant_mut(finisher)
            .and_then(|c| advance_personal_quest(catalog, c, monster.name()));
        if let Some(report) = personal {
            self.report_quest(report, vec![finisher]);
        }

        if self.session.mode() == BattleMode::Party && self.roster.party_quest().is_some() {
            let shared = advance_party_quest(
                catalog,
                self.roster.party_quest_mut(),
                monster.name(),
                finisher_weapon.as_deref(),
            );
            if let Some(report) = shared {
                self.report_quest(report, participants);
            }
        }

        EncounterResult::Victory { finisher }
    }

    fn report_quest(&mut self, report: QuestReport, recipients: Vec<UserId>) {
        match report.reward {
            Some(reward) => {
                for user in &recipients {
                    self.roster.inventory_mut(*user).add(reward.clone(), 1);
                }
                self.events.push(CombatEvent::QuestCompleted {
                    quest: report.quest,
                    reward,
                    recipients,
                });
            }
            None => self.events.push(CombatEvent::QuestProgress {
                quest: report.quest,
                progress: report.progress,
                amount: report.amount,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{fixtures, MonsterTemplate, Rarity};
    use crate::combat::monster::MonsterInstance;
    use crate::combat::signature::SignatureAttack;
    use crate::ids::{GuildId, PartyId};
    use crate::random::testing::ScriptedRandom;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn uid(raw: u64) -> UserId {
        UserId::new(raw)
    }

    fn warrior() -> Combatant {
        Combatant::new()
            .with_level(3)
            .with_class(CharacterClass::Warrior)
            .with_weapon("Iron Sword")
    }

    fn solo(template: &MonsterTemplate) -> EncounterSession {
        EncounterSession::solo(GuildId::new(1), uid(1), MonsterInstance::spawn(template))
    }

    fn roster(members: &[(u64, Combatant)]) -> Roster {
        let mut roster = Roster::new();
        for (raw, combatant) in members {
            roster.insert(uid(*raw), combatant.clone(), Inventory::new());
        }
        roster
    }

    fn run(
        catalog: &Catalog,
        rng: &ScriptedRandom,
        session: &mut EncounterSession,
        roster: &mut Roster,
        actor: u64,
        action: Action,
        target: Option<&str>,
    ) -> Result<TurnOutcome, CombatError> {
        TurnResolver::new(catalog, rng, now(), session, roster).resolve(uid(actor), &action, target)
    }

    fn count(events: &[CombatEvent], pred: impl Fn(&CombatEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn damage_is_floored_at_one_and_victory_pays_out() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.1, 0);
        let template = fixtures::monster("Armored Slime", 10.0, 1.0, 100.0);
        let mut session = solo(&template);
        let mut roster = roster(&[(
            1,
            Combatant::new()
                .with_class(CharacterClass::Warrior)
                .with_quest("Slime Cleanup", 1),
        )]);

        let mut last = None;
        for round in 1..=10 {
            let outcome = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
                .expect("attack resolves");
            let hits: Vec<f64> = outcome
                .events
                .iter()
                .filter_map(|e| match e {
                    CombatEvent::PlayerHit { damage, .. } => Some(*damage),
                    _ => None,
                })
                .collect();
            assert_eq!(hits, vec![1.0], "round {round}");
            last = Some(outcome);
        }

        let outcome = last.expect("ten rounds ran");
        assert_eq!(outcome.result, EncounterResult::Victory { finisher: uid(1) });
        assert!(outcome
            .events
            .contains(&CombatEvent::ExperienceGained { user_id: uid(1), exp: 10 }));
        assert!(outcome.events.contains(&CombatEvent::LootDropped {
            user_id: uid(1),
            item: "Slime Gel".to_string(),
        }));
        assert_eq!(
            count(&outcome.events, |e| matches!(e, CombatEvent::QuestCompleted { .. })),
            1
        );

        let inventory = roster.inventory(uid(1)).expect("inventory loaded");
        assert_eq!(inventory.count("Slime Gel"), 1);
        assert_eq!(inventory.count("Potion"), 1);
        let c = roster.combatant(uid(1)).expect("still alive");
        assert_eq!(c.exp(), 10);
        assert!(c.quest().is_none());
    }

    #[test]
    fn sword_quest_completes_on_victory() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.9, 0);
        let mut session = solo(&fixtures::monster("Green Slime", 1.0, 1.0, 0.0));
        let mut roster = roster(&[(1, warrior().with_quest("Blade Practice", 2))]);

        let outcome = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("attack resolves");
        assert!(outcome.result.is_over());

        let changes = roster.into_changes();
        let (_, inventory) = changes
            .inventories
            .iter()
            .find(|(user, _)| *user == uid(1))
            .expect("inventory written");
        assert_eq!(inventory.count("Magic Scroll"), 1);
        let (_, combatant) = changes
            .combatants
            .iter()
            .find(|(user, _)| *user == uid(1))
            .expect("combatant written");
        assert!(combatant.quest().is_none());
    }

    #[test]
    fn party_monster_waits_for_every_living_member() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 0);
        let monster = MonsterInstance::spawn(&fixtures::monster("Cave Bear", 500.0, 5.0, 0.0));
        let mut session =
            EncounterSession::party(GuildId::new(1), PartyId::new(1), monster, [uid(1), uid(2)]);
        let mut roster = roster(&[(1, warrior()), (2, warrior())]);

        let first = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("first member acts");
        assert!(first
            .events
            .contains(&CombatEvent::TurnProgress { acted: 1, total: 2 }));
        assert_eq!(count(&first.events, |e| matches!(e, CombatEvent::MonsterHit { .. })), 0);

        let again = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None);
        assert_eq!(again.expect_err("already acted"), CombatError::AlreadyActed);

        let second = run(&catalog, &rng, &mut session, &mut roster, 2, Action::Attack, None)
            .expect("second member acts");
        assert_eq!(
            count(&second.events, |e| matches!(e, CombatEvent::EnvironmentTurn { .. })),
            1
        );
        assert_eq!(count(&second.events, |e| matches!(e, CombatEvent::MonsterHit { .. })), 1);
        assert!(session.acted().is_empty());
    }

    #[test]
    fn raid_boss_counters_once_per_round() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 0);
        let template = catalog.monsters_of(Rarity::Raid)[0].clone();
        let boss = MonsterInstance::raid_boss(&template, 3);
        assert_eq!(boss.max_hp(), 2600.0);
        let mut session =
            EncounterSession::raid(GuildId::new(1), PartyId::new(1), boss, [uid(1), uid(2)]);
        let strong = warrior().with_hp(500.0, 500.0).with_defense(50.0);
        let mut roster = roster(&[(1, strong.clone()), (2, strong)]);

        let first = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("first raider acts");
        assert!(!first.events.iter().any(|e| matches!(e, CombatEvent::Initiative { .. })));
        let second = run(&catalog, &rng, &mut session, &mut roster, 2, Action::Attack, None)
            .expect("second raider acts");
        assert_eq!(count(&second.events, |e| matches!(e, CombatEvent::MonsterHit { .. })), 1);
        assert!(session.acted().is_empty());
        assert!(session.monster().hp() < 2600.0);
    }

    #[test]
    fn raid_defeat_benches_without_losing_progress() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 0);
        let template = fixtures::monster("Ancient Titan", 1000.0, 100.0, 0.0);
        let boss = MonsterInstance::raid_boss(&template, 1);
        let mut session = EncounterSession::raid(GuildId::new(7), PartyId::new(1), boss, [uid(1)]);
        let mut roster = roster(&[(1, warrior().with_level(5))]);

        let outcome = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("attack resolves");
        assert_eq!(outcome.result, EncounterResult::Wiped);
        assert!(!session.is_participant(uid(1)));

        let c = roster.combatant(uid(1)).expect("record kept");
        assert_eq!(c.hp(), c.max_hp());
        let changes = roster.into_changes();
        assert!(changes.deleted.is_empty());
        assert_eq!(changes.cooldowns.len(), 1);
        assert_eq!(changes.cooldowns[0].key, "rpgraid_7");
    }

    #[test]
    fn ordinary_defeat_deletes_record_and_strips_rpg_items() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 0);
        let mut session = solo(&fixtures::monster("Ogre", 100.0, 100.0, 0.0));
        let mut roster = roster(&[(1, warrior())]);
        roster.inventory_mut(uid(1)).add("Iron Sword", 1);
        roster.inventory_mut(uid(1)).add("Lucky Coin", 2);

        let outcome = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("attack resolves");
        assert_eq!(outcome.result, EncounterResult::Wiped);
        assert!(outcome.events.contains(&CombatEvent::PlayerDefeated {
            user_id: uid(1),
            penalty: DefeatPenalty::ProgressLost { items_lost: 1 },
        }));

        let changes = roster.into_changes();
        assert_eq!(changes.deleted, vec![uid(1)]);
        let (_, inventory) = &changes.inventories[0];
        assert_eq!(inventory.count("Lucky Coin"), 2);
        assert!(!inventory.contains("Iron Sword"));
    }

    #[test]
    fn revival_item_is_consumed_before_defeat() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 0);
        let mut session = solo(&fixtures::monster("Ogre", 100.0, 100.0, 0.0));
        let mut roster = roster(&[(1, warrior())]);
        roster.inventory_mut(uid(1)).add("Revive Feather", 1);
        roster.inventory_mut(uid(1)).add("Phoenix Down", 1);

        let outcome = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("attack resolves");
        assert_eq!(outcome.result, EncounterResult::Continuing);
        assert!(outcome.events.iter().any(|e| matches!(
            e,
            CombatEvent::Revived { source, .. } if source == "Phoenix Down"
        )));
        let inventory = roster.inventory(uid(1)).expect("inventory loaded");
        assert!(!inventory.contains("Phoenix Down"));
        assert!(inventory.contains("Revive Feather"));
    }

    #[test]
    fn spell_validation_rejects_without_mutation() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::new();
        let mut session = solo(&fixtures::monster("Green Slime", 50.0, 1.0, 0.0));
        let mut roster = roster(&[(1, Combatant::new())]);
        let cast = |spell: &str| Action::Cast {
            spell: spell.to_string(),
        };

        let err = run(&catalog, &rng, &mut session, &mut roster, 1, cast("Fireball"), None)
            .expect_err("no class");
        assert_eq!(err, CombatError::NoClass);

        let mut roster = self::roster(&[(1, warrior().with_mana(1.0, 5.0))]);
        let err = run(&catalog, &rng, &mut session, &mut roster, 1, cast("Fireball"), None)
            .expect_err("mage spell");
        assert_eq!(err, CombatError::UnknownSpell("Fireball".to_string()));

        let err = run(&catalog, &rng, &mut session, &mut roster, 1, cast("shield bash"), None)
            .expect_err("too little mana");
        assert!(matches!(err, CombatError::InsufficientMana { cost, .. } if cost == 3.0));

        let mut roster = self::roster(&[(1, warrior())]);
        let err = run(&catalog, &rng, &mut session, &mut roster, 1, cast("Shield Bash"), Some("me"))
            .expect_err("damage on self");
        assert_eq!(err, CombatError::SelfTargetedDamage);

        assert_eq!(session.monster().hp(), 50.0);
        assert_eq!(roster.combatant(uid(1)).map(Combatant::mana), Some(5.0));
        assert!(roster.into_changes().is_empty());
    }

    #[test]
    fn mage_fireball_uses_bonus_spell_damage() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 0);
        let mut session = solo(&fixtures::monster("Green Slime", 50.0, 1.0, 0.0));
        let mage = Combatant::new()
            .with_class(CharacterClass::Mage)
            .with_bonus_spell_damage(2.0);
        let mut roster = roster(&[(1, mage)]);

        let outcome = run(
            &catalog,
            &rng,
            &mut session,
            &mut roster,
            1,
            Action::Cast {
                spell: "fireball".to_string(),
            },
            None,
        )
        .expect("cast resolves");
        assert!(outcome.events.contains(&CombatEvent::SpellDamage {
            user_id: uid(1),
            spell: "Fireball".to_string(),
            damage: 14.0,
            critical: false,
            monster_hp: 36.0,
        }));
        assert_eq!(roster.combatant(uid(1)).map(Combatant::mana), Some(1.0));
    }

    #[test]
    fn heal_can_target_an_ally() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 0);
        let monster = MonsterInstance::spawn(&fixtures::monster("Cave Bear", 500.0, 1.0, 0.0));
        let mut session =
            EncounterSession::party(GuildId::new(1), PartyId::new(1), monster, [uid(1), uid(2)]);
        let mage = Combatant::new().with_class(CharacterClass::Mage);
        let mut roster = roster(&[(1, mage), (2, warrior().with_hp(2.0, 40.0))]);

        run(
            &catalog,
            &rng,
            &mut session,
            &mut roster,
            1,
            Action::Cast {
                spell: "Heal".to_string(),
            },
            Some("<@2>"),
        )
        .expect("heal resolves");
        assert_eq!(roster.combatant(uid(2)).map(Combatant::hp), Some(22.0));
    }

    #[test]
    fn incapacitated_actor_loses_the_attack() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 0);
        let mut session = solo(&fixtures::monster("Green Slime", 50.0, 1.0, 0.0));
        session.statuses_mut(uid(1)).apply(Status::Sleep, 1);
        let mut roster = roster(&[(1, warrior())]);

        let outcome = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("turn resolves");
        assert!(outcome
            .events
            .contains(&CombatEvent::PlayerIncapacitated { user_id: uid(1) }));
        assert_eq!(session.monster().hp(), 50.0);
        assert!(session.statuses(uid(1)).is_some_and(|s| s.is_empty()));
    }

    #[test]
    fn poison_finishes_the_monster_before_it_can_strike_first() {
        let catalog = fixtures::catalog();
        // int 1 hands the initiative to the monster
        let rng = ScriptedRandom::constant(0.5, 1);
        let mut session = solo(&fixtures::monster("Green Slime", 100.0, 100.0, 0.0));
        session.monster.hp = 3.0;
        session.monster.debuffs.apply(Status::Poison, 3);
        let mut roster = roster(&[(1, warrior())]);

        let outcome = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("turn resolves");
        assert_eq!(outcome.result, EncounterResult::Victory { finisher: uid(1) });
        assert!(matches!(
            outcome.events.first(),
            Some(CombatEvent::MonsterAfflicted {
                status: Status::Poison,
                ..
            })
        ));
        assert_eq!(count(&outcome.events, |e| matches!(e, CombatEvent::MonsterHit { .. })), 0);
        assert_eq!(count(&outcome.events, |e| matches!(e, CombatEvent::Initiative { .. })), 0);
        assert!(roster.into_changes().deleted.is_empty());
    }

    #[test]
    fn sleeping_monster_loses_its_turn_even_with_initiative() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 1);
        let mut session = solo(&fixtures::monster("Green Slime", 100.0, 4.0, 0.0));
        session.monster.debuffs.apply(Status::Sleep, 2);
        let mut roster = roster(&[(1, warrior().with_hp(30.0, 30.0))]);

        let outcome = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("turn resolves");
        let position = |pred: fn(&CombatEvent) -> bool| outcome.events.iter().position(pred);
        let lost = position(|e| matches!(e, CombatEvent::MonsterLosesTurn { .. }))
            .expect("sleep ticks");
        let initiative =
            position(|e| matches!(e, CombatEvent::Initiative { player_first: false }))
                .expect("monster won the flip");
        assert!(lost < initiative);
        assert!(outcome.events.contains(&CombatEvent::MonsterSkipsTurn));
        assert_eq!(count(&outcome.events, |e| matches!(e, CombatEvent::MonsterHit { .. })), 0);
        assert_eq!(roster.combatant(uid(1)).map(Combatant::hp), Some(30.0));
    }

    #[test]
    fn monster_debuffs_tick_while_the_actor_sleeps() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 0);
        let mut session = solo(&fixtures::monster("Green Slime", 100.0, 1.0, 0.0));
        session.monster.debuffs.apply(Status::Burn, 2);
        session.statuses_mut(uid(1)).apply(Status::Sleep, 1);
        let mut roster = roster(&[(1, warrior())]);

        let outcome = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("turn resolves");
        assert!(outcome
            .events
            .contains(&CombatEvent::PlayerIncapacitated { user_id: uid(1) }));
        assert_eq!(session.monster().hp(), 95.0);
    }

    #[test]
    fn bleed_never_drops_below_one_hp() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::constant(0.5, 0);
        let mut session = solo(&fixtures::monster("Green Slime", 50.0, 0.0, 0.0));
        session.statuses_mut(uid(1)).apply(Status::Bleed, 3);
        session.statuses_mut(uid(1)).apply(Status::Vanish, 3);
        let mut roster = roster(&[(1, warrior().with_hp(1.0, 100.0))]);

        run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("turn resolves");
        assert!(roster.combatant(uid(1)).is_some_and(|c| c.hp() >= 1.0));
    }

    #[test]
    fn signature_attack_is_gated_by_rarity() {
        let catalog = fixtures::catalog();
        let mut template = fixtures::monster("Frost Wyrm", 500.0, 10.0, 0.0);
        template.rarity = Rarity::Legendary;
        template.signature = Some(SignatureAttack::FrostNova);
        let mut session = solo(&template);
        let mut roster = roster(&[(1, warrior().with_hp(100.0, 100.0))]);

        // unit 0.4 lands under the legendary 50 % gate
        let rng = ScriptedRandom::constant(0.4, 0);
        let outcome = run(&catalog, &rng, &mut session, &mut roster, 1, Action::Attack, None)
            .expect("turn resolves");
        assert!(outcome.events.contains(&CombatEvent::StatusApplied {
            target: StatusTarget::Player(uid(1)),
            status: Status::DefenseDown,
            turns: 1,
        }));
    }
}
