//! Raid use cases.
//!
//! One durable boss per guild, fought by a party over up to a week.

mod error;
mod raid_attack;
mod start_raid;

use std::sync::Arc;

use tabletop_domain::Catalog;

use crate::infrastructure::ports::{ClockPort, RandomPort, RecordStore};
use crate::stores::{PartyStore, RecordLocks, SessionStore};

pub use error::RaidCommandError;
pub use raid_attack::RaidAttack;
pub use start_raid::{RaidStarted, StartRaid};

/// Container for raid use cases.
pub struct RaidUseCases {
    pub start: Arc<StartRaid>,
    pub attack: Arc<RaidAttack>,
}

impl RaidUseCases {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        sessions: Arc<SessionStore>,
        parties: Arc<PartyStore>,
        locks: Arc<RecordLocks>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            start: Arc::new(StartRaid::new(
                records.clone(),
                catalog.clone(),
                sessions.clone(),
                parties,
                clock.clone(),
                random.clone(),
            )),
            attack: Arc::new(RaidAttack::new(
                records, catalog, sessions, locks, clock, random,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::persistence::InMemoryRecordStore;
    use crate::infrastructure::ports::WriteBatch;
    use crate::infrastructure::ports::WriteOp;
    use crate::use_cases::battle::BattleOutcome;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tabletop_domain::aggregates::raid::{raid_cooldown_key, RAID_LIFETIME};
    use tabletop_domain::catalog::fixtures;
    use tabletop_domain::combat::MonsterInstance;
    use tabletop_domain::random::testing::ScriptedRandom;
    use tabletop_domain::{
        Action, ActiveRaid, CombatError, Combatant, EncounterSession, GuildId, PartyId, RaidError,
        UserId,
    };

    const GUILD: GuildId = GuildId::new(5);
    const LEADER: UserId = UserId::new(1);
    const MEMBER: UserId = UserId::new(2);

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0)
            .single()
            .expect("valid time")
    }

    struct Harness {
        records: Arc<InMemoryRecordStore>,
        sessions: Arc<SessionStore>,
        raids: RaidUseCases,
    }

    async fn harness() -> Harness {
        harness_with_guests(&[]).await
    }

    /// Party of LEADER, MEMBER and `guests`, where guests have no record.
    async fn harness_with_guests(guests: &[UserId]) -> Harness {
        let records = Arc::new(InMemoryRecordStore::new());
        let mut batch = WriteBatch::new();
        batch
            .upsert_combatant(LEADER, Combatant::new())
            .upsert_combatant(MEMBER, Combatant::new());
        records.commit(batch).await.expect("seed");

        let parties = Arc::new(PartyStore::new());
        {
            let mut dir = parties.lock().await;
            let id = dir.create(LEADER).expect("create");
            dir.invite(LEADER, MEMBER).expect("invite");
            dir.join(MEMBER, id).expect("join");
            for guest in guests {
                dir.invite(LEADER, *guest).expect("invite guest");
                dir.join(*guest, id).expect("guest joins");
            }
        }
        let sessions = Arc::new(SessionStore::new());
        let raids = RaidUseCases::new(
            records.clone(),
            Arc::new(fixtures::catalog()),
            sessions.clone(),
            parties,
            Arc::new(RecordLocks::new()),
            Arc::new(FixedClock(now())),
            Arc::new(ScriptedRandom::new()),
        );
        Harness {
            records,
            sessions,
            raids,
        }
    }

    async fn seed_raid(records: &InMemoryRecordStore, hp: f64, spawned_at: DateTime<Utc>) {
        let boss = MonsterInstance::spawn(&fixtures::monster("Tiny Titan", hp, 1.0, 0.0));
        let session = EncounterSession::raid(GUILD, PartyId::new(1), boss, [LEADER, MEMBER]);
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::SaveRaid(ActiveRaid::new(session, spawned_at)));
        records.commit(batch).await.expect("seed raid");
    }

    #[tokio::test]
    async fn leader_summons_one_boss_per_guild() {
        let h = harness().await;

        let err = h.raids.start.execute(GUILD, MEMBER).await.expect_err("not leader");
        assert!(matches!(err, RaidCommandError::NotLeader));

        let started = h.raids.start.execute(GUILD, LEADER).await.expect("summoned");
        assert_eq!(started.boss.name, "Ancient Titan");
        // 1000 * (1 + 0.8)
        assert_eq!(started.boss.max_hp, 1800.0);
        assert_eq!(started.participants, vec![LEADER, MEMBER]);
        assert_eq!(started.ends_at, now() + RAID_LIFETIME);

        let err = h.raids.start.execute(GUILD, LEADER).await.expect_err("active");
        assert!(matches!(
            err,
            RaidCommandError::Raid(RaidError::AlreadyActive { .. })
        ));
        assert!(h.sessions.is_empty());
    }

    #[tokio::test]
    async fn boss_scales_with_the_whole_party() {
        let guest = UserId::new(3);
        let h = harness_with_guests(&[guest]).await;

        let started = h.raids.start.execute(GUILD, LEADER).await.expect("summoned");
        // 1000 * (1 + 0.8 * 2), the guest counts toward scaling
        assert_eq!(started.boss.max_hp, 2600.0);
        assert_eq!(started.participants, vec![LEADER, MEMBER]);
    }

    #[tokio::test]
    async fn raid_round_waits_for_every_participant() {
        let h = harness().await;
        h.raids.start.execute(GUILD, LEADER).await.expect("summoned");

        let report = h
            .raids
            .attack
            .execute(GUILD, MEMBER, Action::Attack, None)
            .await
            .expect("hit");
        assert_eq!(report.outcome, BattleOutcome::Continuing);
        assert!(report.monster.hp < report.monster.max_hp);

        let err = h
            .raids
            .attack
            .execute(GUILD, MEMBER, Action::Attack, None)
            .await
            .expect_err("acted");
        assert!(matches!(
            err,
            RaidCommandError::Combat(CombatError::AlreadyActed)
        ));

        let saved = h
            .records
            .load_raid(GUILD)
            .await
            .expect("load")
            .expect("still up");
        assert_eq!(saved.session.monster().hp(), report.monster.hp);
    }

    #[tokio::test]
    async fn victory_clears_the_raid_and_starts_cooldowns() {
        let h = harness().await;
        seed_raid(&h.records, 1.0, now() - Duration::hours(1)).await;

        let report = h
            .raids
            .attack
            .execute(GUILD, LEADER, Action::Attack, None)
            .await
            .expect("finishing blow");
        assert_eq!(report.outcome, BattleOutcome::Victory { finisher: LEADER });
        assert!(h.records.load_raid(GUILD).await.expect("load").is_none());

        let key = raid_cooldown_key(GUILD);
        for user in [LEADER, MEMBER] {
            let used = h.records.get_cooldown(user, &key).await.expect("load");
            assert_eq!(used, Some(now()));
        }

        let err = h
            .raids
            .attack
            .execute(GUILD, MEMBER, Action::Attack, None)
            .await
            .expect_err("cooling down");
        assert!(matches!(err, RaidCommandError::OnCooldown { until } if until == now() + Duration::hours(24)));
    }

    #[tokio::test]
    async fn expired_raid_is_cleared_on_contact() {
        let h = harness().await;
        seed_raid(&h.records, 500.0, now() - RAID_LIFETIME - Duration::minutes(1)).await;

        let err = h
            .raids
            .attack
            .execute(GUILD, LEADER, Action::Attack, None)
            .await
            .expect_err("expired");
        assert!(matches!(err, RaidCommandError::Raid(RaidError::NoActiveRaid)));
        assert!(h.records.load_raid(GUILD).await.expect("load").is_none());

        // The guild is free for a new boss.
        h.raids.start.execute(GUILD, LEADER).await.expect("summoned");
    }
}
