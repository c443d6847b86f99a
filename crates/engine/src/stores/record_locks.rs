//! Per-user locks over progression records.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use tabletop_domain::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per user record.
///
/// Any command that reads a combatant or inventory and writes it back holds
/// that user's lock from the read until the commit. Fights lock every
/// participant, always in ascending id order, after taking their session slot.
/// Commands that also need a session slot take the slot first.
#[derive(Debug, Default)]
pub struct RecordLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

/// Held record locks; dropping it unlocks them all.
#[derive(Debug)]
pub struct RecordGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, user: UserId) -> Arc<Mutex<()>> {
        self.locks.entry(user).or_default().clone()
    }

    pub async fn lock(&self, user: UserId) -> RecordGuard {
        RecordGuard {
            _guards: vec![self.entry(user).lock_owned().await],
        }
    }

    /// Locks several users at once, in ascending id order.
    pub async fn lock_all(&self, users: impl IntoIterator<Item = UserId>) -> RecordGuard {
        let ordered: BTreeSet<UserId> = users.into_iter().collect();
        let mut guards = Vec::with_capacity(ordered.len());
        for user in ordered {
            guards.push(self.entry(user).lock_owned().await);
        }
        RecordGuard { _guards: guards }
    }
}
