//! Live encounter registry.

use std::sync::Arc;

use dashmap::DashMap;
use tabletop_domain::{EncounterSession, GuildId, PartyId, UserId};
use tokio::sync::Mutex;

/// Which fight a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Solo { guild: GuildId, user: UserId },
    Party { guild: GuildId, party: PartyId },
    /// Guards the guild raid. The raid itself is durable, so this slot stays empty.
    Raid { guild: GuildId },
}

pub type SessionSlot = Arc<Mutex<Option<EncounterSession>>>;

/// Per-key async mutexes over the live encounter sessions.
///
/// Every read-modify-write of one fight happens while holding its slot, so
/// two commands for the same fight never interleave.
#[derive(Debug, Default)]
pub struct SessionStore {
    slots: DashMap<SessionKey, SessionSlot>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `key`, created empty on first use.
    pub fn slot(&self, key: SessionKey) -> SessionSlot {
        self.slots.entry(key).or_default().clone()
    }

    /// Drops the slot once no command holds it and no fight lives in it.
    pub fn release(&self, key: &SessionKey) {
        self.slots.remove_if(key, |_, slot| {
            Arc::strong_count(slot) == 1
                && slot.try_lock().map(|guard| guard.is_none()).unwrap_or(false)
        });
    }

    /// Whether a fight is live under `key`. Waits for the slot if it is busy.
    pub async fn is_active(&self, key: SessionKey) -> bool {
        let Some(slot) = self.slots.get(&key).map(|entry| entry.value().clone()) else {
            return false;
        };
        let active = slot.lock().await.is_some();
        active
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
