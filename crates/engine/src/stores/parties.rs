//! Party directory storage wrapper.

use tabletop_domain::{Party, PartyDirectory, PartyId, UserId};
use tokio::sync::{Mutex, MutexGuard};

/// Process-wide party directory behind one async mutex.
#[derive(Debug)]
pub struct PartyStore {
    directory: Mutex<PartyDirectory>,
}

impl PartyStore {
    pub fn new() -> Self {
        Self {
            directory: Mutex::new(PartyDirectory::new()),
        }
    }

    /// Exclusive access for mutations.
    pub async fn lock(&self) -> MutexGuard<'_, PartyDirectory> {
        self.directory.lock().await
    }

    /// Snapshot of the caller's party.
    pub async fn party_of(&self, user: UserId) -> Option<Party> {
        self.directory.lock().await.party_of(user).cloned()
    }

    pub async fn get(&self, id: PartyId) -> Option<Party> {
        self.directory.lock().await.get(id).cloned()
    }
}

impl Default for PartyStore {
    fn default() -> Self {
        Self::new()
    }
}
