//! Card game table storage wrapper.

use tabletop_domain::{CardGame, LobbyDirectory};
use tokio::sync::{Mutex, MutexGuard};

/// One table directory per card game, each behind its own async mutex.
#[derive(Debug)]
pub struct LobbyStore {
    mtg: Mutex<LobbyDirectory>,
    yugioh: Mutex<LobbyDirectory>,
}

impl LobbyStore {
    pub fn new() -> Self {
        Self {
            mtg: Mutex::new(LobbyDirectory::new(CardGame::Mtg)),
            yugioh: Mutex::new(LobbyDirectory::new(CardGame::Yugioh)),
        }
    }

    pub async fn lock(&self, game: CardGame) -> MutexGuard<'_, LobbyDirectory> {
        match game {
            CardGame::Mtg => self.mtg.lock().await,
            CardGame::Yugioh => self.yugioh.lock().await,
        }
    }
}

impl Default for LobbyStore {
    fn default() -> Self {
        Self::new()
    }
}
