//! Adventure lifecycle use cases.
//!
//! Starting, inspecting, growing and abandoning a progression record, plus
//! consumables.

mod class;
mod error;
mod heal;
mod quit;
mod spend;
mod start;
mod status;

use std::sync::Arc;

pub use class::{ChooseClass, ClassChosen};
pub use error::AdventureError;
pub use heal::{HealOutcome, HealReport, StatusApplied, UseConsumable};
pub use quit::{QuitAdventure, QuitReport};
pub use spend::SpendPoints;
pub use start::StartAdventure;
pub use status::ShowStatus;

/// Container for adventure use cases.
pub struct AdventureUseCases {
    pub start: Arc<StartAdventure>,
    pub status: Arc<ShowStatus>,
    pub spend: Arc<SpendPoints>,
    pub class: Arc<ChooseClass>,
    pub heal: Arc<UseConsumable>,
    pub quit: Arc<QuitAdventure>,
}

impl AdventureUseCases {
    pub fn new(
        start: Arc<StartAdventure>,
        status: Arc<ShowStatus>,
        spend: Arc<SpendPoints>,
        class: Arc<ChooseClass>,
        heal: Arc<UseConsumable>,
        quit: Arc<QuitAdventure>,
    ) -> Self {
        Self {
            start,
            status,
            spend,
            class,
            heal,
            quit,
        }
    }
}
