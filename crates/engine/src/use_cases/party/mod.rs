//! Party use cases.

mod error;
mod party_ops;

pub use error::PartyCommandError;
pub use party_ops::{Departure, Kicked, PartyOps, PartyView};
