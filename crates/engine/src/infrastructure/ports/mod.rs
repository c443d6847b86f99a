//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Record storage (SQLite or in-memory)
//! - Clock/Random (for testing)

mod error;
mod repos;
mod testing;

pub use error::RepoError;
pub use repos::{RecordStore, WriteBatch, WriteOp};
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use repos::MockRecordStore;
#[cfg(test)]
pub use testing::MockClockPort;
