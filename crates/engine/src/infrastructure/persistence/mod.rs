//! Record store adapters.
//!
//! SQLite is the durable backend; the in-memory store serves tests and
//! throwaway local runs.

mod memory_store;
mod sqlite_store;

pub use memory_store::InMemoryRecordStore;
pub use sqlite_store::SqliteRecordStore;
