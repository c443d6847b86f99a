//! Tabletop Terminal engine library.
//!
//! Everything server-side for the chat RPG: persistence, live encounter
//! state, command use cases and the HTTP command API.
//!
//! ## Structure
//!
//! - `infrastructure/` - Ports and adapters (record store, clock, random, config, catalog)
//! - `stores/` - In-memory session registry and party directory
//! - `use_cases/` - One module per gameplay area
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
