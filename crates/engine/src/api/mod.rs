//! API layer - HTTP command entry points.

pub mod commands;
pub mod http;

pub use commands::{Command, Reply};
