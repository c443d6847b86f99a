//! Adventure command errors.

use tabletop_domain::DomainError;

use crate::infrastructure::ports::RepoError;

/// Errors that can occur during adventure lifecycle commands.
#[derive(Debug, thiserror::Error)]
pub enum AdventureError {
    #[error("You already have an adventure in progress.")]
    AlreadyStarted,
    #[error("You haven't started an adventure yet.")]
    NotStarted,
    #[error("Item '{0}' not found.")]
    UnknownItem(String),
    #[error("{0} is not a consumable.")]
    NotConsumable(String),
    #[error("You don't have any {0}.")]
    NotOwned(String),
    #[error("{0}")]
    Validation(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
