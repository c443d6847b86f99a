use tabletop_domain::PartyError;

/// Errors from party commands.
#[derive(Debug, thiserror::Error)]
pub enum PartyCommandError {
    #[error("{0}")]
    Party(#[from] PartyError),
}
