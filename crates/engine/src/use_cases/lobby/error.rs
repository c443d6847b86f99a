use tabletop_domain::LobbyError;

/// Errors from card game table commands.
#[derive(Debug, thiserror::Error)]
pub enum LobbyCommandError {
    #[error("{0}")]
    Lobby(#[from] LobbyError),
}
