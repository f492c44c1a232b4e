use race_core::CoreError;
use race_types::ConnectionId;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),
    #[error("connection {0} not found")]
    SessionNotFound(ConnectionId),
    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),
    #[error("connection {0} already has an active game")]
    AlreadyInGame(ConnectionId),
    #[error(transparent)]
    Core(#[from] CoreError),
}
