use std::sync::Arc;

use race_core::{Clock, WordSource};
use race_types::{ClientMessage, ConnectionId, RoundScore, ServerMessage, SubmitResult};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::ServerError;
use crate::game_table::{GameTable, OPPONENT_LEFT, WORD_POOL_EXHAUSTED};
use crate::ledger::ScoreLedger;
use crate::lobby::{JoinOutcome, Lobby};
use crate::session::SessionRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStatus {
    Waiting,
    AlreadyWaiting,
    /// Joins are ignored until the current game ends.
    AlreadyInGame,
    Matched { opponent: ConnectionId },
    /// A pair was found but no round could be opened for it.
    GameUnavailable,
    NotConnected,
}

/// Entry point for everything a connection can do.
///
/// Lock order, whenever more than one is held: lobby, game table, game,
/// ledger. The session registry is only ever taken on its own or as the
/// innermost lock.
pub struct GameService {
    sessions: Arc<SessionRegistry>,
    lobby: Arc<Lobby>,
    games: Arc<GameTable>,
    ledger: Arc<ScoreLedger>,
}

impl GameService {
    pub fn new(words: Arc<dyn WordSource>, clock: Arc<dyn Clock>, max_word_draws: usize) -> Self {
        let ledger = Arc::new(ScoreLedger::new());
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            lobby: Arc::new(Lobby::new(clock.clone())),
            games: Arc::new(GameTable::new(words, clock, ledger.clone(), max_word_draws)),
            ledger,
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    pub fn games(&self) -> &GameTable {
        &self.games
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    /// Registers a new connection and acknowledges it with `LobbyJoined`.
    pub async fn connect(
        &self,
        id: ConnectionId,
    ) -> Result<mpsc::UnboundedReceiver<ServerMessage>, ServerError> {
        let receiver = self.sessions.register(id).await?;
        self.sessions
            .send_to(id, ServerMessage::LobbyJoined { session_id: id })
            .await?;
        Ok(receiver)
    }

    /// Removes every trace of the connection. If it was mid-game the
    /// opponent is told and left without a game.
    pub async fn disconnect(&self, id: ConnectionId) {
        // Registry first: a join from this id still in flight will find the
        // session gone once it gets the lobby lock.
        let session = self.sessions.drop_session(id).await;

        {
            let mut lobby = self.lobby.lock().await;
            lobby.remove(id);
            self.games.terminate(id, OPPONENT_LEFT).await;
        }

        let rounds = self.ledger.remove(id).await.map_or(0, |history| history.len());
        match session {
            Some(handle) => info!(
                "Connection {} cleaned up after {:?} and {} scored rounds",
                id,
                handle.connected_at().elapsed(),
                rounds
            ),
            None => debug!("Connection {} was already cleaned up", id),
        }
    }

    pub async fn handle_message(&self, id: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::JoinGame => {
                self.join_game(id).await;
            }
            ClientMessage::SetNickname { nickname } => {
                if let Err(e) = self.set_nickname(id, &nickname).await {
                    warn!("Cannot set nickname for {}: {}", id, e);
                }
            }
            ClientMessage::TypeWord { word } => {
                self.submit_word(id, &word).await;
            }
        }
    }

    pub async fn join_game(&self, id: ConnectionId) -> JoinStatus {
        let mut lobby = self.lobby.lock().await;

        let Some(player) = self.sessions.lookup(id).await else {
            return JoinStatus::NotConnected;
        };

        if self.games.has_game(id).await {
            return JoinStatus::AlreadyInGame;
        }

        match lobby.join(player, self.lobby.now()) {
            JoinOutcome::Waiting => {
                debug!("Lobby now holds {:?}", lobby.waiting_ids());
                JoinStatus::Waiting
            }
            JoinOutcome::AlreadyWaiting => JoinStatus::AlreadyWaiting,
            JoinOutcome::Matched { joiner, opponent } => {
                let opponent_id = opponent.id();
                match self.games.create_game(joiner.clone(), opponent.clone()).await {
                    Ok(()) => JoinStatus::Matched {
                        opponent: opponent_id,
                    },
                    Err(e) => {
                        error!("Failed to create game for {} and {}: {}", id, opponent_id, e);
                        for player in [&joiner, &opponent] {
                            player.notify(ServerMessage::GameTerminated {
                                reason: WORD_POOL_EXHAUSTED.to_string(),
                            });
                        }
                        JoinStatus::GameUnavailable
                    }
                }
            }
        }
    }

    pub async fn set_nickname(&self, id: ConnectionId, nickname: &str) -> Result<(), ServerError> {
        self.sessions.set_nickname(id, nickname).await
    }

    pub async fn submit_word(&self, id: ConnectionId, word: &str) -> SubmitResult {
        match self.sessions.lookup(id).await {
            Some(player) => self.games.submit_word(&player, word).await,
            None => SubmitResult::no_game_found(),
        }
    }

    pub async fn scores_for(&self, id: ConnectionId) -> Vec<RoundScore> {
        self.ledger.all_for(id).await
    }
}
