use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use race_core::{Clock, GameState, RoundReferee, WordSource};
use race_types::{ConnectionId, ServerMessage, SubmitResult};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::error::ServerError;
use crate::ledger::ScoreLedger;
use crate::session::PlayerHandle;

pub const OPPONENT_LEFT: &str = "Opponent left";
pub const WORD_POOL_EXHAUSTED: &str = "Word pool exhausted";

#[derive(Debug)]
struct ActiveGame {
    state: GameState,
    players: [PlayerHandle; 2],
    // Set under the game lock before the game is unmapped; a submission that
    // got hold of the game just before termination sees it and backs off.
    closed: bool,
}

impl ActiveGame {
    fn opponent_of(&self, id: ConnectionId) -> Option<&PlayerHandle> {
        self.players.iter().find(|p| p.id() != id)
    }

    async fn broadcast_word(&self) {
        let word = self.state.current_word().to_string();
        for (index, player) in self.players.iter().enumerate() {
            let opponent_nickname = self.players[1 - index].nickname().await;
            player.notify(ServerMessage::WordBroadcast {
                word: word.clone(),
                opponent_nickname,
            });
        }
    }
}

type SharedGame = Arc<Mutex<ActiveGame>>;

/// All running games, reachable from either participant's id.
///
/// Each game has its own lock, so rounds in unrelated games never wait on
/// each other. The table lock is released before a game lock is taken.
pub struct GameTable {
    games: RwLock<HashMap<ConnectionId, SharedGame>>,
    words: Arc<dyn WordSource>,
    clock: Arc<dyn Clock>,
    ledger: Arc<ScoreLedger>,
    max_word_draws: usize,
}

impl GameTable {
    pub fn new(
        words: Arc<dyn WordSource>,
        clock: Arc<dyn Clock>,
        ledger: Arc<ScoreLedger>,
        max_word_draws: usize,
    ) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            words,
            clock,
            ledger,
            max_word_draws,
        }
    }

    /// Pairs two players, opens the first round and tells both the word.
    pub async fn create_game(&self, first: PlayerHandle, second: PlayerHandle) -> Result<(), ServerError> {
        let mut games = self.games.write().await;
        for id in [first.id(), second.id()] {
            if games.contains_key(&id) {
                return Err(ServerError::AlreadyInGame(id));
            }
        }

        let now = self.clock.now();
        let mut state = GameState::new(first.id(), second.id(), now);
        state.start_round(self.words.as_ref(), now, self.max_word_draws)?;

        let game = ActiveGame {
            state,
            players: [first.clone(), second.clone()],
            closed: false,
        };
        game.broadcast_word().await;

        let game = Arc::new(Mutex::new(game));
        games.insert(first.id(), game.clone());
        games.insert(second.id(), game);

        info!("Created game for {} and {}", first.id(), second.id());
        Ok(())
    }

    /// Judges a word from `player` and delivers the result to them.
    ///
    /// A second correct answer stores the round's scores for both players
    /// and opens the next round; the submitter hears their result before
    /// the new word.
    pub async fn submit_word(&self, player: &PlayerHandle, word: &str) -> SubmitResult {
        let Some(game) = self.game_for(player.id()).await else {
            let result = SubmitResult::no_game_found();
            player.notify(result.to_message());
            return result;
        };

        let mut active = game.lock().await;
        if active.closed {
            let result = SubmitResult::no_game_found();
            player.notify(result.to_message());
            return result;
        }

        let now = self.clock.now();
        let judgement = RoundReferee::judge(&active.state, player.id(), word, now);
        active.state.apply(&judgement.delta);

        if let Some(scores) = judgement.scores.clone() {
            if let Some(winner) = active.state.opponent_of(player.id()) {
                self.ledger.append_pair(player.id(), winner, scores).await;
            }
        }

        player.notify(judgement.result.to_message());

        if judgement.closes_round() {
            info!(
                "Round {} scored for {} on '{}' ({} completed)",
                active.state.round(),
                player.id(),
                active.state.current_word(),
                active.state.completed_rounds()
            );

            let next_round = active
                .state
                .start_round(self.words.as_ref(), now, self.max_word_draws)
                .map(|_| ());
            match next_round {
                Ok(()) => active.broadcast_word().await,
                Err(e) => {
                    error!("Cannot start next round for {}: {}", player.id(), e);
                    active.closed = true;
                    let players = active.players.clone();
                    drop(active);

                    self.unmap(&game, &players).await;
                    for p in &players {
                        p.notify(ServerMessage::GameTerminated {
                            reason: WORD_POOL_EXHAUSTED.to_string(),
                        });
                    }
                }
            }
        }

        judgement.result
    }

    /// Ends the game `id` is playing, if any, and tells the other player
    /// why. The survivor is not re-queued.
    pub async fn terminate(&self, id: ConnectionId, reason: &str) -> bool {
        let game = {
            let mut games = self.games.write().await;
            games.remove(&id)
        };
        let Some(game) = game else {
            return false;
        };

        let (survivor, completed) = {
            let mut active = game.lock().await;
            if active.closed {
                return false;
            }
            active.closed = true;
            (active.opponent_of(id).cloned(), active.state.completed_rounds())
        };

        if let Some(survivor) = survivor {
            self.unmap(&game, std::slice::from_ref(&survivor)).await;
            survivor.notify(ServerMessage::GameTerminated {
                reason: reason.to_string(),
            });
            info!(
                "Game of {} and {} terminated after {} rounds: {}",
                id,
                survivor.id(),
                completed,
                reason
            );
        }
        true
    }

    pub async fn has_game(&self, id: ConnectionId) -> bool {
        let games = self.games.read().await;
        games.contains_key(&id)
    }

    /// Number of distinct running games.
    pub async fn game_count(&self) -> usize {
        let games = self.games.read().await;
        games
            .values()
            .map(Arc::as_ptr)
            .collect::<HashSet<_>>()
            .len()
    }

    pub async fn current_word(&self, id: ConnectionId) -> Option<String> {
        let game = self.game_for(id).await?;
        let active = game.lock().await;
        Some(active.state.current_word().to_string())
    }

    pub async fn opponent_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        let game = self.game_for(id).await?;
        let active = game.lock().await;
        active.state.opponent_of(id)
    }

    async fn game_for(&self, id: ConnectionId) -> Option<SharedGame> {
        let games = self.games.read().await;
        games.get(&id).cloned()
    }

    // Only removes entries that still point at this very game.
    async fn unmap(&self, game: &SharedGame, players: &[PlayerHandle]) {
        let mut games = self.games.write().await;
        for player in players {
            if games
                .get(&player.id())
                .is_some_and(|mapped| Arc::ptr_eq(mapped, game))
            {
                games.remove(&player.id());
            }
        }
    }
}
