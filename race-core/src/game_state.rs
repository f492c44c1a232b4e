use std::collections::HashSet;

use chrono::{DateTime, Utc};
use race_types::ConnectionId;
use tracing::debug;

use crate::{CoreError, RoundDelta, WordSource};

/// Default cap on draws when looking for an unused word.
pub const DEFAULT_MAX_WORD_DRAWS: usize = 10_000;

/// Where the current round stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    AwaitingFirstCorrect,
    AwaitingSecondCorrect,
}

/// Round state of one two-player game. The pair of players is fixed for
/// the lifetime of the game; rounds follow each other until someone leaves.
#[derive(Debug, Clone)]
pub struct GameState {
    players: [ConnectionId; 2],
    current_word: String,
    round_started_at: DateTime<Utc>,
    has_winner: bool,
    previous_words: HashSet<String>,
    // Elapsed time of whoever already answered this round.
    recorded_time: Option<(ConnectionId, i64)>,
    round: u32,
    completed_rounds: u32,
}

impl GameState {
    /// A game with no round started yet. Call [`GameState::start_round`]
    /// before judging any submission.
    pub fn new(first: ConnectionId, second: ConnectionId, now: DateTime<Utc>) -> Self {
        Self {
            players: [first, second],
            current_word: String::new(),
            round_started_at: now,
            has_winner: false,
            previous_words: HashSet::new(),
            recorded_time: None,
            round: 0,
            completed_rounds: 0,
        }
    }

    /// Draws words until one not yet used in this game comes up, then opens
    /// a fresh round with it.
    ///
    /// The draw gives up after `max_draws` attempts so an exhausted pool
    /// surfaces as an error instead of spinning forever.
    pub fn start_round(
        &mut self,
        words: &dyn WordSource,
        now: DateTime<Utc>,
        max_draws: usize,
    ) -> Result<&str, CoreError> {
        let mut next_word = None;
        for _ in 0..max_draws {
            let candidate = words.random_word();
            if !self.previous_words.contains(&candidate) {
                next_word = Some(candidate);
                break;
            }
        }

        let next_word = next_word.ok_or(CoreError::WordPoolExhausted {
            attempts: max_draws,
        })?;

        self.previous_words.insert(next_word.clone());
        self.current_word = next_word;
        self.round_started_at = now;
        self.has_winner = false;
        self.recorded_time = None;
        self.round += 1;

        debug!("Round {} started with a {}-letter word", self.round, self.current_word.len());
        Ok(&self.current_word)
    }

    pub fn apply(&mut self, delta: &RoundDelta) {
        match delta {
            RoundDelta::None => {}
            RoundDelta::RecordWinner { player, elapsed_ms } => {
                self.has_winner = true;
                self.recorded_time = Some((*player, *elapsed_ms));
            }
            RoundDelta::CloseRound => {
                self.completed_rounds += 1;
            }
        }
    }

    pub fn players(&self) -> [ConnectionId; 2] {
        self.players
    }

    pub fn contains(&self, player: ConnectionId) -> bool {
        self.players.contains(&player)
    }

    pub fn opponent_of(&self, player: ConnectionId) -> Option<ConnectionId> {
        match self.players {
            [a, b] if a == player => Some(b),
            [a, b] if b == player => Some(a),
            _ => None,
        }
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn round_started_at(&self) -> DateTime<Utc> {
        self.round_started_at
    }

    pub fn has_winner(&self) -> bool {
        self.has_winner
    }

    pub fn phase(&self) -> RoundPhase {
        if self.has_winner {
            RoundPhase::AwaitingSecondCorrect
        } else {
            RoundPhase::AwaitingFirstCorrect
        }
    }

    pub fn previous_words(&self) -> &HashSet<String> {
        &self.previous_words
    }

    pub fn recorded_time(&self) -> Option<(ConnectionId, i64)> {
        self.recorded_time
    }

    /// Elapsed time recorded for `player` in the current round, if they
    /// have already answered.
    pub fn recorded_time_for(&self, player: ConnectionId) -> Option<i64> {
        self.recorded_time
            .filter(|(id, _)| *id == player)
            .map(|(_, elapsed)| elapsed)
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn completed_rounds(&self) -> u32 {
        self.completed_rounds
    }
}
