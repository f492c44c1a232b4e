use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ServerMessage;

/// One player's view of a finished round. Records are always produced in
/// pairs, the second being [`RoundScore::for_opponent`] of the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundScore {
    /// Position in the owning player's history, counting from 0. Filled in
    /// when the record is stored.
    pub index: u32,
    pub word: String,
    pub player_time_millis: i64,
    pub opponent_time_millis: i64,
    pub player_score: u32,
    pub opponent_score: u32,
    pub did_win: bool,
}

impl RoundScore {
    /// The same round seen from the other side of the table.
    pub fn for_opponent(&self) -> Self {
        RoundScore {
            index: self.index,
            word: self.word.clone(),
            player_time_millis: self.opponent_time_millis,
            opponent_time_millis: self.player_time_millis,
            player_score: self.opponent_score,
            opponent_score: self.player_score,
            did_win: !self.did_win,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SubmitOutcome {
    NoGameFound,
    WordMismatch,
    RoundWon,
    RoundLost,
    /// The submitter already won the current round and typed the word again.
    AlreadyAnswered,
}

/// What the submitter of a word is told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub outcome: SubmitOutcome,
    pub player_score: Option<u32>,
    pub player_time_millis: Option<i64>,
}

impl SubmitResult {
    pub fn without_score(outcome: SubmitOutcome) -> Self {
        Self {
            outcome,
            player_score: None,
            player_time_millis: None,
        }
    }

    pub fn no_game_found() -> Self {
        Self::without_score(SubmitOutcome::NoGameFound)
    }

    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::SubmitWordResult {
            outcome: self.outcome,
            player_score: self.player_score,
            player_time_millis: self.player_time_millis,
        }
    }
}
