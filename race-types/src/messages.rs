use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{ConnectionId, SubmitOutcome};

/// Everything a player can send. The set is closed; anything that fails to
/// deserialize into one of these is dropped by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClientMessage {
    JoinGame,
    SetNickname { nickname: String },
    TypeWord { word: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServerMessage {
    /// Sent once, right after the socket is registered.
    LobbyJoined { session_id: ConnectionId },
    /// New round. Both participants receive the same word.
    WordBroadcast {
        word: String,
        opponent_nickname: Option<String>,
    },
    SubmitWordResult {
        outcome: SubmitOutcome,
        player_score: Option<u32>,
        player_time_millis: Option<i64>,
    },
    GameTerminated { reason: String },
}
